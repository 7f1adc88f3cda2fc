use crate::highlight::channel::Correlation;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE: &str = "https://api.github.com/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_base: String,
    pub correlation: Correlation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            correlation: Correlation::Request,
            log_file: None,
            log_filter: "octoview=info".to_string(),
        }
    }
}

/// Command-line values that win over every other source.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_base: Option<String>,
    pub correlation: Option<Correlation>,
}

impl Config {
    pub fn load(overrides: Overrides) -> Self {
        let config_file = config_dir().join("octoview").join("config.toml");
        Self::load_from(&config_file, overrides)
    }

    pub fn load_from(config_file: &Path, overrides: Overrides) -> Self {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if config_file.exists() {
            figment = figment.merge(Toml::file(config_file));
        }

        figment = figment.merge(Env::prefixed("OCTOVIEW_"));

        if let Some(base) = overrides.api_base {
            figment = figment.merge(Serialized::default("api_base", base));
        }
        if let Some(correlation) = overrides.correlation {
            figment = figment.merge(Serialized::default("correlation", correlation));
        }

        match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "config parse error, using defaults");
                Config::default()
            }
        }
    }
}

pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    #[serial]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(&dir.path().join("nope.toml"), Overrides::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn file_values_are_merged() {
        let file = write_config(
            "api_base = \"http://localhost:9000/\"\ncorrelation = \"key\"\nlog_file = \"/tmp/octoview.log\"\n",
        );
        let config = Config::load_from(file.path(), Overrides::default());
        assert_eq!(config.api_base, "http://localhost:9000/");
        assert_eq!(config.correlation, Correlation::Key);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/octoview.log")));
        assert_eq!(config.log_filter, "octoview=info");
    }

    #[test]
    #[serial]
    fn env_beats_file_and_cli_beats_env() {
        let file = write_config("api_base = \"http://file/\"\n");
        std::env::set_var("OCTOVIEW_API_BASE", "http://env/");
        let from_env = Config::load_from(file.path(), Overrides::default());
        let from_cli = Config::load_from(
            file.path(),
            Overrides {
                api_base: Some("http://cli/".to_string()),
                correlation: Some(Correlation::Key),
            },
        );
        std::env::remove_var("OCTOVIEW_API_BASE");

        assert_eq!(from_env.api_base, "http://env/");
        assert_eq!(from_cli.api_base, "http://cli/");
        assert_eq!(from_cli.correlation, Correlation::Key);
    }

    #[test]
    #[serial]
    fn parse_error_falls_back_to_defaults() {
        let file = write_config("correlation = \"telepathy\"\n");
        let config = Config::load_from(file.path(), Overrides::default());
        assert_eq!(config, Config::default());
    }
}
