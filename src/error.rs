use thiserror::Error;

#[derive(Error, Debug)]
pub enum OctoviewError {
    #[error("github error: {0}")]
    GitHub(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown user `{0}`: ADD_USER was never reduced for it")]
    UnknownUser(String),

    #[error("unknown repository `{username}/{repo}`: ADD_USER was never reduced for it")]
    UnknownRepository { username: String, repo: String },

    #[error("malformed {action} payload: {detail}")]
    MalformedPayload { action: &'static str, detail: String },

    #[error("invalid route: {0}")]
    Route(String),

    #[error("highlight worker is gone")]
    WorkerGone,
}

pub type Result<T> = std::result::Result<T, OctoviewError>;
