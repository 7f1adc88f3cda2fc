use crate::error::{OctoviewError, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde_json::Value;

/// One-shot GET against the upstream API, returning the parsed JSON body.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value>;
}

#[derive(Clone)]
pub struct GitHubClient {
    octo: Octocrab,
}

impl GitHubClient {
    pub fn new(api_base: &str) -> Result<Self> {
        let octo = Octocrab::builder()
            .base_uri(api_base)
            .map_err(|e| OctoviewError::GitHub(e.to_string()))?
            .build()
            .map_err(|e| OctoviewError::GitHub(e.to_string()))?;

        Ok(Self { octo })
    }
}

#[async_trait]
impl ResourceClient for GitHubClient {
    async fn get(&self, path: &str) -> Result<Value> {
        let route = format!("/{}", path.trim_start_matches('/'));
        self.octo
            .get::<Value, _, ()>(route, None)
            .await
            .map_err(|e| OctoviewError::GitHub(e.to_string()))
    }
}
