//! JSON-over-HTTP stage backend (feature `http`).
//!
//! Posts each stage's contract input to a configurable endpoint and
//! strictly validates the JSON reply. One bounded call per invocation;
//! retry and backoff policy belongs to the transport collaborator, not
//! here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::decomposition::{DecompositionInput, DecompositionOutput, DecompositionStage};
use super::relation::{RelationInput, RelationOutput, RelationStage};
use super::selection::{SelectionInput, SelectionOutput, SelectionStage};
use super::stance::{StanceInput, StanceOutput, StanceStage};
use super::StageError;

/// Configuration for the HTTP stage backend.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Base URL of the stage service, without a trailing slash.
    pub base_url: String,
    /// Per-call deadline.
    pub timeout: Duration,
    /// Path for the selection endpoint.
    pub selection_path: String,
    /// Path for the decomposition endpoint.
    pub decomposition_path: String,
    /// Path for the relation-linking endpoint.
    pub relation_path: String,
    /// Path for the stance-verification endpoint.
    pub stance_path: String,
}

impl HttpBackendConfig {
    /// Default paths against a base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            selection_path: "/v1/selection".to_string(),
            decomposition_path: "/v1/decomposition".to_string(),
            relation_path: "/v1/relations".to_string(),
            stance_path: "/v1/stance".to_string(),
        }
    }
}

/// HTTP client implementing the four stage capabilities.
///
/// Construct once at process start and share via `Arc`; the inner
/// `reqwest::Client` pools connections.
pub struct HttpBackend {
    client: Client,
    config: HttpBackendConfig,
}

impl HttpBackend {
    /// Build the backend; fails when the HTTP client cannot be constructed.
    pub fn new(config: HttpBackendConfig) -> Result<Self, StageError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StageError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    async fn call<I: Serialize + Sync, O: DeserializeOwned>(
        &self,
        path: &str,
        input: &I,
    ) -> Result<O, StageError> {
        let url = format!("{}{}", self.config.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(input)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StageError::Timeout(self.config.timeout)
                } else {
                    StageError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StageError::Transport(format!(
                "{} returned {}: {}",
                url, status, body
            )));
        }

        response
            .json::<O>()
            .await
            .map_err(|e| StageError::schema(e.to_string()))
    }
}

#[async_trait]
impl SelectionStage for HttpBackend {
    async fn run(&self, input: &SelectionInput) -> Result<SelectionOutput, StageError> {
        self.call(&self.config.selection_path, input).await
    }
}

#[async_trait]
impl DecompositionStage for HttpBackend {
    async fn run(&self, input: &DecompositionInput) -> Result<DecompositionOutput, StageError> {
        self.call(&self.config.decomposition_path, input)
            .await
    }
}

#[async_trait]
impl RelationStage for HttpBackend {
    async fn run(&self, input: &RelationInput) -> Result<RelationOutput, StageError> {
        self.call(&self.config.relation_path, input).await
    }
}

#[async_trait]
impl StanceStage for HttpBackend {
    async fn run(&self, input: &StanceInput) -> Result<StanceOutput, StageError> {
        self.call(&self.config.stance_path, input).await
    }
}
