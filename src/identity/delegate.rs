use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use thiserror::Error;
use tracing::warn;

/// Raised when the remote identity provider cannot produce a verdict. This is
/// deliberately distinct from a `false` verdict: "wrong password" and "can't
/// reach the identity provider" must never be conflated.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
}

/// Answers "are these credentials valid?" by consulting a remote service.
/// Implementations never make a local trust decision.
#[async_trait]
pub trait CredentialDelegate: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Result<bool, VerifyError>;
}

/// Production delegate: `GET <base>/API/User/login?login=<u>&password=<p>`
/// against the external Resorter360 API, expecting the literal JSON `true`.
pub struct RemoteCredentialDelegate {
    base: Url,
    client: reqwest::Client,
}

impl RemoteCredentialDelegate {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = Url::parse(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { base, client })
    }
}

#[async_trait]
impl CredentialDelegate for RemoteCredentialDelegate {
    async fn verify(&self, username: &str, password: &str) -> Result<bool, VerifyError> {
        let url = self
            .base
            .join("/API/User/login")
            .map_err(|e| VerifyError::Unavailable(e.to_string()))?;
        let resp = self
            .client
            .get(url)
            .query(&[("login", username), ("password", password)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!("credential check failed to reach upstream: {e}");
                VerifyError::Unavailable(e.to_string())
            })?;
        let status = resp.status();
        if !status.is_success() {
            warn!("credential check upstream returned {status}");
            return Err(VerifyError::Unavailable(format!("upstream returned {status}")));
        }
        // A well-formed body that is anything other than `true` is an explicit
        // rejection; a body that is not JSON at all is a fault.
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| VerifyError::Unavailable(format!("malformed upstream body: {e}")))?;
        Ok(body == serde_json::Value::Bool(true))
    }
}
