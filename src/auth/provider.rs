use async_trait::async_trait;
use serde::Deserialize;

/// What the identity provider hands back for a valid session id.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionData {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: String,
    pub session_token: String,
}

/// Seam for the delegated-auth exchange, so tests can swap in a stub
/// instead of a live HTTP call.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange(&self, session_id: &str) -> anyhow::Result<SessionData>;
}

/// Live client for the Emergent auth endpoint. The session id travels in
/// the `X-Session-ID` header; the response body is `SessionData` JSON.
pub struct EmergentAuth {
    http: reqwest::Client,
    url: String,
}

impl EmergentAuth {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for EmergentAuth {
    async fn exchange(&self, session_id: &str) -> anyhow::Result<SessionData> {
        let data = self
            .http
            .get(&self.url)
            .header("X-Session-ID", session_id)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(data)
    }
}
