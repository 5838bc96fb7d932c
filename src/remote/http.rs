//! HTTP client for a remote closest-sum solver.

use async_trait::async_trait;
use reqwest::Client;

use super::{RemoteRequest, RemoteSolver, RemoteTransportError};

/// Posts requests as JSON to a remote solver endpoint and returns the raw body.
#[derive(Debug, Clone)]
pub struct HttpRemoteSolver {
    url: String,
    http: Client,
}

impl HttpRemoteSolver {
    /// Create a client for the solver listening at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }

    /// The endpoint requests are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RemoteSolver for HttpRemoteSolver {
    async fn submit(&self, request: &RemoteRequest) -> Result<String, RemoteTransportError> {
        let response = self.http.post(&self.url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            return Err(RemoteTransportError::Status { status, body });
        }

        Ok(response.text().await?)
    }
}
