//! Request/response exchange with the match server

use std::time::Duration;

use async_trait::async_trait;

use super::protocol::{PeerError, PeerRequest};

const CONNECT_TIMEOUT_SECS: u64 = 5;

/// One poll round trip; returns the raw response body
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn exchange(&self, request: &PeerRequest) -> Result<String, PeerError>;
}

/// Plain HTTP GET against the match endpoint
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PeerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| PeerError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn url_for(&self, request: &PeerRequest) -> String {
        format!("{}{}", self.base_url, request.to_query())
    }
}

#[async_trait]
impl PeerTransport for HttpTransport {
    async fn exchange(&self, request: &PeerRequest) -> Result<String, PeerError> {
        let url = self.url_for(request);
        log::debug!("Sending peer request: {url}");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| PeerError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(PeerError::Status(status));
        }

        response
            .text()
            .await
            .map_err(|e| PeerError::Transport(e.to_string()))
    }
}
