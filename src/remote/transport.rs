//! HTTP transport.
//!
//! Validators and the submitter talk to the network only through
//! [`HttpTransport`], so tests can swap in a fake. [`ReqwestTransport`] is
//! the production implementation.

use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::{MipodError, RemoteError, Result};

/// Status code and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for exactly HTTP 200. Other 2xx codes do not count.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Outbound HTTP capability.
///
/// Both calls fail only when the request cannot be completed at all; any
/// status code, including errors, is returned as a response.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issues a GET request.
    async fn get(&self, url: &str) -> Result<HttpResponse>;

    /// Issues a POST request with a JSON body.
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<HttpResponse>;
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// HTTP client.
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mipod/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                MipodError::Remote(RemoteError::Client {
                    message: e.to_string(),
                })
            })?;

        Ok(Self { client })
    }

    async fn read(url: &str, response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::transport(url, format!("Failed to read body: {e}")))?;

        debug!("{url} answered {status}");
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        trace!("GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RemoteError::transport(url, e.to_string()))?;

        Self::read(url, response).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<HttpResponse> {
        trace!("POST {url}");

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::transport(url, e.to_string()))?;

        Self::read(url, response).await
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use async_trait::async_trait;
    use mockall::mock;

    use super::{HttpResponse, HttpTransport};
    use crate::error::Result;

    mock! {
        pub Transport {}

        #[async_trait]
        impl HttpTransport for Transport {
            async fn get(&self, url: &str) -> Result<HttpResponse>;
            async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<HttpResponse>;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_200_is_ok() {
        assert!(HttpResponse::new(200, "").is_ok());
        assert!(!HttpResponse::new(201, "").is_ok());
        assert!(!HttpResponse::new(404, "").is_ok());
    }

    #[test]
    fn test_transport_builds() {
        assert!(ReqwestTransport::new(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        // Port 9 on localhost is the discard service and is normally closed.
        let err = transport.get("http://127.0.0.1:9/health").await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }
}
