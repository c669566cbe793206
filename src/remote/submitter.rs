//! Deployment submission.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{ManifestHasher, ValidatedManifest};
use crate::error::Result;

use super::transport::HttpTransport;

/// Response body returned by the deploy endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// Body parsed as JSON.
    Json(serde_json::Value),
    /// Body that is not JSON.
    Text(String),
}

impl ResponseBody {
    fn parse(text: String) -> Self {
        serde_json::from_str(&text).map_or(Self::Text(text), Self::Json)
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Outcome of a submission that reached the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployResult {
    /// True only for HTTP 200.
    pub success: bool,
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: ResponseBody,
}

/// Posts validated manifests to the API's deploy endpoint.
#[derive(Debug)]
pub struct DeploySubmitter<T> {
    transport: T,
}

impl<T: HttpTransport> DeploySubmitter<T> {
    /// Creates a submitter.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Serializes the whole manifest to JSON and posts it.
    ///
    /// A non-200 answer is returned as an unsuccessful [`DeployResult`], not
    /// as an error.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request cannot be completed, or a
    /// manifest error if the document cannot be serialized.
    pub async fn submit(&self, manifest: &ValidatedManifest) -> Result<DeployResult> {
        let url = manifest.api()?.deploy_url();
        let payload = manifest.to_json()?;

        let hasher = ManifestHasher::new();
        let digest = hasher.hash_manifest(manifest.raw())?;
        info!("Submitting manifest {} to {url}", hasher.short_hash(&digest));

        let response = self.transport.post_json(&url, &payload).await?;
        let success = response.is_ok();

        if success {
            info!("Deployment accepted");
        } else {
            warn!("Deployment rejected with status {}", response.status);
        }

        Ok(DeployResult {
            success,
            status: response.status,
            body: ResponseBody::parse(response.body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvsPolicy, ManifestLoader};
    use crate::error::{MipodError, RemoteError};
    use crate::remote::HttpResponse;
    use crate::remote::mock::MockTransport;

    const MANIFEST: &str = r#"
api:
  address: deploy.local
  port: 9000
model:
  model_name: Qwen/Qwen2.5-7B-Instruct
resources:
  cpus: 8
  memory: 64
  ports: 8000
  accelerators: "MI300:8"
  image_id: "docker:rocm/vllm:latest"
service:
  ports: 8000
  readiness_probe: /health
"#;

    fn manifest() -> ValidatedManifest {
        let raw = ManifestLoader::new().parse_yaml(MANIFEST, None).unwrap();
        ValidatedManifest::new(raw, EnvsPolicy::Ignored)
    }

    #[tokio::test]
    async fn test_submit_accepted() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .withf(|url, body| {
                url == "http://deploy.local:9000/deploy"
                    && body["resources"]["accelerators"] == "MI300:8"
                    && body["service"]["ports"] == 8000
            })
            .times(1)
            .returning(|_, _| Ok(HttpResponse::new(200, r#"{"id":"dep-1"}"#)));

        let result = DeploySubmitter::new(transport).submit(&manifest()).await.unwrap();
        assert!(result.success);
        assert_eq!(result.status, 200);
        assert_eq!(result.body, ResponseBody::Json(serde_json::json!({"id": "dep-1"})));
    }

    #[tokio::test]
    async fn test_submit_non_200_is_reported_not_raised() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .returning(|_, _| Ok(HttpResponse::new(201, "created elsewhere")));

        let result = DeploySubmitter::new(transport).submit(&manifest()).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.status, 201);
        assert_eq!(result.body, ResponseBody::Text(String::from("created elsewhere")));
    }

    #[tokio::test]
    async fn test_submit_transport_failure() {
        let mut transport = MockTransport::new();
        transport.expect_post_json().returning(|url, _| {
            Err(MipodError::Remote(RemoteError::transport(url, "connection refused")))
        });

        let err = DeploySubmitter::new(transport).submit(&manifest()).await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }
}
