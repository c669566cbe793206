//! Reachability checks run during validation.
//!
//! Each check issues a single GET and accepts only HTTP 200. Nothing is
//! retried; the first failure is reported as-is.

use tracing::{debug, info, warn};

use crate::config::ImageRef;
use crate::error::{MipodError, RemoteError, Result};

use super::transport::HttpTransport;

/// Probes the API health endpoint.
///
/// # Errors
///
/// Returns `HealthCheck` if the request fails or the status is not 200.
pub async fn probe_health<T: HttpTransport + ?Sized>(transport: &T, url: &str) -> Result<()> {
    info!("Checking API health at {url}");

    let response = transport.get(url).await.map_err(|e| {
        warn!("Health check failed for {url}: {e}");
        RemoteError::HealthCheck {
            url: url.to_string(),
            reason: transport_reason(&e),
        }
    })?;

    if !response.is_ok() {
        return Err(MipodError::Remote(RemoteError::HealthCheck {
            url: url.to_string(),
            reason: format!("Status code is {}", response.status),
        }));
    }

    debug!("API at {url} is healthy");
    Ok(())
}

/// Returns the registry URL of a model.
#[must_use]
pub fn model_url(registry: &str, model_name: &str) -> String {
    format!("{}/{}", registry.trim_end_matches('/'), model_name.trim_matches('/'))
}

/// Confirms the model exists in the registry.
///
/// # Errors
///
/// Returns `ModelNotFound` if the request fails or the status is not 200.
pub async fn lookup_model<T: HttpTransport + ?Sized>(
    transport: &T,
    registry: &str,
    model_name: &str,
) -> Result<()> {
    let url = model_url(registry, model_name);
    info!("Looking up model {model_name} at {url}");

    let response = transport.get(&url).await.map_err(|e| RemoteError::ModelNotFound {
        model: model_name.to_string(),
        reason: transport_reason(&e),
    })?;

    if !response.is_ok() {
        return Err(MipodError::Remote(RemoteError::ModelNotFound {
            model: model_name.to_string(),
            reason: format!("registry answered {}", response.status),
        }));
    }

    debug!("Model {model_name} found");
    Ok(())
}

/// Returns the Docker registry URL of an image tag.
#[must_use]
pub fn image_url(registry: &str, repository: &str, tag: &str) -> String {
    format!(
        "{}/v2/repositories/{repository}/tags/{tag}/",
        registry.trim_end_matches('/')
    )
}

/// Confirms the image tag exists in the Docker registry.
///
/// # Errors
///
/// Returns `InvalidImageFormat` if the reference has no tag, `ImageNotFound`
/// on 404, and `ImageCheckFailed` for any other failure.
pub async fn lookup_image<T: HttpTransport + ?Sized>(
    transport: &T,
    registry: &str,
    image: &ImageRef,
) -> Result<()> {
    let image_id = image.to_string();
    let tag = image.tag.as_deref().ok_or_else(|| {
        crate::error::ValidationError::InvalidImageFormat {
            image_id: image_id.clone(),
            reason: String::from("Missing tag"),
        }
    })?;

    let url = image_url(registry, &image.repository, tag);
    info!("Looking up image {image_id} at {url}");

    let response = transport
        .get(&url)
        .await
        .map_err(|e| RemoteError::ImageCheckFailed {
            image_id: image_id.clone(),
            reason: transport_reason(&e),
        })?;

    match response.status {
        200 => {
            debug!("Image {image_id} found");
            Ok(())
        }
        404 => Err(MipodError::Remote(RemoteError::ImageNotFound { image_id })),
        status => Err(MipodError::Remote(RemoteError::ImageCheckFailed {
            image_id,
            reason: format!("status {status}"),
        })),
    }
}

/// Extracts the transport message without the outer error prefixes.
fn transport_reason(error: &MipodError) -> String {
    match error {
        MipodError::Remote(RemoteError::Transport { message, .. }) => message.clone(),
        other => other.to_string(),
    }
}
