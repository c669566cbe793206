//! Outbound HTTP: transport, reachability probes, and deployment submission.

mod probes;
mod submitter;
mod transport;

pub use probes::{image_url, lookup_image, lookup_model, model_url, probe_health};
pub use submitter::{DeployResult, DeploySubmitter, ResponseBody};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

#[cfg(test)]
pub(crate) use transport::mock;
