use std::sync::Arc;

use crate::config::{ClientConfig, ConfigError};
use crate::http::{CurlTransport, HttpClient, Transport};
use crate::resources::Core;

/// Top-level handle. Cheap to clone; every clone shares one executor and
/// one retry policy.
#[derive(Debug, Clone)]
pub struct ScalePadClient {
    http: Arc<HttpClient>,
}

impl ScalePadClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::with_transport(config, Arc::new(CurlTransport::default()))
    }

    /// Builds a client over a caller-supplied transport.
    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        let api_key = config.validate()?;
        let retry = config.retry_policy();
        let http = HttpClient::new(
            transport,
            api_key,
            config.base_url.as_str(),
            config.timeout(),
            retry,
        );
        tracing::info!(
            base_url = %http.base_url(),
            timeout_ms = config.timeout_ms,
            max_retries = retry.max_retries,
            "scalepad client initialized"
        );
        Ok(Self {
            http: Arc::new(http),
        })
    }

    pub fn core(&self) -> Core {
        Core::new(Arc::clone(&self.http))
    }

    /// The shared executor, for endpoints without a typed resource.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}
