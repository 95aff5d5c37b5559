use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use composer_core::models::ExternalService;
use composer_core::{ComposerError, ComposerResult};

/// Reachability check against one remote management service.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Returns true when the service answered.
    async fn probe(&self, service: &ExternalService) -> bool;
}

/// HTTP probe: a GET against the service's base URL counts as contact
/// when it answers with a success status.
pub struct HttpReachabilityProbe {
    client: reqwest::Client,
}

impl HttpReachabilityProbe {
    pub fn new(timeout: Duration) -> ComposerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ComposerError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReachabilityProbe for HttpReachabilityProbe {
    async fn probe(&self, service: &ExternalService) -> bool {
        match self.client.get(&service.base_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(
                    service_uuid = %service.uuid,
                    "reachability probe failed: {e}"
                );
                false
            }
        }
    }
}
