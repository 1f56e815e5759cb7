//! Metrics provider seam
//!
//! The engine never computes risk/drift metrics itself; it pulls snapshots
//! from the external ML analytics service. A pull failure is transient: the
//! cycle is skipped and the next timer tick retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::MetricsProviderConfig;
use crate::error::{Error, Result};
use crate::models::MetricsSnapshot;

/// Source of point-in-time health snapshots
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Capture one snapshot; fails with `Error::Provider` when the service
    /// is unavailable
    async fn snapshot(&self) -> Result<MetricsSnapshot>;
}

/// Provider backed by the analytics service's HTTP API
pub struct HttpMetricsProvider {
    client: Client,
    endpoint: String,
}

impl HttpMetricsProvider {
    /// Build a provider from config
    pub fn from_config(config: &MetricsProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::provider(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/health/snapshot", config.base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl MetricsProvider for HttpMetricsProvider {
    async fn snapshot(&self) -> Result<MetricsSnapshot> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| Error::provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::provider(format!(
                "analytics service returned {}",
                response.status()
            )));
        }

        let snapshot = response
            .json::<MetricsSnapshot>()
            .await
            .map_err(|e| Error::provider(e.to_string()))?;

        debug!(captured_at = %snapshot.captured_at, "Pulled metrics snapshot");
        Ok(snapshot)
    }
}
