//! HTTP GET probe

use crate::probe::{Probe, ProbeError, ProbeOutcome};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tracing::debug;

/// Fetches a URL and measures the time to response headers
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    /// Create an HTTP probe
    ///
    /// Proxy environment variables are ignored so the probe measures the
    /// direct route.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    fn name(&self) -> &str {
        "http"
    }

    async fn measure(&self) -> Result<ProbeOutcome, ProbeError> {
        let started = Instant::now();
        let response = self.client.get(&self.url).send().await?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let status = response.status();
        debug!("GET {} -> {}", self.url, status);

        if status == StatusCode::OK {
            Ok(ProbeOutcome::reachable(elapsed_ms))
        } else {
            Ok(ProbeOutcome::unreachable())
        }
    }
}
