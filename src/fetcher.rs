//! HTTP fetching with bounded retries and per-host politeness spacing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use backoff::backoff::Backoff;
use backoff::exponential::ExponentialBackoff;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::types::{FetchConfig, PipelineError, Result};

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    last_request: Arc<RwLock<HashMap<String, Instant>>>,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            last_request: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Fetch a URL body as text, retrying transient failures with
    /// exponential backoff.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        self.apply_host_spacing(url).await;

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 16),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.retry_delay_seconds * 30)),
            ..Default::default()
        };

        let mut last_error: Option<PipelineError> = None;

        for attempt in 0..=self.config.max_retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.text().await?;
                        debug!(url, bytes = body.len(), "fetched");
                        return Ok(body);
                    }
                    last_error = Some(PipelineError::General(format!(
                        "HTTP {}: {}",
                        status,
                        status.canonical_reason().unwrap_or("Unknown")
                    )));
                }
                Err(e) => last_error = Some(PipelineError::Http(e)),
            }

            if attempt < self.config.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!(url, attempt = attempt + 1, ?delay, "fetch attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }
            break;
        }

        Err(last_error.unwrap_or_else(|| PipelineError::General(format!("fetch failed: {url}"))))
    }

    /// Keep a minimum interval between requests to the same host.
    async fn apply_host_spacing(&self, url: &str) {
        let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) else {
            return;
        };

        let min_interval = Duration::from_millis(self.config.host_spacing_ms);
        let now = Instant::now();

        let mut last_request = self.last_request.write().await;
        if let Some(previous) = last_request.get(&host) {
            let elapsed = now.duration_since(*previous);
            if elapsed < min_interval {
                let wait = min_interval - elapsed;
                debug!(%host, ?wait, "spacing requests to host");
                tokio::time::sleep(wait).await;
            }
        }
        last_request.insert(host, Instant::now());
    }
}
