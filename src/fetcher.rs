use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::models::AvailabilityRecord;

pub const AVAILABILITY_PATH: &str = "/api/availability";

/// Error body the backend sends with a 500
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    detail: String,
}

#[derive(Debug, Default)]
struct Snapshot {
    ticket: u64,
    records: Arc<Vec<AvailabilityRecord>>,
}

/// Client for the availability backend that keeps the newest successful payload.
///
/// Every refresh draws a ticket before it is sent. A response only replaces the
/// held payload if no later-issued refresh has already been applied.
pub struct AvailabilityFetcher {
    client: Client,
    endpoint: String,
    timeout: Duration,
    issued: AtomicU64,
    latest: RwLock<Snapshot>,
}

impl AvailabilityFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), AVAILABILITY_PATH),
            timeout,
            issued: AtomicU64::new(0),
            latest: RwLock::new(Snapshot::default()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the payload and make it the current snapshot.
    ///
    /// Returns [`FetchError::Stale`] when a newer refresh finished first.
    pub async fn refresh(&self) -> Result<Arc<Vec<AvailabilityRecord>>, FetchError> {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let records = self.request().await.inspect_err(|err| {
            warn!(endpoint = %self.endpoint, %err, "Availability refresh failed");
        })?;
        self.apply(ticket, records).await
    }

    /// Records from the last applied refresh; empty before the first success.
    pub async fn snapshot(&self) -> Arc<Vec<AvailabilityRecord>> {
        self.latest.read().await.records.clone()
    }

    async fn apply(
        &self,
        ticket: u64,
        records: Vec<AvailabilityRecord>,
    ) -> Result<Arc<Vec<AvailabilityRecord>>, FetchError> {
        let mut latest = self.latest.write().await;
        if ticket < latest.ticket {
            debug!(ticket, applied = latest.ticket, "Discarding stale availability payload");
            return Err(FetchError::Stale);
        }

        let records = Arc::new(records);
        *latest = Snapshot {
            ticket,
            records: records.clone(),
        };
        info!(records = records.len(), "Availability refreshed");
        Ok(records)
    }

    async fn request(&self) -> Result<Vec<AvailabilityRecord>, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| self.classify(err))?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(parsed) if !parsed.detail.is_empty() => parsed.detail,
                Ok(parsed) if !parsed.error.is_empty() => parsed.error,
                _ => status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            };
            return Err(FetchError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else {
            FetchError::Transport(err)
        }
    }
}
