//! Fire-and-forget calls back to the article backend.
//!
//! Both operations are advisory; the controller spawns them detached and a
//! failure is only ever logged.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::models::TrackId;

/// Backend surface the player reports into.
#[async_trait]
pub trait TrackApi: Send + Sync {
    /// Persist a corrected duration, in whole seconds.
    async fn update_duration(&self, id: &TrackId, duration_secs: u32) -> Result<()>;

    /// Record one play of the track.
    async fn record_play(&self, id: &TrackId) -> Result<()>;
}

/// REST client for the article backend.
pub struct HttpTrackApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTrackApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TrackApi for HttpTrackApi {
    async fn update_duration(&self, id: &TrackId, duration_secs: u32) -> Result<()> {
        let url = format!("{}/api/articles/{}/duration", self.base_url, id);
        debug!("Updating stored duration for {id} to {duration_secs}s");
        self.client
            .put(&url)
            .json(&json!({ "duration": duration_secs }))
            .send()
            .await
            .context("Duration update request failed")?
            .error_for_status()
            .context("Duration update rejected by backend")?;
        Ok(())
    }

    async fn record_play(&self, id: &TrackId) -> Result<()> {
        let url = format!("{}/api/articles/{}/play", self.base_url, id);
        debug!("Recording play for {id}");
        self.client
            .post(&url)
            .send()
            .await
            .context("Play tracking request failed")?
            .error_for_status()
            .context("Play tracking rejected by backend")?;
        Ok(())
    }
}
