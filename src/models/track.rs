use serde::{Deserialize, Serialize};
use std::fmt;

use super::TrackId;

/// One playable audio article. External and read-only to the controller; a
/// loader hands these in, the controller never fetches them itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub media_url: String,
    /// Best-effort value computed at ingestion time. May be missing, wrong,
    /// or a known placeholder (0, 300, 480).
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

impl Track {
    pub fn has_media(&self) -> bool {
        !self.media_url.trim().is_empty()
    }
}

/// Coarse playback-quality policy level chosen from device/network signals,
/// overridable by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityTier::Low => write!(f, "low"),
            QualityTier::Medium => write!(f, "medium"),
            QualityTier::High => write!(f, "high"),
        }
    }
}
