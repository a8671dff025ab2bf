use crate::models::{QualityTier, Track};
use crate::player::duration::DurationSource;
use crate::player::preload::PreloadedRanges;
use crate::player::traits::PlayerState;

/// Mutable state of one `load` call. Exactly one session is live per
/// controller; starting a new load replaces it wholesale, which is the only
/// way its resolved duration may drop back to zero.
#[derive(Debug)]
pub struct PlaybackSession {
    pub track: Track,
    /// Monotonic counter distinguishing this session's timers from a
    /// superseded session's.
    pub generation: u64,
    pub state: PlayerState,
    pub tier: QualityTier,
    pub current_url: String,
    pub position_secs: f64,
    resolved_duration_secs: f64,
    pub duration_source: DurationSource,
    /// Durable duration correction already requested for this session.
    pub duration_update_sent: bool,
    pub buffering: bool,
    pub retry_count: u32,
    pub used_fallback: bool,
    pub decode_retry_used: bool,
    pub preloaded: PreloadedRanges,
    pub error_message: Option<String>,
}

impl PlaybackSession {
    pub fn new(track: Track, tier: QualityTier, generation: u64) -> Self {
        // Seed a provisional duration from the stored value so displays have
        // something before metadata arrives; reconciliation replaces it.
        let stored = track
            .duration_secs
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(0.0);

        Self {
            track,
            generation,
            state: PlayerState::Loading,
            tier,
            current_url: String::new(),
            position_secs: 0.0,
            resolved_duration_secs: stored,
            duration_source: DurationSource::Stored,
            duration_update_sent: false,
            buffering: true,
            retry_count: 0,
            used_fallback: false,
            decode_retry_used: false,
            preloaded: PreloadedRanges::default(),
            error_message: None,
        }
    }

    pub fn resolved_duration_secs(&self) -> f64 {
        self.resolved_duration_secs
    }

    /// Adopt a reconciled duration. A positive value never regresses to
    /// zero within a session.
    pub fn set_resolved_duration(&mut self, seconds: f64, source: DurationSource) {
        if seconds <= 0.0 && self.resolved_duration_secs > 0.0 {
            return;
        }
        self.resolved_duration_secs = seconds;
        self.duration_source = source;
    }

    pub fn clamp_seek(&self, position_secs: f64) -> f64 {
        position_secs.clamp(0.0, self.resolved_duration_secs.max(0.0))
    }
}
