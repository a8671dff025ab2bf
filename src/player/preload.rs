//! Advisory chunk-preload bookkeeping.
//!
//! Records intents to preload ranges ahead of the playhead for future
//! range-request support. Never blocks or alters playback; planning failure
//! is a no-op.

use crate::player::capabilities::DeviceProfile;

/// Set of `[start, end)` second intervals already marked for preload.
#[derive(Debug, Clone, Default)]
pub struct PreloadedRanges(Vec<(f64, f64)>);

impl PreloadedRanges {
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// True if an existing range fully covers `[start, end)`.
    pub fn covers(&self, start: f64, end: f64) -> bool {
        self.0.iter().any(|(s, e)| *s <= start && *e >= end)
    }

    /// Record a range unless an existing one already covers it. Returns
    /// whether a new entry was added.
    pub fn record(&mut self, start: f64, end: f64) -> bool {
        if self.covers(start, end) {
            return false;
        }
        self.0.push((start, end));
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decide the next preload candidate on a progress tick, or None when the
/// device profile forbids it, the buffer margin is healthy, or no media
/// remains.
pub fn plan_preload(
    profile: &DeviceProfile,
    position_secs: f64,
    buffered_to_secs: f64,
    duration_secs: f64,
    buffer_secs: f64,
    ranges: &PreloadedRanges,
) -> Option<(f64, f64)> {
    if profile.is_slow_connection || profile.is_mobile {
        return None;
    }
    if duration_secs <= 0.0 {
        return None;
    }

    let margin = buffered_to_secs - position_secs;
    if margin >= buffer_secs || buffered_to_secs >= duration_secs {
        return None;
    }

    let start = buffered_to_secs;
    let end = (buffered_to_secs + buffer_secs).min(duration_secs);
    if ranges.covers(start, end) {
        return None;
    }

    Some((start, end))
}
