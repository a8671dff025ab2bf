// Playback policy constants - adjust these to balance recovery aggressiveness
// vs user-visible latency. All tuning values in one place.

use std::time::Duration;

// === Duration reconciliation ===
/// Stored durations known to be ingestion-time placeholders rather than
/// measured truth.
pub const SENTINEL_DURATIONS_SECS: [u32; 3] = [0, 300, 480];

/// Maximum tolerated drift between stored and measured duration before the
/// measured value wins.
pub const DURATION_DRIFT_TOLERANCE_SECS: f64 = 30.0;

// === Error recovery ===
/// Retry budget for network-class errors within one session.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Linear backoff unit: attempt N waits N * this.
pub const RETRY_BACKOFF_UNIT: Duration = Duration::from_millis(1000);

/// How long a load may sit without metadata before the slow-connection
/// watchdog downgrades quality.
pub const SLOW_LOAD_WATCHDOG: Duration = Duration::from_secs(3);

// === Preloading ===
/// Seconds of audio to keep buffered ahead of the playhead.
pub const DEFAULT_PRELOAD_BUFFER_SECS: f64 = 30.0;

/// iOS media elements refuse preloading until user interaction; keep the
/// advisory window small there.
pub const IOS_PRELOAD_BUFFER_SECS: f64 = 10.0;

// === Playback rate ===
/// Fixed ladder cycled by the speed control.
pub const SPEED_LADDER: [f64; 7] = [0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];

// === Skip controls ===
pub const SKIP_BACK_SECS: f64 = 15.0;
pub const SKIP_FORWARD_SECS: f64 = 30.0;
