//! Duration-source reconciliation.
//!
//! The stored duration comes from ingestion and is frequently a placeholder;
//! the measured duration comes from the media element once metadata is
//! available and is authoritative when the two disagree badly.

use crate::constants::{DURATION_DRIFT_TOLERANCE_SECS, SENTINEL_DURATIONS_SECS};

/// Which side won the reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationSource {
    Stored,
    Measured,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDuration {
    pub seconds: f64,
    pub source: DurationSource,
    /// The stored value should be durably corrected to `seconds`.
    pub needs_update: bool,
}

/// Reconcile a measured duration against the stored one.
///
/// Invalid measurements fall back to the stored value (or 0). A sentinel or
/// zero stored value, or a drift beyond tolerance, adopts the measurement
/// and requests a durable correction. Drift exactly at the tolerance keeps
/// the stored value.
pub fn reconcile(measured: Option<f64>, stored: Option<f64>) -> ResolvedDuration {
    let stored_valid = stored.filter(|s| s.is_finite() && *s > 0.0);

    let Some(measured) = measured.filter(|m| m.is_finite() && *m > 0.0) else {
        return ResolvedDuration {
            seconds: stored_valid.unwrap_or(0.0),
            source: DurationSource::Stored,
            needs_update: false,
        };
    };
    let measured = measured.round();

    let stored_secs = stored_valid.unwrap_or(0.0);
    let suspicious = is_sentinel(stored_secs) || stored_secs == 0.0;
    let drifted = (measured - stored_secs).abs() > DURATION_DRIFT_TOLERANCE_SECS;

    if suspicious || drifted {
        ResolvedDuration {
            seconds: measured,
            source: DurationSource::Measured,
            needs_update: true,
        }
    } else {
        ResolvedDuration {
            seconds: stored_secs,
            source: DurationSource::Stored,
            needs_update: false,
        }
    }
}

fn is_sentinel(stored_secs: f64) -> bool {
    SENTINEL_DURATIONS_SECS
        .iter()
        .any(|s| stored_secs == f64::from(*s))
}
