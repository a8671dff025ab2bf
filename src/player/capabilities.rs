use crate::constants;
use crate::models::QualityTier;

/// How much of the media the element should be told to fetch up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadStrategy {
    /// Fetch aggressively; fast connections on desktop.
    Full,
    /// Fetch headers/metadata only; constrained connections.
    MetadataOnly,
    /// Fetch nothing until user interaction; iOS requires this.
    None,
}

/// Device and network capabilities probed once at controller construction.
/// Immutable for the session.
#[derive(Debug, Clone, Default)]
pub struct DeviceProfile {
    pub is_mobile: bool,
    pub is_ios: bool,
    pub is_android: bool,
    pub is_slow_connection: bool,
    pub supports_mp3: bool,
    pub supports_aac: bool,
    pub supports_ogg: bool,
    pub supports_opus: bool,
}

impl DeviceProfile {
    /// Quality policy: mobile defaults to medium, a slow connection
    /// overrides down to low, everything else gets high.
    pub fn default_tier(&self) -> QualityTier {
        if self.is_slow_connection {
            QualityTier::Low
        } else if self.is_mobile {
            QualityTier::Medium
        } else {
            QualityTier::High
        }
    }

    pub fn preload_buffer_secs(&self) -> f64 {
        if self.is_ios {
            constants::IOS_PRELOAD_BUFFER_SECS
        } else {
            constants::DEFAULT_PRELOAD_BUFFER_SECS
        }
    }

    pub fn preload_strategy(&self) -> PreloadStrategy {
        if self.is_ios {
            PreloadStrategy::None
        } else if self.is_slow_connection {
            PreloadStrategy::MetadataOnly
        } else {
            PreloadStrategy::Full
        }
    }

    /// Touch-first platforms gate autoplay behind a user gesture.
    pub fn requires_user_gesture(&self) -> bool {
        self.is_mobile || self.is_ios
    }
}

/// Injected capability probe. The state machine never inspects the runtime
/// environment itself; hosts supply whatever detection their platform has.
pub trait CapabilityProvider: Send {
    fn probe(&self) -> DeviceProfile;
}

/// Fixed capability set, for hosts that detect up front (and for tests).
pub struct StaticCapabilities(pub DeviceProfile);

impl CapabilityProvider for StaticCapabilities {
    fn probe(&self) -> DeviceProfile {
        self.0.clone()
    }
}
