use thiserror::Error;

/// Controller-level error taxonomy. Every media-layer failure is translated
/// into one of these at the controller boundary; none propagate uncaught.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Track has no media reference")]
    InvalidInput,

    #[error("Network stall while fetching media: {0}")]
    NetworkStall(String),

    #[error("Media could not be decoded: {0}")]
    DecodeFailure(String),

    #[error("Media format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Playback requires a user gesture")]
    PermissionDenied,

    #[error("Failed to load media after {0} retries")]
    MaxRetriesExceeded(u32),
}

/// Raw error category reported by the media element, mirroring the media
/// error codes of the underlying platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorKind {
    /// Fetch aborted by the user agent; not a failure.
    Aborted,
    Network,
    Decode,
    SrcNotSupported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaError {
    pub kind: MediaErrorKind,
    pub message: String,
}

impl MediaError {
    pub fn new(kind: MediaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of asking the media element to start playing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    /// Autoplay blocked pending a user gesture.
    #[error("playback not allowed without user gesture")]
    NotAllowed,

    #[error("playback failed: {0}")]
    Failed(String),
}
