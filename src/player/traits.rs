use async_trait::async_trait;
use tokio::sync::mpsc;

use super::capabilities::PreloadStrategy;
use super::error::{MediaError, PlayError};

/// Lifecycle of one playback session. `Buffering` is tracked separately; a
/// session can be nominally Playing while starved for data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
    Error,
}

/// Events delivered by the media element. All controller state transitions
/// happen on these or on direct user commands.
#[derive(Debug, Clone)]
pub enum MediaEvent {
    /// Metadata became available; duration is None when the element could
    /// not determine one.
    MetadataLoaded { duration_secs: Option<f64> },
    /// Periodic playhead progress.
    Progress {
        position_secs: f64,
        buffered_to_secs: Option<f64>,
    },
    /// Playback starved for data (underrun).
    Waiting,
    /// Playback resumed after start or underrun.
    Resumed,
    Paused,
    Ended,
    Error(MediaError),
}

/// The owned media resource. Exactly one is live per controller; swapping
/// tracks re-subscribes so events from a torn-down load can never reach the
/// new session.
#[async_trait]
pub trait MediaElement: Send {
    /// Replace the element's event sink and return the fresh receiver. Any
    /// previously returned receiver goes stale, which is the teardown
    /// guarantee `swap_resource` relies on.
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<MediaEvent>;

    async fn load(&mut self, url: &str, preload: PreloadStrategy) -> anyhow::Result<()>;

    async fn play(&mut self) -> Result<(), PlayError>;

    async fn pause(&mut self);

    async fn seek(&mut self, position_secs: f64);

    async fn set_volume(&mut self, volume: f64);

    async fn set_rate(&mut self, rate: f64);

    async fn position(&self) -> f64;
}
