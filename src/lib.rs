// Library entry for the playback controller and its collaborator seams.
// The hosting application constructs a PlaybackController explicitly and
// drives it through the cloneable PlayerHandle.

pub mod config;
pub mod constants;
pub mod logging;
pub mod models;
pub mod player;
pub mod services;

pub use config::{PlayerConfig, PlayerSettings};
pub use models::{QualityTier, Track, TrackId};
pub use player::controller::{PlaybackController, PlaybackSnapshot, PlayerHandle};
pub use player::traits::{MediaElement, MediaEvent, PlayerState};
