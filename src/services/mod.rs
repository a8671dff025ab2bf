pub mod telemetry;

pub use telemetry::{HttpTrackApi, TrackApi};
