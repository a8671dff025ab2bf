mod identifiers;
mod track;

pub use identifiers::TrackId;
pub use track::{QualityTier, Track};
