pub mod capabilities;
pub mod controller;
pub mod duration;
pub mod error;
pub mod preload;
pub mod session;
pub mod traits;
pub mod transform;

pub use capabilities::{CapabilityProvider, DeviceProfile, PreloadStrategy, StaticCapabilities};
pub use controller::{PlaybackController, PlaybackSnapshot, PlayerHandle};
pub use duration::{DurationSource, ResolvedDuration};
pub use error::{MediaError, MediaErrorKind, PlayError, PlaybackError};
pub use traits::{MediaElement, MediaEvent, PlayerState};
