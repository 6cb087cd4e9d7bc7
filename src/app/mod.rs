pub mod input;
pub mod opener;
pub mod stage;

pub use input::{CursorIcon, InputEvent, InputResponse, Viewport};
#[cfg(feature = "browser")]
pub use opener::SystemBrowser;
pub use opener::{LinkOpener, RecordingOpener};
pub use stage::{Stage, camera_distance_for_width, orbit_limits};
