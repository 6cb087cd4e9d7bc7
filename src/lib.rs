#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod app;
pub mod assets;
pub mod config;
pub mod errors;
pub mod panels;
pub mod scene;
pub mod utils;

pub use animation::{
    AnimationAction, AnimationClip, AnimationDirector, AnimationMixer, ClipScheduler, LoopMode,
    PlaybackState, PoseTarget,
};
pub use app::{CursorIcon, InputEvent, InputResponse, LinkOpener, RecordingOpener, Stage, Viewport};
#[cfg(feature = "browser")]
pub use app::SystemBrowser;
pub use assets::{LoadedModel, ModelHierarchy, ModelLoader};
#[cfg(feature = "gltf")]
pub use assets::GltfLoader;
pub use config::{DirectorSettings, LayoutSettings, MenuItem, PanelConfig, PanelTarget, StageConfig};
pub use errors::{Result, StageError};
pub use panels::{PanelCommand, PanelLayer};
pub use scene::{Camera, Ray};
pub use utils::{Clock, ManualClock, SystemClock};
