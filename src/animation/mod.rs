pub mod values;
pub mod tracks;
pub mod clip;
pub mod action;
pub mod binding;
pub mod mixer;
pub mod scheduler;
pub mod director;

pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use action::{AnimationAction, LoopMode, Ramp, TrackValue};
pub use mixer::{ActionKey, AnimationMixer};
pub use binding::{PoseTarget, PropertyBinding, TargetPath};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::{Interpolatable, MorphWeightData};
pub use scheduler::{ClipScheduler, TimerHandle};
pub use director::{AnimationDirector, PlaybackState};
