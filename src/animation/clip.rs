use glam::{Quat, Vec3};

use crate::animation::binding::TargetPath;
use crate::animation::tracks::KeyframeTrack;
use crate::animation::values::MorphWeightData;

#[derive(Debug, Clone)]
pub struct TrackMeta {
    pub node_name: String,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
    Scalar(KeyframeTrack<f32>),
    MorphWeights(KeyframeTrack<MorphWeightData>),
}

impl TrackData {
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            TrackData::Vector3(track) => track.end_time(),
            TrackData::Quaternion(track) => track.end_time(),
            TrackData::Scalar(track) => track.end_time(),
            TrackData::MorphWeights(track) => track.end_time(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            TrackData::Vector3(track) => track.is_empty(),
            TrackData::Quaternion(track) => track.is_empty(),
            TrackData::Scalar(track) => track.is_empty(),
            TrackData::MorphWeights(track) => track.is_empty(),
        }
    }

    #[must_use]
    pub fn is_sampleable(&self) -> bool {
        match self {
            TrackData::Vector3(track) => track.is_sampleable(),
            TrackData::Quaternion(track) => track.is_sampleable(),
            TrackData::Scalar(track) => track.is_sampleable(),
            TrackData::MorphWeights(track) => track.is_sampleable(),
        }
    }
}

/// A complete track: target metadata plus keyframe data.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

impl Track {
    /// Whether this track drives morph target influences.
    #[must_use]
    pub fn is_morph(&self) -> bool {
        self.meta.target == TargetPath::Weights
    }
}

/// Immutable named animation sequence.
///
/// An empty `name` means the source asset left the clip unnamed.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Builds a clip whose duration is the latest keyframe across all tracks.
    #[must_use]
    pub fn new(name: String, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);

        Self {
            name,
            duration,
            tracks,
        }
    }

    /// Builds a clip with an explicit duration (loaders may report one that
    /// outlasts the last keyframe).
    #[must_use]
    pub fn with_duration(name: String, duration: f32, tracks: Vec<Track>) -> Self {
        Self {
            name,
            duration,
            tracks,
        }
    }

    /// Copy of this clip keeping only its morph target tracks, named
    /// `<name>_MorphOnly`. Returns `None` when there are none.
    #[must_use]
    pub fn morph_only(&self) -> Option<AnimationClip> {
        let tracks: Vec<Track> = self.tracks.iter().filter(|t| t.is_morph()).cloned().collect();
        if tracks.is_empty() {
            return None;
        }
        Some(Self::with_duration(
            format!("{}_MorphOnly", self.name),
            self.duration,
            tracks,
        ))
    }
}
