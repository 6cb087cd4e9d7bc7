//! Animation System Tests
//!
//! Tests for:
//! - KeyframeTrack linear/step/cubic interpolation and cursor sampling
//! - AnimationAction loop modes and time scaling
//! - AnimationClip duration and morph-only extraction
//! - AnimationMixer crossfades, time warps and pose blending

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;

use stagehand::animation::{
    ActionKey, AnimationAction, AnimationClip, AnimationMixer, Interpolatable, InterpolationMode,
    KeyframeCursor, KeyframeTrack, LoopMode, MorphWeightData, PoseTarget, TargetPath, Track,
    TrackData, TrackMeta,
};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn translation_track(node: &str, times: Vec<f32>, values: Vec<Vec3>) -> Track {
    Track {
        meta: TrackMeta {
            node_name: node.to_string(),
            target: TargetPath::Translation,
        },
        data: TrackData::Vector3(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
    }
}

fn weights(values: &[f32]) -> MorphWeightData {
    MorphWeightData::from_slice(values)
}

fn morph_track(node: &str, times: Vec<f32>, values: Vec<MorphWeightData>) -> Track {
    Track {
        meta: TrackMeta {
            node_name: node.to_string(),
            target: TargetPath::Weights,
        },
        data: TrackData::MorphWeights(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
    }
}

/// Clip holding `node` at a fixed translation for `duration` seconds.
fn hold_clip(name: &str, node: &str, value: Vec3, duration: f32) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        name.to_string(),
        vec![translation_track(node, vec![0.0, duration], vec![value, value])],
    ))
}

fn make_simple_clip(duration: f32) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        "test".to_string(),
        vec![translation_track("node", vec![0.0, duration], vec![Vec3::ZERO, Vec3::X])],
    ))
}

#[derive(Default)]
struct RecordedPose {
    translations: FxHashMap<String, Vec3>,
    morphs: FxHashMap<String, Vec<f32>>,
}

impl PoseTarget for RecordedPose {
    fn set_translation(&mut self, node_name: &str, value: Vec3) {
        self.translations.insert(node_name.to_string(), value);
    }

    fn set_rotation(&mut self, _node_name: &str, _value: Quat) {}

    fn set_scale(&mut self, _node_name: &str, _value: Vec3) {}

    fn set_morph_weights(&mut self, node_name: &str, weights: &[f32]) {
        self.morphs.insert(node_name.to_string(), weights.to_vec());
    }
}

// ============================================================================
// KeyframeTrack: Interpolation
// ============================================================================

#[test]
fn track_linear_f32_midpoint() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 10.0], InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    let val = track.sample_with_cursor(0.5, &mut cursor);
    assert!(approx(val, 5.0), "Expected 5.0, got {val}");
}

#[test]
fn track_linear_clamps_outside_range() {
    let track = KeyframeTrack::new(vec![1.0, 2.0], vec![10.0_f32, 20.0], InterpolationMode::Linear);
    assert!(approx(track.sample(0.0), 10.0), "got {}", track.sample(0.0));
    assert!(approx(track.sample(5.0), 20.0), "got {}", track.sample(5.0));
}

#[test]
fn track_step_holds_value() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![0.0_f32, 100.0, 200.0],
        InterpolationMode::Step,
    );
    assert!(approx(track.sample(0.5), 0.0));
    assert!(approx(track.sample(1.0), 100.0));
    assert!(approx(track.sample(1.9), 100.0));
    assert!(approx(track.sample(2.0), 200.0));
}

#[test]
fn track_linear_quat_slerp() {
    let q0 = Quat::IDENTITY;
    let q1 = Quat::from_rotation_y(FRAC_PI_2);
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![q0, q1], InterpolationMode::Linear);

    let val = track.sample(0.5);
    let angle = val.angle_between(q0.slerp(q1, 0.5));
    assert!(angle < 0.01, "Quaternion slerp mismatch: angle={angle}");
}

#[test]
fn track_cubic_f32_endpoints() {
    // CubicSpline: values = [in_tangent0, value0, out_tangent0, in_tangent1, value1, out_tangent1]
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![0.0_f32, 0.0, 1.0, 1.0, 10.0, 0.0],
        InterpolationMode::CubicSpline,
    );
    assert!(approx(track.sample(0.0), 0.0), "t=0: got {}", track.sample(0.0));
    assert!(approx(track.sample(1.0), 10.0), "t=1: got {}", track.sample(1.0));
}

#[test]
fn track_sampleable_requires_matching_output_count() {
    let linear = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 1.0], InterpolationMode::Linear);
    assert!(linear.is_sampleable());

    let short_cubic = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 1.0], InterpolationMode::CubicSpline);
    assert!(!short_cubic.is_sampleable());

    let long_step = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 1.0, 2.0], InterpolationMode::Step);
    assert!(!long_step.is_sampleable());
}

#[test]
fn mixer_skips_unsampleable_tracks() {
    let clip = Arc::new(AnimationClip::new(
        "mixed".to_string(),
        vec![
            translation_track("good", vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::X]),
            translation_track("bad", vec![0.0, 1.0, 2.0], vec![Vec3::ZERO, Vec3::X]),
        ],
    ));
    let mut mixer = AnimationMixer::new();
    let key = mixer.clip_action(clip);
    assert_eq!(mixer.action(key).unwrap().bindings.len(), 1);

    mixer.action_mut(key).unwrap().play();
    mixer.update(1.5);
    let mut pose = RecordedPose::default();
    mixer.write_pose(&mut pose);
    assert!(pose.translations.contains_key("good"));
    assert!(!pose.translations.contains_key("bad"));
}

#[test]
fn track_morph_weights_interpolate_per_target() {
    let track = KeyframeTrack::new(
        vec![0.0, 2.0],
        vec![
            MorphWeightData::from_slice(&[0.0, 1.0]),
            MorphWeightData::from_slice(&[1.0, 0.0]),
        ],
        InterpolationMode::Linear,
    );
    let val = track.sample(0.5);
    assert!(approx(val.weights[0], 0.25));
    assert!(approx(val.weights[1], 0.75));
}

// ============================================================================
// KeyframeCursor
// ============================================================================

#[test]
fn cursor_sequential_forward() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0, 3.0, 4.0],
        vec![0.0_f32, 10.0, 20.0, 30.0, 40.0],
        InterpolationMode::Linear,
    );

    let mut cursor = KeyframeCursor::default();
    for i in 0..=20 {
        let t = i as f32 * 0.2;
        let val = track.sample_with_cursor(t, &mut cursor);
        assert!(approx(val, t * 10.0), "t={t}: expected {}, got {val}", t * 10.0);
    }
}

#[test]
fn cursor_backward_sampling_matches_stateless() {
    // Reverse playback walks the cursor backwards every frame.
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0, 3.0],
        vec![0.0_f32, 10.0, 5.0, 20.0],
        InterpolationMode::Linear,
    );

    let mut cursor = KeyframeCursor::default();
    for i in (0..=30).rev() {
        let t = i as f32 * 0.1;
        let with_cursor = track.sample_with_cursor(t, &mut cursor);
        assert!(
            approx(with_cursor, track.sample(t)),
            "t={t}: cursor={with_cursor} stateless={}",
            track.sample(t)
        );
    }
}

#[test]
fn interpolatable_morph_weight_linear() {
    let a = MorphWeightData::from_slice(&[0.0, 1.0, 0.5, 0.0]);
    let b = MorphWeightData::from_slice(&[1.0, 0.0, 0.5, 1.0]);

    let result = MorphWeightData::interpolate_linear(&a, &b, 0.5);
    for w in &result.weights {
        assert!(approx(*w, 0.5));
    }
}

// ============================================================================
// AnimationAction Loop Modes
// ============================================================================

/// Mixer holding one playing action over `clip`, after `setup` has run on it.
fn playing(clip: Arc<AnimationClip>, setup: impl FnOnce(&mut AnimationAction)) -> (AnimationMixer, ActionKey) {
    let mut mixer = AnimationMixer::new();
    let key = mixer.clip_action(clip);
    let action = mixer.action_mut(key).unwrap();
    action.play();
    setup(action);
    (mixer, key)
}

#[test]
fn action_loop_mode_once() {
    let (mut mixer, key) = playing(make_simple_clip(2.0), |a| a.loop_mode = LoopMode::Once);

    mixer.update(3.0);
    let action = mixer.action(key).unwrap();
    assert!(approx(action.time, 2.0), "Once: should clamp to duration, got {}", action.time);
    assert!(action.paused, "Once: should auto-pause at end");
}

#[test]
fn action_loop_mode_loop() {
    let (mut mixer, key) = playing(make_simple_clip(2.0), |a| a.loop_mode = LoopMode::Loop);

    mixer.update(2.5);
    let action = mixer.action(key).unwrap();
    assert!(approx(action.time, 0.5), "Loop: should wrap to 0.5, got {}", action.time);
    assert!(!action.paused, "Loop: should NOT auto-pause");
}

#[test]
fn action_loop_reverse_playback_wraps() {
    let (mut mixer, key) = playing(make_simple_clip(2.0), |a| {
        a.time_scale = -1.0;
        a.time = 0.5;
    });

    // 0.5 - 1.0 = -0.5 wraps to 1.5
    mixer.update(1.0);
    let time = mixer.action(key).unwrap().time;
    assert!(approx(time, 1.5), "got {time}");
}

#[test]
fn action_paused_or_disabled_does_not_advance() {
    let (mut mixer, key) = playing(make_simple_clip(2.0), |a| {
        a.paused = true;
        a.time = 0.5;
    });
    mixer.update(1.0);
    assert!(approx(mixer.action(key).unwrap().time, 0.5));

    let (mut mixer, key) = playing(make_simple_clip(2.0), |a| {
        a.enabled = false;
        a.time = 0.5;
    });
    mixer.update(1.0);
    assert!(approx(mixer.action(key).unwrap().time, 0.5));
}

#[test]
fn action_zero_duration_never_moves() {
    let (mut mixer, key) = playing(Arc::new(AnimationClip::new("empty".to_string(), vec![])), |_| {});
    mixer.update(1.0);
    assert!(approx(mixer.action(key).unwrap().time, 0.0));
}

#[test]
fn action_reset_clears_fade_and_warp_state() {
    let mut action = AnimationAction::new(make_simple_clip(2.0));
    action.time = 1.2;
    action.paused = true;
    action.enabled = false;

    action.reset();
    assert!(approx(action.time, 0.0));
    assert!(action.is_running());
    assert!(!action.is_fading());
    assert!(!action.is_warping());
}

// ============================================================================
// AnimationClip
// ============================================================================

#[test]
fn clip_auto_duration() {
    let clip = AnimationClip::new(
        "test".to_string(),
        vec![
            translation_track("a", vec![0.0, 1.5], vec![Vec3::ZERO, Vec3::X]),
            morph_track("b", vec![0.0, 3.0], vec![weights(&[0.0]), weights(&[1.0])]),
        ],
    );
    assert!(approx(clip.duration, 3.0), "Duration should be max of all tracks, got {}", clip.duration);
}

#[test]
fn clip_empty_tracks_zero_duration() {
    let clip = AnimationClip::new("empty".to_string(), vec![]);
    assert!(approx(clip.duration, 0.0));
}

#[test]
fn morph_only_keeps_weight_tracks_and_duration() {
    let clip = AnimationClip::with_duration(
        "Talk".to_string(),
        4.0,
        vec![
            translation_track("Head", vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::Y]),
            morph_track("Face", vec![0.0, 2.0], vec![weights(&[0.0, 1.0]), weights(&[1.0, 0.0])]),
        ],
    );

    let morph = clip.morph_only().expect("clip has a morph track");
    assert_eq!(morph.name, "Talk_MorphOnly");
    assert_eq!(morph.tracks.len(), 1);
    assert!(morph.tracks.iter().all(Track::is_morph));
    assert!(approx(morph.duration, 4.0));
}

#[test]
fn morph_only_without_weight_tracks_is_none() {
    let clip = AnimationClip::new(
        "Walk".to_string(),
        vec![translation_track("Hips", vec![0.0, 1.0], vec![Vec3::ZERO, Vec3::Z])],
    );
    assert!(clip.morph_only().is_none());
}

// ============================================================================
// AnimationMixer: Crossfade
// ============================================================================

#[test]
fn clip_action_starts_stopped() {
    let mut mixer = AnimationMixer::new();
    let key = mixer.clip_action(make_simple_clip(1.0));
    let action = mixer.action(key).unwrap();
    assert!(!action.enabled);
    assert!(approx(action.effective_weight(), 0.0));
    assert_eq!(mixer.len(), 1);
}

#[test]
fn cross_fade_weights_sum_to_one() {
    let mut mixer = AnimationMixer::new();
    let a = mixer.clip_action(hold_clip("A", "Body", Vec3::X, 2.0));
    let b = mixer.clip_action(hold_clip("B", "Body", Vec3::Y, 2.0));
    mixer.action_mut(a).unwrap().play();

    mixer.cross_fade(a, b, 1.0, false);
    mixer.action_mut(b).unwrap().play();

    // Fade start: outgoing still full, incoming silent.
    assert!(approx(mixer.action(a).unwrap().effective_weight(), 1.0));
    assert!(approx(mixer.action(b).unwrap().effective_weight(), 0.0));

    for step in 1..=4 {
        mixer.update(0.2);
        let wa = mixer.action(a).unwrap().effective_weight();
        let wb = mixer.action(b).unwrap().effective_weight();
        assert!((wa + wb - 1.0).abs() < 1e-4, "step {step}: {wa} + {wb}");
        assert!((wb - 0.2 * step as f32).abs() < 1e-4, "step {step}: incoming {wb}");
    }
}

#[test]
fn cross_fade_disables_outgoing_when_done() {
    let mut mixer = AnimationMixer::new();
    let a = mixer.clip_action(hold_clip("A", "Body", Vec3::X, 2.0));
    let b = mixer.clip_action(hold_clip("B", "Body", Vec3::Y, 2.0));
    mixer.action_mut(a).unwrap().play();
    mixer.cross_fade(a, b, 0.5, false);
    mixer.action_mut(b).unwrap().play();

    mixer.update(0.3);
    mixer.update(0.3);

    let out = mixer.action(a).unwrap();
    let incoming = mixer.action(b).unwrap();
    assert!(!out.enabled, "faded-out action should be disabled");
    assert!(approx(out.effective_weight(), 0.0));
    assert!(approx(incoming.effective_weight(), 1.0));
    assert!(!incoming.is_fading());
}

#[test]
fn cross_fade_to_self_is_ignored() {
    let mut mixer = AnimationMixer::new();
    let a = mixer.clip_action(hold_clip("A", "Body", Vec3::X, 2.0));
    mixer.action_mut(a).unwrap().play();

    mixer.cross_fade(a, a, 0.5, true);
    assert!(!mixer.action(a).unwrap().is_fading());
    assert!(!mixer.action(a).unwrap().is_warping());
}

#[test]
fn cross_fade_warp_matches_clip_lengths() {
    let mut mixer = AnimationMixer::new();
    let a = mixer.clip_action(hold_clip("A", "Body", Vec3::X, 2.0));
    let b = mixer.clip_action(hold_clip("B", "Body", Vec3::Y, 4.0));
    mixer.action_mut(a).unwrap().play();
    mixer.cross_fade(a, b, 1.0, true);
    mixer.action_mut(b).unwrap().play();

    // Incoming starts at to/from = 2x, outgoing ends at from/to = 0.5x.
    assert!(approx(mixer.action(b).unwrap().effective_time_scale(), 2.0));
    assert!(approx(mixer.action(a).unwrap().effective_time_scale(), 1.0));

    mixer.update(0.5);
    assert!(approx(mixer.action(a).unwrap().effective_time_scale(), 0.75));
    assert!(approx(mixer.action(b).unwrap().effective_time_scale(), 1.5));

    mixer.update(0.6);
    let incoming = mixer.action(b).unwrap();
    assert!(!incoming.is_warping());
    assert!(approx(incoming.time_scale, 1.0), "got {}", incoming.time_scale);
}

// ============================================================================
// AnimationMixer: Pose Blending
// ============================================================================

#[test]
fn write_pose_blends_by_effective_weight() {
    let mut mixer = AnimationMixer::new();
    let a = mixer.clip_action(hold_clip("A", "Body", Vec3::new(1.0, 0.0, 0.0), 2.0));
    let b = mixer.clip_action(hold_clip("B", "Body", Vec3::new(3.0, 0.0, 0.0), 2.0));
    mixer.action_mut(a).unwrap().play();
    mixer.cross_fade(a, b, 1.0, false);
    mixer.action_mut(b).unwrap().play();
    mixer.update(0.5);

    let mut pose = RecordedPose::default();
    mixer.write_pose(&mut pose);
    let body = pose.translations["Body"];
    assert!((body - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-4, "got {body:?}");
}

#[test]
fn write_pose_skips_stopped_actions() {
    let mut mixer = AnimationMixer::new();
    let _idle = mixer.clip_action(hold_clip("A", "Body", Vec3::X, 2.0));

    let mut pose = RecordedPose::default();
    mixer.write_pose(&mut pose);
    assert!(pose.translations.is_empty());
}

#[test]
fn write_pose_outputs_morph_weights() {
    let mut mixer = AnimationMixer::new();
    let clip = Arc::new(AnimationClip::new(
        "Talk".to_string(),
        vec![morph_track("Face", vec![0.0, 2.0], vec![weights(&[0.0, 1.0]), weights(&[1.0, 0.0])])],
    ));
    let key = mixer.clip_action(clip);
    mixer.action_mut(key).unwrap().play();
    mixer.update(1.0);

    let mut pose = RecordedPose::default();
    mixer.write_pose(&mut pose);
    let face = &pose.morphs["Face"];
    assert!(approx(face[0], 0.5));
    assert!(approx(face[1], 0.5));
}
