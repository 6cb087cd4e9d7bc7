use std::sync::Arc;

use crate::animation::{
    binding::PropertyBinding,
    clip::{AnimationClip, TrackData},
    tracks::KeyframeCursor,
    values::MorphWeightData,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
}

/// Linear ramp over mixer time, used for weight fades and time-scale warps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    pub start_time: f32,
    pub end_time: f32,
    pub from: f32,
    pub to: f32,
}

impl Ramp {
    #[must_use]
    pub fn new(start_time: f32, duration: f32, from: f32, to: f32) -> Self {
        Self {
            start_time,
            end_time: start_time + duration.max(0.0),
            from,
            to,
        }
    }

    #[must_use]
    pub fn evaluate(&self, now: f32) -> f32 {
        let span = self.end_time - self.start_time;
        if span <= f32::EPSILON || now >= self.end_time {
            return self.to;
        }
        let t = ((now - self.start_time) / span).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    #[must_use]
    pub fn is_finished(&self, now: f32) -> bool {
        now >= self.end_time
    }
}

/// Mutable playback cursor over one clip.
///
/// `time_scale` is the base playback rate (the director keeps it at ±1);
/// an active warp multiplies it. `weight` is the base blend weight; an
/// active fade multiplies it.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,

    fade: Option<Ramp>,
    warp: Option<Ramp>,
    effective_weight: f32,
    effective_time_scale: f32,

    pub bindings: Vec<PropertyBinding>,

    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            enabled: true,
            fade: None,
            warp: None,
            effective_weight: 1.0,
            effective_time_scale: 1.0,
            bindings: Vec::new(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[must_use]
    pub fn duration(&self) -> f32 {
        self.clip.duration
    }

    /// Rewinds to time 0 and drops any pending fade or warp.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.paused = false;
        self.enabled = true;
        self.stop_fading();
        self.stop_warping();
    }

    pub fn play(&mut self) {
        self.enabled = true;
        self.paused = false;
        self.refresh_effective();
    }

    pub fn stop(&mut self) {
        self.reset();
        self.enabled = false;
        self.refresh_effective();
    }

    /// Sets the base weight and cancels any fade.
    pub fn set_effective_weight(&mut self, weight: f32) {
        self.weight = weight;
        self.stop_fading();
    }

    /// Sets the base time scale and cancels any warp.
    pub fn set_effective_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
        self.stop_warping();
    }

    /// Weight actually contributed to the blend this frame.
    #[must_use]
    pub fn effective_weight(&self) -> f32 {
        self.effective_weight
    }

    /// Playback rate actually applied this frame.
    #[must_use]
    pub fn effective_time_scale(&self) -> f32 {
        self.effective_time_scale
    }

    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    #[must_use]
    pub fn is_warping(&self) -> bool {
        self.warp.is_some()
    }

    /// Whether the action contributes anything to the pose.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.enabled && !self.paused
    }

    pub fn stop_fading(&mut self) {
        self.fade = None;
        self.refresh_effective();
    }

    pub fn stop_warping(&mut self) {
        self.warp = None;
        self.refresh_effective();
    }

    /// Schedules a weight multiplier ramp `from -> to` starting at mixer time `now`.
    pub(crate) fn schedule_fade(&mut self, now: f32, duration: f32, from: f32, to: f32) {
        self.fade = Some(Ramp::new(now, duration, from, to));
        self.refresh_effective();
    }

    /// Ramps the effective time scale from `start_scale` to `end_scale`.
    /// The ramp is stored relative to the current base scale so a direction
    /// flip during the warp still takes effect.
    pub(crate) fn schedule_warp(&mut self, now: f32, start_scale: f32, end_scale: f32, duration: f32) {
        if self.time_scale == 0.0 {
            return;
        }
        let from = start_scale / self.time_scale;
        let to = end_scale / self.time_scale;
        self.warp = Some(Ramp::new(now, duration, from, to));
        self.refresh_effective();
    }

    /// Recomputes the effective values outside of a mixer step. A pending
    /// ramp contributes its starting value.
    fn refresh_effective(&mut self) {
        self.effective_weight = if self.enabled {
            self.weight * self.fade.map_or(1.0, |f| f.from)
        } else {
            0.0
        };
        self.effective_time_scale = if self.paused {
            0.0
        } else {
            self.time_scale * self.warp.map_or(1.0, |w| w.from)
        };
    }

    fn update_weight(&mut self, mixer_time: f32) -> f32 {
        let mut weight = 0.0;
        if self.enabled {
            weight = self.weight;
            if let Some(fade) = self.fade {
                let value = fade.evaluate(mixer_time);
                weight *= value;
                if fade.is_finished(mixer_time) {
                    self.fade = None;
                    if value == 0.0 {
                        // faded out
                        self.enabled = false;
                        weight = 0.0;
                    }
                }
            }
        }
        self.effective_weight = weight;
        weight
    }

    fn update_time_scale(&mut self, mixer_time: f32) -> f32 {
        let mut time_scale = 0.0;
        if !self.paused {
            time_scale = self.time_scale;
            if let Some(warp) = self.warp {
                time_scale *= warp.evaluate(mixer_time);
                if warp.is_finished(mixer_time) {
                    self.warp = None;
                    if time_scale == 0.0 {
                        self.paused = true;
                    } else {
                        self.time_scale = time_scale;
                    }
                }
            }
        }
        self.effective_time_scale = time_scale;
        time_scale
    }

    /// Mixer-driven step: evaluates fade and warp at `mixer_time`, then
    /// advances local time by `dt` at the effective rate.
    pub(crate) fn advance(&mut self, mixer_time: f32, dt: f32) {
        if !self.enabled {
            self.effective_weight = 0.0;
            return;
        }
        self.update_weight(mixer_time);
        let time_scale = self.update_time_scale(mixer_time);
        if !self.enabled {
            return;
        }
        self.step_time(dt * time_scale);
    }

    fn step_time(&mut self, delta: f32) {
        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        self.time += delta;

        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.paused = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.paused = true;
                }
            }
            LoopMode::Loop => {
                if self.time >= duration {
                    self.time %= duration;
                } else if self.time < 0.0 {
                    // Handle reverse playback loop
                    self.time = duration + (self.time % duration);
                    if self.time >= duration {
                        self.time = 0.0;
                    }
                }
            }
        }
    }

    /// Gets the value of the specified track at the current time.
    pub fn sample_track(&mut self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        if !track.data.is_sampleable() {
            return None;
        }
        let cursor = self.track_cursors.get_mut(track_index)?;

        Some(match &track.data {
            TrackData::Vector3(t) => TrackValue::Vector3(t.sample_with_cursor(self.time, cursor)),
            TrackData::Quaternion(t) => {
                TrackValue::Quaternion(t.sample_with_cursor(self.time, cursor))
            }
            TrackData::Scalar(t) => TrackValue::Scalar(t.sample_with_cursor(self.time, cursor)),
            TrackData::MorphWeights(t) => {
                TrackValue::MorphWeight(t.sample_with_cursor(self.time, cursor))
            }
        })
    }
}

#[derive(Debug, Clone)]
pub enum TrackValue {
    Vector3(glam::Vec3),
    Quaternion(glam::Quat),
    Scalar(f32),
    MorphWeight(MorphWeightData),
}
