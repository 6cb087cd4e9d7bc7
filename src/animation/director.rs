//! Animation Director
//!
//! Keeps a character permanently in motion from a loaded clip set:
//!
//! - every few seconds a different body clip is chosen at random and
//!   crossfaded in from a random point of its timeline;
//! - the current clip ping-pongs near its ends instead of looping back;
//! - one designated clip is stripped down to its morph tracks and loops on
//!   its own mixer, so facial motion never participates in body blending.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use rustc_hash::FxHashMap;

use crate::animation::action::{AnimationAction, LoopMode};
use crate::animation::binding::PoseTarget;
use crate::animation::clip::AnimationClip;
use crate::animation::mixer::{ActionKey, AnimationMixer};
use crate::animation::scheduler::ClipScheduler;
use crate::config::DirectorSettings;
use crate::errors::{Result, StageError};
use crate::utils::time::Clock;

/// Body playback bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub current: Option<ActionKey>,
    /// Action being faded out. Released once its fade completes.
    pub previous: Option<ActionKey>,
    pub reversing: bool,
    pub playing: bool,
}

struct FaceAnimation {
    mixer: AnimationMixer,
    action: ActionKey,
}

pub struct AnimationDirector {
    settings: DirectorSettings,

    body: AnimationMixer,
    face: Option<FaceAnimation>,

    actions: FxHashMap<String, ActionKey>,
    names: Vec<String>,

    state: PlaybackState,
    scheduler: ClipScheduler,
    clock: Box<dyn Clock>,
    rng: StdRng,
}

impl AnimationDirector {
    /// Seeds the RNG from `settings.seed`, or randomly when unset.
    pub fn new(clips: Vec<AnimationClip>, settings: DirectorSettings, clock: Box<dyn Clock>) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random::<u64>()),
        };
        Self::with_rng(clips, settings, clock, rng)
    }

    /// Builds both mixers, starts the first body clip and arms the scheduler.
    pub fn with_rng(
        clips: Vec<AnimationClip>,
        settings: DirectorSettings,
        clock: Box<dyn Clock>,
        rng: StdRng,
    ) -> Self {
        let scheduler = ClipScheduler::new(settings.min_interval_ms, settings.max_interval_ms);
        let mut director = Self {
            settings,
            body: AnimationMixer::new(),
            face: None,
            actions: FxHashMap::default(),
            names: Vec::new(),
            state: PlaybackState {
                playing: true,
                ..PlaybackState::default()
            },
            scheduler,
            clock,
            rng,
        };

        if clips.is_empty() {
            log::info!("No animation clips found");
            return director;
        }
        log::info!("Found {} animation clips", clips.len());

        let face_index = director.settings.face_clip_index;
        for (index, clip) in clips.into_iter().enumerate() {
            if Some(index) == face_index {
                director.setup_face(&clip);
            } else {
                director.add_body_clip(index, clip);
            }
        }

        if let Some(first) = director.names.first().and_then(|n| director.actions.get(n)).copied() {
            director.state.current = Some(first);
            if let Some(action) = director.body.action_mut(first) {
                action.reset();
                action.play();
            }
            let now = director.clock.now();
            director.scheduler.arm(now, &mut director.rng);
        } else {
            log::info!("No body clips available; director stays idle");
        }

        director
    }

    fn setup_face(&mut self, clip: &AnimationClip) {
        let Some(morph_clip) = clip.morph_only() else {
            log::warn!("Face clip '{}' has no morph target tracks", clip.name);
            return;
        };
        let mut mixer = AnimationMixer::new();
        let key = mixer.clip_action(Arc::new(morph_clip));
        if let Some(action) = mixer.action_mut(key) {
            action.loop_mode = LoopMode::Loop;
            action.play();
        }
        log::info!("Facial animation set up: {}_MorphOnly", clip.name);
        self.face = Some(FaceAnimation { mixer, action: key });
    }

    fn add_body_clip(&mut self, index: usize, clip: AnimationClip) {
        let name = if clip.name.is_empty() {
            format!("animation_{index}")
        } else {
            clip.name.clone()
        };
        let key = self.body.clip_action(Arc::new(clip));
        if let Some(action) = self.body.action_mut(key) {
            action.loop_mode = LoopMode::Loop;
        }
        if self.actions.insert(name.clone(), key).is_some() {
            log::warn!("Duplicate clip name '{name}'; later clip replaces earlier one");
        } else {
            self.names.push(name.clone());
        }
        log::info!("Body animation added: {name}");
    }

    /// Advances both mixers by `delta` seconds. Fires a due clip change
    /// first, then applies the ping-pong rule to the current action.
    pub fn tick(&mut self, delta: f32) {
        if !self.state.playing {
            return;
        }

        let now = self.clock.now();
        if self.scheduler.poll(now) {
            self.scheduled_change();
            self.scheduler.arm(now, &mut self.rng);
        }

        self.body.update(delta);
        self.apply_ping_pong();
        self.release_previous();

        if let Some(face) = &mut self.face {
            face.mixer.update(delta);
        }
    }

    fn apply_ping_pong(&mut self) {
        let Some(key) = self.state.current else {
            return;
        };
        let Some(action) = self.body.action_mut(key) else {
            return;
        };
        let duration = action.duration();
        if duration <= 0.0 {
            return;
        }

        if !self.state.reversing && action.time >= duration * self.settings.reverse_at {
            if action.time_scale > 0.0 {
                action.time_scale = -1.0;
                self.state.reversing = true;
                log::debug!("Reversing animation at time {:.3}", action.time);
            }
        } else if self.state.reversing
            && action.time <= duration * self.settings.forward_at
            && action.time_scale < 0.0
        {
            action.time_scale = 1.0;
            self.state.reversing = false;
            log::debug!("Playing animation forward at time {:.3}", action.time);
        }
    }

    fn release_previous(&mut self) {
        let Some(previous) = self.state.previous else {
            return;
        };
        let finished = Some(previous) == self.state.current
            || self.body.action(previous).is_none_or(|a| !a.enabled);
        if finished {
            self.state.previous = None;
        }
    }

    fn scheduled_change(&mut self) {
        let current = self.current_clip().map(str::to_owned);
        let candidates: Vec<&String> = self
            .names
            .iter()
            .filter(|name| Some(name.as_str()) != current.as_deref())
            .collect();
        if candidates.is_empty() {
            log::debug!("Only one body clip; skipping scheduled change");
            return;
        }
        let pick = candidates[self.rng.random_range(0..candidates.len())].clone();
        let fade = self.settings.crossfade_duration;
        if let Err(err) = self.play(&pick, fade) {
            log::warn!("Scheduled change failed: {err}");
        }
    }

    /// Crossfades to the clip `name` over `fade` seconds, starting it from a
    /// random point of its timeline in forward direction.
    ///
    /// An unknown name leaves the playback state untouched.
    pub fn play(&mut self, name: &str, fade: f32) -> Result<()> {
        let Some(&target) = self.actions.get(name) else {
            log::warn!("Animation not found: {name}");
            return Err(StageError::ClipNotFound(name.to_string()));
        };

        let (low, high) = (self.settings.random_start_min, self.settings.random_start_max);
        let start_fraction = if high > low {
            self.rng.random_range(low..=high)
        } else {
            low
        };

        self.state.reversing = false;
        self.state.previous = self.state.current;
        self.state.current = Some(target);

        if let Some(action) = self.body.action_mut(target) {
            action.reset();
            action.time = action.duration() * start_fraction;
            action.set_effective_time_scale(1.0);
            action.set_effective_weight(1.0);
        }

        if let Some(previous) = self.state.previous
            && previous != target
        {
            self.body.cross_fade(previous, target, fade, true);
        }

        if let Some(action) = self.body.action_mut(target) {
            action.play();
        }

        log::info!("Transitioning to animation: {name}");
        Ok(())
    }

    /// [`Self::play`] with the configured crossfade duration.
    pub fn play_default(&mut self, name: &str) -> Result<()> {
        self.play(name, self.settings.crossfade_duration)
    }

    /// Body clip names in discovery order.
    #[must_use]
    pub fn list_available_clips(&self) -> &[String] {
        &self.names
    }

    /// Stops advancing both mixers and cancels the pending clip change.
    pub fn pause(&mut self) {
        self.state.playing = false;
        self.scheduler.cancel();
    }

    /// Resumes playback and arms a fresh clip change.
    pub fn resume(&mut self) {
        self.state.playing = true;
        if !self.names.is_empty() {
            let now = self.clock.now();
            self.scheduler.arm(now, &mut self.rng);
        }
    }

    /// Writes the blended body pose, then the face pose, into `target`.
    pub fn write_pose(&mut self, target: &mut dyn PoseTarget) {
        self.body.write_pose(target);
        if let Some(face) = &mut self.face {
            face.mixer.write_pose(target);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Name of the current body clip.
    #[must_use]
    pub fn current_clip(&self) -> Option<&str> {
        let current = self.state.current?;
        self.names
            .iter()
            .find(|name| self.actions.get(name.as_str()) == Some(&current))
            .map(String::as_str)
    }

    #[must_use]
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    #[must_use]
    pub fn is_reversing(&self) -> bool {
        self.state.reversing
    }

    /// `true` when there is no body clip to play.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn current_action(&self) -> Option<&AnimationAction> {
        self.body.action(self.state.current?)
    }

    #[must_use]
    pub fn previous_action(&self) -> Option<&AnimationAction> {
        self.body.action(self.state.previous?)
    }

    pub fn current_action_mut(&mut self) -> Option<&mut AnimationAction> {
        self.body.action_mut(self.state.current?)
    }

    /// Body action registered under `name`.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&AnimationAction> {
        self.body.action(*self.actions.get(name)?)
    }

    #[must_use]
    pub fn face_action(&self) -> Option<&AnimationAction> {
        let face = self.face.as_ref()?;
        face.mixer.action(face.action)
    }

    #[must_use]
    pub fn body_mixer(&self) -> &AnimationMixer {
        &self.body
    }

    #[must_use]
    pub fn scheduler(&self) -> &ClipScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn settings(&self) -> &DirectorSettings {
        &self.settings
    }
}
