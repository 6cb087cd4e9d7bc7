use glam::Vec3;

use crate::animation::AnimationDirector;
use crate::app::input::{CursorIcon, InputEvent, InputResponse, Viewport};
use crate::app::opener::LinkOpener;
use crate::assets::{LoadedModel, ModelFraming};
use crate::config::{CameraSettings, StageConfig};
use crate::errors::{Result, StageError};
use crate::panels::{PanelCommand, PanelLayer};
use crate::scene::Camera;
use crate::utils::time::Clock;

/// `clamp(base_distance · min(1, width / base_width) + 0.5, min, max)`.
#[must_use]
pub fn camera_distance_for_width(width: f32, settings: &CameraSettings) -> f32 {
    let factor = (width / settings.base_width).min(1.0);
    (settings.base_distance * factor + 0.5).clamp(settings.min_distance, settings.max_distance)
}

/// Orbit zoom limits around a camera distance.
#[must_use]
pub fn orbit_limits(distance: f32, settings: &CameraSettings) -> (f32, f32) {
    (distance * settings.zoom_in_factor, distance * settings.zoom_out_factor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Pending,
    Ready,
    Failed,
}

/// Ties the loaded model, the animation director and the panel layer to
/// the host's frame loop and input.
///
/// Until [`Stage::on_model_loaded`] delivers a model the stage is inert:
/// frames do nothing and input only yields the touch-end default
/// suppression.
pub struct Stage {
    config: StageConfig,
    viewport: Viewport,
    opener: Box<dyn LinkOpener>,
    clock: Option<Box<dyn Clock>>,

    state: LoadState,
    model: Option<LoadedModel>,
    framing: Option<ModelFraming>,
    director: Option<AnimationDirector>,
    panels: Option<PanelLayer>,
}

impl Stage {
    pub fn new(
        config: StageConfig,
        clock: Box<dyn Clock>,
        opener: Box<dyn LinkOpener>,
        viewport: Viewport,
    ) -> Self {
        Self {
            config,
            viewport,
            opener,
            clock: Some(clock),
            state: LoadState::Pending,
            model: None,
            framing: None,
            director: None,
            panels: None,
        }
    }

    /// Accepts the one-time result of the model load.
    ///
    /// A failure is logged and handed back; the stage then stays inert.
    /// Results arriving after the first are ignored.
    pub fn on_model_loaded(&mut self, result: Result<LoadedModel>) -> Result<()> {
        if self.state != LoadState::Pending {
            log::warn!("Model load already resolved; ignoring further result");
            return Ok(());
        }

        let mut model = match result {
            Ok(model) => model,
            Err(err) => {
                log::error!("Error loading model: {err}");
                self.state = LoadState::Failed;
                return Err(err);
            }
        };
        let Some(clock) = self.clock.take() else {
            self.state = LoadState::Failed;
            return Err(StageError::ModelNotLoaded);
        };

        let upgraded = model.hierarchy.prepare_shadows();
        if upgraded > 0 {
            log::info!("Upgraded {upgraded} unlit materials for shadowing");
        }
        let framing = model.frame(
            self.config.camera.fov_degrees.to_radians(),
            self.config.layout.head_clearance,
        );

        let clips = std::mem::take(&mut model.clips);
        let director = AnimationDirector::new(clips, self.config.director.clone(), clock);
        let panels = PanelLayer::new(
            &self.config.panels,
            self.config.actions.clone(),
            self.config.layout.clone(),
            framing.head_anchor,
            self.viewport,
        );

        self.model = Some(model);
        self.framing = Some(framing);
        self.director = Some(director);
        self.panels = Some(panels);
        self.state = LoadState::Ready;
        Ok(())
    }

    /// One frame: advance animation, write the pose, re-face the panels.
    pub fn frame(&mut self, delta: f32, camera: &Camera) {
        if let Some(director) = &mut self.director {
            director.tick(delta);
            if let Some(model) = &mut self.model {
                director.write_pose(&mut model.hierarchy);
                model.hierarchy.update_world_matrices();
            }
        }
        if let Some(panels) = &mut self.panels {
            panels.update_orientation(camera.position());
        }
    }

    /// Hover, click and touch-end handling.
    pub fn handle_input(&mut self, event: InputEvent, camera: &Camera) -> InputResponse {
        let mut response = InputResponse {
            prevent_default: matches!(event, InputEvent::TouchEnd { .. }),
            ..InputResponse::default()
        };
        let Some(panels) = &mut self.panels else {
            return response;
        };

        let ray = camera.ray_from_ndc(self.viewport.to_ndc(event.position()));
        match event {
            InputEvent::PointerMove { .. } => {
                response.cursor = Some(panels.hover(&ray));
            }
            InputEvent::Click { .. } | InputEvent::TouchEnd { .. } => {
                if let Some(PanelCommand::OpenUrl(url)) = panels.activate(&ray) {
                    if let Err(err) = self.opener.open(&url) {
                        log::warn!("Failed to open '{url}': {err}");
                    }
                    response.opened_url = Some(url);
                }
            }
        }
        response
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(panels) = &mut self.panels {
            panels.resize(viewport);
        }
    }

    /// Places `camera` for the current model and viewport: aspect ratio,
    /// responsive distance, looking at the model centre.
    pub fn fit_camera(&self, camera: &mut Camera) {
        camera.set_aspect(self.viewport.aspect());
        let distance = camera_distance_for_width(self.viewport.width, &self.config.camera);
        let (height, target) = self
            .framing
            .map_or((0.0, Vec3::ZERO), |f| (f.center.y, f.camera_target));
        camera.set_position(Vec3::new(0.0, height, distance));
        camera.look_at(target);
    }

    // ========================================================================
    // Director passthroughs
    // ========================================================================

    pub fn play(&mut self, name: &str, fade: f32) -> Result<()> {
        self.director
            .as_mut()
            .ok_or(StageError::ModelNotLoaded)?
            .play(name, fade)
    }

    pub fn play_default(&mut self, name: &str) -> Result<()> {
        self.director
            .as_mut()
            .ok_or(StageError::ModelNotLoaded)?
            .play_default(name)
    }

    #[must_use]
    pub fn list_available_clips(&self) -> &[String] {
        self.director
            .as_ref()
            .map(AnimationDirector::list_available_clips)
            .unwrap_or_default()
    }

    pub fn pause(&mut self) {
        if let Some(director) = &mut self.director {
            director.pause();
        }
    }

    pub fn resume(&mut self) {
        if let Some(director) = &mut self.director {
            director.resume();
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    #[must_use]
    pub fn load_failed(&self) -> bool {
        self.state == LoadState::Failed
    }

    #[must_use]
    pub fn director(&self) -> Option<&AnimationDirector> {
        self.director.as_ref()
    }

    pub fn director_mut(&mut self) -> Option<&mut AnimationDirector> {
        self.director.as_mut()
    }

    #[must_use]
    pub fn panels(&self) -> Option<&PanelLayer> {
        self.panels.as_ref()
    }

    #[must_use]
    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    #[must_use]
    pub fn framing(&self) -> Option<&ModelFraming> {
        self.framing.as_ref()
    }

    #[must_use]
    pub fn cursor(&self) -> CursorIcon {
        self.panels.as_ref().map_or(CursorIcon::Default, PanelLayer::cursor)
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn config(&self) -> &StageConfig {
        &self.config
    }
}
