//! Stage Tests
//!
//! Tests for:
//! - Inert behaviour before the model arrives and after a failed load
//! - Wiring of director, panels and framing on load
//! - Pointer input end to end: projection, picking, link opening
//! - Resize and responsive camera placement

use glam::{Vec2, Vec3, Vec4};

use stagehand::animation::{InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta};
use stagehand::app::stage::camera_distance_for_width;
use stagehand::assets::{Aabb, MaterialTag, ModelNode, Renderable};
use stagehand::config::CameraSettings;
use stagehand::panels::LayoutMode;
use stagehand::{
    AnimationClip, Camera, CursorIcon, InputEvent, LoadedModel, ManualClock, ModelHierarchy,
    RecordingOpener, Stage, StageConfig, StageError, Viewport,
};

fn hold_clip(name: &str, y: f32) -> AnimationClip {
    let value = Vec3::new(0.0, y, 0.0);
    AnimationClip::new(
        name.to_string(),
        vec![Track {
            meta: TrackMeta {
                node_name: "Body".to_string(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, 2.0],
                vec![value, value],
                InterpolationMode::Linear,
            )),
        }],
    )
}

fn model() -> LoadedModel {
    let mut body = ModelNode::new("Body");
    body.renderable = Some(Renderable {
        mesh_name: Some("BodyMesh".to_string()),
        material: MaterialTag::Basic,
        morph_target_count: 0,
        local_bounds: Aabb::new(Vec3::new(-0.5, 0.0, -0.25), Vec3::new(0.5, 2.0, 0.25)),
        cast_shadow: false,
        receive_shadow: false,
    });
    LoadedModel::new(
        ModelHierarchy::new(vec![body]),
        vec![hold_clip("Idle", 0.0), hold_clip("Hop", 0.25)],
    )
}

fn config() -> StageConfig {
    let mut config = StageConfig::default();
    config.director.face_clip_index = None;
    config.director.seed = Some(11);
    config
}

struct Fixture {
    stage: Stage,
    camera: Camera,
    opener: RecordingOpener,
    viewport: Viewport,
}

fn fixture(viewport: Viewport) -> Fixture {
    let config = config();
    let camera = Camera::new_perspective(
        config.camera.fov_degrees,
        viewport.aspect(),
        config.camera.near,
        config.camera.far,
    );
    let opener = RecordingOpener::new();
    let stage = Stage::new(
        config,
        Box::new(ManualClock::new()),
        Box::new(opener.clone()),
        viewport,
    );
    Fixture {
        stage,
        camera,
        opener,
        viewport,
    }
}

fn loaded() -> Fixture {
    let mut f = fixture(Viewport::new(1280.0, 720.0));
    f.stage.on_model_loaded(Ok(model())).unwrap();
    f.stage.fit_camera(&mut f.camera);
    f.stage.frame(0.016, &f.camera);
    f
}

/// Pixel position of a world point.
fn project(camera: &Camera, viewport: Viewport, point: Vec3) -> Vec2 {
    let clip = camera.view_projection_matrix() * Vec4::new(point.x, point.y, point.z, 1.0);
    let ndc = clip.truncate() / clip.w;
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.width,
        (1.0 - ndc.y) * 0.5 * viewport.height,
    )
}

fn panel_pixel(f: &Fixture, index: usize) -> Vec2 {
    let position = f.stage.panels().unwrap().panels()[index].billboard.position();
    project(&f.camera, f.viewport, position)
}

// ============================================================================
// Before / Failed Load
// ============================================================================

#[test]
fn stage_is_inert_before_load() {
    let mut f = fixture(Viewport::default());
    f.stage.frame(0.016, &f.camera);

    assert!(!f.stage.is_ready());
    assert!(f.stage.list_available_clips().is_empty());
    assert!(matches!(f.stage.play("Idle", 0.5), Err(StageError::ModelNotLoaded)));
    assert_eq!(f.stage.cursor(), CursorIcon::Default);

    let click = f.stage.handle_input(InputEvent::Click { position: Vec2::new(960.0, 540.0) }, &f.camera);
    assert_eq!(click.opened_url, None);
    assert_eq!(click.cursor, None);
    assert!(!click.prevent_default);

    let touch = f.stage.handle_input(InputEvent::TouchEnd { position: Vec2::ZERO }, &f.camera);
    assert!(touch.prevent_default);
}

#[test]
fn failed_load_stays_inert() {
    let mut f = fixture(Viewport::default());
    let result = f
        .stage
        .on_model_loaded(Err(StageError::AssetNotFound("noah.glb".to_string())));

    assert!(matches!(result, Err(StageError::AssetNotFound(_))));
    assert!(f.stage.load_failed());
    assert!(!f.stage.is_ready());
    assert!(f.stage.director().is_none());
    assert!(f.stage.panels().is_none());

    // A late success does not resurrect the stage.
    assert!(f.stage.on_model_loaded(Ok(model())).is_ok());
    assert!(!f.stage.is_ready());
}

// ============================================================================
// Load
// ============================================================================

#[test]
fn load_builds_director_panels_and_framing() {
    let f = loaded();

    assert!(f.stage.is_ready());
    assert_eq!(f.stage.list_available_clips(), ["Idle", "Hop"]);
    assert_eq!(f.stage.director().unwrap().current_clip(), Some("Idle"));
    assert_eq!(f.stage.panels().unwrap().panels().len(), 3);

    let framing = f.stage.framing().unwrap();
    assert!((framing.center - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
    assert!((framing.head_anchor - Vec3::new(0.0, 1.5, 0.0)).length() < 1e-5);
    assert!((f.stage.panels().unwrap().head_anchor() - framing.head_anchor).length() < 1e-6);
}

#[test]
fn load_prepares_materials_for_shadows() {
    let f = loaded();
    let body = f.stage.model().unwrap().hierarchy.node("Body").unwrap();
    let renderable = body.renderable.as_ref().unwrap();
    assert!(renderable.cast_shadow && renderable.receive_shadow);
    assert!(renderable.material.receives_light());
}

#[test]
fn second_load_result_is_ignored() {
    let mut f = loaded();
    let again = f
        .stage
        .on_model_loaded(Err(StageError::AssetNotFound("late.glb".to_string())));
    assert!(again.is_ok());
    assert!(f.stage.is_ready());
}

#[test]
fn frame_writes_pose_into_model() {
    let mut f = loaded();
    f.stage.play("Hop", 0.0).unwrap();
    f.stage.frame(0.016, &f.camera);

    let body = f.stage.model().unwrap().hierarchy.node("Body").unwrap();
    assert!((body.transform.position.y - 0.25).abs() < 1e-4, "{:?}", body.transform.position);
}

#[test]
fn unknown_clip_is_reported() {
    let mut f = loaded();
    assert!(matches!(f.stage.play("Nope", 0.5), Err(StageError::ClipNotFound(_))));
    assert_eq!(f.stage.director().unwrap().current_clip(), Some("Idle"));
}

#[test]
fn pause_and_resume_pass_through() {
    let mut f = loaded();
    f.stage.pause();
    assert!(!f.stage.director().unwrap().is_playing());
    f.stage.resume();
    assert!(f.stage.director().unwrap().is_playing());
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn hover_over_panel_shows_pointer() {
    let mut f = loaded();
    let pixel = panel_pixel(&f, 1);

    let response = f.stage.handle_input(InputEvent::PointerMove { position: pixel }, &f.camera);
    assert_eq!(response.cursor, Some(CursorIcon::Pointer));
    assert_eq!(f.stage.cursor(), CursorIcon::Pointer);

    let response = f.stage.handle_input(InputEvent::PointerMove { position: Vec2::new(5.0, 5.0) }, &f.camera);
    assert_eq!(response.cursor, Some(CursorIcon::Default));
}

#[test]
fn click_on_panel_opens_its_link() {
    let mut f = loaded();
    let pixel = panel_pixel(&f, 1);

    let response = f.stage.handle_input(InputEvent::Click { position: pixel }, &f.camera);
    assert_eq!(response.opened_url.as_deref(), Some("https://manifold.gallery/noah"));
    assert_eq!(f.opener.opened(), vec!["https://manifold.gallery/noah".to_string()]);
}

#[test]
fn touch_end_activates_and_suppresses_default() {
    let mut f = loaded();
    let pixel = panel_pixel(&f, 0);

    let response = f.stage.handle_input(InputEvent::TouchEnd { position: pixel }, &f.camera);
    assert!(response.prevent_default);
    assert_eq!(response.opened_url.as_deref(), Some("https://www.instagram.com/ambig_art/"));
}

#[test]
fn click_on_empty_space_opens_nothing() {
    let mut f = loaded();
    let response = f.stage.handle_input(InputEvent::Click { position: Vec2::new(5.0, 5.0) }, &f.camera);
    assert_eq!(response.opened_url, None);
    assert!(f.opener.opened().is_empty());
}

// ============================================================================
// Resize / Camera
// ============================================================================

#[test]
fn resize_relayouts_panels() {
    let mut f = loaded();
    assert_eq!(f.stage.panels().unwrap().layout_mode(), LayoutMode::Desktop);

    f.stage.resize(Viewport::new(400.0, 800.0));
    assert_eq!(f.stage.viewport(), Viewport::new(400.0, 800.0));
    assert_eq!(f.stage.panels().unwrap().layout_mode(), LayoutMode::Mobile);
    assert_eq!(f.stage.panels().unwrap().panels().len(), 3);
}

#[test]
fn fit_camera_uses_responsive_distance() {
    let mut f = loaded();
    let settings = CameraSettings::default();

    let expected = camera_distance_for_width(1280.0, &settings);
    assert!((f.camera.position().z - expected).abs() < 1e-5);
    assert!((f.camera.position().y - 1.0).abs() < 1e-5);

    f.stage.resize(Viewport::new(400.0, 800.0));
    f.stage.fit_camera(&mut f.camera);
    assert!((f.camera.position().z - settings.min_distance).abs() < 1e-5);
    assert!((f.camera.aspect - 0.5).abs() < 1e-6);
}
