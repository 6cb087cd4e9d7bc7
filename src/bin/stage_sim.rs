//! Headless run of the stage: loads a config (and optionally a glTF model),
//! simulates twenty seconds of frames and clicks through every panel.
//!
//! ```text
//! stage-sim [config.json] [model.glb]
//! ```

use std::time::Duration;

use glam::{Quat, Vec2, Vec3, Vec4};
use stagehand::animation::{InterpolationMode, KeyframeTrack, MorphWeightData, TargetPath, Track, TrackData, TrackMeta};
use stagehand::assets::{Aabb, MaterialTag, ModelNode, Renderable};
use stagehand::utils::FrameTimer;
use stagehand::{
    AnimationClip, Camera, Clock, InputEvent, LoadedModel, ManualClock, ModelHierarchy, RecordingOpener, Stage,
    StageConfig, Viewport,
};

fn translation_clip(name: &str, node: &str, amplitude: f32, duration: f32) -> AnimationClip {
    let times = vec![0.0, duration / 2.0, duration];
    let values = vec![Vec3::ZERO, Vec3::new(0.0, amplitude, 0.0), Vec3::ZERO];
    AnimationClip::new(
        name.to_string(),
        vec![Track {
            meta: TrackMeta {
                node_name: node.to_string(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
        }],
    )
}

fn face_clip(name: &str, duration: f32) -> AnimationClip {
    let times = vec![0.0, duration];
    let values = vec![
        MorphWeightData::from_slice(&[0.0, 1.0]),
        MorphWeightData::from_slice(&[1.0, 0.0]),
    ];
    let mut clip = translation_clip(name, "Head", 0.05, duration);
    clip.tracks.push(Track {
        meta: TrackMeta {
            node_name: "Face".to_string(),
            target: TargetPath::Weights,
        },
        data: TrackData::MorphWeights(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
    });
    clip
}

/// Stand-in character: a body, a head and a face mesh with two morph targets.
fn demo_model() -> LoadedModel {
    let mut body = ModelNode::new("Body");
    body.children = vec![1];
    body.renderable = Some(Renderable {
        mesh_name: Some("BodyMesh".to_string()),
        material: MaterialTag::Standard {
            roughness: 0.5,
            metalness: 0.0,
        },
        morph_target_count: 0,
        local_bounds: Aabb::new(Vec3::new(-0.4, 0.0, -0.2), Vec3::new(0.4, 1.6, 0.2)),
        cast_shadow: false,
        receive_shadow: false,
    });

    let mut head = ModelNode::new("Head");
    head.parent = Some(0);
    head.children = vec![2];
    head.transform.position = Vec3::new(0.0, 1.6, 0.0);
    head.transform.rotation = Quat::IDENTITY;

    let mut face = ModelNode::new("Face");
    face.parent = Some(1);
    face.renderable = Some(Renderable {
        mesh_name: Some("FaceMesh".to_string()),
        material: MaterialTag::Basic,
        morph_target_count: 2,
        local_bounds: Aabb::new(Vec3::splat(-0.15), Vec3::splat(0.15)),
        cast_shadow: false,
        receive_shadow: false,
    });

    let clips = vec![
        translation_clip("Idle", "Body", 0.02, 4.0),
        translation_clip("Wave", "Body", 0.1, 2.5),
        translation_clip("Bounce", "Body", 0.3, 1.5),
        translation_clip("", "Body", 0.05, 3.0),
        face_clip("Talk", 2.0),
    ];
    LoadedModel::new(ModelHierarchy::new(vec![body, head, face]), clips)
}

#[cfg(feature = "gltf")]
async fn load_model(path: Option<&str>) -> stagehand::Result<LoadedModel> {
    use stagehand::assets::FileAssetReader;
    use stagehand::{GltfLoader, ModelLoader};

    match path {
        Some(path) => {
            let file_name = stagehand::assets::io::source_filename(path).to_string();
            GltfLoader::new(FileAssetReader::new(path)).load(&file_name).await
        }
        None => Ok(demo_model()),
    }
}

#[cfg(not(feature = "gltf"))]
async fn load_model(path: Option<&str>) -> stagehand::Result<LoadedModel> {
    if let Some(path) = path {
        log::warn!("Built without glTF support; ignoring '{path}'");
    }
    Ok(demo_model())
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.first() {
        Some(path) => StageConfig::from_path(path)?,
        None => StageConfig::default(),
    };

    let viewport = Viewport::new(1280.0, 720.0);
    let clock = ManualClock::new();
    let opener = RecordingOpener::new();
    let mut camera = Camera::new_perspective(
        config.camera.fov_degrees,
        viewport.aspect(),
        config.camera.near,
        config.camera.far,
    );

    let mut stage = Stage::new(config, Box::new(clock.clone()), Box::new(opener.clone()), viewport);
    stage.on_model_loaded(load_model(args.get(1).map(String::as_str)).await)?;
    stage.fit_camera(&mut camera);

    log::info!("Available clips: {:?}", stage.list_available_clips());

    let mut timer = FrameTimer::new(clock.clone());
    let mut last_clip = None;
    for _ in 0..(20 * 60) {
        clock.advance(Duration::from_micros(16_667));
        let dt = timer.tick();
        stage.frame(dt, &camera);

        let current = stage.director().and_then(|d| d.current_clip()).map(str::to_owned);
        if current != last_clip {
            log::info!("t={:.2}s now playing {:?}", clock.now().as_secs_f32(), current);
            last_clip = current;
        }
    }

    // Hover and click every panel once, then click empty space.
    let positions: Vec<Vec3> = stage
        .panels()
        .map(|p| p.panels().iter().map(|panel| panel.billboard.position()).collect())
        .unwrap_or_default();
    for position in positions {
        let pixel = project(&camera, viewport, position);
        let hover = stage.handle_input(InputEvent::PointerMove { position: pixel }, &camera);
        let click = stage.handle_input(InputEvent::Click { position: pixel }, &camera);
        log::info!("Panel at {pixel:?}: cursor {:?}, opened {:?}", hover.cursor, click.opened_url);
    }
    stage.handle_input(InputEvent::Click { position: Vec2::ZERO }, &camera);

    println!("Opened links:");
    for url in opener.opened() {
        println!("  {url}");
    }
    Ok(())
}
