use std::sync::Arc;

use glam::{Quat, Vec3};
use gltf::animation::util::ReadOutputs;

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, MorphWeightData, TargetPath, Track, TrackData,
    TrackMeta,
};
use crate::assets::io::AssetReader;
use crate::assets::loader::ModelLoader;
use crate::assets::model::{Aabb, LoadedModel, MaterialTag, ModelHierarchy, ModelNode, Renderable};
use crate::errors::{Result, StageError};
use crate::scene::Transform;

/// Loads `.glb` / `.gltf` files into a [`LoadedModel`].
///
/// Side buffers of a `.gltf` are resolved relative to the model's URI
/// through the same reader. Decoding runs on the blocking pool natively.
pub struct GltfLoader<R: AssetReader> {
    reader: Arc<R>,
}

impl<R: AssetReader> GltfLoader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Arc::new(reader),
        }
    }

    #[must_use]
    pub fn reader(&self) -> &R {
        &self.reader
    }
}

impl<R: AssetReader> ModelLoader for GltfLoader<R> {
    async fn load(&self, uri: &str) -> Result<LoadedModel> {
        let bytes = self.reader.read_bytes(uri).await?;
        let gltf = gltf::Gltf::from_slice(&bytes)?;

        let base = uri.rfind(['/', '\\']).map_or("", |i| &uri[..=i]);
        let buffers = load_buffers(&gltf, self.reader.as_ref(), base).await?;

        #[cfg(not(target_arch = "wasm32"))]
        let model = tokio::task::spawn_blocking(move || build_model(&gltf, &buffers)).await??;
        #[cfg(target_arch = "wasm32")]
        let model = build_model(&gltf, &buffers)?;

        log::info!(
            "Loaded '{}': {} nodes, {} animation clips",
            uri,
            model.hierarchy.len(),
            model.clips.len()
        );
        Ok(model)
    }
}

/// Decodes a self-contained `.glb` (or a `.gltf` without external buffers).
pub fn load_from_slice(bytes: &[u8]) -> Result<LoadedModel> {
    let gltf = gltf::Gltf::from_slice(bytes)?;
    let mut buffers = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => buffers.push(glb_blob(&gltf)?),
            gltf::buffer::Source::Uri(uri) => {
                return Err(StageError::GltfError(format!(
                    "External buffer '{uri}' needs an asset reader"
                )));
            }
        }
    }
    build_model(&gltf, &buffers)
}

fn glb_blob(gltf: &gltf::Gltf) -> Result<Vec<u8>> {
    gltf.blob
        .as_deref()
        .map(<[u8]>::to_vec)
        .ok_or_else(|| StageError::GltfError("Missing GLB binary chunk".to_string()))
}

async fn load_buffers<R: AssetReader>(gltf: &gltf::Gltf, reader: &R, base: &str) -> Result<Vec<Vec<u8>>> {
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => buffer_data.push(glb_blob(gltf)?),
            gltf::buffer::Source::Uri(uri) => {
                let data = reader.read_bytes(&format!("{base}{uri}")).await?;
                buffer_data.push(data);
            }
        }
    }
    Ok(buffer_data)
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

fn build_model(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<LoadedModel> {
    // Nodes first, indexed like the document
    let mut nodes: Vec<ModelNode> = gltf.nodes().map(|node| load_node(&node)).collect();

    // Then the hierarchy
    for node in gltf.nodes() {
        for child in node.children() {
            let (parent, child) = (node.index(), child.index());
            if let Some(entry) = nodes.get_mut(parent) {
                entry.children.push(child);
            }
            if let Some(entry) = nodes.get_mut(child) {
                entry.parent = Some(parent);
            }
        }
    }

    let hierarchy = ModelHierarchy::new(nodes);
    let clips = load_animations(gltf, buffers)?;
    Ok(LoadedModel::new(hierarchy, clips))
}

fn load_node(node: &gltf::Node) -> ModelNode {
    let mut entry = ModelNode::new(node_name(node));
    let (t, r, s) = node.transform().decomposed();
    entry.transform = Transform::from_trs(Vec3::from_array(t), Quat::from_array(r), Vec3::from_array(s));

    if let Some(mesh) = node.mesh() {
        let mut bounds = Aabb::EMPTY;
        let mut material = None;
        let mut morph_target_count = 0;
        for primitive in mesh.primitives() {
            let bb = primitive.bounding_box();
            bounds = bounds.union(&Aabb::new(Vec3::from_array(bb.min), Vec3::from_array(bb.max)));
            morph_target_count = morph_target_count.max(primitive.morph_targets().count());
            if material.is_none() {
                material = Some(material_tag(&primitive.material()));
            }
        }

        entry.morph_weights = node
            .weights()
            .or_else(|| mesh.weights())
            .map(|w| w.iter().copied().collect())
            .unwrap_or_default();

        entry.renderable = Some(Renderable {
            mesh_name: mesh.name().map(str::to_string),
            material: material.unwrap_or(MaterialTag::Standard {
                roughness: 1.0,
                metalness: 1.0,
            }),
            morph_target_count,
            local_bounds: bounds,
            cast_shadow: false,
            receive_shadow: false,
        });
    }
    entry
}

fn material_tag(material: &gltf::Material) -> MaterialTag {
    if material.unlit() {
        return MaterialTag::Basic;
    }
    let pbr = material.pbr_metallic_roughness();
    MaterialTag::Standard {
        roughness: pbr.roughness_factor(),
        metalness: pbr.metallic_factor(),
    }
}

fn load_animations(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<Vec<AnimationClip>> {
    let mut animations = Vec::new();

    for anim in gltf.animations() {
        let mut tracks = Vec::new();

        for channel in anim.channels() {
            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let target = channel.target();
            let node_name = node_name(&target.node());

            let Some(inputs) = reader.read_inputs() else {
                log::warn!("Animation channel on '{node_name}' has no keyframe times");
                continue;
            };
            let times: Vec<f32> = inputs.collect();

            let interpolation = match channel.sampler().interpolation() {
                gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                gltf::animation::Interpolation::Step => InterpolationMode::Step,
                gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
            };

            let Some(outputs) = reader.read_outputs() else {
                log::warn!("Animation channel on '{node_name}' has no output values");
                continue;
            };

            let (path, data) = match outputs {
                ReadOutputs::Translations(iter) => (
                    TargetPath::Translation,
                    TrackData::Vector3(KeyframeTrack::new(
                        times,
                        iter.map(Vec3::from_array).collect(),
                        interpolation,
                    )),
                ),
                ReadOutputs::Rotations(iter) => (
                    TargetPath::Rotation,
                    TrackData::Quaternion(KeyframeTrack::new(
                        times,
                        iter.into_f32().map(Quat::from_array).collect(),
                        interpolation,
                    )),
                ),
                ReadOutputs::Scales(iter) => (
                    TargetPath::Scale,
                    TrackData::Vector3(KeyframeTrack::new(
                        times,
                        iter.map(Vec3::from_array).collect(),
                        interpolation,
                    )),
                ),
                ReadOutputs::MorphTargetWeights(iter) => {
                    let flat: Vec<f32> = iter.into_f32().collect();
                    let Some(values) = split_morph_outputs(&flat, times.len(), interpolation) else {
                        log::warn!(
                            "Skipping morph channel on '{node_name}': {} weights do not divide into {} keyframes",
                            flat.len(),
                            times.len()
                        );
                        continue;
                    };
                    (
                        TargetPath::Weights,
                        TrackData::MorphWeights(KeyframeTrack::new(times, values, interpolation)),
                    )
                }
            };

            // The gltf crate does not check sampler output counts against the inputs.
            if !data.is_sampleable() {
                log::warn!(
                    "Skipping {path:?} channel on '{node_name}': output count does not match {interpolation:?} keyframes"
                );
                continue;
            }

            tracks.push(Track {
                meta: TrackMeta {
                    node_name,
                    target: path,
                },
                data,
            });
        }

        // Unnamed clips keep an empty name; the director assigns a fallback.
        let clip = AnimationClip::new(anim.name().unwrap_or_default().to_string(), tracks);
        animations.push(clip);
    }

    Ok(animations)
}

/// glTF stores morph weights flat: one run of `targets` floats per output
/// value, and cubic splines carry three values (in-tangent, value,
/// out-tangent) per keyframe.
///
/// Returns `None` when the flat run does not divide evenly into the
/// expected number of output values.
fn split_morph_outputs(
    flat: &[f32],
    key_count: usize,
    interpolation: InterpolationMode,
) -> Option<Vec<MorphWeightData>> {
    let value_count = key_count * interpolation.values_per_key();
    if value_count == 0 || flat.is_empty() || flat.len() % value_count != 0 {
        return None;
    }
    let targets = flat.len() / value_count;
    Some(flat.chunks_exact(targets).map(MorphWeightData::from_slice).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn morph_outputs_split_per_keyframe() {
        let flat = [0.0, 1.0, 0.5, 0.5, 1.0, 0.0];
        let values = split_morph_outputs(&flat, 3, InterpolationMode::Linear).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[1].weights.as_slice(), &[0.5, 0.5]);
    }

    #[test]
    fn cubic_morph_outputs_keep_tangents() {
        let flat: Vec<f32> = (0..12).map(|i| i as f32).collect();
        let values = split_morph_outputs(&flat, 2, InterpolationMode::CubicSpline).unwrap();
        assert_eq!(values.len(), 6);
        assert_eq!(values[0].weights.len(), 2);
    }

    #[test]
    fn uneven_morph_outputs_are_rejected() {
        let flat = [0.0, 1.0, 0.5, 0.5, 1.0];
        assert!(split_morph_outputs(&flat, 3, InterpolationMode::Linear).is_none());
        assert!(split_morph_outputs(&flat, 0, InterpolationMode::Linear).is_none());
    }
}
