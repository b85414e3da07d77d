use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    fmt::Debug,
    iter,
    path::Path,
};

use glam::Mat4;
use gltf::{
    animation::{util::ReadOutputs, Interpolation},
    Animation, Document, Node, Scene, Skin,
};
use log::{debug, info, warn};

use crate::{
    animation::{AnimationKeyFrame, AnimationKeyFrames, JointAnimationAsset, JointTrack},
    mesh::MeshAsset,
    node::{DecomposedTransform, MatrixNodeTransform, NodeAsset, NodeTransform},
    scene::SceneAsset,
    skeleton::SkeletonAsset,
};

use super::LoadError;

fn node_label(node: &Node) -> String {
    match node.name() {
        // `/` separates path segments
        Some(name) if !name.is_empty() => name.replace('/', "_"),
        _ => format!("node{}", node.index()),
    }
}

fn local_matrix(node: &Node) -> Mat4 {
    Mat4::from_cols_array_2d(&node.transform().matrix())
}

fn read_keyframes<T: Debug + Clone>(
    time: Vec<f32>,
    data: Vec<T>,
    interpolation: Interpolation,
) -> AnimationKeyFrames<T> {
    match interpolation {
        Interpolation::Linear | Interpolation::Step => {
            let keyframes = time
                .into_iter()
                .zip(data)
                .map(|(time, value)| AnimationKeyFrame { time, value })
                .collect();
            if interpolation == Interpolation::Step {
                AnimationKeyFrames::Step(keyframes)
            } else {
                AnimationKeyFrames::Linear(keyframes)
            }
        }
        // in-tangent, value and out-tangent are stored as three consecutive items
        Interpolation::CubicSpline => AnimationKeyFrames::CubicSpline(
            time.into_iter()
                .zip(data.chunks_exact(3))
                .map(|(time, chunk)| AnimationKeyFrame {
                    time,
                    value: (chunk[0].clone(), chunk[1].clone(), chunk[2].clone()),
                })
                .collect(),
        ),
    }
}

struct GltfDocumentLoader<'a> {
    buffers: &'a [gltf::buffer::Data],
    // node index -> parent node index
    parents: HashMap<usize, usize>,
    // node index -> local matrix
    locals: Vec<Mat4>,
    joint_nodes: BTreeSet<usize>,
}

impl<'a> GltfDocumentLoader<'a> {
    fn new(document: &Document, buffers: &'a [gltf::buffer::Data]) -> Self {
        let mut parents = HashMap::new();
        for node in document.nodes() {
            for child in node.children() {
                parents.insert(child.index(), node.index());
            }
        }
        let locals = document.nodes().map(|node| local_matrix(&node)).collect();
        let joint_nodes = document
            .skins()
            .flat_map(|skin| skin.joints().map(|joint| joint.index()).collect::<Vec<_>>())
            .collect();
        Self {
            buffers,
            parents,
            locals,
            joint_nodes,
        }
    }

    fn world_matrix(&self, index: usize) -> Mat4 {
        let mut matrix = self.locals[index];
        let mut current = index;
        while let Some(parent) = self.parents.get(&current) {
            matrix = self.locals[*parent] * matrix;
            current = *parent;
        }
        matrix
    }

    // Siblings sharing a name get the node index appended, paths must be
    // unique within a skeleton.
    fn joint_labels(&self, joints: &BTreeMap<usize, Node>) -> BTreeMap<usize, String> {
        let mut seen = HashSet::new();
        joints
            .iter()
            .map(|(index, joint)| {
                let parent = self
                    .parents
                    .get(index)
                    .filter(|parent| joints.contains_key(*parent))
                    .copied();
                let mut label = node_label(joint);
                if !seen.insert((parent, label.clone())) {
                    let unique = format!("{}_{}", label, index);
                    warn!("Duplicate joint name {}, renamed to {}", label, unique);
                    label = unique;
                    seen.insert((parent, label.clone()));
                }
                (*index, label)
            })
            .collect()
    }

    fn joint_paths(&self, skin: &Skin) -> BTreeMap<usize, String> {
        let joints: BTreeMap<usize, Node> = skin
            .joints()
            .map(|joint| (joint.index(), joint))
            .collect();
        let labels = self.joint_labels(&joints);
        let paths = labels
            .keys()
            .map(|index| {
                let mut segments = vec![labels[index].as_str()];
                let mut current = *index;
                while let Some(parent) = self.parents.get(&current) {
                    match labels.get(parent) {
                        Some(label) => segments.push(label),
                        None => break,
                    }
                    current = *parent;
                }
                segments.reverse();
                (*index, segments.join("/"))
            })
            .collect();
        paths
    }

    fn load_skeleton(&self, skin: &Skin, owner: &Node) -> SkeletonAsset {
        let paths = self.joint_paths(skin);
        let joint_paths = skin
            .joints()
            .map(|joint| paths[&joint.index()].clone())
            .collect();
        let rest_transforms = skin.joints().map(|joint| self.locals[joint.index()]).collect();

        let reader = skin.reader(|buffer| Some(&self.buffers[buffer.index()].0[..]));
        let bind_transforms: Vec<Mat4> = match reader.read_inverse_bind_matrices() {
            Some(matrices) => matrices
                .map(|matrix| Mat4::from_cols_array_2d(&matrix).inverse())
                .collect(),
            None => iter::repeat(Mat4::IDENTITY)
                .take(skin.joints().count())
                .collect(),
        };

        // Joints are placed relative to the root joint's parent, skinning
        // output is expected in the owning node's space.
        let root_parent = skin
            .joints()
            .find(|joint| {
                self.parents
                    .get(&joint.index())
                    .map_or(true, |parent| !paths.contains_key(parent))
            })
            .and_then(|joint| self.parents.get(&joint.index()).copied());
        let root_parent_matrix = root_parent
            .map(|index| self.world_matrix(index))
            .unwrap_or(Mat4::IDENTITY);
        let node_matrix = self.world_matrix(owner.index()).inverse() * root_parent_matrix;

        SkeletonAsset {
            name: skin.name().map(str::to_string),
            joint_paths,
            bind_transforms,
            rest_transforms,
            node_matrix,
        }
    }

    fn load_animation(&self, animation: &Animation, paths: &BTreeMap<usize, String>) -> Option<JointAnimationAsset> {
        let mut tracks: BTreeMap<usize, JointTrack> = BTreeMap::new();
        for channel in animation.channels() {
            let target = channel.target().node();
            let path = match paths.get(&target.index()) {
                Some(path) => path,
                None => continue,
            };
            let reader = channel.reader(|buffer| Some(&self.buffers[buffer.index()].0[..]));
            let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
                warn!("Animation channel for joint {} has no data, skipping", path);
                continue;
            };
            let time: Vec<f32> = inputs.collect();
            let interpolation = channel.sampler().interpolation();
            let track = tracks.entry(target.index()).or_insert_with(|| JointTrack {
                path: path.clone(),
                ..Default::default()
            });
            match outputs {
                ReadOutputs::Translations(data) => {
                    track.translation = Some(read_keyframes(time, data.collect(), interpolation))
                }
                ReadOutputs::Rotations(data) => {
                    track.rotation = Some(read_keyframes(
                        time,
                        data.into_f32().collect(),
                        interpolation,
                    ))
                }
                ReadOutputs::Scales(data) => {
                    track.scale = Some(read_keyframes(time, data.collect(), interpolation))
                }
                ReadOutputs::MorphTargetWeights(_) => {
                    debug!("Morph target animation on joint {} is not supported", path)
                }
            }
        }
        if tracks.is_empty() {
            None
        } else {
            Some(JointAnimationAsset {
                name: animation.name().map(str::to_string),
                tracks: tracks.into_values().collect(),
            })
        }
    }

    /// `offset` is the accumulated local matrix of skipped joint ancestors.
    fn load_node(&self, node: Node, offset: Option<Mat4>, document: &Document) -> NodeAsset {
        let transform = match (offset, node.transform()) {
            (Some(offset), _) => {
                NodeTransform::Matrix(MatrixNodeTransform(offset * self.locals[node.index()]))
            }
            (None, gltf::scene::Transform::Matrix { matrix }) => {
                NodeTransform::Matrix(MatrixNodeTransform(Mat4::from_cols_array_2d(&matrix)))
            }
            (
                None,
                gltf::scene::Transform::Decomposed {
                    translation,
                    rotation,
                    scale,
                },
            ) => NodeTransform::Decomposed(DecomposedTransform {
                translation: translation.into(),
                rotation: glam::Quat::from_array(rotation),
                scale: scale.into(),
            }),
        };
        let mesh = node.mesh().map(|mesh| MeshAsset {
            name: mesh.name().map(str::to_string),
            index: mesh.index(),
        });
        let (skeleton, animations) = match node.skin() {
            Some(skin) => {
                let paths = self.joint_paths(&skin);
                let animations = document
                    .animations()
                    .filter_map(|animation| self.load_animation(&animation, &paths))
                    .collect();
                (Some(self.load_skeleton(&skin, &node)), animations)
            }
            None => (None, Vec::new()),
        };
        let mut children = Vec::new();
        self.load_nodes(node.children().collect(), None, document, &mut children);

        NodeAsset {
            name: node.name().map(str::to_string),
            transform: Some(transform),
            children,
            mesh,
            skeleton,
            animations,
        }
    }

    // Joint nodes belong to skeletons. Whatever hangs below them is lifted
    // to the nearest non-joint ancestor, placed at the joints' rest pose.
    fn load_nodes(
        &self,
        nodes: Vec<Node>,
        offset: Option<Mat4>,
        document: &Document,
        output: &mut Vec<NodeAsset>,
    ) {
        for node in nodes {
            if self.joint_nodes.contains(&node.index()) {
                debug!("Skipping joint node {} in node tree", node_label(&node));
                let offset = offset.unwrap_or(Mat4::IDENTITY) * self.locals[node.index()];
                self.load_nodes(node.children().collect(), Some(offset), document, output);
            } else {
                output.push(self.load_node(node, offset, document));
            }
        }
    }

    fn load_scene(&self, scene: Scene, document: &Document) -> SceneAsset {
        let mut nodes = Vec::new();
        self.load_nodes(scene.nodes().collect(), None, document, &mut nodes);
        SceneAsset {
            name: scene.name().map(str::to_string),
            nodes,
        }
    }

    fn load(&self, document: &Document) -> Vec<SceneAsset> {
        document
            .scenes()
            .map(|scene| self.load_scene(scene, document))
            .collect()
    }
}

pub fn load_from_path<P>(path: P) -> Result<Vec<SceneAsset>, LoadError>
where
    P: AsRef<Path>,
{
    let (document, buffers, _) = gltf::import(path.as_ref())?;
    let scenes = GltfDocumentLoader::new(&document, &buffers).load(&document);
    info!(
        "Loaded {} scenes from {}",
        scenes.len(),
        path.as_ref().display()
    );
    Ok(scenes)
}

pub fn load_from_slice(data: &[u8]) -> Result<Vec<SceneAsset>, LoadError> {
    let (document, buffers, _) = gltf::import_slice(data)?;
    Ok(GltfDocumentLoader::new(&document, &buffers).load(&document))
}
