use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use log::{debug, info, warn};
use marionette_asset::{node::NodeAsset, scene::SceneAsset};

use crate::{
    animation::NodeAnimation,
    node::{NodeId, SceneGraph},
    scene::Scene,
    skeleton::{Skeleton, SkeletonError},
};

#[derive(Debug)]
pub enum SceneLoadError {
    Skeleton { node: String, error: SkeletonError },
}

impl Display for SceneLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SceneLoadError::Skeleton { node, error } => {
                write!(f, "Bad skeleton on node {}: {}", node, error)
            }
        }
    }
}

impl Error for SceneLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SceneLoadError::Skeleton { error, .. } => Some(error),
        }
    }
}

/// Turns a [`SceneAsset`] into a runtime [`Scene`]. A malformed skeleton
/// fails the whole load.
#[derive(Debug, Default)]
pub struct SceneLoader {
    skeleton_count: usize,
    animation_count: usize,
}

impl SceneLoader {
    pub fn new() -> Self {
        Self::default()
    }

    fn node_name(asset: &NodeAsset, index: usize) -> String {
        asset
            .name
            .clone()
            .unwrap_or_else(|| format!("node{}", index))
    }

    fn load_node(
        &mut self,
        graph: &mut SceneGraph,
        parent: NodeId,
        asset: &NodeAsset,
    ) -> Result<NodeId, SceneLoadError> {
        let name = Self::node_name(asset, graph.len());
        let id = graph.add_child(parent, name.clone(), asset.matrix());
        let node = &mut graph[id];
        node.set_mesh(asset.mesh.clone());

        match &asset.skeleton {
            Some(skeleton_asset) => {
                let skeleton = Skeleton::from_asset(skeleton_asset).map_err(|error| {
                    SceneLoadError::Skeleton {
                        node: name.clone(),
                        error,
                    }
                })?;
                for animation_asset in &asset.animations {
                    let missing: Vec<&str> = animation_asset
                        .tracks
                        .iter()
                        .map(|track| track.path.as_str())
                        .filter(|path| skeleton.joint_index(path).is_none())
                        .collect();
                    if !missing.is_empty() {
                        warn!(
                            "Animation {} on node {} targets unknown joints: {}",
                            animation_asset.name.as_deref().unwrap_or("<unnamed>"),
                            name,
                            missing.join(", ")
                        );
                    }
                    node.push_animation(NodeAnimation::new(animation_asset.clone()));
                    self.animation_count += 1;
                }
                node.set_skeleton(Some(skeleton));
                self.skeleton_count += 1;
            }
            None if !asset.animations.is_empty() => {
                warn!(
                    "Node {} has {} animations but no skeleton, skipping them",
                    name,
                    asset.animations.len()
                );
            }
            None => (),
        }

        for child in &asset.children {
            self.load_node(graph, id, child)?;
        }
        Ok(id)
    }

    pub fn load(&mut self, asset: &SceneAsset) -> Result<Scene, SceneLoadError> {
        let root_name = format!(
            "Scene node - {}",
            asset.name.as_deref().unwrap_or("<unnamed>")
        );
        let mut graph = SceneGraph::new(root_name);
        let root = graph.root();
        for node in &asset.nodes {
            self.load_node(&mut graph, root, node)?;
        }
        info!(
            "Loaded {} nodes, {} skeletons, {} animations",
            graph.len(),
            self.skeleton_count,
            self.animation_count
        );
        debug!("Scene tree:\n{}", graph.tree_string());
        Ok(Scene::new(graph))
    }
}

pub fn load_scene(asset: &SceneAsset) -> Result<Scene, SceneLoadError> {
    SceneLoader::new().load(asset)
}
