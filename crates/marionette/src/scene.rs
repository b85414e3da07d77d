use std::time::Duration;

use crate::{
    animation::PlaybackMode,
    node::{NodeId, SceneGraph, WorldMatrixObserver},
    transform::Transform,
};

/// Loaded scene with a host-controlled transform on its root node.
#[derive(Debug)]
pub struct Scene {
    graph: SceneGraph,
    transform: Transform,
    mesh_nodes: Vec<NodeId>,
}

impl Scene {
    pub fn new(graph: SceneGraph) -> Self {
        let mesh_nodes = graph.mesh_nodes();
        Self {
            graph,
            transform: Transform::default(),
            mesh_nodes,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Mesh-carrying nodes found when the scene was created.
    pub fn mesh_nodes(&self) -> &[NodeId] {
        &self.mesh_nodes
    }

    pub fn play_all(&mut self, now: Duration) {
        self.graph.start_all_animations(now);
    }

    pub fn set_playback_mode(&mut self, mode: PlaybackMode) {
        self.graph.set_playback_mode(mode);
    }

    pub fn stop_all(&mut self) {
        self.graph.stop_all_animations();
    }

    /// Apply the scene transform to the root, then run one frame.
    pub fn update(&mut self, now: Duration, observer: &mut impl WorldMatrixObserver) {
        let root = self.graph.root();
        self.graph.set_matrix(root, *self.transform.matrix());
        self.graph.update(now, observer);
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use glam::{Mat4, Vec3};
    use marionette_asset::mesh::MeshAsset;

    use crate::node::{NoOpObserver, SceneGraph};

    use super::Scene;

    #[test]
    fn test_scene_transform_drives_root() {
        let mut graph = SceneGraph::new("scene");
        let root = graph.root();
        let child = graph.add_child(root, "child", Mat4::from_translation(Vec3::Y));
        graph[child].set_mesh(Some(MeshAsset::default()));
        let mut scene = Scene::new(graph);
        assert_eq!(scene.mesh_nodes(), &[child]);

        scene.transform_mut().move_by(Vec3::X);
        scene.update(Duration::ZERO, &mut NoOpObserver);
        let world = scene.graph()[child].world_matrix();
        assert!(world.abs_diff_eq(Mat4::from_translation(Vec3::new(1.0, 1.0, 0.0)), 1e-6));
    }
}
