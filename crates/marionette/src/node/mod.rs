use std::{
    collections::VecDeque,
    fmt::{self, Display, Formatter},
    ops::{ControlFlow, Index, IndexMut},
    time::Duration,
};

use glam::Mat4;
use marionette_asset::mesh::MeshAsset;

use crate::{
    animation::{NodeAnimation, PlaybackMode},
    skeleton::Skeleton,
};

pub use observer::{NoOpObserver, WorldMatrixObserver};

pub mod observer;

/// Index of a node inside its [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub struct SceneNode {
    name: String,
    matrix: Mat4,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    mesh: Option<MeshAsset>,
    skeleton: Option<Skeleton>,
    animations: Vec<NodeAnimation>,
    world_matrix: Mat4,
    // Set to false when the observer has not seen the current world matrix
    notified: bool,
}

impl SceneNode {
    fn new(name: String, matrix: Mat4, parent: Option<NodeId>) -> Self {
        Self {
            name,
            matrix,
            parent,
            children: Vec::new(),
            mesh: None,
            skeleton: None,
            animations: Vec::new(),
            world_matrix: Mat4::IDENTITY,
            notified: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Authored local matrix.
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix = matrix;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// World matrix as of the last propagation.
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    pub fn mesh(&self) -> Option<&MeshAsset> {
        self.mesh.as_ref()
    }

    pub fn set_mesh(&mut self, mesh: Option<MeshAsset>) {
        self.mesh = mesh;
        self.notified = false;
    }

    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.as_ref()
    }

    pub fn skeleton_mut(&mut self) -> Option<&mut Skeleton> {
        self.skeleton.as_mut()
    }

    pub fn set_skeleton(&mut self, skeleton: Option<Skeleton>) {
        self.skeleton = skeleton;
    }

    pub fn animations(&self) -> &[NodeAnimation] {
        &self.animations
    }

    pub fn push_animation(&mut self, animation: NodeAnimation) {
        self.animations.push(animation);
    }

    pub fn start_animation(&mut self, index: usize, now: Duration) -> bool {
        match self.animations.get_mut(index) {
            Some(animation) => {
                animation.mark_start(now);
                true
            }
            None => false,
        }
    }

    /// Stop an animation. The skeleton returns to its rest pose right away.
    pub fn stop_animation(&mut self, index: usize) -> bool {
        match self.animations.get_mut(index) {
            Some(animation) => {
                animation.mark_stop();
                if let Some(skeleton) = &mut self.skeleton {
                    skeleton.set_rest_pose();
                }
                true
            }
            None => false,
        }
    }

    /// Pose the skeleton from the first playing animation, or the rest pose
    /// when nothing plays.
    pub fn animate(&mut self, now: Duration) {
        let Some(skeleton) = &mut self.skeleton else {
            return;
        };
        match self.animations.iter().find(|animation| animation.is_playing()) {
            Some(animation) => skeleton.animate(animation, now),
            None => skeleton.set_rest_pose(),
        }
    }
}

/// Node tree stored flat, with a single root.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl Index<NodeId> for SceneGraph {
    type Output = SceneNode;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for SceneGraph {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.0]
    }
}

impl SceneGraph {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![SceneNode::new(root_name.into(), Mat4::IDENTITY, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    /// Append a child under `parent`, after its existing children.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>, matrix: Mat4) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode::new(name.into(), matrix, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    /// Visit nodes breadth first from `from`, parents before children,
    /// until the visitor breaks.
    pub fn enumerate_bfs(
        &self,
        from: NodeId,
        mut action: impl FnMut(NodeId, &SceneNode) -> ControlFlow<()>,
    ) {
        let mut queue = VecDeque::from([from]);
        while let Some(id) = queue.pop_front() {
            let node = &self[id];
            if action(id, node).is_break() {
                break;
            }
            queue.extend(node.children.iter().copied());
        }
    }

    pub fn enumerate_dfs(&self, from: NodeId, mut action: impl FnMut(NodeId, &SceneNode)) {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let node = &self[id];
            action(id, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    pub fn bfs_order(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        self.enumerate_bfs(from, |id, _| {
            order.push(id);
            ControlFlow::Continue(())
        });
        order
    }

    /// Mesh-carrying nodes in depth-first order.
    pub fn mesh_nodes(&self) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        self.enumerate_dfs(self.root(), |id, node| {
            if node.mesh.is_some() {
                nodes.push(id);
            }
        });
        nodes
    }

    pub fn set_matrix(&mut self, id: NodeId, matrix: Mat4) {
        self[id].matrix = matrix;
    }

    /// Recompute every world matrix top-down and report changed ones of
    /// mesh-carrying nodes to `observer`.
    pub fn propagate_world_matrices(&mut self, observer: &mut impl WorldMatrixObserver) {
        for id in self.bfs_order(self.root()) {
            let parent_world = self[id].parent.map(|parent| self[parent].world_matrix);
            let node = &mut self[id];
            let world_matrix = match parent_world {
                Some(parent_world) => parent_world * node.matrix,
                None => node.matrix,
            };
            let changed = world_matrix != node.world_matrix;
            node.world_matrix = world_matrix;
            if let Some(mesh) = &node.mesh {
                if changed || !node.notified {
                    observer.world_matrix_changed(id, mesh, &node.world_matrix);
                    node.notified = true;
                }
            }
        }
    }

    /// Evaluate the pose of every skeleton at `now`.
    pub fn animate(&mut self, now: Duration) {
        for node in &mut self.nodes {
            node.animate(now);
        }
    }

    /// One frame: poses first, then world matrices.
    pub fn update(&mut self, now: Duration, observer: &mut impl WorldMatrixObserver) {
        self.animate(now);
        self.propagate_world_matrices(observer);
    }

    pub fn start_all_animations(&mut self, now: Duration) {
        for node in &mut self.nodes {
            for animation in &mut node.animations {
                animation.mark_start(now);
            }
        }
    }

    pub fn set_playback_mode(&mut self, mode: PlaybackMode) {
        for node in &mut self.nodes {
            for animation in &mut node.animations {
                animation.set_mode(mode);
            }
        }
    }

    pub fn stop_all_animations(&mut self) {
        for node in &mut self.nodes {
            for index in 0..node.animations.len() {
                node.stop_animation(index);
            }
        }
    }

    /// Indented tree of node names with animation and skeleton counts.
    pub fn tree_string(&self) -> String {
        fn write_node(graph: &SceneGraph, id: NodeId, depth: usize, output: &mut String) {
            let node = &graph[id];
            output.push_str(&"  ".repeat(depth));
            output.push_str(&node.name);
            if !node.animations.is_empty() {
                output.push_str(&format!(" anims: {}", node.animations.len()));
            }
            if let Some(skeleton) = &node.skeleton {
                output.push_str(&format!(
                    " skel: {}",
                    skeleton.name().unwrap_or("<unnamed>")
                ));
            }
            output.push('\n');
            for child in &node.children {
                write_node(graph, *child, depth + 1, output);
            }
        }

        let mut output = String::new();
        write_node(self, self.root(), 0, &mut output);
        output
    }
}

#[cfg(test)]
mod test {
    use std::ops::ControlFlow;

    use glam::{Mat4, Vec3};
    use marionette_asset::mesh::MeshAsset;

    use super::{NoOpObserver, NodeId, SceneGraph};

    fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(x, y, z))
    }

    #[test]
    fn test_chain_composition() {
        let mut graph = SceneGraph::new("root");
        let root = graph.root();
        graph.set_matrix(root, translation(1.0, 0.0, 0.0));
        let a = graph.add_child(root, "a", translation(0.0, 1.0, 0.0));
        let b = graph.add_child(a, "b", translation(0.0, 0.0, 1.0));
        graph.propagate_world_matrices(&mut NoOpObserver);

        assert!(graph[root].world_matrix().abs_diff_eq(translation(1.0, 0.0, 0.0), 1e-6));
        assert!(graph[a].world_matrix().abs_diff_eq(translation(1.0, 1.0, 0.0), 1e-6));
        assert!(graph[b].world_matrix().abs_diff_eq(translation(1.0, 1.0, 1.0), 1e-6));
    }

    #[test]
    fn test_sibling_order_does_not_matter() {
        let build = |reversed: bool| {
            let mut graph = SceneGraph::new("root");
            let root = graph.root();
            let names = if reversed { ["right", "left"] } else { ["left", "right"] };
            for name in names {
                let offset = if name == "left" { -1.0 } else { 1.0 };
                let child = graph.add_child(root, name, translation(offset, 0.0, 0.0));
                graph.add_child(child, format!("{}_hand", name), translation(0.0, 2.0, 0.0));
            }
            graph.propagate_world_matrices(&mut NoOpObserver);
            graph
        };
        let graph = build(false);
        let reversed = build(true);
        for name in ["left", "right", "left_hand", "right_hand"] {
            let a = graph[graph.find(name).unwrap()].world_matrix();
            let b = reversed[reversed.find(name).unwrap()].world_matrix();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_observer_sees_changes() {
        let mut graph = SceneGraph::new("root");
        let root = graph.root();
        let body = graph.add_child(root, "body", Mat4::IDENTITY);
        graph[body].set_mesh(Some(MeshAsset {
            name: Some("body".to_string()),
            index: 0,
        }));
        graph.add_child(root, "empty", Mat4::IDENTITY);

        let mut seen: Vec<(NodeId, Mat4)> = Vec::new();
        let mut observer = |id: NodeId, _: &MeshAsset, matrix: &Mat4| seen.push((id, *matrix));
        // first propagation always reports, even for an identity world matrix
        graph.propagate_world_matrices(&mut observer);
        graph.propagate_world_matrices(&mut observer);
        graph.set_matrix(root, translation(0.0, 0.0, 2.0));
        graph.propagate_world_matrices(&mut observer);

        assert_eq!(
            seen,
            vec![(body, Mat4::IDENTITY), (body, translation(0.0, 0.0, 2.0))]
        );
    }

    #[test]
    fn test_traversal() {
        let mut graph = SceneGraph::new("root");
        let root = graph.root();
        let a = graph.add_child(root, "a", Mat4::IDENTITY);
        let b = graph.add_child(root, "b", Mat4::IDENTITY);
        let a1 = graph.add_child(a, "a1", Mat4::IDENTITY);
        let b1 = graph.add_child(b, "b1", Mat4::IDENTITY);

        assert_eq!(graph.bfs_order(root), vec![root, a, b, a1, b1]);

        let mut dfs = Vec::new();
        graph.enumerate_dfs(root, |id, _| dfs.push(id));
        assert_eq!(dfs, vec![root, a, a1, b, b1]);

        let mut visited = Vec::new();
        graph.enumerate_bfs(root, |id, node| {
            visited.push(id);
            if node.name() == "b" {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(visited, vec![root, a, b]);
        assert_eq!(graph.tree_string(), "root\n  a\n    a1\n  b\n    b1\n");
    }
}
