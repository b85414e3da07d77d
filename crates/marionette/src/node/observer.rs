use glam::Mat4;
use marionette_asset::mesh::MeshAsset;

use super::NodeId;

/// Receives the new world matrix of mesh-carrying nodes, e.g. to write it
/// into per-object constant buffers.
pub trait WorldMatrixObserver {
    fn world_matrix_changed(&mut self, node: NodeId, mesh: &MeshAsset, world_matrix: &Mat4);
}

impl<F> WorldMatrixObserver for F
where
    F: FnMut(NodeId, &MeshAsset, &Mat4),
{
    fn world_matrix_changed(&mut self, node: NodeId, mesh: &MeshAsset, world_matrix: &Mat4) {
        self(node, mesh, world_matrix)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpObserver;

impl WorldMatrixObserver for NoOpObserver {
    fn world_matrix_changed(&mut self, _node: NodeId, _mesh: &MeshAsset, _world_matrix: &Mat4) {}
}
