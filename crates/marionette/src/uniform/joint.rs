use std::iter;

use bytemuck::cast_slice;
use glam::Mat4;
use log::warn;

pub const MAX_JOINTS: usize = 1024;

/// Column-major joint matrices, laid out as the skinning shader reads them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointMatrixBuffer {
    pub items: Vec<[f32; 16]>,
}

impl JointMatrixBuffer {
    pub fn new(matrices: &[Mat4]) -> Self {
        Self {
            items: matrices.iter().map(Mat4::to_cols_array).collect(),
        }
    }

    /// Padded with identity matrices up to [`MAX_JOINTS`] for fixed-size
    /// uniform buffers. Joints past the limit are dropped.
    pub fn padded(matrices: &[Mat4]) -> Self {
        if matrices.len() > MAX_JOINTS {
            warn!(
                "Skeleton has {} joints, only the first {} are uploaded",
                matrices.len(),
                MAX_JOINTS
            );
        }
        let items = matrices
            .iter()
            .map(Mat4::to_cols_array)
            .chain(iter::repeat(Mat4::IDENTITY.to_cols_array()))
            .take(MAX_JOINTS)
            .collect();
        Self { items }
    }

    /// Overwrite the leading items, keeping the padding.
    pub fn update(&mut self, matrices: &[Mat4]) {
        for (item, matrix) in self.items.iter_mut().zip(matrices) {
            *item = matrix.to_cols_array();
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        cast_slice(&self.items)
    }
}
