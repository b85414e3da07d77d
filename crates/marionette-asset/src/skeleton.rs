use glam::Mat4;

/// Skeleton definition as exported by a modelling tool.
///
/// All per-joint arrays are indexed identically to `joint_paths`.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SkeletonAsset {
    pub name: Option<String>,
    /// `/`-separated ancestor chain of every joint, e.g. `hip/thigh/knee`.
    pub joint_paths: Vec<String>,
    /// Model-space transform of each joint at the time the skin was bound.
    pub bind_transforms: Vec<Mat4>,
    /// Local-space default pose of each joint.
    pub rest_transforms: Vec<Mat4>,
    /// Correction applied on top of the root joint, e.g. the transform of
    /// the joint root's non-joint ancestors.
    pub node_matrix: Mat4,
}

impl SkeletonAsset {
    pub fn joint_count(&self) -> usize {
        self.joint_paths.len()
    }
}
