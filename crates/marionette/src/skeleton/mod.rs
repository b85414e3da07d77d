use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    time::Duration,
};

use glam::Mat4;
use log::{debug, trace};
use marionette_asset::skeleton::SkeletonAsset;

use crate::animation::NodeAnimation;

pub use joint::{Joint, JointHierarchy};

pub mod joint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkeletonError {
    NoJoints,
    NoRoot,
    MultipleRoots(Vec<String>),
    DuplicatePath(String),
    MatrixCountMismatch {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl Display for SkeletonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SkeletonError::NoJoints => write!(f, "Skeleton has no joints"),
            SkeletonError::NoRoot => write!(f, "Skeleton has no root joint"),
            SkeletonError::MultipleRoots(roots) => {
                write!(f, "Skeleton has multiple root joints: {}", roots.join(", "))
            }
            SkeletonError::DuplicatePath(path) => write!(f, "Duplicated joint path: {}", path),
            SkeletonError::MatrixCountMismatch {
                kind,
                expected,
                actual,
            } => write!(
                f,
                "Expected {} {} matrices, got {}",
                expected, kind, actual
            ),
        }
    }
}

impl Error for SkeletonError {}

/// Skeleton with its bind pose, rest pose and the matrices of the last
/// evaluated pose.
#[derive(Debug, Clone)]
pub struct Skeleton {
    name: Option<String>,
    hierarchy: JointHierarchy,
    // model space to joint local space at bind time
    inverse_bind_matrices: Vec<Mat4>,
    rest_local_matrices: Vec<Mat4>,
    model_space_matrices: Vec<Mat4>,
    skinning_matrices: Vec<Mat4>,
    node_matrix: Mat4,
    // joint indices, parents first
    evaluation_order: Vec<usize>,
}

impl Skeleton {
    /// Build a skeleton from joint paths, model-space bind transforms and
    /// local rest transforms, all indexed identically. The rest pose is
    /// evaluated right away.
    pub fn new<S: AsRef<str>>(
        joint_paths: &[S],
        bind_transforms: &[Mat4],
        rest_transforms: &[Mat4],
    ) -> Result<Self, SkeletonError> {
        let hierarchy = JointHierarchy::from_paths(joint_paths)?;
        let joint_count = hierarchy.len();
        for (kind, matrices) in [("bind", bind_transforms), ("rest", rest_transforms)] {
            if matrices.len() != joint_count {
                return Err(SkeletonError::MatrixCountMismatch {
                    kind,
                    expected: joint_count,
                    actual: matrices.len(),
                });
            }
        }

        let evaluation_order = hierarchy.iter_bfs().map(Joint::index).collect();
        let mut skeleton = Self {
            name: None,
            hierarchy,
            inverse_bind_matrices: bind_transforms.iter().map(Mat4::inverse).collect(),
            rest_local_matrices: rest_transforms.to_vec(),
            model_space_matrices: vec![Mat4::IDENTITY; joint_count],
            skinning_matrices: vec![Mat4::IDENTITY; joint_count],
            node_matrix: Mat4::IDENTITY,
            evaluation_order,
        };
        skeleton.set_rest_pose();
        Ok(skeleton)
    }

    pub fn from_asset(asset: &SkeletonAsset) -> Result<Self, SkeletonError> {
        let mut skeleton = Self::new(
            &asset.joint_paths,
            &asset.bind_transforms,
            &asset.rest_transforms,
        )?;
        skeleton.name = asset.name.clone();
        skeleton.set_node_matrix(asset.node_matrix);
        debug!(
            "Skeleton {}:\n{}",
            skeleton.name().unwrap_or("<unnamed>"),
            skeleton.hierarchy.tree_string()
        );
        Ok(skeleton)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn joint_count(&self) -> usize {
        self.hierarchy.len()
    }

    pub fn root_joint(&self) -> &Joint {
        self.hierarchy.root()
    }

    pub fn joints(&self) -> &JointHierarchy {
        &self.hierarchy
    }

    pub fn joint_index(&self, path: &str) -> Option<usize> {
        self.hierarchy.find(path).map(Joint::index)
    }

    pub fn parent_indices(&self) -> Vec<Option<usize>> {
        self.hierarchy.parent_indices()
    }

    pub fn inverse_bind_matrices(&self) -> &[Mat4] {
        &self.inverse_bind_matrices
    }

    pub fn rest_local_matrices(&self) -> &[Mat4] {
        &self.rest_local_matrices
    }

    pub fn model_space_matrices(&self) -> &[Mat4] {
        &self.model_space_matrices
    }

    /// Final per-joint matrices for vertex skinning, indexed by joint index.
    pub fn skinning_matrices(&self) -> &[Mat4] {
        &self.skinning_matrices
    }

    pub fn node_matrix(&self) -> &Mat4 {
        &self.node_matrix
    }

    /// Takes effect on the next pose evaluation.
    pub fn set_node_matrix(&mut self, node_matrix: Mat4) {
        self.node_matrix = node_matrix;
    }

    pub fn set_rest_pose(&mut self) {
        let rest = self.rest_local_matrices.clone();
        self.set_pose(&rest);
    }

    /// Evaluate a pose from per-joint local matrices indexed by joint index.
    /// Joints beyond the end of `local_poses` use their rest matrix.
    pub fn set_pose(&mut self, local_poses: &[Mat4]) {
        for &index in &self.evaluation_order {
            let local = match local_poses.get(index) {
                Some(local) => local,
                None => &self.rest_local_matrices[index],
            };
            let parent = self
                .hierarchy
                .get(index)
                .and_then(Joint::parent)
                .map(|parent| self.model_space_matrices[parent])
                .unwrap_or(self.node_matrix);
            self.model_space_matrices[index] = parent * *local;
        }

        for ((skinning, model_space), inverse_bind) in self
            .skinning_matrices
            .iter_mut()
            .zip(&self.model_space_matrices)
            .zip(&self.inverse_bind_matrices)
        {
            *skinning = *model_space * *inverse_bind;
        }
    }

    /// Evaluate the pose of a playing animation at `now`, or the rest pose
    /// when the animation is stopped. Joints the animation does not cover
    /// keep their rest matrix.
    pub fn animate(&mut self, animation: &NodeAnimation, now: Duration) {
        let Some(time) = animation.query_time(now) else {
            self.set_rest_pose();
            return;
        };
        trace!("Animate time: {:#.03}s", time);

        let mut poses = self.rest_local_matrices.clone();
        for track in animation.tracks() {
            if let Some(index) = self.joint_index(&track.path) {
                poses[index] = animation
                    .sample_track(track, time)
                    .to_matrix(&self.rest_local_matrices[index]);
            }
        }
        self.set_pose(&poses);
    }
}
