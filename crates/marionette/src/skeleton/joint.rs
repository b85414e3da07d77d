use std::collections::{HashMap, VecDeque};

use super::SkeletonError;

#[derive(Debug, Clone)]
pub struct Joint {
    path: String,
    index: usize,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl Joint {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last segment of the path.
    pub fn name(&self) -> &str {
        match self.path.rfind('/') {
            Some(slash) => &self.path[slash + 1..],
            None => &self.path,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    fn parent_path(&self) -> Option<&str> {
        self.path.rfind('/').map(|slash| &self.path[..slash])
    }
}

/// Joint tree of a skeleton, stored flat and addressed by joint index.
#[derive(Debug, Clone)]
pub struct JointHierarchy {
    joints: Vec<Joint>,
    path_map: HashMap<String, usize>,
    root: usize,
}

impl JointHierarchy {
    /// Link joints by their paths: the parent of `a/b/c` is the joint at
    /// `a/b`. Exactly one joint must end up without a parent.
    pub fn from_paths<S: AsRef<str>>(paths: &[S]) -> Result<Self, SkeletonError> {
        if paths.is_empty() {
            return Err(SkeletonError::NoJoints);
        }

        let mut joints = Vec::with_capacity(paths.len());
        let mut path_map = HashMap::with_capacity(paths.len());
        for (index, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            if path_map.insert(path.to_string(), index).is_some() {
                return Err(SkeletonError::DuplicatePath(path.to_string()));
            }
            joints.push(Joint {
                path: path.to_string(),
                index,
                parent: None,
                children: Vec::new(),
            });
        }

        let mut roots = Vec::new();
        for index in 0..joints.len() {
            let parent = joints[index]
                .parent_path()
                .and_then(|parent_path| path_map.get(parent_path))
                .copied();
            match parent {
                Some(parent) => {
                    joints[index].parent = Some(parent);
                    joints[parent].children.push(index);
                }
                None => roots.push(index),
            }
        }

        match roots.as_slice() {
            [] => Err(SkeletonError::NoRoot),
            [root] => Ok(Self {
                joints,
                path_map,
                root: *root,
            }),
            _ => Err(SkeletonError::MultipleRoots(
                roots
                    .into_iter()
                    .map(|index| joints[index].path.clone())
                    .collect(),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn root(&self) -> &Joint {
        &self.joints[self.root]
    }

    pub fn get(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn find(&self, path: &str) -> Option<&Joint> {
        self.path_map.get(path).map(|index| &self.joints[*index])
    }

    /// Joints in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Joint> {
        self.joints.iter()
    }

    /// Breadth-first from the root, every parent comes before its children.
    pub fn iter_bfs(&self) -> BfsIter<'_> {
        BfsIter {
            joints: &self.joints,
            queue: VecDeque::from([self.root]),
        }
    }

    pub fn iter_dfs(&self) -> DfsIter<'_> {
        DfsIter {
            joints: &self.joints,
            stack: vec![self.root],
        }
    }

    pub fn parent_indices(&self) -> Vec<Option<usize>> {
        self.joints.iter().map(Joint::parent).collect()
    }

    /// Indented tree of `index: name (parent index)` lines.
    pub fn tree_string(&self) -> String {
        fn write_joint(joints: &[Joint], index: usize, depth: usize, output: &mut String) {
            let joint = &joints[index];
            let parent = joint
                .parent
                .map(|parent| parent.to_string())
                .unwrap_or_else(|| "-1".to_string());
            output.push_str(&"  ".repeat(depth));
            output.push_str(&format!("{}: {} ({})\n", joint.index, joint.name(), parent));
            for child in &joint.children {
                write_joint(joints, *child, depth + 1, output);
            }
        }

        let mut output = String::new();
        write_joint(&self.joints, self.root, 0, &mut output);
        output
    }
}

pub struct BfsIter<'a> {
    joints: &'a [Joint],
    queue: VecDeque<usize>,
}

impl<'a> Iterator for BfsIter<'a> {
    type Item = &'a Joint;

    fn next(&mut self) -> Option<Self::Item> {
        let joint = &self.joints[self.queue.pop_front()?];
        self.queue.extend(joint.children.iter().copied());
        Some(joint)
    }
}

pub struct DfsIter<'a> {
    joints: &'a [Joint],
    stack: Vec<usize>,
}

impl<'a> Iterator for DfsIter<'a> {
    type Item = &'a Joint;

    fn next(&mut self) -> Option<Self::Item> {
        let joint = &self.joints[self.stack.pop()?];
        // reversed so the first child is visited first
        self.stack.extend(joint.children.iter().rev().copied());
        Some(joint)
    }
}
