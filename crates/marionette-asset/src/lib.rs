//! Plain-data scene description for the animation core.
//!
//! This library provides a node structure loosely modelled upon GLTF:
//! a tree of nodes with authored local transforms, optional skeleton
//! definitions addressed by hierarchical joint paths, and joint animation
//! clips made of keyframe curves. Loaders for JSON scene descriptions
//! (`serde` feature) and GLTF files (`gltf` feature) live in [`loader`].
//!
pub mod animation;
/// Scene loaders for various formats
pub mod loader;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod skeleton;
