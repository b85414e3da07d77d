//! Skeletal animation and scene-graph transform propagation.
//!
//! A frame goes: animate -> propagate.
//! Animate: evaluate every skeleton's pose (animated or rest) into model
//! space skinning matrices.
//! Propagate: compose world matrices from the root down, parents before
//! children, and report changed mesh transforms to the renderer.
pub mod animation;
pub mod clock;
pub mod loader;
pub mod node;
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod uniform;

pub use marionette_asset as asset;
