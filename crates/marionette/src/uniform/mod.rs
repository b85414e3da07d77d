//! GPU-ready layouts of the computed matrices. Uploading them is up to the
//! renderer.
pub mod joint;
