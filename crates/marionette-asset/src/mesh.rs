/// Reference to renderable geometry owned by the rendering side.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshAsset {
    pub name: Option<String>,
    /// Index of the mesh inside its source file.
    pub index: usize,
}
