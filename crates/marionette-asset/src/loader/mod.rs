use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    io,
};

#[cfg(feature = "gltf")]
pub mod gltf;
#[cfg(feature = "serde")]
pub mod json;

#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    #[cfg(feature = "serde")]
    Json(serde_json::Error),
    #[cfg(feature = "gltf")]
    Gltf(::gltf::Error),
    Malformed(String),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(err) => write!(f, "IO error: {}", err),
            #[cfg(feature = "serde")]
            LoadError::Json(err) => write!(f, "Bad scene description: {}", err),
            #[cfg(feature = "gltf")]
            LoadError::Gltf(err) => write!(f, "Bad GLTF file: {}", err),
            LoadError::Malformed(message) => write!(f, "Malformed asset: {}", message),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Io(err) => Some(err),
            #[cfg(feature = "serde")]
            LoadError::Json(err) => Some(err),
            #[cfg(feature = "gltf")]
            LoadError::Gltf(err) => Some(err),
            LoadError::Malformed(_) => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(value: io::Error) -> Self {
        LoadError::Io(value)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for LoadError {
    fn from(value: serde_json::Error) -> Self {
        LoadError::Json(value)
    }
}

#[cfg(feature = "gltf")]
impl From<::gltf::Error> for LoadError {
    fn from(value: ::gltf::Error) -> Self {
        LoadError::Gltf(value)
    }
}
