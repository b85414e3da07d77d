use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    fs,
    path::PathBuf,
};

use clap::Parser;
use marionette::animation::PlaybackMode;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackConfig {
    #[default]
    Repeat,
    PingPong,
}

impl From<PlaybackConfig> for PlaybackMode {
    fn from(value: PlaybackConfig) -> Self {
        match value {
            PlaybackConfig::Repeat => PlaybackMode::Repeat,
            PlaybackConfig::PingPong => PlaybackMode::PingPong,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Number of frames to evaluate.
    pub frames: u32,
    pub fps: f32,
    pub playback: PlaybackConfig,
    /// Start every animation before the first frame. Otherwise skeletons
    /// stay in their rest pose.
    pub animate: bool,
    pub dump_skinning: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            frames: 60,
            fps: 30.0,
            playback: PlaybackConfig::default(),
            animate: true,
            dump_skinning: false,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    BadFps(f32),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(error) => write!(f, "Failed to read config: {}", error),
            ConfigError::Json(error) => write!(f, "Bad config file: {}", error),
            ConfigError::BadFps(fps) => write!(f, "Frame rate must be positive, got {}", fps),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(error) => Some(error),
            ConfigError::Json(error) => Some(error),
            ConfigError::BadFps(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        ConfigError::Json(value)
    }
}

#[derive(Debug, Parser)]
#[command(name = "marionette-viewer")]
#[command(about = "Step the animations of a scene without a window and log its matrices")]
pub struct Cli {
    /// Scene to load: a .gltf / .glb file or a JSON scene description
    pub input: PathBuf,

    /// JSON file holding a viewer config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of frames to evaluate
    #[arg(long)]
    pub frames: Option<u32>,

    #[arg(long, env = "MARIONETTE_FPS")]
    pub fps: Option<f32>,

    /// Keep skeletons in their rest pose
    #[arg(long)]
    pub rest: bool,

    /// Log every skinning matrix after the last frame
    #[arg(long)]
    pub dump_skinning: bool,
}

impl Cli {
    /// Defaults, then the `--config` file, then flags and environment.
    pub fn viewer_config(&self) -> Result<ViewerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => ViewerConfig::default(),
        };
        self.apply(&mut config);
        if !(config.fps.is_finite() && config.fps > 0.0) {
            return Err(ConfigError::BadFps(config.fps));
        }
        Ok(config)
    }

    fn apply(&self, config: &mut ViewerConfig) {
        if let Some(frames) = self.frames {
            config.frames = frames;
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if self.rest {
            config.animate = false;
        }
        if self.dump_skinning {
            config.dump_skinning = true;
        }
    }
}
