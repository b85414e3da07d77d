use std::{path::Path, process::ExitCode, time::Duration};

use clap::Parser;
use config::{Cli, ViewerConfig};
use glam::Mat4;
use log::{debug, error, info, warn};
use marionette::{
    asset::{
        loader::{gltf, json, LoadError},
        mesh::MeshAsset,
        scene::SceneAsset,
    },
    clock::{Clock, ManualClock},
    loader::SceneLoader,
    node::NodeId,
    scene::Scene,
    uniform::joint::JointMatrixBuffer,
};

mod config;

fn load_assets(path: &Path) -> Result<Vec<SceneAsset>, LoadError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("gltf") | Some("glb") => gltf::load_from_path(path),
        _ => Ok(vec![json::load_from_path(path)?]),
    }
}

fn dump_skinning(scene: &Scene) {
    let graph = scene.graph();
    for (id, node) in graph.iter() {
        let Some(skeleton) = node.skeleton() else {
            continue;
        };
        let buffer = JointMatrixBuffer::new(skeleton.skinning_matrices());
        debug!(
            "Node {} ({}): {} joints, {} bytes of joint matrices",
            id,
            node.name(),
            buffer.len(),
            buffer.as_bytes().len()
        );
        for (joint, matrix) in skeleton.joints().iter().zip(skeleton.skinning_matrices()) {
            info!("  {}: {:?}", joint.path(), matrix.to_cols_array());
        }
    }
}

fn run(input: &Path, config: &ViewerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let assets = load_assets(input)?;
    if assets.is_empty() {
        warn!("{} contains no scene", input.display());
        return Ok(());
    }

    let mut scenes = Vec::with_capacity(assets.len());
    for asset in &assets {
        scenes.push(SceneLoader::new().load(asset)?);
    }

    let mut clock = ManualClock::new(Duration::ZERO);
    let frame_time = Duration::from_secs_f32(1.0 / config.fps);
    for scene in &mut scenes {
        scene.set_playback_mode(config.playback.into());
        if config.animate {
            scene.play_all(clock.now());
        }
    }

    for frame in 0..config.frames {
        let now = clock.now();
        for scene in &mut scenes {
            scene.update(now, &mut |id: NodeId, mesh: &MeshAsset, world_matrix: &Mat4| {
                debug!(
                    "Frame {}: node {} mesh {} world matrix {:?}",
                    frame, id, mesh_name(mesh), world_matrix
                );
            });
        }
        clock.advance(frame_time);
    }

    if config.dump_skinning {
        for scene in &scenes {
            dump_skinning(scene);
        }
    }
    info!(
        "Evaluated {} frames of {} scenes at {} fps",
        config.frames,
        scenes.len(),
        config.fps
    );
    Ok(())
}

fn mesh_name(mesh: &MeshAsset) -> String {
    mesh.name
        .clone()
        .unwrap_or_else(|| format!("#{}", mesh.index))
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.viewer_config() {
        Ok(config) => run(&cli.input, &config),
        Err(err) => Err(err.into()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
