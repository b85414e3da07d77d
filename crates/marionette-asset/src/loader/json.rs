use std::{fs::File, io::BufReader, path::Path};

use log::info;

use crate::{node::NodeAsset, scene::SceneAsset};

use super::LoadError;

// hand-written descriptions may list keys out of order
fn sort_keyframes(node: &mut NodeAsset) {
    for animation in &mut node.animations {
        animation.sort_keyframes();
    }
    for child in &mut node.children {
        sort_keyframes(child);
    }
}

fn prepare(mut scene: SceneAsset) -> SceneAsset {
    for node in &mut scene.nodes {
        sort_keyframes(node);
    }
    scene
}

pub fn load_from_str(text: &str) -> Result<SceneAsset, LoadError> {
    let scene: SceneAsset = serde_json::from_str(text)?;
    Ok(prepare(scene))
}

pub fn load_from_path<P>(path: P) -> Result<SceneAsset, LoadError>
where
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    let scene = prepare(serde_json::from_reader(BufReader::new(file))?);
    info!(
        "Loaded scene description {} with {} root nodes",
        path.as_ref().display(),
        scene.nodes.len()
    );
    Ok(scene)
}

#[cfg(test)]
mod test {
    use glam::{Mat4, Vec3};

    use crate::{animation::AnimationKeyFrames, node::NodeTransform};

    use super::load_from_str;

    #[test]
    fn test_scene_description() {
        let scene = load_from_str(
            r#"{
                "name": "walk",
                "nodes": [{
                    "name": "character",
                    "transform": { "decomposed": { "translation": [1.0, 0.0, 0.0] } },
                    "mesh": { "name": "body", "index": 0 },
                    "skeleton": {
                        "joint_paths": ["hip", "hip/knee"],
                        "bind_transforms": [
                            [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,1,0,1],
                            [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0.5,0,1]
                        ],
                        "rest_transforms": [
                            [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,1,0,1],
                            [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,-0.5,0,1]
                        ]
                    },
                    "animations": [{
                        "name": "bend",
                        "tracks": [{
                            "path": "hip/knee",
                            "rotation": { "linear": [
                                { "time": 0.0, "value": [0.0, 0.0, 0.0, 1.0] },
                                { "time": 1.0, "value": [0.0, 0.0, 1.0, 0.0] }
                            ] }
                        }]
                    }],
                    "children": [{ "name": "prop" }]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(scene.name.as_deref(), Some("walk"));
        let node = &scene.nodes[0];
        match &node.transform {
            Some(NodeTransform::Decomposed(transform)) => {
                assert_eq!(transform.translation, Vec3::X);
                assert_eq!(transform.scale, Vec3::ONE);
            }
            other => panic!("unexpected transform {:?}", other),
        }
        let skeleton = node.skeleton.as_ref().unwrap();
        assert_eq!(skeleton.joint_count(), 2);
        assert_eq!(
            skeleton.bind_transforms[0],
            Mat4::from_translation(Vec3::Y)
        );
        assert_eq!(skeleton.node_matrix, Mat4::IDENTITY);
        let track = &node.animations[0].tracks[0];
        assert_eq!(track.path, "hip/knee");
        assert!(matches!(track.rotation, Some(AnimationKeyFrames::Linear(ref keys)) if keys.len() == 2));
        assert!(track.translation.is_none());
        assert_eq!(node.children[0].name.as_deref(), Some("prop"));
    }

    #[test]
    fn test_keyframes_sorted() {
        let scene = load_from_str(
            r#"{
                "nodes": [{ "children": [{
                    "animations": [{ "tracks": [{
                        "path": "hip",
                        "scale": { "step": [
                            { "time": 2.0, "value": [3.0, 3.0, 3.0] },
                            { "time": 0.0, "value": [1.0, 1.0, 1.0] },
                            { "time": 1.0, "value": [2.0, 2.0, 2.0] }
                        ] }
                    }] }]
                }] }]
            }"#,
        )
        .unwrap();
        let track = &scene.nodes[0].children[0].animations[0].tracks[0];
        match &track.scale {
            Some(AnimationKeyFrames::Step(keys)) => {
                let times: Vec<f32> = keys.iter().map(|key| key.time).collect();
                assert_eq!(times, vec![0.0, 1.0, 2.0]);
                assert_eq!(keys[0].value, [1.0, 1.0, 1.0]);
            }
            other => panic!("unexpected curve {:?}", other),
        }
    }

    #[test]
    fn test_bad_description() {
        assert!(load_from_str(r#"{ "nodes": 3 }"#).is_err());
    }
}
