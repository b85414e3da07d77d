use std::fmt::Debug;

use glam::{Mat4, Quat, Vec3};
use marionette_asset::animation::{
    AnimationKeyFrame, AnimationKeyFrames, Interpolate, JointTrack,
};

/// Keys around `time` as `(progress, key delta, current, next)`. Outside the
/// sampled range the nearest key is held.
fn find_keyframe<T: Debug + Clone>(
    time: f32,
    keyframes: &[AnimationKeyFrame<T>],
) -> Option<(f32, f32, &T, &T)> {
    let first = keyframes.first()?;
    if time <= first.time {
        return Some((0.0, 0.0, &first.value, &first.value));
    }
    let next_index = keyframes.partition_point(|keyframe| keyframe.time <= time);
    if next_index >= keyframes.len() {
        let last = keyframes.last()?;
        return Some((0.0, 0.0, &last.value, &last.value));
    }
    let current = &keyframes[next_index - 1];
    let next = &keyframes[next_index];
    let delta = next.time - current.time;
    let progress = if delta > 0.0 {
        ((time - current.time) / delta).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Some((progress, delta, &current.value, &next.value))
}

fn interpolate_frames<T: Debug + Clone, I: Interpolate>(
    time: f32,
    keyframes: &AnimationKeyFrames<T>,
    mapper: impl Fn(&T) -> I,
    linear: impl Fn(I, I, f32) -> I,
) -> Option<I> {
    match keyframes {
        AnimationKeyFrames::Linear(vec) => {
            find_keyframe(time, vec).map(|(progress, _, current, next)| {
                linear(mapper(current), mapper(next), progress)
            })
        }
        AnimationKeyFrames::Step(vec) => {
            find_keyframe(time, vec).map(|(_, _, current, _)| mapper(current))
        }
        AnimationKeyFrames::CubicSpline(vec) => {
            find_keyframe(time, vec).map(|(progress, delta, current, next)| {
                let (val_cur, out_cur) = (mapper(&current.1), mapper(&current.2));
                let (in_next, val_next) = (mapper(&next.0), mapper(&next.1));
                I::cubic_spline(val_cur, out_cur, val_next, in_next, progress, delta)
            })
        }
    }
}

pub fn sample_translation(keyframes: &AnimationKeyFrames<[f32; 3]>, time: f32) -> Option<Vec3> {
    interpolate_frames(time, keyframes, |arr| Vec3::from_array(*arr), Vec3::linear)
}

pub fn sample_scale(keyframes: &AnimationKeyFrames<[f32; 3]>, time: f32) -> Option<Vec3> {
    sample_translation(keyframes, time)
}

pub fn sample_rotation(keyframes: &AnimationKeyFrames<[f32; 4]>, time: f32) -> Option<Quat> {
    // glam's lerp takes the shortest arc and renormalizes
    interpolate_frames(time, keyframes, |arr| Quat::from_array(*arr), Quat::lerp)
        .map(Quat::normalize)
}

/// Sampled components of one joint. `None` components keep the rest value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JointSample {
    pub translation: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub scale: Option<Vec3>,
}

impl JointSample {
    pub fn sample(track: &JointTrack, time: f32) -> Self {
        Self {
            translation: track
                .translation
                .as_ref()
                .and_then(|keyframes| sample_translation(keyframes, time)),
            rotation: track
                .rotation
                .as_ref()
                .and_then(|keyframes| sample_rotation(keyframes, time)),
            scale: track
                .scale
                .as_ref()
                .and_then(|keyframes| sample_scale(keyframes, time)),
        }
    }

    /// Local TRS matrix, missing components taken from `rest`.
    pub fn to_matrix(&self, rest: &Mat4) -> Mat4 {
        if let (Some(translation), Some(rotation), Some(scale)) =
            (self.translation, self.rotation, self.scale)
        {
            return Mat4::from_scale_rotation_translation(scale, rotation, translation);
        }
        let (rest_scale, rest_rotation, rest_translation) = rest.to_scale_rotation_translation();
        Mat4::from_scale_rotation_translation(
            self.scale.unwrap_or(rest_scale),
            self.rotation.unwrap_or(rest_rotation),
            self.translation.unwrap_or(rest_translation),
        )
    }
}
