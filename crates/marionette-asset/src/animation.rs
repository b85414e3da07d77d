use std::{
    fmt::Debug,
    ops::{Add, Mul},
};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationKeyFrame<T: Debug + Clone> {
    pub time: f32,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnimationKeyFrames<T: Debug + Clone> {
    Linear(Vec<AnimationKeyFrame<T>>),
    Step(Vec<AnimationKeyFrame<T>>),
    // in, val, out
    CubicSpline(Vec<AnimationKeyFrame<(T, T, T)>>),
}

impl<T: Debug + Clone> AnimationKeyFrames<T> {
    pub fn len(&self) -> usize {
        match self {
            AnimationKeyFrames::Linear(vec) | AnimationKeyFrames::Step(vec) => vec.len(),
            AnimationKeyFrames::CubicSpline(vec) => vec.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Order keys by time. Stable, so keys sharing a time keep their order.
    pub fn sort_by_time(&mut self) {
        match self {
            AnimationKeyFrames::Linear(vec) | AnimationKeyFrames::Step(vec) => {
                vec.sort_by(|a, b| a.time.total_cmp(&b.time))
            }
            AnimationKeyFrames::CubicSpline(vec) => vec.sort_by(|a, b| a.time.total_cmp(&b.time)),
        }
    }

    /// Earliest and latest keyframe time of the curve.
    pub fn time_range(&self) -> Option<(f32, f32)> {
        fn range<V: Debug + Clone>(keyframes: &[AnimationKeyFrame<V>]) -> Option<(f32, f32)> {
            keyframes.iter().fold(None, |range, keyframe| match range {
                None => Some((keyframe.time, keyframe.time)),
                Some((min, max)) => Some((min.min(keyframe.time), max.max(keyframe.time))),
            })
        }

        match self {
            AnimationKeyFrames::Linear(vec) | AnimationKeyFrames::Step(vec) => range(vec),
            AnimationKeyFrames::CubicSpline(vec) => range(vec),
        }
    }
}

/// Curves of a single joint. Missing curves leave that component at the
/// joint's rest value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JointTrack {
    pub path: String,
    pub translation: Option<AnimationKeyFrames<[f32; 3]>>,
    pub rotation: Option<AnimationKeyFrames<[f32; 4]>>,
    pub scale: Option<AnimationKeyFrames<[f32; 3]>>,
}

impl JointTrack {
    pub fn time_range(&self) -> Option<(f32, f32)> {
        [
            self.translation.as_ref().and_then(AnimationKeyFrames::time_range),
            self.rotation.as_ref().and_then(AnimationKeyFrames::time_range),
            self.scale.as_ref().and_then(AnimationKeyFrames::time_range),
        ]
        .into_iter()
        .flatten()
        .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)))
    }
}

/// Joint animation clip bound to one skeleton. May cover only a subset of
/// the skeleton's joints.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct JointAnimationAsset {
    pub name: Option<String>,
    pub tracks: Vec<JointTrack>,
}

impl JointAnimationAsset {
    pub fn sort_keyframes(&mut self) {
        for track in &mut self.tracks {
            if let Some(curve) = &mut track.translation {
                curve.sort_by_time();
            }
            if let Some(curve) = &mut track.rotation {
                curve.sort_by_time();
            }
            if let Some(curve) = &mut track.scale {
                curve.sort_by_time();
            }
        }
    }

    /// Union of the sample ranges of every curve in the clip.
    pub fn time_range(&self) -> Option<(f32, f32)> {
        self.tracks
            .iter()
            .filter_map(JointTrack::time_range)
            .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)))
    }
}

pub trait Interpolate {
    fn linear(a: Self, b: Self, t: f32) -> Self;
    /// Hermite spline between `vk` and `vk_1`, with `bk` the out-tangent of
    /// the first key, `ak_1` the in-tangent of the second and `td` the time
    /// between both keys.
    fn cubic_spline(vk: Self, bk: Self, vk_1: Self, ak_1: Self, t: f32, td: f32) -> Self;
}

impl<T> Interpolate for T
where
    T: Mul<f32, Output = T> + Add<T, Output = T>,
{
    fn linear(a: Self, b: Self, t: f32) -> Self {
        a * (1.0 - t) + b * t
    }

    fn cubic_spline(vk: Self, bk: Self, vk_1: Self, ak_1: Self, t: f32, td: f32) -> Self {
        let t3 = t.powi(3);
        let t2 = t.powi(2);
        let first = vk * (2.0 * t3 - 3.0 * t2 + 1.0);
        let second = bk * (td * (t3 - 2.0 * t2 + t));
        let third = vk_1 * (-2.0 * t3 + 3.0 * t2);
        let forth = ak_1 * (td * (t3 - t2));
        first + second + third + forth
    }
}

#[cfg(test)]
mod test {
    use glam::Vec3;

    use super::{AnimationKeyFrame, AnimationKeyFrames, Interpolate, JointAnimationAsset, JointTrack};

    fn keyframes(times: &[f32]) -> AnimationKeyFrames<[f32; 3]> {
        AnimationKeyFrames::Linear(
            times
                .iter()
                .map(|time| AnimationKeyFrame {
                    time: *time,
                    value: [0.0; 3],
                })
                .collect(),
        )
    }

    #[test]
    fn clip_range_is_union_of_curves() {
        let clip = JointAnimationAsset {
            name: None,
            tracks: vec![
                JointTrack {
                    path: "root".to_string(),
                    translation: Some(keyframes(&[0.5, 1.0])),
                    ..Default::default()
                },
                JointTrack {
                    path: "root/arm".to_string(),
                    scale: Some(keyframes(&[0.25, 3.0])),
                    ..Default::default()
                },
                JointTrack {
                    path: "root/leg".to_string(),
                    ..Default::default()
                },
            ],
        };
        assert_eq!(clip.time_range(), Some((0.25, 3.0)));
        assert_eq!(JointAnimationAsset::default().time_range(), None);
    }

    #[test]
    fn cubic_spline_hits_both_keys() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-1.0, 0.0, 5.0);
        let tangent = Vec3::new(4.0, 4.0, 4.0);
        let start = Vec3::cubic_spline(a, tangent, b, tangent, 0.0, 2.0);
        let end = Vec3::cubic_spline(a, tangent, b, tangent, 1.0, 2.0);
        assert!(start.abs_diff_eq(a, 1e-6));
        assert!(end.abs_diff_eq(b, 1e-6));
        let middle = Vec3::linear(a, b, 0.5);
        assert!(middle.abs_diff_eq(Vec3::new(0.0, 1.0, 4.0), 1e-6));
    }
}
