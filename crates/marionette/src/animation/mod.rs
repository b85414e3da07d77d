use std::time::Duration;

use log::warn;
use marionette_asset::animation::{JointAnimationAsset, JointTrack};

pub use sampler::JointSample;

pub mod sampler;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Wrap back to the beginning after the end.
    #[default]
    Repeat,
    /// Play forward, then backward.
    PingPong,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnimationState {
    #[default]
    Stopped,
    /// Playing since the contained timestamp.
    Playing(Duration),
}

/// Joint animation clip of one skeleton with its playback state.
#[derive(Debug, Clone)]
pub struct NodeAnimation {
    name: Option<String>,
    tracks: Vec<JointTrack>,
    begin_time: f32,
    end_time: f32,
    mode: PlaybackMode,
    state: AnimationState,
}

impl NodeAnimation {
    pub fn new(asset: JointAnimationAsset) -> Self {
        let (begin_time, end_time) = asset.time_range().unwrap_or_else(|| {
            warn!(
                "Animation {} has no keyframes",
                asset.name.as_deref().unwrap_or("<unnamed>")
            );
            (0.0, 0.0)
        });
        Self {
            name: asset.name,
            tracks: asset.tracks,
            begin_time,
            end_time,
            mode: PlaybackMode::default(),
            state: AnimationState::Stopped,
        }
    }

    pub fn with_mode(mut self, mode: PlaybackMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tracks(&self) -> &[JointTrack] {
        &self.tracks
    }

    pub fn begin_time(&self) -> f32 {
        self.begin_time
    }

    pub fn end_time(&self) -> f32 {
        self.end_time
    }

    pub fn duration(&self) -> f32 {
        self.end_time - self.begin_time
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, AnimationState::Playing(_))
    }

    /// Start playing, anchored at `now`. Restarts a playing animation.
    pub fn mark_start(&mut self, now: Duration) {
        self.state = AnimationState::Playing(now);
    }

    pub fn mark_stop(&mut self) {
        self.state = AnimationState::Stopped;
    }

    /// Map time elapsed since start into `[0, duration]`.
    pub fn looped_time(&self, elapsed: Duration) -> f32 {
        let duration = self.duration().max(0.0);
        let Ok(length) = Duration::try_from_secs_f32(duration) else {
            return self.looped_time_f64(elapsed, duration as f64);
        };
        let length = length.as_nanos();
        if length == 0 {
            return 0.0;
        }
        let elapsed = elapsed.as_nanos();
        let time = match self.mode {
            PlaybackMode::Repeat => elapsed % length,
            PlaybackMode::PingPong => {
                let progress = elapsed % (2 * length);
                if progress > length {
                    2 * length - progress
                } else {
                    progress
                }
            }
        };
        Duration::from_nanos(time as u64).as_secs_f32()
    }

    // clips too long for `Duration`
    fn looped_time_f64(&self, elapsed: Duration, duration: f64) -> f32 {
        if !duration.is_finite() {
            return elapsed.as_secs_f64() as f32;
        }
        let elapsed = elapsed.as_secs_f64();
        let time = match self.mode {
            PlaybackMode::Repeat => elapsed.rem_euclid(duration),
            PlaybackMode::PingPong => {
                let progress = elapsed.rem_euclid(2.0 * duration);
                if progress > duration {
                    2.0 * duration - progress
                } else {
                    progress
                }
            }
        };
        time as f32
    }

    /// Curve time to sample at `now`, `None` when stopped.
    pub fn query_time(&self, now: Duration) -> Option<f32> {
        match self.state {
            AnimationState::Stopped => None,
            AnimationState::Playing(start_time) => {
                let elapsed = now.saturating_sub(start_time);
                Some(self.begin_time + self.looped_time(elapsed))
            }
        }
    }

    pub fn sample_track(&self, track: &JointTrack, time: f32) -> JointSample {
        JointSample::sample(track, time)
    }

    /// Sample every track at curve time `time`.
    pub fn sample(&self, time: f32) -> Vec<(&str, JointSample)> {
        self.tracks
            .iter()
            .map(|track| (track.path.as_str(), self.sample_track(track, time)))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use marionette_asset::animation::{
        AnimationKeyFrame, AnimationKeyFrames, JointAnimationAsset, JointTrack,
    };

    use super::{AnimationState, NodeAnimation, PlaybackMode};

    fn clip(begin: f32, end: f32) -> NodeAnimation {
        NodeAnimation::new(JointAnimationAsset {
            name: Some("wave".to_string()),
            tracks: vec![JointTrack {
                path: "root".to_string(),
                translation: Some(AnimationKeyFrames::Linear(vec![
                    AnimationKeyFrame {
                        time: begin,
                        value: [0.0, 0.0, 0.0],
                    },
                    AnimationKeyFrame {
                        time: end,
                        value: [4.0, 0.0, 0.0],
                    },
                ])),
                ..Default::default()
            }],
        })
    }

    #[test]
    fn test_state_machine() {
        let mut animation = clip(0.0, 2.0);
        assert_eq!(*animation.state(), AnimationState::Stopped);
        assert_eq!(animation.query_time(Duration::from_secs(3)), None);

        animation.mark_start(Duration::from_secs(10));
        assert!(animation.is_playing());
        assert_eq!(animation.query_time(Duration::from_millis(10_500)), Some(0.5));

        animation.mark_stop();
        assert!(!animation.is_playing());
        assert_eq!(animation.query_time(Duration::from_secs(11)), None);
    }

    #[test]
    fn test_repeat_wraps() {
        let mut animation = clip(0.0, 2.0);
        animation.mark_start(Duration::ZERO);
        for millis in [0, 250, 500, 1750] {
            let time = Duration::from_millis(millis);
            let wrapped = time + Duration::from_secs(2);
            assert_eq!(animation.query_time(time), animation.query_time(wrapped));
            let first = animation.query_time(time).unwrap();
            let second = animation.query_time(wrapped).unwrap();
            assert_eq!(animation.sample(first), animation.sample(second));
        }
        assert_eq!(animation.query_time(Duration::from_millis(4_500)), Some(0.5));
    }

    #[test]
    fn test_query_uses_absolute_curve_time() {
        let mut animation = clip(1.0, 3.0);
        assert_eq!(animation.begin_time(), 1.0);
        assert_eq!(animation.duration(), 2.0);
        animation.mark_start(Duration::ZERO);
        // first key plays at the start of playback
        let time = animation.query_time(Duration::ZERO).unwrap();
        assert_eq!(time, 1.0);
        let (path, sample) = animation.sample(time)[0];
        assert_eq!(path, "root");
        assert_eq!(sample.translation, Some(glam::Vec3::ZERO));

        let time = animation.query_time(Duration::from_secs(1)).unwrap();
        assert_eq!(animation.sample(time)[0].1.translation, Some(glam::Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_ping_pong() {
        let mut animation = clip(0.0, 2.0).with_mode(PlaybackMode::PingPong);
        animation.mark_start(Duration::ZERO);
        assert_eq!(animation.query_time(Duration::from_millis(500)), Some(0.5));
        assert_eq!(animation.query_time(Duration::from_millis(2_500)), Some(1.5));
        assert_eq!(animation.query_time(Duration::from_millis(4_500)), Some(0.5));
    }

    #[test]
    fn test_clip_longer_than_duration_range() {
        let mut animation = clip(0.0, 1.0e20);
        animation.mark_start(Duration::ZERO);
        assert_eq!(animation.query_time(Duration::from_secs(1)), Some(1.0));

        animation.set_mode(PlaybackMode::PingPong);
        assert_eq!(animation.query_time(Duration::from_millis(1_500)), Some(1.5));
    }

    #[test]
    fn test_empty_clip() {
        let mut animation = NodeAnimation::new(JointAnimationAsset::default());
        animation.mark_start(Duration::ZERO);
        assert_eq!(animation.duration(), 0.0);
        assert_eq!(animation.query_time(Duration::from_secs(5)), Some(0.0));
    }
}
