//! Composition of raw motion segments into one normalized-time keyframe
//! track.
//!
//! The track carries four parallel channels (x, y, heading, opacity)
//! plus the time array, ready for an external animation host or a
//! motion-accuracy estimate. The baseline and optimized segments are
//! joined by a deliberate fade-out/teleport/fade-in hand-off rather than
//! a continuous glide between unrelated paths.

use crate::{
    core::{OrientedPoint, Point},
    error::{FieldlineError, FieldlineResult},
    geom::{lerp, shortest_rotation},
};

/// Normalized-time placement of the baseline segment, the hand-off pause
/// and the optimized segment's reveal.
///
/// `new` rejects anything outside
/// `0 <= baseline_fraction <= handoff_pause <= reveal_start <= 1`, which
/// is exactly the precondition for the output timeline to stay
/// non-decreasing.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HandoffTiming {
    pub baseline_fraction: f64,
    pub reveal_start: f64,
    pub handoff_pause: f64,
}

impl HandoffTiming {
    pub fn new(
        baseline_fraction: f64,
        reveal_start: f64,
        handoff_pause: f64,
    ) -> FieldlineResult<Self> {
        let timing = Self {
            baseline_fraction,
            reveal_start,
            handoff_pause,
        };
        timing.validate()?;
        Ok(timing)
    }

    pub fn validate(&self) -> FieldlineResult<()> {
        for (name, v) in [
            ("baseline_fraction", self.baseline_fraction),
            ("reveal_start", self.reveal_start),
            ("handoff_pause", self.handoff_pause),
        ] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(FieldlineError::validation(format!(
                    "timing {name} must be within [0,1], got {v}"
                )));
            }
        }
        if self.baseline_fraction > self.handoff_pause {
            return Err(FieldlineError::validation(
                "timing baseline_fraction must be <= handoff_pause",
            ));
        }
        if self.handoff_pause > self.reveal_start {
            return Err(FieldlineError::validation(
                "timing handoff_pause must be <= reveal_start",
            ));
        }
        Ok(())
    }
}

impl Default for HandoffTiming {
    fn default() -> Self {
        Self {
            baseline_fraction: 0.58,
            reveal_start: 0.64,
            handoff_pause: 0.6,
        }
    }
}

/// A time-indexed robot motion track with four parallel channels.
///
/// All arrays have equal length and `times` is non-decreasing in [0,1].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyframeTrack {
    pub times: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub heading_deg: Vec<f64>,
    pub opacity: Vec<f64>,
}

/// One evaluated sample of a [`KeyframeTrack`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackPose {
    pub pos: Point,
    pub heading_deg: f64,
    pub opacity: f64,
}

impl KeyframeTrack {
    /// The "nothing to animate" fallback: two all-zero keyframes at
    /// times 0 and 1. Callers treat this as an empty preview, not an
    /// error.
    pub fn empty_fallback() -> Self {
        Self {
            times: vec![0.0, 1.0],
            x: vec![0.0; 2],
            y: vec![0.0; 2],
            heading_deg: vec![0.0; 2],
            opacity: vec![0.0; 2],
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn validate(&self) -> FieldlineResult<()> {
        let n = self.times.len();
        if n < 2 {
            return Err(FieldlineError::validation(
                "keyframe track must have at least two keyframes",
            ));
        }
        if [&self.x, &self.y, &self.heading_deg, &self.opacity]
            .iter()
            .any(|c| c.len() != n)
        {
            return Err(FieldlineError::validation(
                "keyframe track channels must have equal lengths",
            ));
        }
        if !self.times.windows(2).all(|w| w[0] <= w[1]) {
            return Err(FieldlineError::validation(
                "keyframe track times must be non-decreasing",
            ));
        }
        Ok(())
    }

    /// Evaluate the track at a normalized time.
    ///
    /// Position and opacity interpolate linearly between the surrounding
    /// keyframes; heading interpolates along the shorter rotational
    /// direction. Times outside the track clamp to the end keyframes.
    pub fn pose_at(&self, t: f64) -> Option<TrackPose> {
        if self.is_empty() {
            return None;
        }

        let idx = self.times.partition_point(|&k| k <= t);
        if idx == 0 {
            return Some(self.pose_index(0));
        }
        if idx >= self.len() {
            return Some(self.pose_index(self.len() - 1));
        }

        let (a, b) = (idx - 1, idx);
        let denom = self.times[b] - self.times[a];
        if denom <= 0.0 {
            return Some(self.pose_index(a));
        }

        let f = (t - self.times[a]) / denom;
        Some(TrackPose {
            pos: Point::new(
                lerp(self.x[a], self.x[b], f),
                lerp(self.y[a], self.y[b], f),
            ),
            heading_deg: shortest_rotation(self.heading_deg[a], self.heading_deg[b], f),
            opacity: lerp(self.opacity[a], self.opacity[b], f),
        })
    }

    fn pose_index(&self, i: usize) -> TrackPose {
        TrackPose {
            pos: Point::new(self.x[i], self.y[i]),
            heading_deg: self.heading_deg[i],
            opacity: self.opacity[i],
        }
    }

    fn push(&mut self, time: f64, pose: &OrientedPoint, opacity: f64) {
        self.times.push(time);
        self.x.push(pose.pos.x);
        self.y.push(pose.pos.y);
        self.heading_deg.push(pose.heading_deg);
        self.opacity.push(opacity);
    }
}

/// Merge a baseline and an optimized oriented path into one keyframe
/// track with a fade-out/teleport/fade-in hand-off between them.
///
/// Baseline samples spread evenly over `[0, baseline_fraction]` at
/// opacity 1. Two synthetic keyframes bridge the segments: the
/// baseline's final pose held at `handoff_pause` and the optimized
/// segment's first pose at `reveal_start`, both at opacity 0. The
/// remaining optimized samples spread evenly up to time 1 at opacity 1;
/// the optimized first sample is consumed by the hand-off pair, not
/// duplicated. Either sequence empty yields the all-zero fallback track.
pub fn build_robot_keyframes(
    baseline: &[OrientedPoint],
    optimized: &[OrientedPoint],
    timing: HandoffTiming,
) -> KeyframeTrack {
    let (Some(baseline_last), Some(optimized_first)) = (baseline.last(), optimized.first()) else {
        return KeyframeTrack::empty_fallback();
    };

    let mut track = KeyframeTrack::default();

    let baseline_denom = baseline.len().saturating_sub(1).max(1) as f64;
    for (i, pose) in baseline.iter().enumerate() {
        let t = timing.baseline_fraction * (i as f64 / baseline_denom);
        track.push(t, pose, 1.0);
    }

    track.push(timing.handoff_pause, baseline_last, 0.0);
    track.push(timing.reveal_start, optimized_first, 0.0);

    let optimized_denom = optimized.len().saturating_sub(1).max(1) as f64;
    for (i, pose) in optimized.iter().enumerate().skip(1) {
        let t = lerp(timing.reveal_start, 1.0, i as f64 / optimized_denom);
        track.push(t, pose, 1.0);
    }

    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::orient_path;

    fn oriented(points: &[(f64, f64)]) -> Vec<OrientedPoint> {
        let pts: Vec<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
        orient_path(&pts)
    }

    #[test]
    fn timing_rejects_out_of_order_marks() {
        assert!(HandoffTiming::new(0.58, 0.64, 0.6).is_ok());
        // Pause after reveal would make the timeline non-monotonic.
        assert!(HandoffTiming::new(0.58, 0.64, 0.7).is_err());
        // Baseline running past the pause, likewise.
        assert!(HandoffTiming::new(0.65, 0.64, 0.6).is_err());
        assert!(HandoffTiming::new(-0.1, 0.64, 0.6).is_err());
        assert!(HandoffTiming::new(0.58, 1.2, 0.6).is_err());
        assert!(HandoffTiming::new(f64::NAN, 0.64, 0.6).is_err());
    }

    #[test]
    fn empty_segment_yields_all_zero_fallback() {
        let some = oriented(&[(0.0, 0.0), (10.0, 0.0)]);
        for track in [
            build_robot_keyframes(&[], &some, HandoffTiming::default()),
            build_robot_keyframes(&some, &[], HandoffTiming::default()),
            build_robot_keyframes(&[], &[], HandoffTiming::default()),
        ] {
            assert_eq!(track.times, vec![0.0, 1.0]);
            assert_eq!(track.x, vec![0.0, 0.0]);
            assert_eq!(track.y, vec![0.0, 0.0]);
            assert_eq!(track.heading_deg, vec![0.0, 0.0]);
            assert_eq!(track.opacity, vec![0.0, 0.0]);
            track.validate().unwrap();
        }
    }

    #[test]
    fn handoff_pair_holds_poses_at_zero_opacity() {
        let baseline = oriented(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let optimized = oriented(&[(50.0, 50.0), (60.0, 50.0), (70.0, 50.0)]);
        let timing = HandoffTiming::default();
        let track = build_robot_keyframes(&baseline, &optimized, timing);

        // 3 baseline + 2 hand-off + 2 optimized-after-first.
        assert_eq!(track.len(), 7);
        assert_eq!(track.opacity, vec![1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0]);

        // Hand-off keyframe 1: baseline final pose at the pause mark.
        assert_eq!(track.times[3], timing.handoff_pause);
        assert_eq!(track.x[3], 20.0);
        // Hand-off keyframe 2: optimized first pose at the reveal mark.
        assert_eq!(track.times[4], timing.reveal_start);
        assert_eq!(track.x[4], 50.0);
        assert_eq!(track.y[4], 50.0);

        assert_eq!(track.times[0], 0.0);
        assert_eq!(*track.times.last().unwrap(), 1.0);
        track.validate().unwrap();
    }

    #[test]
    fn times_are_non_decreasing_for_valid_timing() {
        let baseline = oriented(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (10.0, 5.0)]);
        let optimized = oriented(&[(0.0, 0.0), (4.0, 4.0), (10.0, 5.0)]);
        let track = build_robot_keyframes(
            &baseline,
            &optimized,
            HandoffTiming::new(0.5, 0.5, 0.5).unwrap(),
        );
        assert!(track.times.windows(2).all(|w| w[0] <= w[1]));
        track.validate().unwrap();
    }

    #[test]
    fn single_point_segments_do_not_divide_by_zero() {
        let one = oriented(&[(3.0, 4.0)]);
        let track = build_robot_keyframes(&one, &one, HandoffTiming::default());
        // 1 baseline + 2 hand-off; the lone optimized sample is consumed.
        assert_eq!(track.len(), 3);
        assert_eq!(track.times[0], 0.0);
        track.validate().unwrap();
    }

    #[test]
    fn pose_at_interpolates_heading_the_short_way() {
        let track = KeyframeTrack {
            times: vec![0.0, 1.0],
            x: vec![0.0, 10.0],
            y: vec![0.0, 0.0],
            heading_deg: vec![350.0, 10.0],
            opacity: vec![1.0, 1.0],
        };
        let mid = track.pose_at(0.5).unwrap();
        assert!(mid.heading_deg.abs() < 1e-9);
        assert!((mid.pos.x - 5.0).abs() < 1e-9);

        // Outside the track clamps to the end keyframes.
        assert_eq!(track.pose_at(-1.0).unwrap().pos.x, 0.0);
        assert_eq!(track.pose_at(2.0).unwrap().pos.x, 10.0);
    }

    #[test]
    fn validate_rejects_ragged_or_unsorted_tracks() {
        let mut track = KeyframeTrack::empty_fallback();
        track.x.pop();
        assert!(track.validate().is_err());

        let track = KeyframeTrack {
            times: vec![0.5, 0.2],
            x: vec![0.0; 2],
            y: vec![0.0; 2],
            heading_deg: vec![0.0; 2],
            opacity: vec![0.0; 2],
        };
        assert!(track.validate().is_err());
    }
}
