//! Trajectory preview: project a routine graph onto the field and
//! compose the baseline/optimized keyframe track.
//!
//! The baseline is the naive route through the movement nodes'
//! waypoints; the optimized path smooths the same route through a cubic
//! Bezier. Both are resampled evenly by arc length, oriented, and
//! handed to the compositor.

use std::collections::BTreeSet;

use crate::{
    core::Point,
    error::FieldlineResult,
    geom::{self, orient_path},
    keyframes::{HandoffTiming, KeyframeTrack, build_robot_keyframes},
    routine::{MotionGeometry, RoutineGraph},
};

/// How many samples each curve segment contributes when a bezier
/// movement node is flattened into the route.
const CURVE_FLATTEN_SAMPLES: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PreviewOptions {
    pub baseline_samples: usize,
    pub optimized_samples: usize,
    pub timing: HandoffTiming,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            baseline_samples: 46,
            optimized_samples: 35,
            timing: HandoffTiming::default(),
        }
    }
}

/// Build the preview keyframe track for a routine.
///
/// A routine without at least two route points has nothing to animate
/// and yields the all-zero fallback track.
#[tracing::instrument(skip(graph))]
pub fn plan_preview(graph: &RoutineGraph, opts: &PreviewOptions) -> FieldlineResult<KeyframeTrack> {
    graph.validate_structure()?;

    let route = collect_route(graph);
    tracing::debug!(points = route.len(), "collected movement route");
    if route.len() < 2 {
        return Ok(KeyframeTrack::empty_fallback());
    }

    let baseline = orient_path(&geom::sample_polyline(&route, opts.baseline_samples));
    let optimized = orient_path(&optimized_route(&route, opts.optimized_samples));
    let track = build_robot_keyframes(&baseline, &optimized, opts.timing);
    track.validate()?;
    Ok(track)
}

/// Walk the routine from its start node, taking the first outgoing edge
/// at loop/branch forks, and append each movement node's spatial
/// footprint in program order. The visited guard terminates loop
/// cycles.
fn collect_route(graph: &RoutineGraph) -> Vec<Point> {
    let mut route: Vec<Point> = Vec::new();
    let mut visited = BTreeSet::new();
    let mut current = graph.start_node();

    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }
        let Some(node) = graph.node(id) else {
            break;
        };

        match node.kind.motion_geometry() {
            Some(MotionGeometry::Polyline(pts)) => route.extend(pts),
            Some(geometry @ MotionGeometry::Cubic(_)) => {
                route.extend(geometry.sample(CURVE_FLATTEN_SAMPLES));
            }
            None => {}
        }

        current = graph.outgoing(id).next();
    }

    route
}

/// Smooth the route into a single cubic: the interior waypoints'
/// centroid acts as the quadratic control point, promoted to a cubic.
/// Routes with no interior points stay a straight line.
fn optimized_route(route: &[Point], samples: usize) -> Vec<Point> {
    let (Some(&first), Some(&last)) = (route.first(), route.last()) else {
        return Vec::new();
    };

    let interior = &route[1..route.len().saturating_sub(1)];
    if interior.is_empty() {
        return geom::sample_polyline(route, samples);
    }

    let centroid = Point::new(
        interior.iter().map(|p| p.x).sum::<f64>() / interior.len() as f64,
        interior.iter().map(|p| p.y).sum::<f64>() / interior.len() as f64,
    );
    let (q1, q2) = geom::quadratic_to_cubic(first, centroid, last);
    geom::sample_cubic_bezier(first, q1, q2, last, samples)
}
