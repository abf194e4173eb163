//! Pure path/curve math over field-relative coordinates.
//!
//! Everything here is total over finite numeric input: degenerate
//! geometry (single points, zero-length paths) falls back to a
//! well-defined output instead of erroring.

use crate::core::{OrientedPoint, Point};

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Component-wise [`lerp`]. `t` outside [0,1] extrapolates; callers rely
/// on that.
pub fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    Point::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// De Casteljau evaluation of an arbitrary-degree Bezier at `t`.
///
/// `t` is expected in [0,1] but is not clamped. A single control point is
/// returned unchanged; an empty slice yields the origin.
pub fn curve_point(t: f64, control_points: &[Point]) -> Point {
    let Some(&first) = control_points.first() else {
        return Point::ZERO;
    };
    if control_points.len() == 1 {
        return first;
    }

    let mut scratch = control_points.to_vec();
    let mut n = scratch.len();
    while n > 1 {
        for i in 0..n - 1 {
            scratch[i] = lerp_point(scratch[i], scratch[i + 1], t);
        }
        n -= 1;
    }
    scratch[0]
}

/// Evaluate the cubic Bernstein form at `samples` evenly spaced `t`
/// values. `samples` is floored to 2; the first output is exactly `p0`
/// and the last exactly `p3`.
pub fn sample_cubic_bezier(p0: Point, p1: Point, p2: Point, p3: Point, samples: usize) -> Vec<Point> {
    let samples = samples.max(2);
    let mut out = Vec::with_capacity(samples);
    for i in 0..samples {
        let t = i as f64 / (samples - 1) as f64;
        let mt = 1.0 - t;
        let w0 = mt * mt * mt;
        let w1 = 3.0 * mt * mt * t;
        let w2 = 3.0 * mt * t * t;
        let w3 = t * t * t;
        out.push(Point::new(
            w0 * p0.x + w1 * p1.x + w2 * p2.x + w3 * p3.x,
            w0 * p0.y + w1 * p1.y + w2 * p2.y + w3 * p3.y,
        ));
    }
    out
}

/// Resample a polyline into exactly `samples` points spaced evenly by arc
/// length, not by input vertex index.
///
/// Segment lengths are precomputed and the cumulative distance targets
/// are walked once. Degenerate input (fewer than two points, or total
/// length zero) yields `samples` copies of the sole/first point.
pub fn sample_polyline(points: &[Point], samples: usize) -> Vec<Point> {
    let samples = samples.max(2);
    let Some(&first) = points.first() else {
        return vec![Point::ZERO; samples];
    };
    if points.len() < 2 {
        return vec![first; samples];
    }

    let seg_lens: Vec<f64> = points.windows(2).map(|w| distance(w[0], w[1])).collect();
    let total: f64 = seg_lens.iter().sum();
    if total <= 0.0 {
        return vec![first; samples];
    }

    let step = total / (samples - 1) as f64;
    let mut out = Vec::with_capacity(samples);
    let mut seg = 0usize;
    let mut consumed = 0.0; // arc length before `seg`
    for i in 0..samples {
        let target = step * i as f64;
        while seg < seg_lens.len() - 1 && consumed + seg_lens[seg] < target {
            consumed += seg_lens[seg];
            seg += 1;
        }
        let len = seg_lens[seg];
        let t = if len > 0.0 {
            ((target - consumed) / len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(lerp_point(points[seg], points[seg + 1], t));
    }
    out
}

/// Control points `(Q1, Q2)` of the cubic Bezier that coincides exactly
/// with the quadratic Bezier `P0, P1, P2`.
pub fn quadratic_to_cubic(p0: Point, p1: Point, p2: Point) -> (Point, Point) {
    const TWO_THIRDS: f64 = 2.0 / 3.0;
    (
        lerp_point(p0, p1, TWO_THIRDS),
        lerp_point(p2, p1, TWO_THIRDS),
    )
}

/// Normalize any real angle into (-180, 180] degrees. Idempotent.
pub fn normalize_angle_deg(angle_deg: f64) -> f64 {
    let mut a = angle_deg % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Interpolate between two headings along the shorter rotational
/// direction.
///
/// Both angles are normalized to [0,360), the signed difference is
/// wrapped into (-180,180] to pick the short way around, then lerped by
/// `fraction`. This is the only sanctioned way to interpolate headings;
/// lerping raw angles goes the long way around across the 0/360 boundary.
pub fn shortest_rotation(start_deg: f64, end_deg: f64, fraction: f64) -> f64 {
    let start = start_deg.rem_euclid(360.0);
    let end = end_deg.rem_euclid(360.0);
    let mut delta = end - start;
    if delta <= -180.0 {
        delta += 360.0;
    } else if delta > 180.0 {
        delta -= 360.0;
    }
    normalize_angle_deg(start + delta * fraction)
}

/// Derive a heading at each sample from the direction between its
/// (clamped) previous and next neighbors.
///
/// The first and last samples use themselves as their own missing
/// neighbor. A single point gets heading 0.
pub fn orient_path(points: &[Point]) -> Vec<OrientedPoint> {
    let n = points.len();
    let mut out = Vec::with_capacity(n);
    for (i, &p) in points.iter().enumerate() {
        let prev = points[i.saturating_sub(1)];
        let next = points[(i + 1).min(n - 1)];
        let heading = (next.y - prev.y).atan2(next.x - prev.x).to_degrees();
        out.push(OrientedPoint::new(p, heading));
    }
    out
}
