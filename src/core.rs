use crate::error::{FieldlineError, FieldlineResult};

pub use kurbo::{Point, Vec2};

/// A sampled path point with the heading implied by the direction of
/// travel at that sample. Heading is in degrees, signed, no fixed range.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrientedPoint {
    pub pos: Point,
    pub heading_deg: f64,
}

impl OrientedPoint {
    pub fn new(pos: Point, heading_deg: f64) -> Self {
        Self { pos, heading_deg }
    }
}

/// An authoring-time target point with an optional heading target.
///
/// Consecutive duplicate waypoints collapse to zero-length segments; the
/// resampler is required to survive them (see [`crate::geom::sample_polyline`]).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Waypoint {
    pub pos: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_deg: Option<f64>,
}

impl Waypoint {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            pos: Point::new(x, y),
            heading_deg: None,
        }
    }

    pub fn with_heading(x: f64, y: f64, heading_deg: f64) -> Self {
        Self {
            pos: Point::new(x, y),
            heading_deg: Some(heading_deg),
        }
    }

    pub fn validate(&self) -> FieldlineResult<()> {
        if !self.pos.x.is_finite() || !self.pos.y.is_finite() {
            return Err(FieldlineError::validation(
                "waypoint coordinates must be finite",
            ));
        }
        if let Some(h) = self.heading_deg
            && !h.is_finite()
        {
            return Err(FieldlineError::validation(
                "waypoint heading must be finite when set",
            ));
        }
        Ok(())
    }
}

/// How a movement node's points are interpreted when projected to a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    /// Points are polyline vertices, followed in order.
    Linear,
    /// Points are Bezier control points.
    Bezier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waypoint_rejects_non_finite_input() {
        assert!(Waypoint::at(f64::NAN, 0.0).validate().is_err());
        assert!(Waypoint::at(0.0, f64::INFINITY).validate().is_err());
        assert!(
            Waypoint::with_heading(0.0, 0.0, f64::NAN)
                .validate()
                .is_err()
        );
        assert!(Waypoint::with_heading(1.0, 2.0, 90.0).validate().is_ok());
    }

    #[test]
    fn waypoint_heading_is_optional_in_json() {
        let wp: Waypoint = serde_json::from_str(r#"{"pos":{"x":1.0,"y":2.0}}"#).unwrap();
        assert_eq!(wp.heading_deg, None);

        let s = serde_json::to_string(&wp).unwrap();
        assert!(!s.contains("heading_deg"));
    }
}
