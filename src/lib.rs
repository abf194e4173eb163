#![forbid(unsafe_code)]

pub mod core;
pub mod drivetrain;
pub mod dsl;
pub mod error;
pub mod geom;
pub mod hardware;
pub mod keyframes;
pub mod preview;
pub mod project;
pub mod routine;

pub use crate::core::{CurveType, OrientedPoint, Point, Vec2, Waypoint};
pub use drivetrain::{
    ComplexityTier, DriveTrainDefinition, DriveTrainType, MotorRole, MovementCapabilities,
    default_motor_names, definition, motor_roles,
};
pub use dsl::RoutineBuilder;
pub use error::{FieldlineError, FieldlineResult};
pub use hardware::{HardwareConfig, I2cDevice, Motor, MotorDirection, Servo};
pub use keyframes::{HandoffTiming, KeyframeTrack, TrackPose, build_robot_keyframes};
pub use preview::{PreviewOptions, plan_preview};
pub use project::{ContentFingerprint, MAX_PROJECTS_PER_USER, Project, Timestamp};
pub use routine::{MotionGeometry, NodeId, NodeKind, RoutineEdge, RoutineGraph, RoutineNode};
