//! Static catalog of drivetrain archetypes.
//!
//! The registry is immutable process-wide data: definitions live in
//! `&'static` tables and only read accessors are exposed. Typed lookups
//! are total; the only fallible surface is parsing an id string at the
//! boundary, which signals an integration defect rather than a user
//! error.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{FieldlineError, FieldlineResult};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DriveTrainType {
    TankDrive,
    OmniDrive,
    MecanumDrive,
    XDrive,
    HDrive,
    SwerveDrive,
}

impl DriveTrainType {
    pub const ALL: [DriveTrainType; 6] = [
        Self::TankDrive,
        Self::OmniDrive,
        Self::MecanumDrive,
        Self::XDrive,
        Self::HDrive,
        Self::SwerveDrive,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::TankDrive => "tank-drive",
            Self::OmniDrive => "omni-drive",
            Self::MecanumDrive => "mecanum-drive",
            Self::XDrive => "x-drive",
            Self::HDrive => "h-drive",
            Self::SwerveDrive => "swerve-drive",
        }
    }
}

impl fmt::Display for DriveTrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DriveTrainType {
    type Err = FieldlineError;

    fn from_str(s: &str) -> FieldlineResult<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.id() == s)
            .ok_or_else(|| FieldlineError::catalog(format!("unknown drivetrain id '{s}'")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct MotorRole {
    /// Position code on the chassis (e.g. `front_left`).
    pub position: &'static str,
    pub default_name: &'static str,
    pub required: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct MovementCapabilities {
    pub forward: bool,
    pub backward: bool,
    pub strafe: bool,
    pub rotate: bool,
    pub diagonal: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct DriveTrainDefinition {
    pub id: DriveTrainType,
    pub motor_count: usize,
    /// Ordered roles; invariant `motors.len() == motor_count`.
    pub motors: &'static [MotorRole],
    pub capabilities: MovementCapabilities,
    pub complexity: ComplexityTier,
}

const fn role(position: &'static str, default_name: &'static str) -> MotorRole {
    MotorRole {
        position,
        default_name,
        required: true,
    }
}

static TANK: DriveTrainDefinition = DriveTrainDefinition {
    id: DriveTrainType::TankDrive,
    motor_count: 2,
    motors: &[
        role("left", "left_drive"),
        role("right", "right_drive"),
    ],
    capabilities: MovementCapabilities {
        forward: true,
        backward: true,
        strafe: false,
        rotate: true,
        diagonal: false,
    },
    complexity: ComplexityTier::Beginner,
};

static OMNI: DriveTrainDefinition = DriveTrainDefinition {
    id: DriveTrainType::OmniDrive,
    motor_count: 4,
    motors: &[
        role("front_left", "front_left_drive"),
        role("front_right", "front_right_drive"),
        role("back_left", "back_left_drive"),
        role("back_right", "back_right_drive"),
    ],
    capabilities: MovementCapabilities {
        forward: true,
        backward: true,
        strafe: true,
        rotate: true,
        diagonal: true,
    },
    complexity: ComplexityTier::Intermediate,
};

static MECANUM: DriveTrainDefinition = DriveTrainDefinition {
    id: DriveTrainType::MecanumDrive,
    motor_count: 4,
    motors: &[
        role("front_left", "front_left_drive"),
        role("front_right", "front_right_drive"),
        role("back_left", "back_left_drive"),
        role("back_right", "back_right_drive"),
    ],
    capabilities: MovementCapabilities {
        forward: true,
        backward: true,
        strafe: true,
        rotate: true,
        diagonal: true,
    },
    complexity: ComplexityTier::Intermediate,
};

static X_DRIVE: DriveTrainDefinition = DriveTrainDefinition {
    id: DriveTrainType::XDrive,
    motor_count: 4,
    motors: &[
        role("front_left", "front_left_drive"),
        role("front_right", "front_right_drive"),
        role("back_left", "back_left_drive"),
        role("back_right", "back_right_drive"),
    ],
    capabilities: MovementCapabilities {
        forward: true,
        backward: true,
        strafe: true,
        rotate: true,
        diagonal: true,
    },
    complexity: ComplexityTier::Intermediate,
};

static H_DRIVE: DriveTrainDefinition = DriveTrainDefinition {
    id: DriveTrainType::HDrive,
    motor_count: 3,
    motors: &[
        role("left", "left_drive"),
        role("right", "right_drive"),
        role("center", "center_drive"),
    ],
    capabilities: MovementCapabilities {
        forward: true,
        backward: true,
        strafe: true,
        rotate: true,
        diagonal: false,
    },
    complexity: ComplexityTier::Intermediate,
};

static SWERVE: DriveTrainDefinition = DriveTrainDefinition {
    id: DriveTrainType::SwerveDrive,
    motor_count: 8,
    motors: &[
        role("front_left", "front_left_drive"),
        role("front_right", "front_right_drive"),
        role("back_left", "back_left_drive"),
        role("back_right", "back_right_drive"),
        role("front_left", "front_left_steer"),
        role("front_right", "front_right_steer"),
        role("back_left", "back_left_steer"),
        role("back_right", "back_right_steer"),
    ],
    capabilities: MovementCapabilities {
        forward: true,
        backward: true,
        strafe: true,
        rotate: true,
        diagonal: true,
    },
    complexity: ComplexityTier::Advanced,
};

pub fn definition(ty: DriveTrainType) -> &'static DriveTrainDefinition {
    match ty {
        DriveTrainType::TankDrive => &TANK,
        DriveTrainType::OmniDrive => &OMNI,
        DriveTrainType::MecanumDrive => &MECANUM,
        DriveTrainType::XDrive => &X_DRIVE,
        DriveTrainType::HDrive => &H_DRIVE,
        DriveTrainType::SwerveDrive => &SWERVE,
    }
}

pub fn motor_roles(ty: DriveTrainType) -> &'static [MotorRole] {
    definition(ty).motors
}

/// Default hardware name per role key.
///
/// Roles past the 4th get a `_steer` key suffix so swerve's drive/steer
/// pairs sharing a position code stay distinguishable. The suffix is a
/// naming convenience only.
pub fn default_motor_names(ty: DriveTrainType) -> BTreeMap<String, String> {
    let mut names = BTreeMap::new();
    for (i, role) in motor_roles(ty).iter().enumerate() {
        let key = if i >= 4 {
            format!("{}_steer", role.position)
        } else {
            role.position.to_string()
        };
        names.insert(key, role.default_name.to_string());
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_lists_match_declared_counts() {
        for ty in DriveTrainType::ALL {
            let def = definition(ty);
            assert_eq!(def.motors.len(), def.motor_count, "{ty}");
            assert_eq!(def.id, ty);
        }
    }

    #[test]
    fn swerve_has_eight_roles_and_steer_names() {
        assert_eq!(motor_roles(DriveTrainType::SwerveDrive).len(), 8);

        let names = default_motor_names(DriveTrainType::SwerveDrive);
        assert_eq!(names.len(), 8);
        assert_eq!(names["front_left"], "front_left_drive");
        assert_eq!(names["front_left_steer"], "front_left_steer");
    }

    #[test]
    fn tank_has_exactly_two_default_names() {
        let names = default_motor_names(DriveTrainType::TankDrive);
        assert_eq!(names.len(), 2);
        assert_eq!(names["left"], "left_drive");
        assert_eq!(names["right"], "right_drive");
    }

    #[test]
    fn id_round_trips_through_from_str() {
        for ty in DriveTrainType::ALL {
            assert_eq!(ty.id().parse::<DriveTrainType>().unwrap(), ty);
        }
        assert!("hover-drive".parse::<DriveTrainType>().is_err());
    }

    #[test]
    fn serde_ids_match_catalog_ids() {
        for ty in DriveTrainType::ALL {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.id()));
        }
    }

    #[test]
    fn tank_cannot_strafe_but_swerve_can() {
        assert!(!definition(DriveTrainType::TankDrive).capabilities.strafe);
        assert!(definition(DriveTrainType::SwerveDrive).capabilities.strafe);
        assert!(!definition(DriveTrainType::HDrive).capabilities.diagonal);
    }
}
