//! User-configured hardware wiring: motors, servos, I2C devices.
//!
//! The routine graph cross-references devices by name, so names must be
//! unique within their collection. Ports are bounded by the hub: a base
//! hub exposes motor ports 0-3 and servo ports 0-5; an expansion hub is
//! modeled purely as doubled capacity.

use std::collections::BTreeSet;

use crate::{
    drivetrain::{self, DriveTrainType},
    error::{FieldlineError, FieldlineResult},
};

pub const BASE_MOTOR_PORTS: u8 = 4;
pub const BASE_SERVO_PORTS: u8 = 6;

/// Usable 7-bit I2C address range.
pub const I2C_ADDR_MIN: u8 = 0x08;
pub const I2C_ADDR_MAX: u8 = 0x77;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorDirection {
    Forward,
    Reverse,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Motor {
    pub id: String,
    pub name: String,
    pub port: u8,
    pub direction: MotorDirection,
    pub motor_type: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Servo {
    pub id: String,
    pub name: String,
    pub port: u8,
    pub min_position: f64,
    pub max_position: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct I2cDevice {
    pub id: String,
    pub name: String,
    pub device_type: String,
    pub address: u8,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HardwareConfig {
    pub motors: Vec<Motor>,
    pub servos: Vec<Servo>,
    pub i2c_devices: Vec<I2cDevice>,
    #[serde(default)]
    pub expansion_hub: bool,
}

impl HardwareConfig {
    /// Derive a wiring config from the catalog: one motor per role, in
    /// role order on sequential ports, named by the catalog defaults.
    /// Configs needing more than a base hub's motor ports get the
    /// expansion hub.
    pub fn for_drive_train(ty: DriveTrainType) -> Self {
        let roles = drivetrain::motor_roles(ty);
        let motors = roles
            .iter()
            .enumerate()
            .map(|(i, role)| Motor {
                id: format!("motor-{i}"),
                name: role.default_name.to_string(),
                port: i as u8,
                direction: MotorDirection::Forward,
                motor_type: "dc".to_string(),
            })
            .collect();

        Self {
            motors,
            servos: Vec::new(),
            i2c_devices: Vec::new(),
            expansion_hub: roles.len() > BASE_MOTOR_PORTS as usize,
        }
    }

    pub fn motor_port_capacity(&self) -> u8 {
        if self.expansion_hub {
            BASE_MOTOR_PORTS * 2
        } else {
            BASE_MOTOR_PORTS
        }
    }

    pub fn servo_port_capacity(&self) -> u8 {
        if self.expansion_hub {
            BASE_SERVO_PORTS * 2
        } else {
            BASE_SERVO_PORTS
        }
    }

    pub fn motor(&self, name: &str) -> Option<&Motor> {
        self.motors.iter().find(|m| m.name == name)
    }

    pub fn servo(&self, name: &str) -> Option<&Servo> {
        self.servos.iter().find(|s| s.name == name)
    }

    pub fn i2c_device(&self, name: &str) -> Option<&I2cDevice> {
        self.i2c_devices.iter().find(|d| d.name == name)
    }

    pub fn validate(&self) -> FieldlineResult<()> {
        let motor_cap = self.motor_port_capacity();
        let mut motor_ports = BTreeSet::new();
        let mut motor_names = BTreeSet::new();
        for motor in &self.motors {
            if motor.name.trim().is_empty() {
                return Err(FieldlineError::validation(format!(
                    "motor '{}' must have a non-empty name",
                    motor.id
                )));
            }
            if motor.port >= motor_cap {
                return Err(FieldlineError::validation(format!(
                    "motor '{}' port {} exceeds available ports 0-{}",
                    motor.name,
                    motor.port,
                    motor_cap - 1
                )));
            }
            if !motor_ports.insert(motor.port) {
                return Err(FieldlineError::validation(format!(
                    "motor port {} assigned more than once",
                    motor.port
                )));
            }
            if !motor_names.insert(motor.name.as_str()) {
                return Err(FieldlineError::validation(format!(
                    "duplicate motor name '{}'",
                    motor.name
                )));
            }
        }

        let servo_cap = self.servo_port_capacity();
        let mut servo_ports = BTreeSet::new();
        let mut servo_names = BTreeSet::new();
        for servo in &self.servos {
            if servo.name.trim().is_empty() {
                return Err(FieldlineError::validation(format!(
                    "servo '{}' must have a non-empty name",
                    servo.id
                )));
            }
            if servo.port >= servo_cap {
                return Err(FieldlineError::validation(format!(
                    "servo '{}' port {} exceeds available ports 0-{}",
                    servo.name,
                    servo.port,
                    servo_cap - 1
                )));
            }
            if !servo_ports.insert(servo.port) {
                return Err(FieldlineError::validation(format!(
                    "servo port {} assigned more than once",
                    servo.port
                )));
            }
            if !servo_names.insert(servo.name.as_str()) {
                return Err(FieldlineError::validation(format!(
                    "duplicate servo name '{}'",
                    servo.name
                )));
            }
            let range_ok = (0.0..=1.0).contains(&servo.min_position)
                && (0.0..=1.0).contains(&servo.max_position)
                && servo.min_position <= servo.max_position;
            if !range_ok {
                return Err(FieldlineError::validation(format!(
                    "servo '{}' position range [{}, {}] must lie within [0,1]",
                    servo.name, servo.min_position, servo.max_position
                )));
            }
        }

        let mut addresses = BTreeSet::new();
        let mut device_names = BTreeSet::new();
        for device in &self.i2c_devices {
            if device.name.trim().is_empty() {
                return Err(FieldlineError::validation(format!(
                    "i2c device '{}' must have a non-empty name",
                    device.id
                )));
            }
            if !(I2C_ADDR_MIN..=I2C_ADDR_MAX).contains(&device.address) {
                return Err(FieldlineError::validation(format!(
                    "i2c device '{}' address {:#04x} outside usable range {:#04x}-{:#04x}",
                    device.name, device.address, I2C_ADDR_MIN, I2C_ADDR_MAX
                )));
            }
            if !addresses.insert(device.address) {
                return Err(FieldlineError::validation(format!(
                    "i2c address {:#04x} assigned more than once",
                    device.address
                )));
            }
            if !device_names.insert(device.name.as_str()) {
                return Err(FieldlineError::validation(format!(
                    "duplicate i2c device name '{}'",
                    device.name
                )));
            }
        }

        Ok(())
    }
}
