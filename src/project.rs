//! The project envelope exchanged with the external project store.
//!
//! The store owns persistence, ownership and the per-account cap; this
//! crate owns the payload: a serialization of the routine graph and
//! hardware config that round-trips losslessly, plus a cheap
//! fingerprint the store can use for change detection. Field names are
//! camelCase on the wire to match the store's schema.

use crate::{
    drivetrain::DriveTrainType,
    error::{FieldlineError, FieldlineResult},
    hardware::HardwareConfig,
    routine::RoutineGraph,
};

/// Enforced by the project store, documented here for callers sizing
/// UI affordances.
pub const MAX_PROJECTS_PER_USER: usize = 3;

/// Epoch milliseconds, UTC.
pub type Timestamp = i64;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub user_id: String,
    /// Opaque store key; never interpreted here.
    pub project_hash: String,
    pub name: String,
    pub template_type: DriveTrainType,
    pub motor_config: HardwareConfig,
    pub workflow_data: RoutineGraph,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn validate(&self) -> FieldlineResult<()> {
        if self.name.trim().is_empty() {
            return Err(FieldlineError::validation("project name must be non-empty"));
        }
        if self.updated_at < self.created_at {
            return Err(FieldlineError::validation(
                "project updated_at must be >= created_at",
            ));
        }
        self.motor_config.validate()?;
        self.workflow_data.validate(&self.motor_config)
    }

    pub fn from_json(s: &str) -> FieldlineResult<Self> {
        serde_json::from_str(s).map_err(|e| FieldlineError::serde(e.to_string()))
    }

    pub fn to_json(&self) -> FieldlineResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| FieldlineError::serde(e.to_string()))
    }

    /// Fingerprint of the editable payload (routine + wiring). Stable
    /// across runs for the same content; envelope metadata does not
    /// participate.
    pub fn fingerprint(&self) -> FieldlineResult<ContentFingerprint> {
        let workflow = serde_json::to_value(&self.workflow_data)
            .map_err(|e| FieldlineError::serde(e.to_string()))?;
        let wiring = serde_json::to_value(&self.motor_config)
            .map_err(|e| FieldlineError::serde(e.to_string()))?;

        let mut a = Fnv1a64::new(0xcbf29ce484222325);
        let mut b = Fnv1a64::new(0x9ae16a3b2f90404f);
        write_json_value_pair(&mut a, &mut b, &workflow);
        write_json_value_pair(&mut a, &mut b, &wiring);
        Ok(ContentFingerprint {
            hi: a.finish(),
            lo: b.finish(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentFingerprint {
    pub hi: u64,
    pub lo: u64,
}

fn write_json_value_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: &serde_json::Value) {
    match v {
        serde_json::Value::Null => write_u8_pair(a, b, 0),
        serde_json::Value::Bool(x) => {
            write_u8_pair(a, b, 1);
            write_u8_pair(a, b, u8::from(*x));
        }
        serde_json::Value::Number(n) => {
            write_u8_pair(a, b, 2);
            write_str_pair(a, b, &n.to_string());
        }
        serde_json::Value::String(s) => {
            write_u8_pair(a, b, 3);
            write_str_pair(a, b, s);
        }
        serde_json::Value::Array(items) => {
            write_u8_pair(a, b, 4);
            write_u64_pair(a, b, items.len() as u64);
            for item in items {
                write_json_value_pair(a, b, item);
            }
        }
        serde_json::Value::Object(map) => {
            write_u8_pair(a, b, 5);
            let mut keys = map.keys().cloned().collect::<Vec<_>>();
            keys.sort();
            write_u64_pair(a, b, keys.len() as u64);
            for k in keys {
                write_str_pair(a, b, &k);
                write_json_value_pair(a, b, &map[&k]);
            }
        }
    }
}

fn write_u8_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u8) {
    a.write_u8(v);
    b.write_u8(v);
}

fn write_u64_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u64) {
    a.write_u64(v);
    b.write_u64(v);
}

fn write_str_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, s: &str) {
    write_u64_pair(a, b, s.len() as u64);
    a.write_bytes(s.as_bytes());
    b.write_bytes(s.as_bytes());
}

#[derive(Clone, Copy)]
struct Fnv1a64(u64);

impl Fnv1a64 {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        self.0 = h;
    }

    fn finish(self) -> u64 {
        self.0
    }
}
