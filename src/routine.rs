//! The routine graph: the authoritative node/edge program for an
//! autonomous routine.
//!
//! Nodes live in a flat arena keyed by stable integer handles (ids are
//! never reused) and carry a tagged parameter union, so a node can only
//! hold the parameters its type declares. Every mutation is
//! validate-then-commit: a rejected edit leaves the graph untouched.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use crate::{
    core::{CurveType, Point, Waypoint},
    error::{FieldlineError, FieldlineResult},
    geom,
    hardware::HardwareConfig,
};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A node's type and its type-specific parameters, as one tagged union:
/// parameter combinations outside the declared type are unrepresentable.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    // Movement
    Drive {
        /// Signed travel distance in field units (negative = backward).
        distance: f64,
        power: f64,
    },
    Turn {
        heading_deg: f64,
        power: f64,
    },
    MoveTo {
        target: Waypoint,
        power: f64,
        curve: CurveType,
    },
    FollowPath {
        points: Vec<Waypoint>,
        curve: CurveType,
        power: f64,
    },

    // Mechanism
    MotorRun {
        motor: String,
        power: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_secs: Option<f64>,
    },
    MotorToPosition {
        motor: String,
        ticks: i32,
        power: f64,
    },
    ServoSet {
        servo: String,
        position: f64,
    },

    // Sensor
    ReadSensor {
        device: String,
    },

    // Control flow
    Wait {
        duration_secs: f64,
    },
    Loop {
        count: u32,
    },
    Branch {
        condition: String,
    },

    Custom {
        code: String,
    },
}

/// A movement node's spatial footprint, ready for the geometry kernel.
#[derive(Clone, Debug, PartialEq)]
pub enum MotionGeometry {
    Polyline(Vec<Point>),
    /// Cubic Bezier control points.
    Cubic([Point; 4]),
}

impl MotionGeometry {
    pub fn sample(&self, samples: usize) -> Vec<Point> {
        match self {
            Self::Polyline(pts) => geom::sample_polyline(pts, samples),
            Self::Cubic([p0, p1, p2, p3]) => {
                geom::sample_cubic_bezier(*p0, *p1, *p2, *p3, samples)
            }
        }
    }

    pub fn endpoints(&self) -> Option<(Point, Point)> {
        match self {
            Self::Polyline(pts) => Some((*pts.first()?, *pts.last()?)),
            Self::Cubic([p0, _, _, p3]) => Some((*p0, *p3)),
        }
    }
}

impl NodeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Drive { .. } => "drive",
            Self::Turn { .. } => "turn",
            Self::MoveTo { .. } => "move_to",
            Self::FollowPath { .. } => "follow_path",
            Self::MotorRun { .. } => "motor_run",
            Self::MotorToPosition { .. } => "motor_to_position",
            Self::ServoSet { .. } => "servo_set",
            Self::ReadSensor { .. } => "read_sensor",
            Self::Wait { .. } => "wait",
            Self::Loop { .. } => "loop",
            Self::Branch { .. } => "branch",
            Self::Custom { .. } => "custom",
        }
    }

    /// Loop/branch nodes are the only ones allowed a second outgoing
    /// edge or a place inside a cycle.
    pub fn is_loop_or_branch(&self) -> bool {
        matches!(self, Self::Loop { .. } | Self::Branch { .. })
    }

    pub fn is_movement(&self) -> bool {
        matches!(
            self,
            Self::Drive { .. } | Self::Turn { .. } | Self::MoveTo { .. } | Self::FollowPath { .. }
        )
    }

    /// Validate this node's parameters against their type's legal set
    /// and the active hardware wiring. Device references are resolved at
    /// edit time, not deferred to execution.
    pub fn validate(&self, hw: &HardwareConfig) -> FieldlineResult<()> {
        match self {
            Self::Drive { distance, power } => {
                require_finite("drive distance", *distance)?;
                require_power("drive", *power)
            }
            Self::Turn { heading_deg, power } => {
                require_finite("turn heading", *heading_deg)?;
                require_power("turn", *power)
            }
            Self::MoveTo { target, power, .. } => {
                target.validate()?;
                require_power("move_to", *power)
            }
            Self::FollowPath {
                points,
                curve,
                power,
            } => {
                if points.is_empty() {
                    return Err(FieldlineError::validation(
                        "follow_path must have at least one point",
                    ));
                }
                for wp in points {
                    wp.validate()?;
                }
                if *curve == CurveType::Bezier && points.len() > 4 {
                    return Err(FieldlineError::validation(format!(
                        "follow_path bezier supports at most 4 control points, got {}",
                        points.len()
                    )));
                }
                require_power("follow_path", *power)
            }
            Self::MotorRun {
                motor,
                power,
                duration_secs,
            } => {
                require_motor(hw, motor)?;
                if let Some(d) = duration_secs
                    && !(d.is_finite() && *d >= 0.0)
                {
                    return Err(FieldlineError::validation(
                        "motor_run duration must be finite and >= 0",
                    ));
                }
                require_power("motor_run", *power)
            }
            Self::MotorToPosition { motor, power, .. } => {
                require_motor(hw, motor)?;
                require_power("motor_to_position", *power)
            }
            Self::ServoSet { servo, position } => {
                let Some(cfg) = hw.servo(servo) else {
                    return Err(FieldlineError::validation(format!(
                        "servo_set references unknown servo '{servo}'"
                    )));
                };
                if !(position.is_finite()
                    && (cfg.min_position..=cfg.max_position).contains(position))
                {
                    return Err(FieldlineError::validation(format!(
                        "servo_set position {position} outside servo '{servo}' range [{}, {}]",
                        cfg.min_position, cfg.max_position
                    )));
                }
                Ok(())
            }
            Self::ReadSensor { device } => {
                if hw.i2c_device(device).is_none() {
                    return Err(FieldlineError::validation(format!(
                        "read_sensor references unknown i2c device '{device}'"
                    )));
                }
                Ok(())
            }
            Self::Wait { duration_secs } => {
                if !(duration_secs.is_finite() && *duration_secs >= 0.0) {
                    return Err(FieldlineError::validation(
                        "wait duration must be finite and >= 0",
                    ));
                }
                Ok(())
            }
            Self::Loop { count } => {
                if *count == 0 {
                    return Err(FieldlineError::validation("loop count must be >= 1"));
                }
                Ok(())
            }
            Self::Branch { condition } => {
                if condition.trim().is_empty() {
                    return Err(FieldlineError::validation(
                        "branch condition must be non-empty",
                    ));
                }
                Ok(())
            }
            Self::Custom { code } => {
                if code.trim().is_empty() {
                    return Err(FieldlineError::validation("custom code must be non-empty"));
                }
                Ok(())
            }
        }
    }

    /// The spatial footprint of a movement node, or `None` for node
    /// types without one.
    ///
    /// A `follow_path` bezier with three control points is promoted
    /// quadratic-to-cubic; with two it degrades to a straight polyline.
    pub fn motion_geometry(&self) -> Option<MotionGeometry> {
        match self {
            Self::MoveTo { target, .. } => {
                Some(MotionGeometry::Polyline(vec![target.pos]))
            }
            Self::FollowPath { points, curve, .. } => {
                let pts: Vec<Point> = points.iter().map(|wp| wp.pos).collect();
                match curve {
                    CurveType::Linear => Some(MotionGeometry::Polyline(pts)),
                    CurveType::Bezier => match pts.as_slice() {
                        &[p0, p1, p2, p3] => Some(MotionGeometry::Cubic([p0, p1, p2, p3])),
                        &[p0, p1, p2] => {
                            let (q1, q2) = geom::quadratic_to_cubic(p0, p1, p2);
                            Some(MotionGeometry::Cubic([p0, q1, q2, p2]))
                        }
                        _ => Some(MotionGeometry::Polyline(pts)),
                    },
                }
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RoutineNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Editor canvas position, display metadata owned by the renderer.
    #[serde(default)]
    pub canvas: Point,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoutineEdge {
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RoutineGraph {
    nodes: Vec<RoutineNode>,
    edges: Vec<RoutineEdge>,
    /// Id watermark; ids below it are never handed out again.
    next_id: u32,
}

impl RoutineGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[RoutineNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[RoutineEdge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&RoutineNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|e| e.from == id).count()
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|e| e.to == id).count()
    }

    /// The unique entry node (in-degree 0), if the graph currently has
    /// exactly one.
    pub fn start_node(&self) -> Option<NodeId> {
        let mut starts = self.nodes.iter().filter(|n| self.in_degree(n.id) == 0);
        let first = starts.next()?;
        if starts.next().is_some() {
            return None;
        }
        Some(first.id)
    }

    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.from == id)
            .map(|e| e.to)
    }

    pub fn add_node(&mut self, kind: NodeKind, hw: &HardwareConfig) -> FieldlineResult<NodeId> {
        kind.validate(hw)?;
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(RoutineNode {
            id,
            kind,
            canvas: Point::ZERO,
        });
        Ok(id)
    }

    pub fn update_node(
        &mut self,
        id: NodeId,
        kind: NodeKind,
        hw: &HardwareConfig,
    ) -> FieldlineResult<()> {
        kind.validate(hw)?;
        let idx = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| unknown_node(id))?;

        if !kind.is_loop_or_branch() && self.out_degree(id) > 1 {
            return Err(FieldlineError::validation(format!(
                "node {id} has multiple outgoing edges and cannot become '{}'",
                kind.type_name()
            )));
        }

        // Swapping a loop/branch kind away may strip a cycle of its
        // mediator; roll back if it does.
        let old = std::mem::replace(&mut self.nodes[idx].kind, kind);
        if let Err(err) = self.check_cycles() {
            self.nodes[idx].kind = old;
            return Err(err);
        }
        Ok(())
    }

    /// Move a node on the editor canvas. Display-only, never validated
    /// beyond existence.
    pub fn set_canvas(&mut self, id: NodeId, pos: Point) -> FieldlineResult<()> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| unknown_node(id))?;
        node.canvas = pos;
        Ok(())
    }

    /// Remove a node and every edge incident to it.
    pub fn remove_node(&mut self, id: NodeId) -> FieldlineResult<()> {
        if self.node(id).is_none() {
            return Err(unknown_node(id));
        }
        self.nodes.retain(|n| n.id != id);
        self.edges.retain(|e| e.from != id && e.to != id);
        Ok(())
    }

    /// Insert an edge, enforcing the graph rules eagerly:
    /// both endpoints exist, no duplicate edge, non-loop/branch sources
    /// keep a single outgoing edge (loop/branch get two), and any cycle
    /// the edge closes must pass through a loop or branch node.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> FieldlineResult<()> {
        let source = self.require_node(from)?;
        self.require_node(to)?;

        if self.edges.iter().any(|e| e.from == from && e.to == to) {
            return Err(FieldlineError::validation(format!(
                "edge {from} -> {to} already exists"
            )));
        }

        let max_out = if source.kind.is_loop_or_branch() { 2 } else { 1 };
        let out = self.out_degree(from);
        if out >= max_out {
            return Err(FieldlineError::validation(format!(
                "node {from} ({}) already has {out} outgoing edge(s), max {max_out}",
                source.kind.type_name()
            )));
        }

        // The edge closes a cycle iff `from` is already reachable from
        // `to`; such a cycle is legal only when mediated by a loop or
        // branch node.
        if self.is_reachable(to, from) && !self.cycle_is_mediated(to, from) {
            return Err(FieldlineError::validation(format!(
                "edge {from} -> {to} creates a cycle without a loop or branch node"
            )));
        }

        self.edges.push(RoutineEdge { from, to });
        Ok(())
    }

    pub fn remove_edge(&mut self, from: NodeId, to: NodeId) -> FieldlineResult<()> {
        let before = self.edges.len();
        self.edges.retain(|e| !(e.from == from && e.to == to));
        if self.edges.len() == before {
            return Err(FieldlineError::validation(format!(
                "edge {from} -> {to} does not exist"
            )));
        }
        Ok(())
    }

    /// Whole-graph structural validity: non-empty, exactly one start
    /// node, at least one terminal node, sound edge endpoints and
    /// out-degrees, and every cycle mediated by a loop/branch node.
    #[tracing::instrument(skip(self))]
    pub fn validate_structure(&self) -> FieldlineResult<()> {
        if self.nodes.is_empty() {
            return Err(FieldlineError::validation("routine graph has no nodes"));
        }

        let mut seen = BTreeSet::new();
        for node in &self.nodes {
            if node.id.0 >= self.next_id {
                return Err(FieldlineError::validation(format!(
                    "node {} is above the id watermark",
                    node.id
                )));
            }
            if !seen.insert(node.id) {
                return Err(FieldlineError::validation(format!(
                    "duplicate node id {}",
                    node.id
                )));
            }
        }

        for edge in &self.edges {
            for id in [edge.from, edge.to] {
                if self.node(id).is_none() {
                    return Err(FieldlineError::validation(format!(
                        "edge {} -> {} references missing node {id}",
                        edge.from, edge.to
                    )));
                }
            }
        }

        let starts: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| self.in_degree(n.id) == 0)
            .map(|n| n.id)
            .collect();
        if starts.len() != 1 {
            return Err(FieldlineError::validation(format!(
                "routine graph must have exactly one start node, found {}",
                starts.len()
            )));
        }

        if !self.nodes.iter().any(|n| self.out_degree(n.id) == 0) {
            return Err(FieldlineError::validation(
                "routine graph must have at least one terminal node",
            ));
        }

        for node in &self.nodes {
            let max_out = if node.kind.is_loop_or_branch() { 2 } else { 1 };
            let out = self.out_degree(node.id);
            if out > max_out {
                return Err(FieldlineError::validation(format!(
                    "node {} ({}) has {out} outgoing edges, max {max_out}",
                    node.id,
                    node.kind.type_name()
                )));
            }
        }

        self.check_cycles()
    }

    /// Structural validity plus per-node parameter and hardware
    /// cross-reference checks. The entry point for deserialized graphs,
    /// which skipped edit-time validation.
    pub fn validate(&self, hw: &HardwareConfig) -> FieldlineResult<()> {
        self.validate_structure()?;
        for node in &self.nodes {
            node.kind.validate(hw).map_err(|err| {
                FieldlineError::validation(format!("node {}: {err}", node.id))
            })?;
        }
        Ok(())
    }

    fn require_node(&self, id: NodeId) -> FieldlineResult<&RoutineNode> {
        self.node(id).ok_or_else(|| unknown_node(id))
    }

    /// Every cycle must pass through a loop or branch node.
    fn check_cycles(&self) -> FieldlineResult<()> {
        for edge in &self.edges {
            if self.is_reachable(edge.to, edge.from) && !self.cycle_is_mediated(edge.to, edge.from)
            {
                return Err(FieldlineError::validation(format!(
                    "cycle through edge {} -> {} has no loop or branch node",
                    edge.from, edge.to
                )));
            }
        }
        Ok(())
    }

    fn is_reachable(&self, from: NodeId, to: NodeId) -> bool {
        if from == to {
            return true;
        }
        let mut visited = BTreeSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            for next in self.outgoing(current) {
                if next == to {
                    return true;
                }
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// Is the cycle `entry -> ... -> exit -> entry` mediated by a loop
    /// or branch node somewhere along a path from `entry` to `exit`?
    fn cycle_is_mediated(&self, entry: NodeId, exit: NodeId) -> bool {
        self.nodes
            .iter()
            .filter(|n| n.kind.is_loop_or_branch())
            .any(|n| self.is_reachable(entry, n.id) && self.is_reachable(n.id, exit))
    }
}

fn unknown_node(id: NodeId) -> FieldlineError {
    FieldlineError::validation(format!("unknown node {id}"))
}

fn require_finite(what: &str, v: f64) -> FieldlineResult<()> {
    if !v.is_finite() {
        return Err(FieldlineError::validation(format!("{what} must be finite")));
    }
    Ok(())
}

fn require_power(what: &str, power: f64) -> FieldlineResult<()> {
    if !(power.is_finite() && (-1.0..=1.0).contains(&power)) {
        return Err(FieldlineError::validation(format!(
            "{what} power must be within [-1, 1], got {power}"
        )));
    }
    Ok(())
}

fn require_motor(hw: &HardwareConfig, name: &str) -> FieldlineResult<()> {
    if hw.motor(name).is_none() {
        return Err(FieldlineError::validation(format!(
            "node references unknown motor '{name}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivetrain::DriveTrainType;

    fn hw() -> HardwareConfig {
        HardwareConfig::for_drive_train(DriveTrainType::TankDrive)
    }

    fn drive() -> NodeKind {
        NodeKind::Drive {
            distance: 100.0,
            power: 0.5,
        }
    }

    #[test]
    fn non_loop_node_is_limited_to_one_outgoing_edge() {
        let hw = hw();
        let mut graph = RoutineGraph::new();
        let a = graph.add_node(drive(), &hw).unwrap();
        let b = graph.add_node(drive(), &hw).unwrap();
        let c = graph.add_node(drive(), &hw).unwrap();

        graph.add_edge(a, b).unwrap();
        assert!(graph.add_edge(a, c).is_err());
        assert_eq!(graph.out_degree(a), 1);
    }

    #[test]
    fn branch_node_allows_two_outgoing_edges_but_not_three() {
        let hw = hw();
        let mut graph = RoutineGraph::new();
        let root = graph.add_node(drive(), &hw).unwrap();
        let branch = graph
            .add_node(
                NodeKind::Branch {
                    condition: "sensed".to_string(),
                },
                &hw,
            )
            .unwrap();
        let left = graph.add_node(drive(), &hw).unwrap();
        let right = graph.add_node(drive(), &hw).unwrap();
        let third = graph.add_node(drive(), &hw).unwrap();

        graph.add_edge(root, branch).unwrap();
        graph.add_edge(branch, left).unwrap();
        graph.add_edge(branch, right).unwrap();
        assert!(graph.add_edge(branch, third).is_err());
    }

    #[test]
    fn plain_back_edge_is_rejected_loop_mediated_cycle_is_not() {
        let hw = hw();
        let mut graph = RoutineGraph::new();
        let a = graph.add_node(drive(), &hw).unwrap();
        let b = graph.add_node(drive(), &hw).unwrap();
        graph.add_edge(a, b).unwrap();
        // b -> a closes a cycle with no loop/branch node anywhere.
        assert!(graph.add_edge(b, a).is_err());

        let mut graph = RoutineGraph::new();
        let start = graph.add_node(drive(), &hw).unwrap();
        let lp = graph.add_node(NodeKind::Loop { count: 3 }, &hw).unwrap();
        let body = graph.add_node(drive(), &hw).unwrap();
        let done = graph.add_node(drive(), &hw).unwrap();
        graph.add_edge(start, lp).unwrap();
        graph.add_edge(lp, body).unwrap();
        graph.add_edge(body, lp).unwrap(); // back to the loop head
        graph.add_edge(lp, done).unwrap(); // loop exit
        graph.validate_structure().unwrap();
    }

    #[test]
    fn second_start_node_fails_structural_validation() {
        let hw = hw();
        let mut graph = RoutineGraph::new();
        let a = graph.add_node(drive(), &hw).unwrap();
        let b = graph.add_node(drive(), &hw).unwrap();
        graph.add_edge(a, b).unwrap();
        graph.validate_structure().unwrap();
        assert_eq!(graph.start_node(), Some(a));

        // A second in-degree-0 node: legal mid-edit, rejected at commit.
        graph.add_node(drive(), &hw).unwrap();
        assert!(graph.validate_structure().is_err());
        assert_eq!(graph.start_node(), None);
    }

    #[test]
    fn remove_node_drops_incident_edges() {
        let hw = hw();
        let mut graph = RoutineGraph::new();
        let a = graph.add_node(drive(), &hw).unwrap();
        let b = graph.add_node(drive(), &hw).unwrap();
        let c = graph.add_node(drive(), &hw).unwrap();
        graph.add_edge(a, b).unwrap();
        graph.add_edge(b, c).unwrap();

        graph.remove_node(b).unwrap();
        assert!(graph.edges().is_empty());
        assert!(graph.node(b).is_none());

        // Ids are never reused after removal.
        let d = graph.add_node(drive(), &hw).unwrap();
        assert_ne!(d, b);
        assert!(d.0 > b.0);
    }

    #[test]
    fn node_parameters_are_validated_at_edit_time() {
        let hw = hw();
        let mut graph = RoutineGraph::new();

        assert!(
            graph
                .add_node(
                    NodeKind::Drive {
                        distance: 10.0,
                        power: 1.5,
                    },
                    &hw,
                )
                .is_err()
        );
        assert!(
            graph
                .add_node(
                    NodeKind::MotorRun {
                        motor: "arm".to_string(),
                        power: 0.5,
                        duration_secs: None,
                    },
                    &hw,
                )
                .is_err()
        );
        assert!(graph.add_node(NodeKind::Loop { count: 0 }, &hw).is_err());
        assert!(graph.nodes().is_empty());

        // A motor the wiring actually has is accepted.
        graph
            .add_node(
                NodeKind::MotorRun {
                    motor: "left_drive".to_string(),
                    power: 0.5,
                    duration_secs: Some(1.5),
                },
                &hw,
            )
            .unwrap();
    }

    #[test]
    fn servo_position_is_checked_against_servo_range() {
        let mut hw = hw();
        hw.servos.push(crate::hardware::Servo {
            id: "servo-0".to_string(),
            name: "claw".to_string(),
            port: 0,
            min_position: 0.2,
            max_position: 0.8,
        });

        let ok = NodeKind::ServoSet {
            servo: "claw".to_string(),
            position: 0.5,
        };
        ok.validate(&hw).unwrap();

        let outside = NodeKind::ServoSet {
            servo: "claw".to_string(),
            position: 0.9,
        };
        assert!(outside.validate(&hw).is_err());
    }

    #[test]
    fn update_node_rejects_bad_params_and_keeps_old_kind() {
        let hw = hw();
        let mut graph = RoutineGraph::new();
        let a = graph.add_node(drive(), &hw).unwrap();

        let bad = NodeKind::Wait {
            duration_secs: -1.0,
        };
        assert!(graph.update_node(a, bad, &hw).is_err());
        assert_eq!(graph.node(a).unwrap().kind.type_name(), "drive");

        graph
            .update_node(a, NodeKind::Wait { duration_secs: 2.0 }, &hw)
            .unwrap();
        assert_eq!(graph.node(a).unwrap().kind.type_name(), "wait");
    }

    #[test]
    fn update_node_cannot_strip_a_cycle_of_its_mediator() {
        let hw = hw();
        let mut graph = RoutineGraph::new();
        let start = graph.add_node(drive(), &hw).unwrap();
        let lp = graph.add_node(NodeKind::Loop { count: 2 }, &hw).unwrap();
        let body = graph.add_node(drive(), &hw).unwrap();
        graph.add_edge(start, lp).unwrap();
        graph.add_edge(lp, body).unwrap();
        graph.add_edge(body, lp).unwrap();

        // The loop head is the cycle's only mediator; demoting it would
        // leave a plain cycle, so the edit rolls back.
        assert!(
            graph
                .update_node(lp, NodeKind::Wait { duration_secs: 1.0 }, &hw)
                .is_err()
        );
        assert_eq!(graph.node(lp).unwrap().kind.type_name(), "loop");

        // Swapping one mediator kind for another is fine.
        graph
            .update_node(
                lp,
                NodeKind::Branch {
                    condition: "again".to_string(),
                },
                &hw,
            )
            .unwrap();
    }

    #[test]
    fn follow_path_projects_per_curve_type() {
        let polyline = NodeKind::FollowPath {
            points: vec![Waypoint::at(0.0, 0.0), Waypoint::at(10.0, 0.0)],
            curve: CurveType::Linear,
            power: 0.5,
        };
        assert!(polyline.is_movement());
        let Some(geometry) = polyline.motion_geometry() else {
            panic!("expected polyline");
        };
        assert_eq!(
            geometry.endpoints(),
            Some((Point::new(0.0, 0.0), Point::new(10.0, 0.0)))
        );
        let MotionGeometry::Polyline(pts) = geometry else {
            panic!("expected polyline");
        };
        assert_eq!(pts.len(), 2);

        // Three bezier controls are promoted to an equivalent cubic.
        let quad = NodeKind::FollowPath {
            points: vec![
                Waypoint::at(0.0, 0.0),
                Waypoint::at(50.0, 80.0),
                Waypoint::at(100.0, 0.0),
            ],
            curve: CurveType::Bezier,
            power: 0.5,
        };
        let Some(geometry) = quad.motion_geometry() else {
            panic!("expected geometry");
        };
        let sampled = geometry.sample(5);
        let expected = geom::curve_point(
            0.5,
            &[
                Point::new(0.0, 0.0),
                Point::new(50.0, 80.0),
                Point::new(100.0, 0.0),
            ],
        );
        assert!((sampled[2].x - expected.x).abs() < 1e-9);
        assert!((sampled[2].y - expected.y).abs() < 1e-9);

        // Five controls are out of the bezier contract.
        let too_many = NodeKind::FollowPath {
            points: vec![Waypoint::at(0.0, 0.0); 5],
            curve: CurveType::Bezier,
            power: 0.5,
        };
        assert!(too_many.validate(&hw()).is_err());

        assert_eq!(NodeKind::Loop { count: 2 }.motion_geometry(), None);
    }

    #[test]
    fn graph_json_round_trips_losslessly() {
        let hw = hw();
        let mut graph = RoutineGraph::new();
        let a = graph.add_node(drive(), &hw).unwrap();
        let b = graph
            .add_node(
                NodeKind::FollowPath {
                    points: vec![Waypoint::at(0.0, 0.0), Waypoint::with_heading(1.0, 2.0, 90.0)],
                    curve: CurveType::Bezier,
                    power: 0.25,
                },
                &hw,
            )
            .unwrap();
        graph.add_edge(a, b).unwrap();
        graph.set_canvas(b, Point::new(120.0, 44.0)).unwrap();

        let json = serde_json::to_string(&graph).unwrap();
        let back: RoutineGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, graph);
        back.validate(&hw).unwrap();
    }

    #[test]
    fn unknown_node_type_fails_deserialization() {
        let json = r#"{"nodes":[{"id":0,"type":"teleport","x":1}],"edges":[],"next_id":1}"#;
        assert!(serde_json::from_str::<RoutineGraph>(json).is_err());
    }
}
