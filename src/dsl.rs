//! Fluent construction of routine graphs.
//!
//! The builder appends nodes in program order, wiring each new node to
//! the previous one, and runs the whole-graph validity check on
//! `build`. Hardware cross-references are checked as nodes are added,
//! the same as editor mutations.

use crate::{
    error::FieldlineResult,
    hardware::HardwareConfig,
    routine::{NodeId, NodeKind, RoutineGraph},
};

pub struct RoutineBuilder<'a> {
    hw: &'a HardwareConfig,
    graph: RoutineGraph,
    cursor: Option<NodeId>,
}

impl<'a> RoutineBuilder<'a> {
    pub fn new(hw: &'a HardwareConfig) -> Self {
        Self {
            hw,
            graph: RoutineGraph::new(),
            cursor: None,
        }
    }

    /// Append a node after the previous one.
    pub fn then(mut self, kind: NodeKind) -> FieldlineResult<Self> {
        let id = self.graph.add_node(kind, self.hw)?;
        if let Some(prev) = self.cursor {
            self.graph.add_edge(prev, id)?;
        }
        self.cursor = Some(id);
        Ok(self)
    }

    /// Append a loop node whose body is built by `body`, wiring the
    /// body's tail back to the loop head and leaving the loop head as
    /// the cursor for the exit edge.
    pub fn repeat(
        mut self,
        count: u32,
        body: impl FnOnce(RoutineBuilder<'a>) -> FieldlineResult<RoutineBuilder<'a>>,
    ) -> FieldlineResult<Self> {
        let head = self.graph.add_node(NodeKind::Loop { count }, self.hw)?;
        if let Some(prev) = self.cursor {
            self.graph.add_edge(prev, head)?;
        }

        self.cursor = Some(head);
        let mut built = body(self)?;
        if let Some(tail) = built.cursor
            && tail != head
        {
            built.graph.add_edge(tail, head)?;
        }
        built.cursor = Some(head);
        Ok(built)
    }

    pub fn build(self) -> FieldlineResult<RoutineGraph> {
        self.graph.validate_structure()?;
        Ok(self.graph)
    }
}
