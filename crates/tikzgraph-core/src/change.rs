//! Invertible records of graph mutations

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::data::ElementData;
use crate::model::{Bend, Edge, EdgeId, Node, NodeId, Point, Rect};

/// Axis a flip mirrors across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipAxis {
    /// Mirror left-to-right (x changes).
    Horizontal,
    /// Mirror top-to-bottom (y changes).
    Vertical,
}

/// One reversible mutation of a [`Graph`](crate::Graph).
///
/// A change owns private copies of every node and edge it mentions, so it
/// never depends on objects the graph has since dropped. Replaying a change
/// only looks objects up by identity; cascades are frozen when the change is
/// built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphChange {
    /// Insert nodes, then the edges among/onto them. Covers single node
    /// insertion and pasting a subgraph.
    AddNodes {
        nodes: BTreeMap<NodeId, Node>,
        edges: BTreeMap<EdgeId, Edge>,
    },
    /// Remove the captured edges, then the nodes. `edges` is the full
    /// incident-edge cascade of `nodes`.
    RemoveNodes {
        nodes: BTreeMap<NodeId, Node>,
        edges: BTreeMap<EdgeId, Edge>,
    },
    AddEdges { edges: BTreeMap<EdgeId, Edge> },
    RemoveEdges { edges: BTreeMap<EdgeId, Edge> },
    ShiftNodes {
        nodes: BTreeSet<NodeId>,
        dx: f64,
        dy: f64,
    },
    /// Exact before/after positions and bends of a flip.
    FlipNodes {
        axis: FlipAxis,
        old_points: BTreeMap<NodeId, Point>,
        new_points: BTreeMap<NodeId, Point>,
        old_bends: BTreeMap<EdgeId, Bend>,
        new_bends: BTreeMap<EdgeId, Bend>,
    },
    /// Swap source and target; its own inverse.
    ReverseEdges { edges: BTreeSet<EdgeId> },
    /// Replace node properties (name, label, position, data) by identity.
    SetNodes {
        old: BTreeMap<NodeId, Node>,
        new: BTreeMap<NodeId, Node>,
    },
    /// Replace edge data and bend by identity. Endpoints are not touched.
    SetEdges {
        old: BTreeMap<EdgeId, Edge>,
        new: BTreeMap<EdgeId, Edge>,
    },
    SetData { old: ElementData, new: ElementData },
    SetBoundingBox {
        old: Option<Rect>,
        new: Option<Rect>,
    },
}

impl GraphChange {
    /// The change that undoes this one.
    pub fn inverse(&self) -> GraphChange {
        match self {
            GraphChange::AddNodes { nodes, edges } => GraphChange::RemoveNodes {
                nodes: nodes.clone(),
                edges: edges.clone(),
            },
            GraphChange::RemoveNodes { nodes, edges } => GraphChange::AddNodes {
                nodes: nodes.clone(),
                edges: edges.clone(),
            },
            GraphChange::AddEdges { edges } => GraphChange::RemoveEdges {
                edges: edges.clone(),
            },
            GraphChange::RemoveEdges { edges } => GraphChange::AddEdges {
                edges: edges.clone(),
            },
            GraphChange::ShiftNodes { nodes, dx, dy } => GraphChange::ShiftNodes {
                nodes: nodes.clone(),
                dx: -dx,
                dy: -dy,
            },
            GraphChange::FlipNodes {
                axis,
                old_points,
                new_points,
                old_bends,
                new_bends,
            } => GraphChange::FlipNodes {
                axis: *axis,
                old_points: new_points.clone(),
                new_points: old_points.clone(),
                old_bends: new_bends.clone(),
                new_bends: old_bends.clone(),
            },
            GraphChange::ReverseEdges { edges } => GraphChange::ReverseEdges {
                edges: edges.clone(),
            },
            GraphChange::SetNodes { old, new } => GraphChange::SetNodes {
                old: new.clone(),
                new: old.clone(),
            },
            GraphChange::SetEdges { old, new } => GraphChange::SetEdges {
                old: new.clone(),
                new: old.clone(),
            },
            GraphChange::SetData { old, new } => GraphChange::SetData {
                old: new.clone(),
                new: old.clone(),
            },
            GraphChange::SetBoundingBox { old, new } => GraphChange::SetBoundingBox {
                old: *new,
                new: *old,
            },
        }
    }

    /// Short name of the operation, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GraphChange::AddNodes { .. } => "add-nodes",
            GraphChange::RemoveNodes { .. } => "remove-nodes",
            GraphChange::AddEdges { .. } => "add-edges",
            GraphChange::RemoveEdges { .. } => "remove-edges",
            GraphChange::ShiftNodes { .. } => "shift-nodes",
            GraphChange::FlipNodes {
                axis: FlipAxis::Horizontal,
                ..
            } => "flip-horizontal",
            GraphChange::FlipNodes {
                axis: FlipAxis::Vertical,
                ..
            } => "flip-vertical",
            GraphChange::ReverseEdges { .. } => "reverse-edges",
            GraphChange::SetNodes { .. } => "set-nodes",
            GraphChange::SetEdges { .. } => "set-edges",
            GraphChange::SetData { .. } => "set-data",
            GraphChange::SetBoundingBox { .. } => "set-bounding-box",
        }
    }

    /// Whether applying this change would leave the graph as it was.
    pub fn is_noop(&self) -> bool {
        match self {
            GraphChange::AddNodes { nodes, edges } | GraphChange::RemoveNodes { nodes, edges } => {
                nodes.is_empty() && edges.is_empty()
            }
            GraphChange::AddEdges { edges } | GraphChange::RemoveEdges { edges } => {
                edges.is_empty()
            }
            GraphChange::ShiftNodes { nodes, dx, dy } => {
                nodes.is_empty() || (*dx == 0.0 && *dy == 0.0)
            }
            GraphChange::FlipNodes {
                old_points,
                new_points,
                old_bends,
                new_bends,
                ..
            } => old_points == new_points && old_bends == new_bends,
            GraphChange::ReverseEdges { edges } => edges.is_empty(),
            GraphChange::SetNodes { old, new } => old == new,
            GraphChange::SetEdges { old, new } => old == new,
            GraphChange::SetData { old, new } => old == new,
            GraphChange::SetBoundingBox { old, new } => old == new,
        }
    }
}
