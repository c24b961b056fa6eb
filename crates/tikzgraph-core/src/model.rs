//! Core data structures for the diagram graph

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::data::ElementData;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_EDGE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a node. Two nodes are "the same" iff their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Allocate an identity no other node in this process has.
    pub fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Make sure `fresh` never hands out this id; used when importing
    /// identities from outside the process.
    pub(crate) fn reserve(self) {
        NEXT_NODE_ID.fetch_max(self.0.saturating_add(1), Ordering::Relaxed);
    }
}

/// Identity of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub fn fresh() -> Self {
        EdgeId(NEXT_EDGE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn reserve(self) {
        NEXT_EDGE_ID.fetch_max(self.0.saturating_add(1), Ordering::Relaxed);
    }
}

/// A point in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle anchored at its minimum corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// The degenerate rectangle returned for empty node sets.
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two opposite corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Rect::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Smallest rectangle enclosing every point; `Rect::ZERO` if there are none.
    pub fn enclosing<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        let (min, max) = points.fold((first, first), |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        });
        Rect::from_corners(min, max)
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }
}

/// A vertex of the diagram.
///
/// `Clone` keeps the identity (a snapshot of the same node); use
/// [`Node::duplicate`] for a distinct node carrying the same data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    /// Name used to reference the node from edges in TikZ output.
    #[serde(default)]
    pub name: String,
    /// Text content of the node.
    #[serde(default)]
    pub label: String,
    pub point: Point,
    #[serde(default)]
    pub data: ElementData,
}

impl Node {
    pub fn new(point: Point) -> Self {
        Node {
            id: NodeId::fresh(),
            name: String::new(),
            label: String::new(),
            point,
            data: ElementData::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_data(mut self, data: ElementData) -> Self {
        self.data = data;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Copy of this node under a fresh identity.
    pub fn duplicate(&self) -> Self {
        Node {
            id: NodeId::fresh(),
            ..self.clone()
        }
    }
}

/// How an edge is drawn between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Bend {
    #[default]
    Straight,
    /// Signed bend angle in degrees; positive bends left.
    Basic { bend: i32 },
    /// Explicit leaving/entering angles in degrees.
    InOut {
        in_angle: i32,
        out_angle: i32,
        looseness: f64,
    },
}

impl Bend {
    /// Bend of the same curve traversed target-to-source.
    pub fn reversed(self) -> Self {
        match self {
            Bend::Straight => Bend::Straight,
            Bend::Basic { bend } => Bend::Basic {
                bend: bend.wrapping_neg(),
            },
            Bend::InOut {
                in_angle,
                out_angle,
                looseness,
            } => Bend::InOut {
                in_angle: out_angle,
                out_angle: in_angle,
                looseness,
            },
        }
    }

    /// Bend after mirroring the drawing left-to-right.
    pub fn mirrored_horizontally(self) -> Self {
        match self {
            Bend::Straight => Bend::Straight,
            Bend::Basic { bend } => Bend::Basic {
                bend: bend.wrapping_neg(),
            },
            Bend::InOut {
                in_angle,
                out_angle,
                looseness,
            } => Bend::InOut {
                in_angle: normalize_angle(180 - in_angle.rem_euclid(360)),
                out_angle: normalize_angle(180 - out_angle.rem_euclid(360)),
                looseness,
            },
        }
    }

    /// Bend after mirroring the drawing top-to-bottom.
    pub fn mirrored_vertically(self) -> Self {
        match self {
            Bend::Straight => Bend::Straight,
            Bend::Basic { bend } => Bend::Basic {
                bend: bend.wrapping_neg(),
            },
            Bend::InOut {
                in_angle,
                out_angle,
                looseness,
            } => Bend::InOut {
                in_angle: normalize_angle(-in_angle.rem_euclid(360)),
                out_angle: normalize_angle(-out_angle.rem_euclid(360)),
                looseness,
            },
        }
    }
}

/// Map an angle in degrees into (-180, 180].
fn normalize_angle(angle: i32) -> i32 {
    let a = angle.rem_euclid(360);
    if a > 180 { a - 360 } else { a }
}

/// A directed edge. Endpoints are referenced by identity, never owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    id: EdgeId,
    source: NodeId,
    target: NodeId,
    #[serde(default)]
    pub data: ElementData,
    #[serde(default)]
    pub bend: Bend,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Edge {
            id: EdgeId::fresh(),
            source,
            target,
            data: ElementData::new(),
            bend: Bend::Straight,
        }
    }

    pub fn with_data(mut self, data: ElementData) -> Self {
        self.data = data;
        self
    }

    pub fn with_bend(mut self, bend: Bend) -> Self {
        self.bend = bend;
        self
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Copy of this edge under a fresh identity, attached to new endpoints.
    pub fn duplicate_between(&self, source: NodeId, target: NodeId) -> Self {
        Edge {
            id: EdgeId::fresh(),
            source,
            target,
            ..self.clone()
        }
    }

    /// Same edge with its direction swapped.
    pub(crate) fn reversed(&self) -> Self {
        Edge {
            source: self.target,
            target: self.source,
            bend: self.bend.reversed(),
            ..self.clone()
        }
    }
}
