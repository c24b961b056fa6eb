//! TikZ production for a graph snapshot

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::model::{Bend, Edge, Node, NodeId, Point, Rect};
use crate::snapshot::GraphSnapshot;

/// Output settings for [`render`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TikzOptions {
    /// Decimal places kept in coordinates; trailing zeros are dropped.
    pub precision: usize,
    /// One level of indentation.
    pub indent: String,
}

impl Default for TikzOptions {
    fn default() -> Self {
        TikzOptions {
            precision: 2,
            indent: "\t".to_string(),
        }
    }
}

/// Render `graph` as a `tikzpicture` holding a node layer and an edge layer.
pub fn render(graph: &GraphSnapshot, options: &TikzOptions) -> String {
    let names = reference_names(&graph.nodes);
    let i1 = options.indent.as_str();
    let i2 = options.indent.repeat(2);

    let mut out = String::new();
    let _ = writeln!(out, "\\begin{{tikzpicture}}{}", graph.data.tikz_list());
    if let Some(bbox) = graph.bounding_box {
        let _ = writeln!(out, "{i1}{}", bounding_box_line(&bbox, options));
    }

    let _ = writeln!(out, "{i1}\\begin{{pgfonlayer}}{{nodelayer}}");
    for node in &graph.nodes {
        let _ = writeln!(out, "{i2}{}", node_line(node, &names, options));
    }
    let _ = writeln!(out, "{i1}\\end{{pgfonlayer}}");

    let _ = writeln!(out, "{i1}\\begin{{pgfonlayer}}{{edgelayer}}");
    for edge in &graph.edges {
        match edge_line(edge, &names, options) {
            Some(line) => {
                let _ = writeln!(out, "{i2}{line}");
            }
            None => tracing::warn!(
                edge = ?edge.id(),
                "skipping edge with an endpoint outside the picture"
            ),
        }
    }
    let _ = writeln!(out, "{i1}\\end{{pgfonlayer}}");
    out.push_str("\\end{tikzpicture}\n");
    out
}

/// Name a node is referenced by: its own name, or its identity when unnamed.
pub(crate) fn node_name(node: &Node) -> String {
    if node.name.is_empty() {
        node.id().0.to_string()
    } else {
        node.name.clone()
    }
}

/// One reference name per node, unique within the picture. A later node whose
/// name is already taken gets a `-k` suffix.
fn reference_names(nodes: &[Node]) -> BTreeMap<NodeId, String> {
    let mut taken = BTreeSet::new();
    let mut names = BTreeMap::new();
    for node in nodes {
        let base = node_name(node);
        let mut name = base.clone();
        let mut k = 1;
        while taken.contains(&name) {
            name = format!("{base}-{k}");
            k += 1;
        }
        taken.insert(name.clone());
        names.insert(node.id(), name);
    }
    names
}

fn node_line(node: &Node, names: &BTreeMap<NodeId, String>, options: &TikzOptions) -> String {
    let mut line = String::from("\\node ");
    if !node.data.is_empty() {
        line.push_str(&node.data.tikz_list());
        line.push(' ');
    }
    let _ = write!(
        line,
        "({}) at {} {{{}}};",
        names[&node.id()],
        coordinate(node.point, options),
        node.label
    );
    line
}

fn edge_line(
    edge: &Edge,
    names: &BTreeMap<NodeId, String>,
    options: &TikzOptions,
) -> Option<String> {
    let source = names.get(&edge.source())?;
    let target = names.get(&edge.target())?;
    let mut items: Vec<String> = edge.data.iter().map(ToString::to_string).collect();
    match edge.bend {
        Bend::Straight => {}
        Bend::Basic { bend } if bend > 0 => items.push(format!("bend left={bend}")),
        Bend::Basic { bend } if bend < 0 => {
            items.push(format!("bend right={}", bend.unsigned_abs()))
        }
        Bend::Basic { .. } => {}
        Bend::InOut {
            in_angle,
            out_angle,
            looseness,
        } => {
            items.push(format!("in={in_angle}"));
            items.push(format!("out={out_angle}"));
            if looseness != 1.0 {
                items.push(format!(
                    "looseness={}",
                    number(looseness, options.precision)
                ));
            }
        }
    }

    let mut line = String::from("\\draw ");
    if !items.is_empty() {
        let _ = write!(line, "[{}] ", items.join(", "));
    }
    let _ = write!(line, "({source}) to ({target});");
    Some(line)
}

fn bounding_box_line(bbox: &Rect, options: &TikzOptions) -> String {
    format!(
        "\\path [use as bounding box] {} rectangle {};",
        coordinate(Point::new(bbox.min_x(), bbox.min_y()), options),
        coordinate(Point::new(bbox.max_x(), bbox.max_y()), options)
    )
}

fn coordinate(p: Point, options: &TikzOptions) -> String {
    format!(
        "({}, {})",
        number(p.x, options.precision),
        number(p.y, options.precision)
    )
}

/// Fixed-point number with trailing zeros removed; never prints `-0`.
fn number(value: f64, precision: usize) -> String {
    let mut s = format!("{value:.precision$}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}
