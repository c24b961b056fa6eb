//! TikZGraph Core — undoable diagram graph, change log and TikZ output

pub mod model;
pub mod data;
pub mod incidence;
pub mod change;
pub mod graph;
pub mod history;
pub mod transform;
pub mod snapshot;
pub mod tikz;
pub mod error;


#[cfg(test)]
pub mod test_utils;

pub use model::{NodeId, EdgeId, Point, Rect, Node, Edge, Bend};
pub use data::{ElementData, Property};
pub use incidence::IncidenceIndex;
pub use change::{GraphChange, FlipAxis};
pub use graph::Graph;
pub use history::History;
pub use transform::{Transformer, ScaleTransformer};
pub use snapshot::GraphSnapshot;
pub use tikz::TikzOptions;
pub use error::{GraphError, Result};
