//! Node → in/out edge index derived from the edge set

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Edge, EdgeId, NodeId};

/// Maps each node to the edges leaving and entering it.
///
/// Nodes with no incident edges have no entry, so two indices built from the
/// same edge set always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidenceIndex {
    outgoing: BTreeMap<NodeId, BTreeSet<EdgeId>>,
    incoming: BTreeMap<NodeId, BTreeSet<EdgeId>>,
}

impl IncidenceIndex {
    pub fn new() -> Self {
        IncidenceIndex::default()
    }

    /// Build an index from scratch.
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = &'a Edge>,
    {
        let mut index = IncidenceIndex::new();
        for edge in edges {
            index.insert(edge);
        }
        index
    }

    pub fn insert(&mut self, edge: &Edge) {
        self.outgoing
            .entry(edge.source())
            .or_default()
            .insert(edge.id());
        self.incoming
            .entry(edge.target())
            .or_default()
            .insert(edge.id());
    }

    pub fn remove(&mut self, edge: &Edge) {
        detach(&mut self.outgoing, edge.source(), edge.id());
        detach(&mut self.incoming, edge.target(), edge.id());
    }

    pub fn out_edges(&self, node: NodeId) -> BTreeSet<EdgeId> {
        self.outgoing.get(&node).cloned().unwrap_or_default()
    }

    pub fn in_edges(&self, node: NodeId) -> BTreeSet<EdgeId> {
        self.incoming.get(&node).cloned().unwrap_or_default()
    }

    /// Union of in- and out-edges of every given node, each edge once.
    pub fn incident_edges<'a, I>(&self, nodes: I) -> BTreeSet<EdgeId>
    where
        I: IntoIterator<Item = &'a NodeId>,
    {
        let mut result = BTreeSet::new();
        for node in nodes {
            if let Some(out) = self.outgoing.get(node) {
                result.extend(out.iter().copied());
            }
            if let Some(inc) = self.incoming.get(node) {
                result.extend(inc.iter().copied());
            }
        }
        result
    }

    /// Whether `node` has any entry at all.
    pub fn touches(&self, node: NodeId) -> bool {
        self.outgoing.contains_key(&node) || self.incoming.contains_key(&node)
    }
}

fn detach(map: &mut BTreeMap<NodeId, BTreeSet<EdgeId>>, node: NodeId, edge: EdgeId) {
    if let Some(set) = map.get_mut(&node) {
        set.remove(&edge);
        if set.is_empty() {
            map.remove(&node);
        }
    }
}
