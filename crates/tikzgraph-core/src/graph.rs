//! The diagram graph: nodes, edges, incidence index and reversible mutators

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::change::{FlipAxis, GraphChange};
use crate::data::ElementData;
use crate::error::{GraphError, Result};
use crate::incidence::IncidenceIndex;
use crate::model::*;
use crate::snapshot::GraphSnapshot;
use crate::tikz::{self, TikzOptions};
use crate::transform::Transformer;

/// A diagram: a directed multigraph whose nodes carry positions.
///
/// All methods take `&self`; a single lock guards mutation and the rebuild of
/// the cached node/edge views, so a `Graph` can be shared behind an `Arc`.
/// Every mutator returns a [`GraphChange`]. To undo it, pass
/// `change.inverse()` to [`Graph::apply_change`]; to redo, pass the change.
///
/// Mutators must not be called from inside another mutation on the same graph.
pub struct Graph {
    state: Mutex<GraphState>,
}

#[derive(Clone, Default)]
struct GraphState {
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    incidence: IncidenceIndex,
    data: ElementData,
    bounding_box: Option<Rect>,
    cache: ViewCache,
}

/// Immutable node/edge views handed out to readers. Rebuilt lazily after a
/// mutation sets `dirty`.
#[derive(Clone)]
struct ViewCache {
    dirty: bool,
    nodes: Arc<[Node]>,
    edges: Arc<[Edge]>,
}

impl Default for ViewCache {
    fn default() -> Self {
        ViewCache {
            dirty: false,
            nodes: Arc::from(Vec::new()),
            edges: Arc::from(Vec::new()),
        }
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Graph")
            .field("node_count", &state.nodes.len())
            .field("edge_count", &state.edges.len())
            .field("bounding_box", &state.bounding_box)
            .finish()
    }
}

impl Clone for Graph {
    fn clone(&self) -> Self {
        Graph {
            state: Mutex::new(self.lock().clone()),
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            state: Mutex::new(GraphState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GraphState> {
        // Changes are checked before any of them is applied, so a panic while
        // the lock is held never leaves a half-applied change behind.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Build the change under the lock, apply it, and hand it back.
    fn mutate<F>(&self, build: F) -> GraphChange
    where
        F: FnOnce(&GraphState) -> GraphChange,
    {
        let mut state = self.lock();
        let change = build(&state);
        state.check(&change);
        state.apply(&change);
        tracing::debug!(kind = change.kind(), "graph mutated");
        change
    }

    // ── Views ───────────────────────────────────────────────

    /// Snapshot of the node set, ordered by identity. It does not change when
    /// the graph is mutated later.
    pub fn nodes(&self) -> Arc<[Node]> {
        let mut state = self.lock();
        state.refresh_cache();
        Arc::clone(&state.cache.nodes)
    }

    /// Snapshot of the edge set, ordered by identity.
    pub fn edges(&self) -> Arc<[Edge]> {
        let mut state = self.lock();
        state.refresh_cache();
        Arc::clone(&state.cache.edges)
    }

    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.lock().nodes.get(&id).cloned()
    }

    pub fn edge(&self, id: EdgeId) -> Option<Edge> {
        self.lock().edges.get(&id).cloned()
    }

    /// First node (by identity) with the given TikZ name.
    pub fn node_by_name(&self, name: &str) -> Option<Node> {
        self.lock().nodes.values().find(|n| n.name == name).cloned()
    }

    pub fn node_ids(&self) -> BTreeSet<NodeId> {
        self.lock().nodes.keys().copied().collect()
    }

    pub fn edge_ids(&self) -> BTreeSet<EdgeId> {
        self.lock().edges.keys().copied().collect()
    }

    pub fn node_count(&self) -> usize {
        self.lock().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.lock().edges.len()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.lock().nodes.contains_key(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.lock().edges.contains_key(&id)
    }

    pub fn data(&self) -> ElementData {
        self.lock().data.clone()
    }

    /// Explicit bounding box, if one was set.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.lock().bounding_box
    }

    pub fn has_bounding_box(&self) -> bool {
        self.lock().bounding_box.is_some()
    }

    // ── Incidence ───────────────────────────────────────────

    pub fn out_edges(&self, node: NodeId) -> BTreeSet<EdgeId> {
        self.lock().incidence.out_edges(node)
    }

    pub fn in_edges(&self, node: NodeId) -> BTreeSet<EdgeId> {
        self.lock().incidence.in_edges(node)
    }

    /// Edges with at least one endpoint in `nodes`, each listed once.
    pub fn incident_edges(&self, nodes: &BTreeSet<NodeId>) -> BTreeSet<EdgeId> {
        self.lock().incidence.incident_edges(nodes)
    }

    // ── Geometry ────────────────────────────────────────────

    /// Rectangle enclosing every node position; `Rect::ZERO` for an empty graph.
    pub fn bounds(&self) -> Rect {
        Rect::enclosing(self.lock().nodes.values().map(|n| n.point))
    }

    /// Rectangle enclosing the given nodes. Unknown ids are ignored.
    pub fn bounds_for_node_set(&self, nodes: &BTreeSet<NodeId>) -> Rect {
        self.lock().bounds_for(nodes)
    }

    // ── Copies ──────────────────────────────────────────────

    /// Identity-keyed copies of the given nodes, independent of the live graph.
    pub fn node_table(&self, nodes: &BTreeSet<NodeId>) -> BTreeMap<NodeId, Node> {
        self.lock().node_table(nodes)
    }

    /// Identity-keyed copies of the given edges.
    pub fn edge_table(&self, edges: &BTreeSet<EdgeId>) -> BTreeMap<EdgeId, Edge> {
        self.lock().edge_table(edges)
    }

    /// A new graph holding fresh copies of `nodes` and of every edge whose
    /// endpoints both lie in `nodes`.
    pub fn copy_of_subgraph(&self, nodes: &BTreeSet<NodeId>) -> Graph {
        let state = self.lock();
        let mut copy = GraphState::default();
        let mut remap = BTreeMap::new();
        for node in nodes.iter().filter_map(|id| state.nodes.get(id)) {
            let fresh = node.duplicate();
            remap.insert(node.id(), fresh.id());
            copy.insert_node(fresh);
        }
        for edge in state.edges.values() {
            if let (Some(&s), Some(&t)) = (remap.get(&edge.source()), remap.get(&edge.target())) {
                copy.insert_edge(edge.duplicate_between(s, t));
            }
        }
        tracing::debug!(
            nodes = copy.nodes.len(),
            edges = copy.edges.len(),
            "copied subgraph"
        );
        Graph {
            state: Mutex::new(copy),
        }
    }

    /// Partition the edges into maximal directed chains.
    ///
    /// Chains start at nodes that are not pass-through points (a pass-through
    /// node has exactly one remaining in-edge and one remaining out-edge) and
    /// are extended while the current node is one. Pure cycles are broken at
    /// their lowest edge.
    pub fn path_cover(&self) -> Vec<Vec<Edge>> {
        let state = self.lock();
        let mut remaining: BTreeSet<EdgeId> = state.edges.keys().copied().collect();
        let mut cover = Vec::new();

        let remaining_in = |remaining: &BTreeSet<EdgeId>, node: NodeId| {
            state
                .incidence
                .in_edges(node)
                .into_iter()
                .filter(|e| remaining.contains(e))
                .count()
        };
        let remaining_out = |remaining: &BTreeSet<EdgeId>, node: NodeId| -> Vec<EdgeId> {
            state
                .incidence
                .out_edges(node)
                .into_iter()
                .filter(|e| remaining.contains(e))
                .collect()
        };

        while let Some(&fallback) = remaining.iter().next() {
            let start = remaining
                .iter()
                .copied()
                .find(|id| {
                    let source = state.edges[id].source();
                    remaining_in(&remaining, source) != 1
                        || remaining_out(&remaining, source).len() != 1
                })
                .unwrap_or(fallback);

            let mut chain = Vec::new();
            let mut current = Some(start);
            while let Some(id) = current.take() {
                remaining.remove(&id);
                let edge = &state.edges[&id];
                chain.push(edge.clone());

                let next = edge.target();
                let outs = remaining_out(&remaining, next);
                if outs.len() == 1 && remaining_in(&remaining, next) == 0 {
                    current = outs.first().copied();
                }
            }
            cover.push(chain);
        }
        cover
    }

    // ── Mutators ────────────────────────────────────────────

    /// Insert `node`. Panics if a node with the same identity is present.
    pub fn add_node(&self, node: Node) -> GraphChange {
        self.add_nodes(vec![node])
    }

    pub fn add_nodes(&self, nodes: Vec<Node>) -> GraphChange {
        let count = nodes.len();
        let nodes: BTreeMap<_, _> = nodes.into_iter().map(|n| (n.id(), n)).collect();
        assert_eq!(nodes.len(), count, "add_nodes: repeated node identity");
        self.mutate(|_| GraphChange::AddNodes {
            nodes,
            edges: BTreeMap::new(),
        })
    }

    /// Remove `node` and every edge incident to it.
    pub fn remove_node(&self, node: NodeId) -> GraphChange {
        self.remove_nodes(&BTreeSet::from([node]))
    }

    /// Remove `nodes` and their incident edges as one change. The cascade is
    /// computed once, before anything is removed.
    pub fn remove_nodes(&self, nodes: &BTreeSet<NodeId>) -> GraphChange {
        self.mutate(|state| {
            for id in nodes {
                assert!(
                    state.nodes.contains_key(id),
                    "remove_nodes: node {id:?} is not in the graph"
                );
            }
            let cascade = state.incidence.incident_edges(nodes);
            GraphChange::RemoveNodes {
                nodes: state.node_table(nodes),
                edges: state.edge_table(&cascade),
            }
        })
    }

    /// Insert `edge`. Both endpoints must already be in the graph.
    pub fn add_edge(&self, edge: Edge) -> GraphChange {
        self.add_edges(vec![edge])
    }

    /// Convenience: a plain edge from `source` to `target`.
    pub fn add_edge_from(&self, source: NodeId, target: NodeId) -> GraphChange {
        self.add_edge(Edge::new(source, target))
    }

    pub fn add_edges(&self, edges: Vec<Edge>) -> GraphChange {
        let count = edges.len();
        let edges: BTreeMap<_, _> = edges.into_iter().map(|e| (e.id(), e)).collect();
        assert_eq!(edges.len(), count, "add_edges: repeated edge identity");
        self.mutate(|_| GraphChange::AddEdges { edges })
    }

    pub fn remove_edge(&self, edge: EdgeId) -> GraphChange {
        self.remove_edges(&BTreeSet::from([edge]))
    }

    /// Remove edges only; their endpoints stay.
    pub fn remove_edges(&self, edges: &BTreeSet<EdgeId>) -> GraphChange {
        self.mutate(|state| {
            for id in edges {
                assert!(
                    state.edges.contains_key(id),
                    "remove_edges: edge {id:?} is not in the graph"
                );
            }
            GraphChange::RemoveEdges {
                edges: state.edge_table(edges),
            }
        })
    }

    /// Translate every node in `nodes` by `(dx, dy)`. Edges are untouched.
    pub fn shift_nodes(&self, nodes: &BTreeSet<NodeId>, dx: f64, dy: f64) -> GraphChange {
        self.mutate(|_| GraphChange::ShiftNodes {
            nodes: nodes.clone(),
            dx,
            dy,
        })
    }

    /// Paste `other` into this graph. Everything is copied under fresh
    /// identities, so `other` is never aliased and identities cannot collide.
    /// `other` may be this graph itself.
    ///
    /// A pasted node whose name is already taken is renamed to the lowest
    /// unused integer, keeping names usable as TikZ references.
    pub fn insert_graph(&self, other: &Graph) -> GraphChange {
        let pasted = other.snapshot();
        self.mutate(|state| {
            let mut taken: BTreeSet<String> =
                state.nodes.values().map(tikz::node_name).collect();
            let mut remap = BTreeMap::new();
            let mut nodes = BTreeMap::new();
            for node in &pasted.nodes {
                let mut fresh = node.duplicate();
                if !fresh.name.is_empty() && taken.contains(&fresh.name) {
                    fresh.name = unused_name(&taken);
                }
                taken.insert(tikz::node_name(&fresh));
                remap.insert(node.id(), fresh.id());
                nodes.insert(fresh.id(), fresh);
            }
            let edges = pasted
                .edges
                .iter()
                .filter_map(|e| {
                    let s = remap.get(&e.source())?;
                    let t = remap.get(&e.target())?;
                    Some(e.duplicate_between(*s, *t))
                })
                .map(|e| (e.id(), e))
                .collect();
            GraphChange::AddNodes { nodes, edges }
        })
    }

    /// Mirror `nodes` left-to-right about the vertical midline of their bounds.
    pub fn flip_horizontal_nodes(&self, nodes: &BTreeSet<NodeId>) -> GraphChange {
        self.flip_nodes(nodes, FlipAxis::Horizontal)
    }

    /// Mirror `nodes` top-to-bottom about the horizontal midline of their bounds.
    pub fn flip_vertical_nodes(&self, nodes: &BTreeSet<NodeId>) -> GraphChange {
        self.flip_nodes(nodes, FlipAxis::Vertical)
    }

    fn flip_nodes(&self, nodes: &BTreeSet<NodeId>, axis: FlipAxis) -> GraphChange {
        self.mutate(|state| {
            state.check_nodes(nodes);
            let bounds = state.bounds_for(nodes);
            let mut old_points = BTreeMap::new();
            let mut new_points = BTreeMap::new();
            for node in nodes.iter().filter_map(|id| state.nodes.get(id)) {
                let p = node.point;
                let flipped = match axis {
                    FlipAxis::Horizontal => Point::new(bounds.min_x() + bounds.max_x() - p.x, p.y),
                    FlipAxis::Vertical => Point::new(p.x, bounds.min_y() + bounds.max_y() - p.y),
                };
                old_points.insert(node.id(), p);
                new_points.insert(node.id(), flipped);
            }

            // Edges drawn entirely inside the flipped region bend the other way.
            let mut old_bends = BTreeMap::new();
            let mut new_bends = BTreeMap::new();
            for edge in state.edges.values() {
                if nodes.contains(&edge.source()) && nodes.contains(&edge.target()) {
                    let mirrored = match axis {
                        FlipAxis::Horizontal => edge.bend.mirrored_horizontally(),
                        FlipAxis::Vertical => edge.bend.mirrored_vertically(),
                    };
                    old_bends.insert(edge.id(), edge.bend);
                    new_bends.insert(edge.id(), mirrored);
                }
            }
            GraphChange::FlipNodes {
                axis,
                old_points,
                new_points,
                old_bends,
                new_bends,
            }
        })
    }

    /// Swap source and target of each edge.
    pub fn reverse_edges(&self, edges: &BTreeSet<EdgeId>) -> GraphChange {
        self.mutate(|_| GraphChange::ReverseEdges {
            edges: edges.clone(),
        })
    }

    /// Replace the stored node with the same identity as `node`.
    pub fn set_node(&self, node: Node) -> GraphChange {
        self.mutate(|state| {
            let Some(old) = state.nodes.get(&node.id()) else {
                panic!("set_node: node {:?} is not in the graph", node.id());
            };
            GraphChange::SetNodes {
                old: BTreeMap::from([(old.id(), old.clone())]),
                new: BTreeMap::from([(node.id(), node)]),
            }
        })
    }

    /// Replace data and bend of the stored edge with the same identity.
    pub fn set_edge(&self, edge: Edge) -> GraphChange {
        self.mutate(|state| {
            let Some(old) = state.edges.get(&edge.id()) else {
                panic!("set_edge: edge {:?} is not in the graph", edge.id());
            };
            assert!(
                old.source() == edge.source() && old.target() == edge.target(),
                "set_edge: endpoints of {:?} cannot change",
                edge.id()
            );
            GraphChange::SetEdges {
                old: BTreeMap::from([(old.id(), old.clone())]),
                new: BTreeMap::from([(edge.id(), edge)]),
            }
        })
    }

    pub fn set_data(&self, data: ElementData) -> GraphChange {
        self.mutate(|state| GraphChange::SetData {
            old: state.data.clone(),
            new: data,
        })
    }

    /// Set or clear the explicit bounding box.
    pub fn set_bounding_box(&self, bounding_box: Option<Rect>) -> GraphChange {
        self.mutate(|state| GraphChange::SetBoundingBox {
            old: state.bounding_box,
            new: bounding_box,
        })
    }

    /// Map every node position through `t`. Not undoable; the caller keeps it
    /// out of the undo history.
    pub fn apply_transformer(&self, t: &dyn Transformer) {
        let mut state = self.lock();
        for node in state.nodes.values_mut() {
            node.point = t.to_screen(node.point);
        }
        state.cache.dirty = true;
        tracing::debug!(nodes = state.nodes.len(), "applied transformer");
    }

    /// Redo `change`, or undo it when given `change.inverse()`.
    ///
    /// Succeeds provided the graph is in the state the change was produced
    /// against (or its inverse left behind).
    pub fn apply_change(&self, change: &GraphChange) {
        let mut state = self.lock();
        state.check(change);
        state.apply(change);
        tracing::debug!(kind = change.kind(), "replayed change");
    }

    // ── Import / export ─────────────────────────────────────

    /// Plain copy of the whole graph, ordered by identity.
    pub fn snapshot(&self) -> GraphSnapshot {
        let state = self.lock();
        GraphSnapshot {
            nodes: state.nodes.values().cloned().collect(),
            edges: state.edges.values().cloned().collect(),
            data: state.data.clone(),
            bounding_box: state.bounding_box,
        }
    }

    /// Build a graph from an external snapshot, checking it is well formed.
    /// Identities in the snapshot are preserved.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Graph> {
        let mut state = GraphState {
            data: snapshot.data,
            bounding_box: snapshot.bounding_box,
            ..GraphState::default()
        };
        for node in snapshot.nodes {
            if state.nodes.contains_key(&node.id()) {
                return Err(GraphError::DuplicateNode(node.id()));
            }
            node.id().reserve();
            state.insert_node(node);
        }
        for edge in snapshot.edges {
            if state.edges.contains_key(&edge.id()) {
                return Err(GraphError::DuplicateEdge(edge.id()));
            }
            for node in [edge.source(), edge.target()] {
                if !state.nodes.contains_key(&node) {
                    return Err(GraphError::DanglingEdge {
                        edge: edge.id(),
                        node,
                    });
                }
            }
            edge.id().reserve();
            state.insert_edge(edge);
        }
        Ok(Graph {
            state: Mutex::new(state),
        })
    }

    /// Check every structural invariant: endpoints are members and the
    /// incidence index matches the edge set exactly.
    pub fn validate(&self) -> Result<()> {
        let state = self.lock();
        for edge in state.edges.values() {
            for node in [edge.source(), edge.target()] {
                if !state.nodes.contains_key(&node) {
                    return Err(GraphError::DanglingEdge {
                        edge: edge.id(),
                        node,
                    });
                }
            }
        }
        if state.incidence != IncidenceIndex::from_edges(state.edges.values()) {
            return Err(GraphError::Inconsistent(
                "incidence index does not match edge set".to_string(),
            ));
        }
        Ok(())
    }

    /// TikZ code sufficient to reconstruct the graph.
    pub fn tikz(&self) -> String {
        self.tikz_with(&TikzOptions::default())
    }

    pub fn tikz_with(&self, options: &TikzOptions) -> String {
        tikz::render(&self.snapshot(), options)
    }
}

/// Lowest non-negative integer, as a string, that is not in `taken`.
fn unused_name(taken: &BTreeSet<String>) -> String {
    let mut n: u64 = 0;
    loop {
        let name = n.to_string();
        if !taken.contains(&name) {
            return name;
        }
        n += 1;
    }
}

impl GraphState {
    fn refresh_cache(&mut self) {
        if self.cache.dirty {
            self.cache.nodes = self.nodes.values().cloned().collect();
            self.cache.edges = self.edges.values().cloned().collect();
            self.cache.dirty = false;
            tracing::trace!(
                nodes = self.cache.nodes.len(),
                edges = self.cache.edges.len(),
                "rebuilt view cache"
            );
        }
    }

    fn bounds_for(&self, nodes: &BTreeSet<NodeId>) -> Rect {
        Rect::enclosing(
            nodes
                .iter()
                .filter_map(|id| self.nodes.get(id))
                .map(|n| n.point),
        )
    }

    fn node_table(&self, nodes: &BTreeSet<NodeId>) -> BTreeMap<NodeId, Node> {
        nodes
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|n| (n.id(), n.clone()))
            .collect()
    }

    fn edge_table(&self, edges: &BTreeSet<EdgeId>) -> BTreeMap<EdgeId, Edge> {
        edges
            .iter()
            .filter_map(|id| self.edges.get(id))
            .map(|e| (e.id(), e.clone()))
            .collect()
    }

    fn insert_node(&mut self, node: Node) {
        let id = node.id();
        let previous = self.nodes.insert(id, node);
        assert!(previous.is_none(), "node {id:?} is already in the graph");
        self.cache.dirty = true;
    }

    fn take_node(&mut self, id: NodeId) -> Node {
        assert!(
            !self.incidence.touches(id),
            "node {id:?} still has incident edges"
        );
        let Some(node) = self.nodes.remove(&id) else {
            panic!("node {id:?} is not in the graph");
        };
        self.cache.dirty = true;
        node
    }

    fn insert_edge(&mut self, edge: Edge) {
        let id = edge.id();
        assert!(
            self.nodes.contains_key(&edge.source()) && self.nodes.contains_key(&edge.target()),
            "edge {id:?} has an endpoint outside the graph"
        );
        self.incidence.insert(&edge);
        let previous = self.edges.insert(id, edge);
        assert!(previous.is_none(), "edge {id:?} is already in the graph");
        self.cache.dirty = true;
    }

    fn take_edge(&mut self, id: EdgeId) -> Edge {
        let Some(edge) = self.edges.remove(&id) else {
            panic!("edge {id:?} is not in the graph");
        };
        self.incidence.remove(&edge);
        self.cache.dirty = true;
        edge
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.cache.dirty = true;
        match self.nodes.get_mut(&id) {
            Some(node) => node,
            None => panic!("node {id:?} is not in the graph"),
        }
    }

    fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        self.cache.dirty = true;
        match self.edges.get_mut(&id) {
            Some(edge) => edge,
            None => panic!("edge {id:?} is not in the graph"),
        }
    }

    fn check_nodes<'a>(&self, ids: impl IntoIterator<Item = &'a NodeId>) {
        for id in ids {
            assert!(self.nodes.contains_key(id), "node {id:?} is not in the graph");
        }
    }

    fn check_edges<'a>(&self, ids: impl IntoIterator<Item = &'a EdgeId>) {
        for id in ids {
            assert!(self.edges.contains_key(id), "edge {id:?} is not in the graph");
        }
    }

    /// `edge` is new and each endpoint is a member or satisfies `pending`.
    fn check_new_edge(&self, edge: &Edge, pending: impl Fn(NodeId) -> bool) {
        let id = edge.id();
        assert!(
            !self.edges.contains_key(&id),
            "edge {id:?} is already in the graph"
        );
        for node in [edge.source(), edge.target()] {
            assert!(
                self.nodes.contains_key(&node) || pending(node),
                "edge {id:?} has an endpoint outside the graph"
            );
        }
    }

    /// Panic unless `change` applies cleanly to the current state. Runs before
    /// anything is touched, so a rejected change leaves the graph unchanged.
    fn check(&self, change: &GraphChange) {
        match change {
            GraphChange::AddNodes { nodes, edges } => {
                for id in nodes.keys() {
                    assert!(
                        !self.nodes.contains_key(id),
                        "node {id:?} is already in the graph"
                    );
                }
                for edge in edges.values() {
                    self.check_new_edge(edge, |n| nodes.contains_key(&n));
                }
            }
            GraphChange::RemoveNodes { nodes, edges } => {
                self.check_nodes(nodes.keys());
                self.check_edges(edges.keys());
                let cascade = self.incidence.incident_edges(nodes.keys());
                assert!(
                    cascade.iter().all(|id| edges.contains_key(id)),
                    "removed nodes still have incident edges"
                );
            }
            GraphChange::AddEdges { edges } => {
                for edge in edges.values() {
                    self.check_new_edge(edge, |_| false);
                }
            }
            GraphChange::RemoveEdges { edges } => self.check_edges(edges.keys()),
            GraphChange::ShiftNodes { nodes, .. } => self.check_nodes(nodes),
            GraphChange::FlipNodes {
                new_points,
                new_bends,
                ..
            } => {
                self.check_nodes(new_points.keys());
                self.check_edges(new_bends.keys());
            }
            GraphChange::ReverseEdges { edges } => self.check_edges(edges),
            GraphChange::SetNodes { new, .. } => self.check_nodes(new.keys()),
            GraphChange::SetEdges { new, .. } => {
                for edge in new.values() {
                    let Some(old) = self.edges.get(&edge.id()) else {
                        panic!("edge {:?} is not in the graph", edge.id());
                    };
                    assert!(
                        old.source() == edge.source() && old.target() == edge.target(),
                        "endpoints of {:?} cannot change",
                        edge.id()
                    );
                }
            }
            GraphChange::SetData { .. } | GraphChange::SetBoundingBox { .. } => {}
        }
    }

    /// Effect `change` against the current state. Nodes are inserted before
    /// edges and edges removed before nodes.
    fn apply(&mut self, change: &GraphChange) {
        match change {
            GraphChange::AddNodes { nodes, edges } => {
                for node in nodes.values() {
                    self.insert_node(node.clone());
                }
                for edge in edges.values() {
                    self.insert_edge(edge.clone());
                }
            }
            GraphChange::RemoveNodes { nodes, edges } => {
                for id in edges.keys() {
                    self.take_edge(*id);
                }
                for id in nodes.keys() {
                    self.take_node(*id);
                }
            }
            GraphChange::AddEdges { edges } => {
                for edge in edges.values() {
                    self.insert_edge(edge.clone());
                }
            }
            GraphChange::RemoveEdges { edges } => {
                for id in edges.keys() {
                    self.take_edge(*id);
                }
            }
            GraphChange::ShiftNodes { nodes, dx, dy } => {
                for id in nodes {
                    let node = self.node_mut(*id);
                    node.point = node.point.translate(*dx, *dy);
                }
            }
            GraphChange::FlipNodes {
                new_points,
                new_bends,
                ..
            } => {
                for (id, point) in new_points {
                    self.node_mut(*id).point = *point;
                }
                for (id, bend) in new_bends {
                    self.edge_mut(*id).bend = *bend;
                }
            }
            GraphChange::ReverseEdges { edges } => {
                for id in edges {
                    let edge = self.take_edge(*id);
                    self.insert_edge(edge.reversed());
                }
            }
            GraphChange::SetNodes { new, .. } => {
                for (id, node) in new {
                    *self.node_mut(*id) = node.clone();
                }
            }
            GraphChange::SetEdges { new, .. } => {
                for (id, edge) in new {
                    let current = self.edge_mut(*id);
                    current.data = edge.data.clone();
                    current.bend = edge.bend;
                }
            }
            GraphChange::SetData { new, .. } => {
                self.data = new.clone();
            }
            GraphChange::SetBoundingBox { new, .. } => {
                self.bounding_box = *new;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::ScaleTransformer;

    fn node_at(x: f64, y: f64) -> Node {
        Node::new(Point::new(x, y))
    }

    #[test]
    fn test_add_node_and_undo() {
        let graph = Graph::new();
        let n = node_at(1.0, 2.0);
        let id = n.id();
        let change = graph.add_node(n.clone());
        assert_eq!(graph.node(id), Some(n));

        graph.apply_change(&change.inverse());
        assert_eq!(graph.node_count(), 0);

        graph.apply_change(&change);
        assert!(graph.contains_node(id));
        graph.validate().unwrap();
    }

    #[test]
    fn test_views_are_snapshots() {
        let graph = Graph::new();
        graph.add_node(node_at(0.0, 0.0));
        let before = graph.nodes();
        graph.add_node(node_at(1.0, 1.0));
        assert_eq!(before.len(), 1);
        assert_eq!(graph.nodes().len(), 2);
    }

    #[test]
    fn test_views_reuse_cache_until_mutation() {
        let graph = Graph::new();
        graph.add_node(node_at(0.0, 0.0));
        let first = graph.nodes();
        let second = graph.nodes();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_remove_edges_keeps_nodes() {
        let graph = Graph::new();
        let (a, b) = (node_at(0.0, 0.0), node_at(1.0, 0.0));
        let (ida, idb) = (a.id(), b.id());
        graph.add_nodes(vec![a, b]);
        let e = Edge::new(ida, idb);
        let eid = e.id();
        graph.add_edge(e);

        let change = graph.remove_edge(eid);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.out_edges(ida).is_empty());

        graph.apply_change(&change.inverse());
        assert_eq!(graph.out_edges(ida), BTreeSet::from([eid]));
        assert_eq!(graph.in_edges(idb), BTreeSet::from([eid]));
    }

    #[test]
    #[should_panic(expected = "endpoint outside the graph")]
    fn test_add_edge_requires_members() {
        let graph = Graph::new();
        let a = node_at(0.0, 0.0);
        let outsider = node_at(5.0, 5.0);
        let ida = a.id();
        graph.add_node(a);
        graph.add_edge_from(ida, outsider.id());
    }

    #[test]
    #[should_panic(expected = "is not in the graph")]
    fn test_remove_missing_node_panics() {
        let graph = Graph::new();
        graph.remove_node(NodeId::fresh());
    }

    #[test]
    fn test_shift_nodes_round_trip() {
        let graph = Graph::new();
        let n = node_at(1.0, 1.0);
        let id = n.id();
        graph.add_node(n);
        let change = graph.shift_nodes(&BTreeSet::from([id]), 2.0, -3.0);
        assert_eq!(graph.node(id).unwrap().point, Point::new(3.0, -2.0));
        graph.apply_change(&change.inverse());
        assert_eq!(graph.node(id).unwrap().point, Point::new(1.0, 1.0));
    }

    /// Runs `f`, which must panic, and returns the graph's snapshot afterwards.
    fn after_rejected(graph: &Graph, f: impl FnOnce(&Graph)) -> GraphSnapshot {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(graph)));
        assert!(result.is_err(), "expected the mutation to be rejected");
        graph.snapshot()
    }

    #[test]
    fn test_rejected_shift_leaves_graph_unchanged() {
        let graph = Graph::new();
        let a = node_at(1.0, 1.0);
        let ida = a.id();
        graph.add_node(a);
        let before = graph.snapshot();

        let after = after_rejected(&graph, |g| {
            g.shift_nodes(&BTreeSet::from([ida, NodeId::fresh()]), 5.0, 5.0);
        });
        assert_eq!(after, before);
        assert_eq!(graph.node(ida).unwrap().point, Point::new(1.0, 1.0));
        graph.validate().unwrap();

        // The graph stays usable after the rejected call.
        graph.shift_nodes(&BTreeSet::from([ida]), 1.0, 0.0);
        assert_eq!(graph.node(ida).unwrap().point, Point::new(2.0, 1.0));
    }

    #[test]
    fn test_rejected_edge_batch_adds_nothing() {
        let graph = Graph::new();
        let (a, b) = (node_at(0.0, 0.0), node_at(1.0, 0.0));
        let (ida, idb) = (a.id(), b.id());
        graph.add_nodes(vec![a, b]);
        let before = graph.snapshot();

        let after = after_rejected(&graph, |g| {
            g.add_edges(vec![Edge::new(ida, idb), Edge::new(idb, NodeId::fresh())]);
        });
        assert_eq!(after, before);
        assert!(graph.out_edges(ida).is_empty());
        graph.validate().unwrap();

        let edge = Edge::new(ida, idb);
        let after = after_rejected(&graph, |g| {
            g.add_edges(vec![edge.clone(), edge.clone()]);
        });
        assert_eq!(after, before);
    }

    #[test]
    fn test_rejected_flip_and_reverse_leave_graph_unchanged() {
        let graph = Graph::new();
        let (a, b) = (node_at(0.0, 0.0), node_at(2.0, 0.0));
        let (ida, idb) = (a.id(), b.id());
        graph.add_nodes(vec![a, b]);
        let e = Edge::new(ida, idb);
        let eid = e.id();
        graph.add_edge(e);
        let before = graph.snapshot();

        let after = after_rejected(&graph, |g| {
            g.flip_horizontal_nodes(&BTreeSet::from([ida, idb, NodeId::fresh()]));
        });
        assert_eq!(after, before);

        let after = after_rejected(&graph, |g| {
            g.reverse_edges(&BTreeSet::from([eid, EdgeId::fresh()]));
        });
        assert_eq!(after, before);
        graph.validate().unwrap();
    }

    #[test]
    fn test_replaying_a_stale_change_is_rejected_whole() {
        let graph = Graph::new();
        let (a, b) = (node_at(0.0, 0.0), node_at(1.0, 0.0));
        let (ida, idb) = (a.id(), b.id());
        let add = graph.add_nodes(vec![a, b]);
        graph.remove_node(idb);
        let before = graph.snapshot();

        // `a` is still present, so re-adding both must fail before adding `b`.
        let after = after_rejected(&graph, |g| g.apply_change(&add));
        assert_eq!(after, before);
        assert!(graph.contains_node(ida));
        assert!(!graph.contains_node(idb));
    }

    #[test]
    fn test_bounds_of_empty_graph_is_zero() {
        assert_eq!(Graph::new().bounds(), Rect::ZERO);
    }

    #[test]
    fn test_set_node_and_edge_properties() {
        let graph = Graph::new();
        let a = node_at(0.0, 0.0).with_label("a");
        let ida = a.id();
        graph.add_node(a.clone());
        let loop_edge = Edge::new(ida, ida);
        graph.add_edge(loop_edge.clone());

        let renamed = a.clone().with_label("alpha");
        let node_change = graph.set_node(renamed.clone());
        assert_eq!(graph.node(ida), Some(renamed));

        let bent = loop_edge.clone().with_bend(Bend::Basic { bend: 45 });
        let edge_change = graph.set_edge(bent);
        assert_eq!(
            graph.edge(loop_edge.id()).unwrap().bend,
            Bend::Basic { bend: 45 }
        );

        graph.apply_change(&edge_change.inverse());
        graph.apply_change(&node_change.inverse());
        assert_eq!(graph.node(ida), Some(a));
        assert_eq!(graph.edge(loop_edge.id()), Some(loop_edge));
    }

    #[test]
    fn test_reverse_edges_updates_incidence() {
        let graph = Graph::new();
        let (a, b) = (node_at(0.0, 0.0), node_at(1.0, 0.0));
        let (ida, idb) = (a.id(), b.id());
        graph.add_nodes(vec![a, b]);
        let e = Edge::new(ida, idb).with_bend(Bend::Basic { bend: 30 });
        let eid = e.id();
        graph.add_edge(e);

        let change = graph.reverse_edges(&BTreeSet::from([eid]));
        let reversed = graph.edge(eid).unwrap();
        assert_eq!(reversed.source(), idb);
        assert_eq!(reversed.bend, Bend::Basic { bend: -30 });
        assert_eq!(graph.out_edges(idb), BTreeSet::from([eid]));
        graph.validate().unwrap();

        graph.apply_change(&change.inverse());
        assert_eq!(graph.edge(eid).unwrap().source(), ida);
        assert_eq!(graph.out_edges(ida), BTreeSet::from([eid]));
    }

    #[test]
    fn test_bounding_box_and_data_changes() {
        let graph = Graph::new();
        let bbox = Rect::new(-1.0, -1.0, 2.0, 2.0);
        let change = graph.set_bounding_box(Some(bbox));
        assert!(graph.has_bounding_box());
        graph.apply_change(&change.inverse());
        assert_eq!(graph.bounding_box(), None);

        let data: ElementData = [("scale", "2")].into_iter().collect();
        let change = graph.set_data(data.clone());
        assert_eq!(graph.data(), data);
        graph.apply_change(&change.inverse());
        assert!(graph.data().is_empty());
    }

    #[test]
    fn test_apply_transformer_moves_nodes() {
        let graph = Graph::new();
        let n = node_at(1.0, 2.0);
        let id = n.id();
        graph.add_node(n);
        graph.apply_transformer(&ScaleTransformer::new(Point::new(10.0, 10.0), 2.0));
        assert_eq!(graph.node(id).unwrap().point, Point::new(12.0, 14.0));
        assert_eq!(graph.nodes()[0].point, Point::new(12.0, 14.0));
    }

    #[test]
    fn test_from_snapshot_rejects_dangling_edge() {
        let a = node_at(0.0, 0.0);
        let ghost = NodeId::fresh();
        let snapshot = GraphSnapshot {
            edges: vec![Edge::new(a.id(), ghost)],
            nodes: vec![a],
            ..GraphSnapshot::default()
        };
        let err = Graph::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, GraphError::DanglingEdge { node, .. } if node == ghost));
    }

    #[test]
    fn test_from_snapshot_rejects_duplicate_node() {
        let a = node_at(0.0, 0.0);
        let snapshot = GraphSnapshot {
            nodes: vec![a.clone(), a],
            ..GraphSnapshot::default()
        };
        assert!(matches!(
            Graph::from_snapshot(snapshot),
            Err(GraphError::DuplicateNode(_))
        ));
    }
}
