//! Graph builders shared by the unit tests

use std::collections::BTreeSet;

use crate::graph::Graph;
use crate::model::{Edge, EdgeId, Node, NodeId, Point};

/// Add a named node at `(x, y)` and return its id.
pub fn add_node(graph: &Graph, name: &str, x: f64, y: f64) -> NodeId {
    let node = Node::new(Point::new(x, y)).with_name(name);
    let id = node.id();
    graph.add_node(node);
    id
}

/// Add a plain edge and return its id.
pub fn add_edge(graph: &Graph, source: NodeId, target: NodeId) -> EdgeId {
    let edge = Edge::new(source, target);
    let id = edge.id();
    graph.add_edge(edge);
    id
}

/// A → B → C laid out left to right.
pub struct Chain {
    pub graph: Graph,
    pub a: NodeId,
    pub b: NodeId,
    pub c: NodeId,
    pub ab: EdgeId,
    pub bc: EdgeId,
}

pub fn chain() -> Chain {
    let graph = Graph::new();
    let a = add_node(&graph, "A", 0.0, 0.0);
    let b = add_node(&graph, "B", 1.0, 0.0);
    let c = add_node(&graph, "C", 2.0, 0.0);
    let ab = add_edge(&graph, a, b);
    let bc = add_edge(&graph, b, c);
    Chain {
        graph,
        a,
        b,
        c,
        ab,
        bc,
    }
}

/// A denser graph: square a-b-c-d with both diagonals, a self-loop on `a`
/// and a parallel edge a → b. Returns the graph and its node ids in order.
pub fn dense() -> (Graph, Vec<NodeId>) {
    let graph = Graph::new();
    let ids = vec![
        add_node(&graph, "a", 0.0, 0.0),
        add_node(&graph, "b", 2.0, 0.0),
        add_node(&graph, "c", 2.0, 2.0),
        add_node(&graph, "d", 0.0, 2.0),
    ];
    for (s, t) in [(0, 1), (1, 2), (2, 3), (3, 0), (0, 2), (1, 3), (0, 0), (0, 1)] {
        add_edge(&graph, ids[s], ids[t]);
    }
    (graph, ids)
}

/// Per-node (in, out) edge sets, for comparing incidence before and after.
pub fn incidence_of(graph: &Graph) -> Vec<(NodeId, BTreeSet<EdgeId>, BTreeSet<EdgeId>)> {
    graph
        .node_ids()
        .into_iter()
        .map(|id| (id, graph.in_edges(id), graph.out_edges(id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_builder() {
        let chain = chain();
        assert_eq!(chain.graph.node_count(), 3);
        assert_eq!(chain.graph.edge_count(), 2);
        assert_eq!(chain.graph.out_edges(chain.a), BTreeSet::from([chain.ab]));
        assert_eq!(chain.graph.in_edges(chain.c), BTreeSet::from([chain.bc]));
    }
}
