//! Undo/redo stacks over graph changes

use crate::change::GraphChange;
use crate::graph::Graph;

/// Undo manager for a single [`Graph`].
///
/// Changes are recorded after the graph already applied them. `undo` replays
/// the inverse of the newest change; `redo` replays the change itself.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<GraphChange>,
    redo_stack: Vec<GraphChange>,
    limit: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    /// Keep at most `limit` undo steps; older ones are dropped.
    pub fn with_limit(limit: usize) -> Self {
        History {
            limit: Some(limit),
            ..History::default()
        }
    }

    /// Record a change that was just applied. Clears the redo stack.
    pub fn record(&mut self, change: GraphChange) {
        if change.is_noop() {
            return;
        }
        self.undo_stack.push(change);
        self.redo_stack.clear();
        if let Some(limit) = self.limit {
            if self.undo_stack.len() > limit {
                let excess = self.undo_stack.len() - limit;
                self.undo_stack.drain(0..excess);
            }
        }
    }

    /// Undo the newest change. Returns false when there is nothing to undo.
    pub fn undo(&mut self, graph: &Graph) -> bool {
        let Some(change) = self.undo_stack.pop() else {
            tracing::warn!("nothing to undo");
            return false;
        };
        graph.apply_change(&change.inverse());
        tracing::debug!(kind = change.kind(), "undo");
        self.redo_stack.push(change);
        true
    }

    /// Redo the most recently undone change.
    pub fn redo(&mut self, graph: &Graph) -> bool {
        let Some(change) = self.redo_stack.pop() else {
            tracing::warn!("nothing to redo");
            return false;
        };
        graph.apply_change(&change);
        tracing::debug!(kind = change.kind(), "redo");
        self.undo_stack.push(change);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }
}
