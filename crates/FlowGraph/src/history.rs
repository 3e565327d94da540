use crate::config::EditorConfig;
use crate::model::FlowModel;
use crate::store::FlowStore;

/// Undo/redo over whole-flow snapshots.
///
/// Every snapshot is a structural clone of the [`FlowModel`], so restoring one
/// brings back every id exactly. The undo stack is bounded by `max_history`;
/// the oldest snapshot is dropped first.
#[derive(Clone, Debug)]
pub struct History {
    undo_stack: Vec<FlowModel>,
    redo_stack: Vec<FlowModel>,
    pub max_history: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_history: 50,
        }
    }
}

impl History {
    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: Vec::with_capacity(max_history),
            redo_stack: Vec::new(),
            max_history,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.max_history)
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

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Records `state` as the point to return to on the next undo.
    ///
    /// Call with the state as it was *before* the mutation. Starts a new
    /// timeline, so the redo stack is cleared.
    pub fn on_state_changed(&mut self, state: &FlowModel) {
        if self.max_history == 0 {
            return;
        }
        while self.undo_stack.len() >= self.max_history {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(state.clone());
        self.redo_stack.clear();
        tracing::trace!(depth = self.undo_stack.len(), "History snapshot taken");
    }

    /// Restores the last recorded state. Returns false if nothing to undo.
    pub fn on_undo(&mut self, store: &mut FlowStore) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(store.get_flow_state());
        store.set_flow(previous);
        true
    }

    /// Re-applies the last undone state. Returns false if nothing to redo.
    pub fn on_redo(&mut self, store: &mut FlowStore) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(store.get_flow_state());
        store.set_flow(next);
        true
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
