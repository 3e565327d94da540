use crate::panel::BaseSidePanel;
use crate::panels::panel_for;
use flow_graph::{EditorConfig, FlowStore, NodeId, UpdateNodeOptions};

/// Hosts the panel of the selected node and decides when it saves.
///
/// Saving happens implicitly: when another node is selected, on Escape and
/// whenever the host fires its periodic autosave trigger.
#[derive(Debug)]
pub struct PanelShell {
    selected: Option<NodeId>,
    panel: Option<Box<dyn BaseSidePanel>>,
    is_updating_node: bool,
    is_autosaving: bool,
    autosave_on_escape: bool,
}

impl Default for PanelShell {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl PanelShell {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            selected: None,
            panel: None,
            is_updating_node: false,
            is_autosaving: false,
            autosave_on_escape: config.autosave_on_escape,
        }
    }

    pub fn selected_node(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn panel(&self) -> Option<&dyn BaseSidePanel> {
        self.panel.as_deref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut (dyn BaseSidePanel + 'static)> {
        self.panel.as_deref_mut()
    }

    pub fn is_updating_node(&self) -> bool {
        self.is_updating_node
    }

    pub fn is_autosaving(&self) -> bool {
        self.is_autosaving
    }

    /// Saves the open node, then opens `node_id` (or nothing).
    ///
    /// Re-selecting the open node is a no-op.
    pub fn select_node(&mut self, store: &mut FlowStore, node_id: Option<&NodeId>) {
        if self.selected.as_ref() == node_id {
            return;
        }
        if self.selected.is_some() {
            self.save(store);
        }
        self.open(store, node_id);
    }

    /// Writes the panel's form back into the store.
    ///
    /// Returns true when the node changed.
    pub fn save(&mut self, store: &mut FlowStore) -> bool {
        if self.is_updating_node {
            tracing::debug!("Save requested while a node update is in flight");
            return false;
        }
        let (Some(node_id), Some(panel)) = (&self.selected, &self.panel) else {
            return false;
        };
        let Some(node) = store.node(node_id).cloned() else {
            tracing::warn!(node_id = %node_id, "Selected node no longer exists");
            return false;
        };
        let updated = panel.on_save(&node);
        if updated == node {
            return false;
        }

        self.is_updating_node = true;
        let applied = store.update_node(updated, UpdateNodeOptions::default());
        self.is_updating_node = false;

        // The store may normalize what it stores; mirror that in the form.
        if applied {
            if let (Some(panel), Some(node)) = (self.panel.as_mut(), store.node(node_id)) {
                panel.initialize_form(node);
            }
            tracing::debug!(node_id = %node_id, "Saved node from panel");
        }
        applied
    }

    /// Saves (when configured to) and closes the panel.
    pub fn on_escape(&mut self, store: &mut FlowStore) -> bool {
        let saved = self.autosave_on_escape && self.save(store);
        self.close();
        saved
    }

    /// Periodic save that never re-enters itself or a running update.
    pub fn on_autosave_trigger(&mut self, store: &mut FlowStore) -> bool {
        if self.is_autosaving || self.is_updating_node {
            return false;
        }
        self.is_autosaving = true;
        let saved = self.save(store);
        self.is_autosaving = false;
        saved
    }

    pub fn close(&mut self) {
        self.selected = None;
        self.panel = None;
    }

    fn open(&mut self, store: &FlowStore, node_id: Option<&NodeId>) {
        self.close();
        let Some(node_id) = node_id else {
            return;
        };
        let Some(node) = store.node(node_id) else {
            tracing::warn!(node_id = %node_id, "Cannot open panel for unknown node");
            return;
        };
        self.selected = Some(node_id.clone());
        self.panel = panel_for(node.kind()).map(|mut panel| {
            panel.initialize_form(node);
            panel
        });
    }
}
