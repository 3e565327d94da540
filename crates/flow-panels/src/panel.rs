use crate::form::{FormError, FormState};
use crate::key_value::KeyValueRows;
use crate::schema::VisualField;
use flow_graph::{NodeKind, NodeModel};

pub const NODE_NAME: &str = "node_name";
pub const OUTPUT_VARIABLE_PATH: &str = "output_variable_path";

/// Form pieces every panel carries: the form itself plus the node's
/// `input_map` rows.
#[derive(Debug, Default, Clone)]
pub struct PanelCore {
    pub form: FormState,
    pub input_map: KeyValueRows,
}

impl PanelCore {
    /// Builds the form from the shared fields plus `fields`, seeded from `node`.
    pub fn seeded(node: &NodeModel, fields: Vec<VisualField>) -> Self {
        let mut all = vec![
            VisualField::text(NODE_NAME).required(),
            VisualField::text(OUTPUT_VARIABLE_PATH),
        ];
        all.extend(fields);
        let mut form = FormState::new(all);
        form.update_value(NODE_NAME, node.node_name.clone());
        form.update_value(
            OUTPUT_VARIABLE_PATH,
            node.output_variable_path.clone().unwrap_or_default(),
        );
        Self {
            form,
            input_map: KeyValueRows::from_map(&node.input_map),
        }
    }

    /// Copies the shared fields back onto a clone of `node`.
    pub fn apply_common(&self, node: &NodeModel) -> Result<NodeModel, FormError> {
        let mut updated = node.clone();
        updated.node_name = self.form.string(NODE_NAME)?.trim().to_string();
        updated.output_variable_path = self.form.optional_string(OUTPUT_VARIABLE_PATH)?;
        updated.input_map = self.input_map.to_map();
        Ok(updated)
    }
}

/// Contract of a node configuration panel.
///
/// A panel rebuilds its form whenever a node is loaded into it and maps the
/// form back onto that node on save.
pub trait BaseSidePanel: std::fmt::Debug {
    fn kind(&self) -> NodeKind;

    fn core(&self) -> &PanelCore;

    fn core_mut(&mut self) -> &mut PanelCore;

    /// Rebuilds the form from `node`.
    fn initialize_form(&mut self, node: &NodeModel);

    /// Maps the form values onto a copy of `node`.
    fn create_updated_node(&self, node: &NodeModel) -> Result<NodeModel, FormError>;

    fn form(&self) -> &FormState {
        &self.core().form
    }

    fn form_mut(&mut self) -> &mut FormState {
        &mut self.core_mut().form
    }

    fn input_map_mut(&mut self) -> &mut KeyValueRows {
        &mut self.core_mut().input_map
    }

    fn is_valid(&self) -> bool {
        self.form().is_valid()
    }

    /// The updated node, or `node` unchanged while the form is invalid.
    fn on_save(&self, node: &NodeModel) -> NodeModel {
        if !self.is_valid() {
            tracing::debug!(node_id = %node.id, errors = ?self.form().errors, "Form invalid, not saving");
            return node.clone();
        }
        match self.create_updated_node(node) {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(node_id = %node.id, error = %e, "Could not apply form to node");
                node.clone()
            }
        }
    }
}

pub(crate) fn kind_mismatch(expected: NodeKind, node: &NodeModel) -> FormError {
    FormError::KindMismatch {
        expected: expected.as_str(),
        found: node.kind().as_str(),
    }
}
