use crate::form::FormError;
use crate::key_value::KeyValueRows;
use crate::panel::{BaseSidePanel, PanelCore, kind_mismatch};
use crate::schema::{FieldType, Validator, VisualField};
use flow_graph::payload::{EndData, StartData};
use flow_graph::{NodeKind, NodeModel, NodePayload};
use serde_json::Value;

const INITIAL_STATE: &str = "initial_state";

/// Edits the flow's initial state as JSON text.
#[derive(Debug, Default)]
pub struct StartPanel {
    core: PanelCore,
    invalid_json: bool,
}

impl StartPanel {
    /// True when the node's stored state could not be read and `{}` was
    /// shown instead.
    pub fn has_invalid_json(&self) -> bool {
        self.invalid_json
    }
}

impl BaseSidePanel for StartPanel {
    panel_plumbing!(NodeKind::Start);

    fn initialize_form(&mut self, node: &NodeModel) {
        self.core = PanelCore::seeded(
            node,
            vec![VisualField::new(INITIAL_STATE, FieldType::Json).validate(Validator::JsonObject)],
        );
        self.invalid_json = false;
        let state = match &node.data {
            NodePayload::Start(data) => match &data.initial_state {
                Value::Object(_) => data.initial_state.clone(),
                Value::Null => Value::Object(Default::default()),
                // Older documents store the state as JSON text
                Value::String(text) => match serde_json::from_str::<Value>(text) {
                    Ok(value @ Value::Object(_)) => value,
                    _ => {
                        self.invalid_json = true;
                        Value::Object(Default::default())
                    }
                },
                _ => {
                    self.invalid_json = true;
                    Value::Object(Default::default())
                }
            },
            _ => Value::Object(Default::default()),
        };
        if self.invalid_json {
            tracing::warn!(node_id = %node.id, "Start node state is not a JSON object, showing {{}}");
        }
        let text = serde_json::to_string_pretty(&state).unwrap_or_else(|_| "{}".to_string());
        self.core.form.update_value(INITIAL_STATE, text);
    }

    fn create_updated_node(&self, node: &NodeModel) -> Result<NodeModel, FormError> {
        if node.kind() != NodeKind::Start {
            return Err(kind_mismatch(NodeKind::Start, node));
        }
        let data = StartData {
            initial_state: self.core.form.json_object(INITIAL_STATE)?,
        };
        let mut updated = self.core.apply_common(node)?;
        updated.data = NodePayload::Start(data);
        Ok(updated)
    }
}

/// Maps final state variables to the flow's outputs.
#[derive(Debug, Default)]
pub struct EndPanel {
    core: PanelCore,
    output_map: KeyValueRows,
}

impl EndPanel {
    pub fn output_map_mut(&mut self) -> &mut KeyValueRows {
        &mut self.output_map
    }
}

impl BaseSidePanel for EndPanel {
    panel_plumbing!(NodeKind::End);

    fn initialize_form(&mut self, node: &NodeModel) {
        self.core = PanelCore::seeded(node, Vec::new());
        self.output_map = match &node.data {
            NodePayload::End(data) => KeyValueRows::from_map(&data.output_map),
            _ => KeyValueRows::default(),
        };
    }

    fn create_updated_node(&self, node: &NodeModel) -> Result<NodeModel, FormError> {
        if node.kind() != NodeKind::End {
            return Err(kind_mismatch(NodeKind::End, node));
        }
        let data = EndData {
            output_map: self.output_map.to_map(),
        };
        let mut updated = self.core.apply_common(node)?;
        updated.data = NodePayload::End(data);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn start_with(state: Value) -> NodeModel {
        NodeModel::new(NodeKind::Start, "Start").with_data(NodePayload::Start(StartData {
            initial_state: state,
        }))
    }

    #[test]
    fn test_malformed_state_falls_back_to_empty_object() {
        let node = start_with(json!("{not json"));
        let mut panel = StartPanel::default();
        panel.initialize_form(&node);

        assert!(panel.has_invalid_json());
        assert!(panel.is_valid());
        let updated = panel.on_save(&node);
        assert_eq!(updated.data, NodePayload::Start(StartData::default()));
    }

    #[test]
    fn test_state_text_is_parsed_on_save() {
        let node = start_with(json!("{\"count\": 1}"));
        let mut panel = StartPanel::default();
        panel.initialize_form(&node);
        assert!(!panel.has_invalid_json());

        panel.form_mut().update_value(INITIAL_STATE, "[1, 2]");
        assert!(!panel.is_valid());
        assert_eq!(panel.on_save(&node), node);

        panel.form_mut().update_value(INITIAL_STATE, "{\"count\": 2}");
        let updated = panel.on_save(&node);
        assert_eq!(
            updated.data,
            NodePayload::Start(StartData {
                initial_state: json!({"count": 2})
            })
        );
    }

    #[test]
    fn test_end_output_map_skips_blank_rows() {
        let node = NodeModel::new(NodeKind::End, "End");
        let mut panel = EndPanel::default();
        panel.initialize_form(&node);
        panel.output_map_mut().set(0, "answer", "state.answer");

        let updated = panel.on_save(&node);
        match updated.data {
            NodePayload::End(data) => {
                assert_eq!(data.output_map.len(), 1);
                assert_eq!(data.output_map["answer"], "state.answer");
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }
}
