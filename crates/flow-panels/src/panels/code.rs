use crate::form::{FormError, FormState};
use crate::panel::{BaseSidePanel, PanelCore, kind_mismatch};
use crate::schema::{Validator, VisualField};
use flow_graph::payload::{CodeAgentData, ConditionalEdgeData, PythonCode, WebhookTriggerData};
use flow_graph::{NodeKind, NodeModel, NodePayload};
use serde_json::json;

const CODE: &str = "code";
const ENTRYPOINT: &str = "entrypoint";
const LIBRARIES: &str = "libraries";
const DEFAULT_ENTRYPOINT: &str = "main";

fn code_fields() -> Vec<VisualField> {
    vec![
        VisualField::python(CODE).required(),
        VisualField::text(ENTRYPOINT)
            .required()
            .with_default(json!(DEFAULT_ENTRYPOINT)),
        VisualField::text(LIBRARIES),
    ]
}

fn seed_code(form: &mut FormState, code: &PythonCode) {
    form.update_value(CODE, code.code.clone());
    if !code.entrypoint.is_empty() {
        form.update_value(ENTRYPOINT, code.entrypoint.clone());
    }
    form.update_value(LIBRARIES, code.libraries.join(", "));
}

fn read_code(form: &FormState, existing: &PythonCode) -> Result<PythonCode, FormError> {
    Ok(PythonCode {
        name: existing.name.clone(),
        code: form.string(CODE)?,
        entrypoint: form.string(ENTRYPOINT)?.trim().to_string(),
        libraries: form.list(LIBRARIES)?,
    })
}

#[derive(Debug, Default)]
pub struct PythonPanel {
    core: PanelCore,
}

impl BaseSidePanel for PythonPanel {
    panel_plumbing!(NodeKind::Python);

    fn initialize_form(&mut self, node: &NodeModel) {
        self.core = PanelCore::seeded(node, code_fields());
        if let NodePayload::Python(code) = &node.data {
            seed_code(&mut self.core.form, code);
        }
    }

    fn create_updated_node(&self, node: &NodeModel) -> Result<NodeModel, FormError> {
        let NodePayload::Python(existing) = &node.data else {
            return Err(kind_mismatch(NodeKind::Python, node));
        };
        let code = read_code(&self.core.form, existing)?;
        let mut updated = self.core.apply_common(node)?;
        updated.data = NodePayload::Python(code);
        Ok(updated)
    }
}

const SOURCE: &str = "source";
const THEN: &str = "then";

#[derive(Debug, Default)]
pub struct ConditionalEdgePanel {
    core: PanelCore,
}

impl BaseSidePanel for ConditionalEdgePanel {
    panel_plumbing!(NodeKind::ConditionalEdge);

    fn initialize_form(&mut self, node: &NodeModel) {
        let mut fields = vec![VisualField::text(SOURCE), VisualField::text(THEN)];
        fields.extend(code_fields());
        self.core = PanelCore::seeded(node, fields);
        if let NodePayload::ConditionalEdge(data) = &node.data {
            let form = &mut self.core.form;
            form.update_value(SOURCE, data.source.clone());
            form.update_value(THEN, data.then.clone().unwrap_or_default());
            seed_code(form, &data.python_code);
        }
    }

    fn create_updated_node(&self, node: &NodeModel) -> Result<NodeModel, FormError> {
        let NodePayload::ConditionalEdge(existing) = &node.data else {
            return Err(kind_mismatch(NodeKind::ConditionalEdge, node));
        };
        let form = &self.core.form;
        let data = ConditionalEdgeData {
            source: form.string(SOURCE)?,
            then: form.optional_string(THEN)?,
            python_code: read_code(form, &existing.python_code)?,
        };
        let mut updated = self.core.apply_common(node)?;
        updated.data = NodePayload::ConditionalEdge(data);
        Ok(updated)
    }
}

const PATH: &str = "path";

#[derive(Debug, Default)]
pub struct WebhookTriggerPanel {
    core: PanelCore,
}

impl BaseSidePanel for WebhookTriggerPanel {
    panel_plumbing!(NodeKind::WebhookTrigger);

    fn initialize_form(&mut self, node: &NodeModel) {
        let mut fields = vec![VisualField::text(PATH).required()];
        fields.extend(code_fields());
        self.core = PanelCore::seeded(node, fields);
        if let NodePayload::WebhookTrigger(data) = &node.data {
            self.core.form.update_value(PATH, data.path.clone());
            seed_code(&mut self.core.form, &data.python_code);
        }
    }

    fn create_updated_node(&self, node: &NodeModel) -> Result<NodeModel, FormError> {
        let NodePayload::WebhookTrigger(existing) = &node.data else {
            return Err(kind_mismatch(NodeKind::WebhookTrigger, node));
        };
        let form = &self.core.form;
        let data = WebhookTriggerData {
            path: form.string(PATH)?.trim().trim_start_matches('/').to_string(),
            python_code: read_code(form, &existing.python_code)?,
        };
        let mut updated = self.core.apply_common(node)?;
        updated.data = NodePayload::WebhookTrigger(data);
        Ok(updated)
    }
}

const SYSTEM_PROMPT: &str = "system_prompt";
const MAX_STEPS: &str = "max_steps";
const LLM_CONFIG_ID: &str = "llm_config_id";

#[derive(Debug, Default)]
pub struct CodeAgentPanel {
    core: PanelCore,
}

impl BaseSidePanel for CodeAgentPanel {
    panel_plumbing!(NodeKind::CodeAgent);

    fn initialize_form(&mut self, node: &NodeModel) {
        let defaults = CodeAgentData::default();
        self.core = PanelCore::seeded(
            node,
            vec![
                VisualField::text(SYSTEM_PROMPT),
                VisualField::number(MAX_STEPS)
                    .required()
                    .validate(Validator::Positive)
                    .with_default(json!(defaults.max_steps)),
                VisualField::number(LLM_CONFIG_ID).validate(Validator::Positive),
            ],
        );
        if let NodePayload::CodeAgent(data) = &node.data {
            let form = &mut self.core.form;
            form.update_value(SYSTEM_PROMPT, data.system_prompt.clone());
            form.update_value(MAX_STEPS, data.max_steps);
            form.update_value(LLM_CONFIG_ID, json!(data.llm_config_id));
        }
    }

    fn create_updated_node(&self, node: &NodeModel) -> Result<NodeModel, FormError> {
        if node.kind() != NodeKind::CodeAgent {
            return Err(kind_mismatch(NodeKind::CodeAgent, node));
        }
        let form = &self.core.form;
        let max_steps = u32::try_from(form.u64(MAX_STEPS)?).map_err(|_| FormError::TypeMismatch {
            field: MAX_STEPS.to_string(),
            expected: "a step count",
        })?;
        let data = CodeAgentData {
            llm_config_id: form.optional_u64(LLM_CONFIG_ID)?,
            system_prompt: form.string(SYSTEM_PROMPT)?,
            max_steps,
        };
        let mut updated = self.core.apply_common(node)?;
        updated.data = NodePayload::CodeAgent(data);
        Ok(updated)
    }
}
