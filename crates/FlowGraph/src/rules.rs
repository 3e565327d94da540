//! # Port compatibility rules
//!
//! Static per-node-type tables of port templates. Each template lists the
//! partner roles it accepts; a connection is valid only when both sides list
//! each other.

use crate::decision::{DECISION_OUT_PREFIX, DECISION_OUT_ROLE};
use crate::model::{BasePort, NodeId, PortId, PortPosition, PortRole, PortType, ViewPort};
use crate::payload::NodeKind;

/// Compile-time description of a port role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortTemplate {
    pub role: &'static str,
    pub port_type: PortType,
    pub multiple: bool,
    pub allowed: &'static [&'static str],
    pub position: PortPosition,
    pub color: &'static str,
}

impl PortTemplate {
    const fn input(role: &'static str, multiple: bool, allowed: &'static [&'static str]) -> Self {
        Self {
            role,
            port_type: PortType::INPUT,
            multiple,
            allowed,
            position: PortPosition::Left,
            color: "#8c8c8c",
        }
    }

    const fn output(role: &'static str, multiple: bool, allowed: &'static [&'static str]) -> Self {
        Self {
            role,
            port_type: PortType::OUTPUT,
            multiple,
            allowed,
            position: PortPosition::Right,
            color: "#8c8c8c",
        }
    }

    const fn at(mut self, position: PortPosition) -> Self {
        self.position = position;
        self
    }

    const fn colored(mut self, color: &'static str) -> Self {
        self.color = color;
        self
    }

    pub fn to_base(&self) -> BasePort {
        BasePort {
            role: PortRole::from(self.role),
            port_type: self.port_type,
            multiple: self.multiple,
            allowed_connections: self.allowed.iter().map(|r| PortRole::from(*r)).collect(),
            position: self.position,
            color: self.color.to_string(),
        }
    }

    pub fn instantiate(&self, node_id: &NodeId) -> ViewPort {
        ViewPort {
            id: PortId::new(node_id.clone(), self.role),
            base: self.to_base(),
        }
    }

    /// Whether this template lists `role` among its partners.
    pub fn allows(&self, role: &PortRole) -> bool {
        let family = role_family(role.as_str());
        self.allowed.iter().any(|allowed| *allowed == family)
    }
}

/// Inputs of every node that takes part in control flow.
const FLOW_TARGETS: &[&str] = &[
    "python-in",
    "project-in",
    "llm-in",
    "conditional-edge-in",
    "table-in",
    "file-extractor-in",
    "web-scraper-in",
    "code-agent-in",
    "subgraph-in",
    "end-in",
];

/// Outputs of every node that takes part in control flow.
const FLOW_SOURCES: &[&str] = &[
    "start-start",
    "python-out",
    "project-out",
    "llm-out",
    "conditional-edge-out",
    DECISION_OUT_ROLE,
    "decision-default",
    "decision-error",
    "file-extractor-out",
    "web-scraper-out",
    "code-agent-out",
    "subgraph-out",
    "webhook-trigger-out",
    "telegram-trigger-out",
];

static START_PORTS: &[PortTemplate] =
    &[PortTemplate::output("start-start", true, FLOW_TARGETS).colored("#d3869b")];

static END_PORTS: &[PortTemplate] =
    &[PortTemplate::input("end-in", true, FLOW_SOURCES).colored("#d3869b")];

static PYTHON_PORTS: &[PortTemplate] = &[
    PortTemplate::input("python-in", true, FLOW_SOURCES).colored("#ffcf3f"),
    PortTemplate::output("python-out", true, FLOW_TARGETS).colored("#ffcf3f"),
];

static PROJECT_PORTS: &[PortTemplate] = &[
    PortTemplate::input("project-in", true, FLOW_SOURCES).colored("#5672cd"),
    PortTemplate::output("project-out", true, FLOW_TARGETS).colored("#5672cd"),
    PortTemplate::input("project-tasks", true, &["task-project"])
        .at(PortPosition::Bottom)
        .colored("#5672cd"),
];

static TASK_PORTS: &[PortTemplate] = &[
    PortTemplate::output("task-project", false, &["project-tasks"])
        .at(PortPosition::Top)
        .colored("#00aaff"),
    PortTemplate::input("task-agent", false, &["agent-task"]).colored("#00aaff"),
    PortTemplate::input("task-tools", true, &["tool-out"])
        .at(PortPosition::Bottom)
        .colored("#00aaff"),
];

static AGENT_PORTS: &[PortTemplate] = &[
    PortTemplate::output("agent-task", true, &["task-agent"]).colored("#9e5fff"),
    PortTemplate::input("agent-tools", true, &["tool-out"])
        .at(PortPosition::Bottom)
        .colored("#9e5fff"),
];

static TOOL_PORTS: &[PortTemplate] = &[PortTemplate::output(
    "tool-out",
    true,
    &["agent-tools", "task-tools", "code-agent-tools"],
)
.at(PortPosition::Top)
.colored("#00d68f")];

static LLM_PORTS: &[PortTemplate] = &[
    PortTemplate::input("llm-in", true, FLOW_SOURCES).colored("#ff7d4f"),
    PortTemplate::output("llm-out", true, FLOW_TARGETS).colored("#ff7d4f"),
];

static CONDITIONAL_EDGE_PORTS: &[PortTemplate] = &[
    PortTemplate::input("conditional-edge-in", true, FLOW_SOURCES).colored("#8e44ad"),
    PortTemplate::output("conditional-edge-out", true, FLOW_TARGETS).colored("#8e44ad"),
];

static DECISION_TABLE_PORTS: &[PortTemplate] = &[
    PortTemplate::input("table-in", true, FLOW_SOURCES).colored("#00bfa5"),
    PortTemplate::output("decision-default", false, FLOW_TARGETS).colored("#00bfa5"),
    PortTemplate::output("decision-error", false, FLOW_TARGETS).colored("#e53935"),
];

static DECISION_OUT_TEMPLATE: PortTemplate =
    PortTemplate::output(DECISION_OUT_ROLE, false, FLOW_TARGETS).colored("#00bfa5");

static NOTE_PORTS: &[PortTemplate] = &[];

static FILE_EXTRACTOR_PORTS: &[PortTemplate] = &[
    PortTemplate::input("file-extractor-in", true, FLOW_SOURCES).colored("#2e7d32"),
    PortTemplate::output("file-extractor-out", true, FLOW_TARGETS).colored("#2e7d32"),
];

static WEB_SCRAPER_PORTS: &[PortTemplate] = &[
    PortTemplate::input("web-scraper-in", true, FLOW_SOURCES).colored("#1e88e5"),
    PortTemplate::output("web-scraper-out", true, FLOW_TARGETS).colored("#1e88e5"),
];

static CODE_AGENT_PORTS: &[PortTemplate] = &[
    PortTemplate::input("code-agent-in", true, FLOW_SOURCES).colored("#c2185b"),
    PortTemplate::output("code-agent-out", true, FLOW_TARGETS).colored("#c2185b"),
    PortTemplate::input("code-agent-tools", true, &["tool-out"])
        .at(PortPosition::Bottom)
        .colored("#c2185b"),
];

static WEBHOOK_TRIGGER_PORTS: &[PortTemplate] =
    &[PortTemplate::output("webhook-trigger-out", true, FLOW_TARGETS).colored("#ff9800")];

static TELEGRAM_TRIGGER_PORTS: &[PortTemplate] =
    &[PortTemplate::output("telegram-trigger-out", true, FLOW_TARGETS).colored("#29b6f6")];

static SUBGRAPH_PORTS: &[PortTemplate] = &[
    PortTemplate::input("subgraph-in", true, FLOW_SOURCES).colored("#607d8b"),
    PortTemplate::output("subgraph-out", true, FLOW_TARGETS).colored("#607d8b"),
];

/// The static port table of a node type.
///
/// Decision tables only list their fixed ports here; the per-group outputs
/// come from [`decision_template`].
pub fn templates_for(kind: NodeKind) -> &'static [PortTemplate] {
    match kind {
        NodeKind::Start => START_PORTS,
        NodeKind::End => END_PORTS,
        NodeKind::Python => PYTHON_PORTS,
        NodeKind::Project => PROJECT_PORTS,
        NodeKind::Task => TASK_PORTS,
        NodeKind::Agent => AGENT_PORTS,
        NodeKind::Tool => TOOL_PORTS,
        NodeKind::Llm => LLM_PORTS,
        NodeKind::ConditionalEdge => CONDITIONAL_EDGE_PORTS,
        NodeKind::DecisionTable => DECISION_TABLE_PORTS,
        NodeKind::Note => NOTE_PORTS,
        NodeKind::FileExtractor => FILE_EXTRACTOR_PORTS,
        NodeKind::WebScraper => WEB_SCRAPER_PORTS,
        NodeKind::CodeAgent => CODE_AGENT_PORTS,
        NodeKind::WebhookTrigger => WEBHOOK_TRIGGER_PORTS,
        NodeKind::TelegramTrigger => TELEGRAM_TRIGGER_PORTS,
        NodeKind::Subgraph => SUBGRAPH_PORTS,
    }
}

/// Template for the dynamically named `decision-out-*` ports.
pub fn decision_template() -> &'static PortTemplate {
    &DECISION_OUT_TEMPLATE
}

/// Maps dynamically named roles onto the template role they were built from.
pub fn role_family(role: &str) -> &str {
    if role.starts_with(DECISION_OUT_PREFIX) {
        DECISION_OUT_ROLE
    } else {
        role
    }
}

/// Looks up the template declaring `role` across all node types.
pub fn template_for_role(role: &str) -> Option<&'static PortTemplate> {
    if role_family(role) == DECISION_OUT_ROLE {
        return Some(decision_template());
    }
    NodeKind::ALL
        .iter()
        .flat_map(|kind| templates_for(*kind).iter())
        .find(|template| template.role == role)
}

/// Whether an allowed-role list accepts `role`.
pub fn allows(allowed: &[PortRole], role: &PortRole) -> bool {
    let family = role_family(role.as_str());
    allowed.iter().any(|a| a.as_str() == family || a == role)
}

/// Instantiates the static ports of `kind` on `node_id`.
pub fn default_ports(node_id: &NodeId, kind: NodeKind) -> Vec<ViewPort> {
    templates_for(kind)
        .iter()
        .map(|t| t.instantiate(node_id))
        .collect()
}

/// Checks a proposed edge between two port id strings against the rule tables.
///
/// Pure: the answer depends only on the two ids.
pub fn is_connection_valid(source_port_id: &str, target_port_id: &str) -> bool {
    let (Ok(source), Ok(target)) = (PortId::parse(source_port_id), PortId::parse(target_port_id))
    else {
        return false;
    };
    if source.node_id == target.node_id {
        return false;
    }
    let (Some(source_template), Some(target_template)) = (
        template_for_role(source.role.as_str()),
        template_for_role(target.role.as_str()),
    ) else {
        return false;
    };
    if !source_template.port_type.pairs_with(target_template.port_type) {
        return false;
    }
    source_template.allows(&target.role) && target_template.allows(&source.role)
}
