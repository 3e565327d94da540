//! Per-type node payloads.
//!
//! `NodePayload` is serialized adjacently tagged: `{"type": "python", "data": {...}}`.

use crate::decision::DecisionTableData;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Payload-free discriminant of [`NodePayload`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Start,
    End,
    Python,
    Project,
    Task,
    Agent,
    Tool,
    Llm,
    ConditionalEdge,
    DecisionTable,
    Note,
    FileExtractor,
    WebScraper,
    CodeAgent,
    WebhookTrigger,
    TelegramTrigger,
    Subgraph,
}

impl NodeKind {
    pub const ALL: [NodeKind; 17] = [
        NodeKind::Start,
        NodeKind::End,
        NodeKind::Python,
        NodeKind::Project,
        NodeKind::Task,
        NodeKind::Agent,
        NodeKind::Tool,
        NodeKind::Llm,
        NodeKind::ConditionalEdge,
        NodeKind::DecisionTable,
        NodeKind::Note,
        NodeKind::FileExtractor,
        NodeKind::WebScraper,
        NodeKind::CodeAgent,
        NodeKind::WebhookTrigger,
        NodeKind::TelegramTrigger,
        NodeKind::Subgraph,
    ];

    /// The wire tag, also used as the role prefix of the node's ports.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::End => "end",
            NodeKind::Python => "python",
            NodeKind::Project => "project",
            NodeKind::Task => "task",
            NodeKind::Agent => "agent",
            NodeKind::Tool => "tool",
            NodeKind::Llm => "llm",
            NodeKind::ConditionalEdge => "conditional-edge",
            NodeKind::DecisionTable => "decision-table",
            NodeKind::Note => "note",
            NodeKind::FileExtractor => "file-extractor",
            NodeKind::WebScraper => "web-scraper",
            NodeKind::CodeAgent => "code-agent",
            NodeKind::WebhookTrigger => "webhook-trigger",
            NodeKind::TelegramTrigger => "telegram-trigger",
            NodeKind::Subgraph => "subgraph",
        }
    }

    /// Human readable title shown for unnamed nodes.
    pub fn title(&self) -> &'static str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::End => "End",
            NodeKind::Python => "Python Code",
            NodeKind::Project => "Project",
            NodeKind::Task => "Task",
            NodeKind::Agent => "Agent",
            NodeKind::Tool => "Tool",
            NodeKind::Llm => "LLM",
            NodeKind::ConditionalEdge => "Conditional Edge",
            NodeKind::DecisionTable => "Decision Table",
            NodeKind::Note => "Note",
            NodeKind::FileExtractor => "File Extractor",
            NodeKind::WebScraper => "Web Scraper",
            NodeKind::CodeAgent => "Code Agent",
            NodeKind::WebhookTrigger => "Webhook Trigger",
            NodeKind::TelegramTrigger => "Telegram Trigger",
            NodeKind::Subgraph => "Subgraph",
        }
    }
}

/// A block of user Python code.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonCode {
    pub name: String,
    pub code: String,
    pub entrypoint: String,
    pub libraries: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartData {
    /// Initial flow state; always a JSON object.
    pub initial_state: Value,
}

impl Default for StartData {
    fn default() -> Self {
        Self {
            initial_state: Value::Object(Default::default()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndData {
    pub output_map: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectData {
    pub project_id: u64,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskData {
    pub name: String,
    pub instructions: String,
    pub expected_output: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentData {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub llm_config_id: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolData {
    pub tool_id: u64,
    pub name: String,
    pub config: Value,
}

impl Default for ToolData {
    fn default() -> Self {
        Self {
            tool_id: 0,
            name: String::new(),
            config: Value::Object(Default::default()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmData {
    pub llm_config_id: u64,
    pub prompt: String,
}

/// A Python predicate choosing the branch to follow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionalEdgeData {
    pub source: String,
    pub then: Option<String>,
    pub python_code: PythonCode,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteData {
    pub content: String,
    pub background: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExtractorData {
    pub file_paths: Vec<String>,
    pub output_format: String,
}

impl Default for FileExtractorData {
    fn default() -> Self {
        Self {
            file_paths: Vec::new(),
            output_format: "text".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebScraperData {
    pub url: String,
    pub selector: Option<String>,
    pub max_pages: u32,
}

impl Default for WebScraperData {
    fn default() -> Self {
        Self {
            url: String::new(),
            selector: None,
            max_pages: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeAgentData {
    pub llm_config_id: Option<u64>,
    pub system_prompt: String,
    pub max_steps: u32,
}

impl Default for CodeAgentData {
    fn default() -> Self {
        Self {
            llm_config_id: None,
            system_prompt: String::new(),
            max_steps: 10,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookTriggerData {
    pub path: String,
    pub python_code: PythonCode,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramTriggerData {
    pub bot_token_ref: String,
    pub allowed_chat_ids: Vec<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubgraphData {
    pub graph_id: u64,
}

/// Typed payload of a node, one variant per node type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum NodePayload {
    Start(StartData),
    End(EndData),
    Python(PythonCode),
    Project(ProjectData),
    Task(TaskData),
    Agent(AgentData),
    Tool(ToolData),
    Llm(LlmData),
    ConditionalEdge(ConditionalEdgeData),
    DecisionTable(DecisionTableData),
    Note(NoteData),
    FileExtractor(FileExtractorData),
    WebScraper(WebScraperData),
    CodeAgent(CodeAgentData),
    WebhookTrigger(WebhookTriggerData),
    TelegramTrigger(TelegramTriggerData),
    Subgraph(SubgraphData),
}

impl NodePayload {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Start(_) => NodeKind::Start,
            NodePayload::End(_) => NodeKind::End,
            NodePayload::Python(_) => NodeKind::Python,
            NodePayload::Project(_) => NodeKind::Project,
            NodePayload::Task(_) => NodeKind::Task,
            NodePayload::Agent(_) => NodeKind::Agent,
            NodePayload::Tool(_) => NodeKind::Tool,
            NodePayload::Llm(_) => NodeKind::Llm,
            NodePayload::ConditionalEdge(_) => NodeKind::ConditionalEdge,
            NodePayload::DecisionTable(_) => NodeKind::DecisionTable,
            NodePayload::Note(_) => NodeKind::Note,
            NodePayload::FileExtractor(_) => NodeKind::FileExtractor,
            NodePayload::WebScraper(_) => NodeKind::WebScraper,
            NodePayload::CodeAgent(_) => NodeKind::CodeAgent,
            NodePayload::WebhookTrigger(_) => NodeKind::WebhookTrigger,
            NodePayload::TelegramTrigger(_) => NodeKind::TelegramTrigger,
            NodePayload::Subgraph(_) => NodeKind::Subgraph,
        }
    }

    pub fn default_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Start => NodePayload::Start(StartData::default()),
            NodeKind::End => NodePayload::End(EndData::default()),
            NodeKind::Python => NodePayload::Python(PythonCode::default()),
            NodeKind::Project => NodePayload::Project(ProjectData::default()),
            NodeKind::Task => NodePayload::Task(TaskData::default()),
            NodeKind::Agent => NodePayload::Agent(AgentData::default()),
            NodeKind::Tool => NodePayload::Tool(ToolData::default()),
            NodeKind::Llm => NodePayload::Llm(LlmData::default()),
            NodeKind::ConditionalEdge => NodePayload::ConditionalEdge(ConditionalEdgeData::default()),
            NodeKind::DecisionTable => NodePayload::DecisionTable(DecisionTableData::default()),
            NodeKind::Note => NodePayload::Note(NoteData::default()),
            NodeKind::FileExtractor => NodePayload::FileExtractor(FileExtractorData::default()),
            NodeKind::WebScraper => NodePayload::WebScraper(WebScraperData::default()),
            NodeKind::CodeAgent => NodePayload::CodeAgent(CodeAgentData::default()),
            NodeKind::WebhookTrigger => NodePayload::WebhookTrigger(WebhookTriggerData::default()),
            NodeKind::TelegramTrigger => NodePayload::TelegramTrigger(TelegramTriggerData::default()),
            NodeKind::Subgraph => NodePayload::Subgraph(SubgraphData::default()),
        }
    }

    pub fn as_decision_table(&self) -> Option<&DecisionTableData> {
        match self {
            NodePayload::DecisionTable(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_decision_table_mut(&mut self) -> Option<&mut DecisionTableData> {
        match self {
            NodePayload::DecisionTable(table) => Some(table),
            _ => None,
        }
    }
}
