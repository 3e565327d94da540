//! # Core Data Models
//!
//! Nodes, ports, connections and groups as they are loaded from and saved to
//! the backend. Identifiers are composite keys; their `${a}_${b}` and
//! `${a}+${b}` string forms only exist at the serialization boundary.

use crate::decision;
use crate::error::FlowError;
use crate::payload::{NodeKind, NodePayload};
use crate::rules;
use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Size given to freshly created nodes.
pub const DEFAULT_NODE_SIZE: Vec2 = Vec2::new(330.0, 60.0);

/// Role of the synthetic port a collapsed group exposes for incoming edges.
pub const GROUP_INPUT_ROLE: &str = "group-input";
/// Role of the synthetic port a collapsed group exposes for outgoing edges.
pub const GROUP_OUTPUT_ROLE: &str = "group-output";

/// Opaque identifier shared by nodes and groups.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Generates a fresh random id.
    pub fn new_v4() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Groups live in the same id space as nodes.
pub type GroupId = NodeId;

/// Role tag of a port, e.g. `python-out` or `decision-out-group-1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortRole(pub String);

impl PortRole {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortRole {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PortRole {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PortRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite key of a port: the owning node plus the port role.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId {
    pub node_id: NodeId,
    pub role: PortRole,
}

impl PortId {
    pub fn new(node_id: impl Into<NodeId>, role: impl Into<PortRole>) -> Self {
        Self {
            node_id: node_id.into(),
            role: role.into(),
        }
    }

    /// Parses `nodeId_role[:suffix]`, splitting at the first underscore.
    pub fn parse(raw: &str) -> Result<Self, FlowError> {
        let (node, role) = raw
            .split_once('_')
            .ok_or_else(|| FlowError::MalformedPortId(raw.to_string()))?;
        let role = strip_suffix(role);
        if node.is_empty() || role.is_empty() {
            return Err(FlowError::MalformedPortId(raw.to_string()));
        }
        Ok(Self::new(node, role))
    }

    /// Parses a port id whose owning node is already known.
    ///
    /// Unlike [`PortId::parse`] this tolerates underscores inside the node id.
    pub fn parse_for_node(raw: &str, node_id: &NodeId) -> Result<Self, FlowError> {
        let role = raw
            .strip_prefix(node_id.as_str())
            .and_then(|rest| rest.strip_prefix('_'))
            .map(strip_suffix)
            .filter(|role| !role.is_empty())
            .ok_or_else(|| FlowError::PortNodeMismatch {
                port_id: raw.to_string(),
                node_id: node_id.to_string(),
            })?;
        Ok(Self::new(node_id.clone(), role))
    }
}

fn strip_suffix(role: &str) -> &str {
    role.split(':').next().unwrap_or(role)
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.node_id, self.role)
    }
}

impl Serialize for PortId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PortId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        PortId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Composite key of a connection: its two endpoint ports.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId {
    pub source: PortId,
    pub target: PortId,
}

impl ConnectionId {
    pub fn new(source: PortId, target: PortId) -> Self {
        Self { source, target }
    }

    /// Parses `sourcePortId+targetPortId`.
    pub fn parse(raw: &str) -> Result<Self, FlowError> {
        let (source, target) = raw
            .split_once('+')
            .ok_or_else(|| FlowError::MalformedConnectionId(raw.to_string()))?;
        Ok(Self::new(PortId::parse(source)?, PortId::parse(target)?))
    }

    /// True for ids synthesized for collapsed-group rendering.
    pub fn is_virtual(&self) -> bool {
        is_group_role(&self.source.role) || is_group_role(&self.target.role)
    }
}

fn is_group_role(role: &PortRole) -> bool {
    role.as_str() == GROUP_INPUT_ROLE || role.as_str() == GROUP_OUTPUT_ROLE
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.source, self.target)
    }
}

impl Serialize for ConnectionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConnectionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ConnectionId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

bitflags! {
    /// Direction of a port. `INPUT | OUTPUT` is an `input-output` port.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PortType: u8 {
        const INPUT = 1 << 0;
        const OUTPUT = 1 << 1;
        const INPUT_OUTPUT = Self::INPUT.bits() | Self::OUTPUT.bits();
    }
}

impl PortType {
    pub fn as_str(&self) -> &'static str {
        if *self == Self::INPUT_OUTPUT {
            "input-output"
        } else if *self == Self::OUTPUT {
            "output"
        } else {
            "input"
        }
    }

    /// Two ports can pair when their types differ and one side can emit
    /// while the other can receive.
    pub fn pairs_with(self, other: PortType) -> bool {
        self != other
            && ((self.contains(Self::OUTPUT) && other.contains(Self::INPUT))
                || (self.contains(Self::INPUT) && other.contains(Self::OUTPUT)))
    }
}

// Wire form is the string tag used by the backend.
impl Serialize for PortType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PortType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "input" => Ok(Self::INPUT),
            "output" => Ok(Self::OUTPUT),
            "input-output" => Ok(Self::INPUT_OUTPUT),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["input", "output", "input-output"],
            )),
        }
    }
}

/// Side of the node a port is drawn on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortPosition {
    #[default]
    Left,
    Right,
    Top,
    Bottom,
}

/// Port descriptor shared by every instance of a role.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasePort {
    pub role: PortRole,
    pub port_type: PortType,
    /// May this port host more than one connection.
    #[serde(default)]
    pub multiple: bool,
    #[serde(rename = "allowedConnections", default)]
    pub allowed_connections: Vec<PortRole>,
    #[serde(default)]
    pub position: PortPosition,
    #[serde(default)]
    pub color: String,
}

/// A port instantiated on a concrete node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewPort {
    pub id: PortId,
    #[serde(flatten)]
    pub base: BasePort,
}

impl ViewPort {
    pub fn role(&self) -> &PortRole {
        &self.base.role
    }

    /// Whether this port lists `role` among its partners.
    pub fn allows(&self, role: &PortRole) -> bool {
        rules::allows(&self.base.allowed_connections, role)
    }
}

/// A typed unit of work on the canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeModel {
    pub id: NodeId,
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub position: Vec2,
    #[serde(default = "default_node_size")]
    pub size: Vec2,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<GroupId>,
    #[serde(default)]
    pub ports: Vec<ViewPort>,
    #[serde(default)]
    pub input_map: BTreeMap<String, String>,
    #[serde(default)]
    pub output_variable_path: Option<String>,
    #[serde(flatten)]
    pub data: NodePayload,
}

fn default_node_size() -> Vec2 {
    DEFAULT_NODE_SIZE
}

impl NodeModel {
    /// Creates a node of `kind` with a fresh id, default payload and ports.
    pub fn new(kind: NodeKind, node_name: impl Into<String>) -> Self {
        let mut node = Self {
            id: NodeId::new_v4(),
            node_name: node_name.into(),
            position: Vec2::ZERO,
            size: DEFAULT_NODE_SIZE,
            color: None,
            icon: None,
            parent_id: None,
            ports: Vec::new(),
            input_map: BTreeMap::new(),
            output_variable_path: None,
            data: NodePayload::default_for(kind),
        };
        node.ports = node.default_ports();
        node
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = id.into();
        self.rebind_ports();
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_parent(mut self, parent_id: Option<GroupId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_data(mut self, data: NodePayload) -> Self {
        self.data = data;
        self.ports = self.default_ports();
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    /// Display title: the node name, or the type title when unnamed.
    pub fn title(&self) -> &str {
        if self.node_name.trim().is_empty() {
            self.kind().title()
        } else {
            &self.node_name
        }
    }

    /// Ports a node of this type carries right now.
    pub fn default_ports(&self) -> Vec<ViewPort> {
        match &self.data {
            NodePayload::DecisionTable(table) => decision::generate_decision_ports(&self.id, table),
            _ => rules::default_ports(&self.id, self.kind()),
        }
    }

    /// Re-derives every port id from the node id and the port role.
    pub fn rebind_ports(&mut self) {
        for port in &mut self.ports {
            port.id = PortId::new(self.id.clone(), port.base.role.clone());
        }
    }

    pub fn port(&self, role: &str) -> Option<&ViewPort> {
        self.ports.iter().find(|p| p.base.role.as_str() == role)
    }

    pub fn port_by_id(&self, id: &PortId) -> Option<&ViewPort> {
        self.ports.iter().find(|p| &p.id == id)
    }
}

/// Distinguishes stored edges from the ones synthesized for collapsed groups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionBehavior {
    #[default]
    Default,
    Virtual,
}

/// An edge between two ports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "crate::persistence::ConnectionWire",
    into = "crate::persistence::ConnectionWire"
)]
pub struct ConnectionModel {
    pub id: ConnectionId,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    pub source_port_id: PortId,
    pub target_port_id: PortId,
    pub behavior: ConnectionBehavior,
}

impl ConnectionModel {
    pub fn new(source: PortId, target: PortId) -> Self {
        Self {
            id: ConnectionId::new(source.clone(), target.clone()),
            source_node_id: source.node_id.clone(),
            target_node_id: target.node_id.clone(),
            source_port_id: source,
            target_port_id: target,
            behavior: ConnectionBehavior::Default,
        }
    }

    pub(crate) fn new_virtual(source: PortId, target: PortId) -> Self {
        Self {
            behavior: ConnectionBehavior::Virtual,
            ..Self::new(source, target)
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.behavior == ConnectionBehavior::Virtual || self.id.is_virtual()
    }

    /// True when the connection has `node_id` at either end.
    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source_node_id == node_id || &self.target_node_id == node_id
    }
}

/// Connection ids hidden when a group was collapsed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionData {
    #[serde(default)]
    pub inputs: Vec<ConnectionId>,
    #[serde(default)]
    pub outputs: Vec<ConnectionId>,
    #[serde(default)]
    pub internal: Vec<ConnectionId>,
}

impl ConnectionData {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty() && self.internal.is_empty()
    }

    pub(crate) fn forget(&mut self, id: &ConnectionId) {
        self.inputs.retain(|c| c != id);
        self.outputs.retain(|c| c != id);
        self.internal.retain(|c| c != id);
    }
}

/// A container that visually nests nodes and other groups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupNodeModel {
    pub id: GroupId,
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<GroupId>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub position: Vec2,
    #[serde(default)]
    pub size: Vec2,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(rename = "connectionData", default)]
    pub connection_data: ConnectionData,
}

impl GroupNodeModel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: NodeId::new_v4(),
            parent_id: None,
            collapsed: false,
            title: title.into(),
            position: Vec2::ZERO,
            size: Vec2::new(400.0, 300.0),
            color: None,
            connection_data: ConnectionData::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<GroupId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_parent(mut self, parent_id: Option<GroupId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }
}

/// The whole editable graph, as exchanged with the backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowModel {
    #[serde(default)]
    pub nodes: Vec<NodeModel>,
    #[serde(default)]
    pub connections: Vec<ConnectionModel>,
    #[serde(default)]
    pub groups: Vec<GroupNodeModel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_id_splits_at_first_underscore_and_drops_suffix() {
        let id = PortId::parse("n1_decision-out-a_b:3").unwrap();
        assert_eq!(id.node_id.as_str(), "n1");
        assert_eq!(id.role.as_str(), "decision-out-a_b");
        assert!(PortId::parse("no-underscore").is_err());
        assert!(PortId::parse("_python-in").is_err());
    }

    #[test]
    fn port_id_for_known_node_keeps_underscores() {
        let node = NodeId::from("node_with_underscores");
        let id = PortId::parse_for_node("node_with_underscores_python-in", &node).unwrap();
        assert_eq!(id.node_id, node);
        assert_eq!(id.role.as_str(), "python-in");
        assert_eq!(id.to_string(), "node_with_underscores_python-in");

        let err = PortId::parse_for_node("other_python-in", &node).unwrap_err();
        assert!(matches!(err, FlowError::PortNodeMismatch { .. }));
    }

    #[test]
    fn connection_id_round_trips_through_display() {
        let id = ConnectionId::new(PortId::new("a", "python-out"), PortId::new("b", "python-in"));
        assert_eq!(id.to_string(), "a_python-out+b_python-in");
        assert_eq!(ConnectionId::parse(&id.to_string()).unwrap(), id);
        assert!(!id.is_virtual());

        let virt = ConnectionId::new(PortId::new("g", GROUP_OUTPUT_ROLE), PortId::new("b", "python-in"));
        assert!(virt.is_virtual());
    }

    #[test]
    fn port_type_pairing() {
        assert!(PortType::OUTPUT.pairs_with(PortType::INPUT));
        assert!(PortType::INPUT.pairs_with(PortType::OUTPUT));
        assert!(PortType::INPUT_OUTPUT.pairs_with(PortType::INPUT));
        assert!(!PortType::INPUT.pairs_with(PortType::INPUT));
        assert!(!PortType::OUTPUT.pairs_with(PortType::OUTPUT));
        assert!(!PortType::INPUT_OUTPUT.pairs_with(PortType::INPUT_OUTPUT));
    }

    #[test]
    fn port_type_wire_strings() {
        let json = serde_json::to_string(&PortType::INPUT_OUTPUT).unwrap();
        assert_eq!(json, "\"input-output\"");
        let parsed: PortType = serde_json::from_str("\"output\"").unwrap();
        assert_eq!(parsed, PortType::OUTPUT);
        assert!(serde_json::from_str::<PortType>("\"sideways\"").is_err());
    }

    #[test]
    fn new_node_carries_bound_default_ports() {
        let node = NodeModel::new(NodeKind::Python, "parse").with_id("p1");
        let roles: Vec<&str> = node.ports.iter().map(|p| p.role().as_str()).collect();
        assert_eq!(roles, vec!["python-in", "python-out"]);
        assert!(node.ports.iter().all(|p| p.id.node_id.as_str() == "p1"));
        assert_eq!(node.title(), "parse");
    }
}
