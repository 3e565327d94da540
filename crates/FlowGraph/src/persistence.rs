use crate::error::FlowError;
use crate::model::{ConnectionBehavior, ConnectionId, ConnectionModel, FlowModel, NodeId, PortId};
use crate::store::FlowStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Wire shape of a connection as the backend stores it.
///
/// Port ids are flat strings here. They are resolved against the endpoint
/// node ids on load, so node ids containing underscores survive a round trip.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionWire {
    #[serde(default)]
    pub id: String,
    pub source_node_id: String,
    pub target_node_id: String,
    pub source_port_id: String,
    pub target_port_id: String,
    #[serde(default)]
    pub behavior: ConnectionBehavior,
}

impl TryFrom<ConnectionWire> for ConnectionModel {
    type Error = FlowError;

    fn try_from(wire: ConnectionWire) -> Result<Self, Self::Error> {
        let source_node = NodeId::from(wire.source_node_id);
        let target_node = NodeId::from(wire.target_node_id);
        let source = PortId::parse_for_node(&wire.source_port_id, &source_node)?;
        let target = PortId::parse_for_node(&wire.target_port_id, &target_node)?;

        let mut connection = ConnectionModel::new(source, target);
        connection.behavior = wire.behavior;
        if !wire.id.is_empty() && wire.id != connection.id.to_string() {
            tracing::debug!(stored = %wire.id, derived = %connection.id, "Re-deriving connection id");
        }
        Ok(connection)
    }
}

impl From<ConnectionModel> for ConnectionWire {
    fn from(connection: ConnectionModel) -> Self {
        Self {
            id: connection.id.to_string(),
            source_node_id: connection.source_node_id.0,
            target_node_id: connection.target_node_id.0,
            source_port_id: connection.source_port_id.to_string(),
            target_port_id: connection.target_port_id.to_string(),
            behavior: connection.behavior,
        }
    }
}

impl FlowModel {
    /// Parses a flow document.
    ///
    /// Port ids inside nodes are re-derived from the node id and role, since
    /// the flat string form cannot tell where an underscored node id ends.
    /// Connection ids a group recorded are matched against the loaded
    /// connections for the same reason.
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        let mut flow: FlowModel =
            serde_json::from_str(json).map_err(|e| FlowError::JsonParseError(e.to_string()))?;
        for node in &mut flow.nodes {
            node.rebind_ports();
        }
        let known: HashMap<String, ConnectionId> = flow
            .connections
            .iter()
            .map(|c| (c.id.to_string(), c.id.clone()))
            .collect();
        for group in &mut flow.groups {
            let data = &mut group.connection_data;
            for ids in [&mut data.inputs, &mut data.outputs, &mut data.internal] {
                for id in ids.iter_mut() {
                    if let Some(resolved) = known.get(&id.to_string()) {
                        *id = resolved.clone();
                    }
                }
            }
        }
        Ok(flow)
    }

    pub fn to_json(&self) -> Result<String, FlowError> {
        serde_json::to_string(self).map_err(|e| FlowError::JsonParseError(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, FlowError> {
        serde_json::to_string_pretty(self).map_err(|e| FlowError::JsonParseError(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FlowError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_pretty()?).map_err(|e| io_error(path, e))
    }
}

impl FlowStore {
    /// Parses a flow document and replaces the whole graph with it.
    ///
    /// On a parse error the current graph is left untouched.
    pub fn load_json(&mut self, json: &str) -> Result<(), FlowError> {
        let flow = FlowModel::from_json(json)?;
        self.set_flow(flow);
        Ok(())
    }
}

fn io_error(path: &Path, error: std::io::Error) -> FlowError {
    FlowError::Io {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}
