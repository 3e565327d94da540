//! # Derived views
//!
//! Pure functions of the store: which items are visible once collapsed groups
//! hide their contents, and which ports may legally be joined right now.
//! [`crate::store::FlowStore`] memoizes them and drops the memo on mutation.

use crate::error::ConnectionRejected;
use crate::model::{
    ConnectionModel, GROUP_INPUT_ROLE, GROUP_OUTPUT_ROLE, GroupNodeModel, NodeId, NodeModel,
    PortId, ViewPort,
};
use crate::store::FlowStore;
use std::collections::{BTreeMap, HashSet};

/// Placeholder listed for a port with no eligible partner, so that "no entry"
/// is never mistaken for "anything goes".
pub const NONE_SENTINEL: &str = "__none__";

/// Facts about existing connections needed to judge a new one.
#[derive(Debug, Default)]
pub(crate) struct Connectivity {
    joined: HashSet<(NodeId, NodeId)>,
    occupied: HashSet<PortId>,
}

impl Connectivity {
    pub fn build<'a>(connections: impl Iterator<Item = &'a ConnectionModel>) -> Self {
        let mut connectivity = Self::default();
        for connection in connections {
            connectivity
                .joined
                .insert(node_pair(&connection.source_node_id, &connection.target_node_id));
            connectivity.occupied.insert(connection.source_port_id.clone());
            connectivity.occupied.insert(connection.target_port_id.clone());
        }
        connectivity
    }

    pub fn nodes_joined(&self, a: &NodeId, b: &NodeId) -> bool {
        self.joined.contains(&node_pair(a, b))
    }

    /// Applies every global connection rule to a pair of ports, in either
    /// orientation.
    pub fn check(
        &self,
        a_node: &NodeModel,
        a: &ViewPort,
        b_node: &NodeModel,
        b: &ViewPort,
    ) -> Result<(), ConnectionRejected> {
        if a.id == b.id || a_node.id == b_node.id {
            return Err(ConnectionRejected::SelfConnection(a_node.id.to_string()));
        }
        if self.nodes_joined(&a_node.id, &b_node.id) {
            return Err(ConnectionRejected::NodesAlreadyJoined(
                a_node.id.to_string(),
                b_node.id.to_string(),
            ));
        }
        for port in [a, b] {
            if !port.base.multiple && self.occupied.contains(&port.id) {
                return Err(ConnectionRejected::PortOccupied(port.id.to_string()));
            }
        }
        if !a.base.port_type.pairs_with(b.base.port_type)
            || !a.allows(b.role())
            || !b.allows(a.role())
        {
            return Err(ConnectionRejected::IncompatibleRoles(
                a.id.to_string(),
                b.id.to_string(),
            ));
        }
        Ok(())
    }
}

fn node_pair(a: &NodeId, b: &NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// For every port, the port ids it could be joined to right now.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortConnectionsMap(BTreeMap<PortId, Vec<String>>);

impl PortConnectionsMap {
    pub fn get(&self, port: &PortId) -> Option<&[String]> {
        self.0.get(port).map(Vec::as_slice)
    }

    /// True when `to` is listed as an eligible partner of `from`.
    pub fn can_connect(&self, from: &PortId, to: &PortId) -> bool {
        let to = to.to_string();
        self.get(from).is_some_and(|targets| targets.contains(&to))
    }

    /// True when the port maps to the sentinel.
    pub fn is_blocked(&self, port: &PortId) -> bool {
        self.get(port)
            .is_some_and(|targets| targets.len() == 1 && targets[0] == NONE_SENTINEL)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PortId, &Vec<String>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub(crate) fn compute_port_connections(store: &FlowStore) -> PortConnectionsMap {
    let connectivity = Connectivity::build(store.connections());
    let ports: Vec<(&NodeModel, &ViewPort)> = store
        .nodes()
        .flat_map(|node| node.ports.iter().map(move |port| (node, port)))
        .collect();

    let mut map = BTreeMap::new();
    for &(a_node, a) in &ports {
        let mut targets: Vec<String> = ports
            .iter()
            .filter(|(b_node, b)| connectivity.check(a_node, a, b_node, b).is_ok())
            .map(|(_, b)| b.id.to_string())
            .collect();
        if targets.is_empty() {
            targets.push(NONE_SENTINEL.to_string());
        }
        map.insert(a.id.clone(), targets);
    }
    PortConnectionsMap(map)
}

/// What the canvas shows once collapsed groups hide their contents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisibleGraph {
    pub nodes: Vec<NodeModel>,
    pub groups: Vec<GroupNodeModel>,
    pub connections: Vec<ConnectionModel>,
}

/// The outermost collapsed group on the parent chain starting at `parent`.
pub(crate) fn collapsed_ancestor(store: &FlowStore, parent: Option<&NodeId>) -> Option<NodeId> {
    let mut current = parent.cloned();
    let mut outermost = None;
    let mut seen = HashSet::new();
    while let Some(id) = current {
        if !seen.insert(id.clone()) {
            tracing::warn!(group_id = %id, "Cycle in group nesting");
            break;
        }
        let Some(group) = store.group(&id) else {
            break;
        };
        if group.collapsed {
            outermost = Some(id.clone());
        }
        current = group.parent_id.clone();
    }
    outermost
}

pub(crate) fn compute_visible(store: &FlowStore) -> VisibleGraph {
    let nodes: Vec<NodeModel> = store
        .nodes()
        .filter(|n| collapsed_ancestor(store, n.parent_id.as_ref()).is_none())
        .cloned()
        .collect();
    let groups: Vec<GroupNodeModel> = store
        .groups()
        .filter(|g| collapsed_ancestor(store, g.parent_id.as_ref()).is_none())
        .cloned()
        .collect();

    let representative = |node_id: &NodeId| -> Option<NodeId> {
        let parent = store.node(node_id).and_then(|n| n.parent_id.as_ref());
        collapsed_ancestor(store, parent)
    };

    let mut seen = HashSet::new();
    let mut connections = Vec::new();
    for connection in store.connections() {
        let source_group = representative(&connection.source_node_id);
        let target_group = representative(&connection.target_node_id);
        let visible = match (source_group, target_group) {
            (None, None) => connection.clone(),
            (Some(s), Some(t)) if s == t => continue,
            (source_group, target_group) => {
                let source = source_group
                    .map(|g| PortId::new(g, GROUP_OUTPUT_ROLE))
                    .unwrap_or_else(|| connection.source_port_id.clone());
                let target = target_group
                    .map(|g| PortId::new(g, GROUP_INPUT_ROLE))
                    .unwrap_or_else(|| connection.target_port_id.clone());
                ConnectionModel::new_virtual(source, target)
            }
        };
        if seen.insert(visible.id.clone()) {
            connections.push(visible);
        }
    }

    VisibleGraph {
        nodes,
        groups,
        connections,
    }
}
