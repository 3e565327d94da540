//! # Flow store
//!
//! Single source of truth for the editor graph. Every mutation goes through a
//! method here; visible items and port eligibility are derived lazily and the
//! memo is dropped after each mutation.
//!
//! Mutations are best effort: an unknown id logs a warning and leaves the
//! state untouched instead of failing the caller.

use crate::arena::Table;
use crate::config::EditorConfig;
use crate::decision::{is_decision_output, normalize_decision_port_role};
use crate::error::ConnectionRejected;
use crate::model::{
    ConnectionData, ConnectionId, ConnectionModel, FlowModel, GroupId, GroupNodeModel, NodeId,
    NodeModel, PortId, PortRole, PortType,
};
use crate::payload::{NodeKind, NodePayload};
use crate::view::{self, Connectivity, PortConnectionsMap, VisibleGraph};
use glam::Vec2;
use slotmap::new_key_type;
use std::cell::OnceCell;
use std::collections::BTreeSet;

new_key_type! {
    pub(crate) struct NodeKey;
    pub(crate) struct ConnectionKey;
    pub(crate) struct GroupKey;
}

/// Options for [`FlowStore::update_node`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateNodeOptions {
    /// Keep existing decision-table connections even if the routing changed.
    ///
    /// Set when the update itself was caused by a connection change.
    pub skip_decision_table_reset: bool,
}

/// Items picked for deletion on the canvas.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    pub node_ids: Vec<NodeId>,
    pub connection_ids: Vec<ConnectionId>,
    pub group_ids: Vec<GroupId>,
}

/// What [`FlowStore::delete_selections`] actually removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeletedItems {
    pub node_ids: Vec<NodeId>,
    pub group_ids: Vec<GroupId>,
    pub connection_ids: Vec<ConnectionId>,
}

#[derive(Clone, Debug, Default)]
struct ViewCache {
    visible: OnceCell<VisibleGraph>,
    port_connections: OnceCell<PortConnectionsMap>,
}

/// The editor graph: nodes, connections and groups.
#[derive(Clone, Debug, Default)]
pub struct FlowStore {
    config: EditorConfig,
    nodes: Table<NodeKey, NodeId, NodeModel>,
    connections: Table<ConnectionKey, ConnectionId, ConnectionModel>,
    groups: Table<GroupKey, GroupId, GroupNodeModel>,
    views: ViewCache,
}

impl FlowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // --- Reads ---

    pub fn node(&self, id: &NodeId) -> Option<&NodeModel> {
        self.nodes.get(id)
    }

    pub fn group(&self, id: &GroupId) -> Option<&GroupNodeModel> {
        self.groups.get(id)
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<&ConnectionModel> {
        self.connections.get(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeModel> {
        self.nodes.iter()
    }

    pub fn connections(&self) -> impl Iterator<Item = &ConnectionModel> {
        self.connections.iter()
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupNodeModel> {
        self.groups.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn find_node_by_name(&self, name: &str) -> Option<&NodeModel> {
        self.nodes.iter().find(|n| n.node_name == name)
    }

    // --- Whole state ---

    /// Replaces the whole graph.
    #[tracing::instrument(
        skip(self, flow),
        fields(
            nodes = flow.nodes.len(),
            connections = flow.connections.len(),
            groups = flow.groups.len()
        )
    )]
    pub fn set_flow(&mut self, flow: FlowModel) {
        self.nodes.clear();
        self.connections.clear();
        self.groups.clear();

        for mut node in flow.nodes {
            prepare_node(&mut node);
            self.nodes.upsert(node.id.clone(), node);
        }
        for connection in flow.connections {
            if connection.is_virtual() {
                tracing::debug!(connection_id = %connection.id, "Skipping virtual connection on load");
                continue;
            }
            self.connections.upsert(connection.id.clone(), connection);
        }
        for group in flow.groups {
            self.groups.upsert(group.id.clone(), group);
        }
        self.invalidate();
    }

    /// Snapshot of the whole graph in insertion order.
    pub fn get_flow_state(&self) -> FlowModel {
        FlowModel {
            nodes: self.nodes.iter().cloned().collect(),
            connections: self.connections.iter().cloned().collect(),
            groups: self.groups.iter().cloned().collect(),
        }
    }

    // --- Creation ---

    /// Builds a node of `kind` with default ports and adds it.
    pub fn create_node(&mut self, kind: NodeKind, name: &str, position: Vec2) -> NodeId {
        let mut node = NodeModel::new(kind, name).with_position(position);
        node.size = self.config.default_node_size;
        let id = node.id.clone();
        self.add_node(node);
        id
    }

    /// Builds a group around `members` and adds it.
    pub fn create_group(&mut self, title: &str, position: Vec2, members: &[NodeId]) -> GroupId {
        let mut group = GroupNodeModel::new(title);
        group.position = position;
        group.size = self.config.default_group_size;
        let id = group.id.clone();
        self.add_group(group);
        self.set_parent(members, Some(id.clone()));
        id
    }

    pub fn add_node(&mut self, mut node: NodeModel) {
        prepare_node(&mut node);
        if self.nodes.upsert(node.id.clone(), node) {
            tracing::debug!("Replaced existing node on add");
        }
        self.invalidate();
    }

    pub fn add_group(&mut self, group: GroupNodeModel) {
        self.groups.upsert(group.id.clone(), group);
        self.invalidate();
    }

    /// Stores a connection if every connection rule allows it.
    ///
    /// A connection leaving a decision-table output also routes that output
    /// to the target node.
    pub fn add_connection(&mut self, connection: ConnectionModel) -> bool {
        match self.insert_connection(connection) {
            Ok(id) => {
                self.sync_binding_from_connection(&id);
                self.invalidate();
                true
            }
            Err(reason) => {
                tracing::warn!(%reason, "Connection rejected");
                false
            }
        }
    }

    /// Shorthand for [`FlowStore::add_connection`] between two ports.
    pub fn connect(&mut self, source: &PortId, target: &PortId) -> bool {
        self.add_connection(ConnectionModel::new(source.clone(), target.clone()))
    }

    /// Adds several connections; returns how many were accepted.
    pub fn add_connections_in_batch(&mut self, connections: Vec<ConnectionModel>) -> usize {
        let mut added = 0;
        for connection in connections {
            match self.insert_connection(connection) {
                Ok(id) => {
                    self.sync_binding_from_connection(&id);
                    added += 1;
                }
                Err(reason) => tracing::warn!(%reason, "Connection rejected in batch"),
            }
        }
        self.invalidate();
        added
    }

    // --- Updates ---

    /// Replaces a node by id.
    ///
    /// When a decision table's routing or outputs changed, its outgoing
    /// connections are rebuilt from the table data unless
    /// `skip_decision_table_reset` is set.
    pub fn update_node(&mut self, mut node: NodeModel, options: UpdateNodeOptions) -> bool {
        let Some(stored) = self.nodes.get(&node.id) else {
            tracing::warn!(node_id = %node.id, "Cannot update unknown node");
            return false;
        };
        prepare_node(&mut node);
        let needs_reset =
            !options.skip_decision_table_reset && decision_routing_changed(stored, &node);

        let id = node.id.clone();
        self.nodes.upsert(id.clone(), node);
        if needs_reset {
            self.reset_decision_table_connections(&id);
        }
        self.invalidate();
        true
    }

    /// Replaces known nodes by id without touching their connections.
    pub fn update_nodes_in_batch(&mut self, nodes: Vec<NodeModel>) -> usize {
        let mut updated = 0;
        for mut node in nodes {
            if !self.nodes.contains(&node.id) {
                tracing::warn!(node_id = %node.id, "Skipping unknown node in batch update");
                continue;
            }
            prepare_node(&mut node);
            self.nodes.upsert(node.id.clone(), node);
            updated += 1;
        }
        self.invalidate();
        updated
    }

    pub fn update_groups_in_batch(&mut self, groups: Vec<GroupNodeModel>) -> usize {
        let mut updated = 0;
        for group in groups {
            if !self.groups.contains(&group.id) {
                tracing::warn!(group_id = %group.id, "Skipping unknown group in batch update");
                continue;
            }
            self.groups.upsert(group.id.clone(), group);
            updated += 1;
        }
        self.invalidate();
        updated
    }

    pub fn update_connections_in_batch(&mut self, connections: Vec<ConnectionModel>) -> usize {
        let mut updated = 0;
        for connection in connections {
            if connection.is_virtual() || !self.connections.contains(&connection.id) {
                tracing::warn!(connection_id = %connection.id, "Skipping unknown connection in batch update");
                continue;
            }
            self.connections.upsert(connection.id.clone(), connection);
            updated += 1;
        }
        self.invalidate();
        updated
    }

    /// Brings the connections leaving a decision table's outputs in line with
    /// the table's current routing.
    ///
    /// A connection whose output is still routed to its target's name is
    /// kept. The others are dropped and every output without a connection is
    /// rebuilt from the first node carrying the routed name.
    pub fn reset_decision_table_connections(&mut self, node_id: &NodeId) {
        let Some(node) = self.nodes.get(node_id) else {
            tracing::warn!(node_id = %node_id, "Cannot reset connections of unknown node");
            return;
        };
        let Some(table) = node.data.as_decision_table() else {
            tracing::warn!(node_id = %node_id, "Node is not a decision table");
            return;
        };
        let bindings = table.bindings();

        let mut settled: BTreeSet<PortRole> = BTreeSet::new();
        let mut stale: Vec<ConnectionId> = Vec::new();
        for connection in self.connections.iter() {
            if &connection.source_node_id != node_id
                || !is_decision_output(&connection.source_port_id.role)
            {
                continue;
            }
            let role = PortRole(normalize_decision_port_role(
                connection.source_port_id.role.as_str(),
            ));
            let target_name = self
                .nodes
                .get(&connection.target_node_id)
                .map(|n| n.node_name.as_str());
            let still_routed = bindings
                .iter()
                .any(|(r, name)| r == &role && name.as_deref().is_some_and(|n| Some(n) == target_name));
            if still_routed && settled.insert(role) {
                continue;
            }
            stale.push(connection.id.clone());
        }
        for id in &stale {
            self.connections.remove(id);
        }
        self.forget_connections(&stale);

        for (role, target_name) in bindings {
            let Some(target_name) = target_name else {
                continue;
            };
            if settled.contains(&role) {
                continue;
            }
            let target_port = self
                .nodes
                .iter()
                .find(|n| n.node_name == target_name && &n.id != node_id)
                .and_then(|target| {
                    target
                        .ports
                        .iter()
                        .find(|p| p.base.port_type.contains(PortType::INPUT) && p.allows(&role))
                        .map(|p| p.id.clone())
                });
            let Some(target_port) = target_port else {
                tracing::warn!(node_id = %node_id, target = %target_name, role = %role, "No input to route decision output to");
                continue;
            };
            let connection = ConnectionModel::new(PortId::new(node_id.clone(), role), target_port);
            if let Err(reason) = self.insert_connection(connection) {
                tracing::warn!(node_id = %node_id, %reason, "Decision output not reconnected");
            }
        }
        self.invalidate();
    }

    // --- Removal ---

    /// Removes a stored connection. Virtual ids are ignored.
    pub fn remove_connection(&mut self, id: &ConnectionId) -> bool {
        let removed = self.detach_connection(id);
        if removed {
            self.invalidate();
        }
        removed
    }

    pub fn remove_connections_in_batch(&mut self, ids: &[ConnectionId]) -> usize {
        let removed = ids.iter().filter(|id| self.detach_connection(id)).count();
        self.invalidate();
        removed
    }

    /// Deletes the selection with its cascade.
    ///
    /// Collapsed groups take their whole subtree with them; expanded groups
    /// release their direct children to the top level. Connections touching
    /// anything deleted go too, and decision tables that lose an output
    /// connection forget the matching route.
    #[tracing::instrument(
        skip(self, selection),
        fields(
            nodes = selection.node_ids.len(),
            connections = selection.connection_ids.len(),
            groups = selection.group_ids.len()
        )
    )]
    pub fn delete_selections(&mut self, selection: Selection) -> DeletedItems {
        let mut doomed_nodes: BTreeSet<NodeId> = BTreeSet::new();
        for id in selection.node_ids {
            if self.nodes.contains(&id) {
                doomed_nodes.insert(id);
            } else {
                tracing::warn!(node_id = %id, "Cannot delete unknown node");
            }
        }

        let mut doomed_groups: BTreeSet<GroupId> = BTreeSet::new();
        let mut expanded: Vec<GroupId> = Vec::new();
        for id in selection.group_ids {
            let Some(group) = self.groups.get(&id) else {
                tracing::warn!(group_id = %id, "Cannot delete unknown group");
                continue;
            };
            if group.collapsed {
                let (nodes, groups) = self.descendants(&id);
                doomed_nodes.extend(nodes);
                doomed_groups.extend(groups);
            } else {
                expanded.push(id.clone());
            }
            doomed_groups.insert(id);
        }

        for group_id in &expanded {
            for node in self.nodes.values_mut() {
                if node.parent_id.as_ref() == Some(group_id) && !doomed_nodes.contains(&node.id) {
                    node.parent_id = None;
                }
            }
            for group in self.groups.values_mut() {
                if group.parent_id.as_ref() == Some(group_id) && !doomed_groups.contains(&group.id) {
                    group.parent_id = None;
                }
            }
        }

        let mut doomed_connections: BTreeSet<ConnectionId> = selection
            .connection_ids
            .into_iter()
            .filter(|id| !id.is_virtual() && self.connections.contains(id))
            .collect();
        doomed_connections.extend(
            self.connections
                .iter()
                .filter(|c| {
                    doomed_nodes.contains(&c.source_node_id) || doomed_nodes.contains(&c.target_node_id)
                })
                .map(|c| c.id.clone()),
        );

        for id in &doomed_nodes {
            self.nodes.remove(id);
        }
        for id in &doomed_groups {
            self.groups.remove(id);
        }

        let mut removed = Vec::new();
        for id in &doomed_connections {
            if let Some(connection) = self.connections.remove(id) {
                removed.push(connection);
            }
        }
        let removed_ids: Vec<ConnectionId> = doomed_connections.into_iter().collect();
        self.forget_connections(&removed_ids);

        let mut touched_tables = BTreeSet::new();
        for connection in &removed {
            if self.release_decision_binding(connection) {
                touched_tables.insert(connection.source_node_id.clone());
            }
        }
        for table_id in touched_tables {
            if let Some(node) = self.nodes.get_mut(&table_id) {
                prepare_node(node);
            }
        }

        self.invalidate();
        let deleted = DeletedItems {
            node_ids: doomed_nodes.into_iter().collect(),
            group_ids: doomed_groups.into_iter().collect(),
            connection_ids: removed_ids,
        };
        tracing::info!(
            nodes = deleted.node_ids.len(),
            groups = deleted.group_ids.len(),
            connections = deleted.connection_ids.len(),
            "Deleted selection"
        );
        deleted
    }

    // --- Groups ---

    /// Collapses an expanded group or expands a collapsed one.
    ///
    /// Collapsing records which connections the group now hides.
    pub fn toggle_group_collapsed(&mut self, group_id: &GroupId) -> bool {
        let Some(group) = self.groups.get(group_id) else {
            tracing::warn!(group_id = %group_id, "Cannot toggle unknown group");
            return false;
        };
        let collapsing = !group.collapsed;
        let connection_data = if collapsing {
            self.classify_connections(group_id)
        } else {
            ConnectionData::default()
        };
        if let Some(group) = self.groups.get_mut(group_id) {
            group.collapsed = collapsing;
            group.connection_data = connection_data;
        }
        self.invalidate();
        true
    }

    /// Moves nodes or groups under `parent`, or to the top level for `None`.
    ///
    /// Groups are never moved into themselves or their own descendants.
    pub fn set_parent(&mut self, ids: &[NodeId], parent: Option<GroupId>) -> usize {
        if let Some(parent_id) = &parent {
            if !self.groups.contains(parent_id) {
                tracing::warn!(group_id = %parent_id, "Cannot reparent into unknown group");
                return 0;
            }
        }
        let mut moved = 0;
        for id in ids {
            if let Some(node) = self.nodes.get_mut(id) {
                node.parent_id = parent.clone();
                moved += 1;
                continue;
            }
            if !self.groups.contains(id) {
                tracing::warn!(id = %id, "Cannot reparent unknown item");
                continue;
            }
            if let Some(parent_id) = &parent {
                if parent_id == id || self.descendants(id).1.contains(parent_id) {
                    tracing::warn!(group_id = %id, parent_id = %parent_id, "Refusing to nest a group inside itself");
                    continue;
                }
            }
            if let Some(group) = self.groups.get_mut(id) {
                group.parent_id = parent.clone();
                moved += 1;
            }
        }
        if moved > 0 {
            self.invalidate();
        }
        moved
    }

    pub fn move_nodes_into_group(&mut self, ids: &[NodeId], group_id: &GroupId) -> usize {
        self.set_parent(ids, Some(group_id.clone()))
    }

    /// Nodes and groups nested anywhere below `group_id`.
    pub fn descendants(&self, group_id: &GroupId) -> (BTreeSet<NodeId>, BTreeSet<GroupId>) {
        let mut visited: BTreeSet<GroupId> = BTreeSet::from([group_id.clone()]);
        let mut frontier = vec![group_id.clone()];
        while let Some(current) = frontier.pop() {
            for group in self.groups.iter() {
                if group.parent_id.as_ref() == Some(&current) && visited.insert(group.id.clone()) {
                    frontier.push(group.id.clone());
                }
            }
        }
        let nodes = self
            .nodes
            .iter()
            .filter(|n| n.parent_id.as_ref().is_some_and(|p| visited.contains(p)))
            .map(|n| n.id.clone())
            .collect();
        visited.remove(group_id);
        (nodes, visited)
    }

    // --- Views ---

    pub fn visible_nodes(&self) -> &[NodeModel] {
        &self.visible().nodes
    }

    pub fn visible_groups(&self) -> &[GroupNodeModel] {
        &self.visible().groups
    }

    /// Stored connections between visible nodes, plus virtual connections
    /// re-routed to the outermost collapsed group of a hidden endpoint.
    pub fn visible_connections(&self) -> &[ConnectionModel] {
        &self.visible().connections
    }

    pub fn port_connections_map(&self) -> &PortConnectionsMap {
        self.views
            .port_connections
            .get_or_init(|| view::compute_port_connections(self))
    }

    /// Whether the two ports could be joined right now, in either orientation.
    pub fn can_ports_connect(&self, a: &PortId, b: &PortId) -> bool {
        let endpoint = |id: &PortId| {
            self.nodes
                .get(&id.node_id)
                .and_then(|node| node.port_by_id(id).map(|port| (node, port)))
        };
        let (Some((a_node, a_port)), Some((b_node, b_port))) = (endpoint(a), endpoint(b)) else {
            return false;
        };
        Connectivity::build(self.connections.iter())
            .check(a_node, a_port, b_node, b_port)
            .is_ok()
    }

    fn visible(&self) -> &VisibleGraph {
        self.views
            .visible
            .get_or_init(|| view::compute_visible(self))
    }

    fn invalidate(&mut self) {
        self.views = ViewCache::default();
    }

    // --- Internals ---

    fn insert_connection(
        &mut self,
        connection: ConnectionModel,
    ) -> Result<ConnectionId, ConnectionRejected> {
        if connection.is_virtual() {
            return Err(ConnectionRejected::Virtual(connection.id.to_string()));
        }
        if self.connections.contains(&connection.id) {
            return Err(ConnectionRejected::Duplicate(connection.id.to_string()));
        }
        let source_node = self
            .nodes
            .get(&connection.source_node_id)
            .ok_or_else(|| ConnectionRejected::UnknownNode(connection.source_node_id.to_string()))?;
        let target_node = self
            .nodes
            .get(&connection.target_node_id)
            .ok_or_else(|| ConnectionRejected::UnknownNode(connection.target_node_id.to_string()))?;
        let source_port = source_node
            .port_by_id(&connection.source_port_id)
            .ok_or_else(|| ConnectionRejected::UnknownPort(connection.source_port_id.to_string()))?;
        let target_port = target_node
            .port_by_id(&connection.target_port_id)
            .ok_or_else(|| ConnectionRejected::UnknownPort(connection.target_port_id.to_string()))?;

        if !source_port.base.port_type.contains(PortType::OUTPUT)
            || !target_port.base.port_type.contains(PortType::INPUT)
        {
            return Err(ConnectionRejected::IncompatibleRoles(
                source_port.id.to_string(),
                target_port.id.to_string(),
            ));
        }
        Connectivity::build(self.connections.iter()).check(
            source_node,
            source_port,
            target_node,
            target_port,
        )?;

        let id = connection.id.clone();
        self.connections.upsert(id.clone(), connection);
        Ok(id)
    }

    /// Routes a decision output to the node its new connection points at.
    fn sync_binding_from_connection(&mut self, id: &ConnectionId) {
        let Some(connection) = self.connections.get(id) else {
            return;
        };
        if !is_decision_output(&connection.source_port_id.role) {
            return;
        }
        let Some(target_name) = self
            .nodes
            .get(&connection.target_node_id)
            .map(|n| n.node_name.clone())
        else {
            return;
        };
        let role = connection.source_port_id.role.clone();
        let Some(mut table_node) = self.nodes.get(&connection.source_node_id).cloned() else {
            return;
        };
        let Some(table) = table_node.data.as_decision_table_mut() else {
            return;
        };
        if table.set_binding(&role, Some(target_name)) {
            self.update_node(
                table_node,
                UpdateNodeOptions {
                    skip_decision_table_reset: true,
                },
            );
        }
    }

    fn detach_connection(&mut self, id: &ConnectionId) -> bool {
        if id.is_virtual() {
            tracing::debug!(connection_id = %id, "Ignoring virtual connection");
            return false;
        }
        let Some(connection) = self.connections.remove(id) else {
            tracing::warn!(connection_id = %id, "Cannot remove unknown connection");
            return false;
        };
        self.forget_connections(std::slice::from_ref(id));
        self.release_decision_binding(&connection);
        true
    }

    /// Clears the route of a decision output whose connection was removed,
    /// unless another connection still leaves the same output.
    ///
    /// Returns true when a route was cleared.
    fn release_decision_binding(&mut self, removed: &ConnectionModel) -> bool {
        let role = &removed.source_port_id.role;
        if !is_decision_output(role) {
            return false;
        }
        let normalized = normalize_decision_port_role(role.as_str());
        let still_occupied = self.connections.iter().any(|c| {
            c.source_node_id == removed.source_node_id
                && normalize_decision_port_role(c.source_port_id.role.as_str())
                    == normalized
        });
        if still_occupied {
            return false;
        }
        self.nodes
            .get_mut(&removed.source_node_id)
            .and_then(|node| node.data.as_decision_table_mut())
            .is_some_and(|table| table.clear_binding(role))
    }

    fn forget_connections(&mut self, ids: &[ConnectionId]) {
        if ids.is_empty() {
            return;
        }
        for group in self.groups.values_mut() {
            for id in ids {
                group.connection_data.forget(id);
            }
        }
    }

    fn classify_connections(&self, group_id: &GroupId) -> ConnectionData {
        let (inside, _) = self.descendants(group_id);
        let mut data = ConnectionData::default();
        for connection in self.connections.iter() {
            match (
                inside.contains(&connection.source_node_id),
                inside.contains(&connection.target_node_id),
            ) {
                (true, true) => data.internal.push(connection.id.clone()),
                (false, true) => data.inputs.push(connection.id.clone()),
                (true, false) => data.outputs.push(connection.id.clone()),
                (false, false) => {}
            }
        }
        data
    }
}

/// Normalizes a node before it is stored: port ids follow the node id, and a
/// decision table's validity flags and ports follow its groups.
fn prepare_node(node: &mut NodeModel) {
    if let NodePayload::DecisionTable(table) = &mut node.data {
        table.recompute_validity();
        node.ports = node.default_ports();
    } else {
        node.rebind_ports();
    }
}

fn decision_routing_changed(old: &NodeModel, new: &NodeModel) -> bool {
    match (old.data.as_decision_table(), new.data.as_decision_table()) {
        (Some(before), Some(after)) => before.bindings() != after.bindings() || old.ports != new.ports,
        _ => false,
    }
}
