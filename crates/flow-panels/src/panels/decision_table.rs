use crate::form::FormError;
use crate::panel::{BaseSidePanel, PanelCore, kind_mismatch};
use crate::schema::VisualField;
use flow_graph::decision::{Condition, ConditionGroup, DecisionTableData, GroupType};
use flow_graph::{NodeKind, NodeModel, NodePayload, PortRole};

const TABLE_NAME: &str = "table_name";

/// Edits a decision table's condition groups.
///
/// The groups are kept as a working copy of the table data; validity is
/// recomputed after every edit so the grid can flag bad rows immediately.
/// Invalid groups do not block saving, they just get no output port.
///
/// Routes can also change in the store while the panel is open, when an
/// output is connected on the canvas. A save only writes the routes edited
/// here and keeps the stored ones otherwise.
#[derive(Debug, Default)]
pub struct DecisionTablePanel {
    core: PanelCore,
    table: DecisionTableData,
    /// One entry per condition group, in the same order.
    routes: Vec<RouteEdit>,
    default_route_edited: bool,
    error_route_edited: bool,
}

#[derive(Clone, Debug, Default)]
struct RouteEdit {
    /// Output role the group had when the form was loaded.
    loaded_role: Option<PortRole>,
    edited: bool,
}

impl DecisionTablePanel {
    pub fn table(&self) -> &DecisionTableData {
        &self.table
    }

    pub fn groups(&self) -> &[ConditionGroup] {
        &self.table.condition_groups
    }

    /// Appends a group after the current last one and returns its index.
    pub fn add_group(&mut self, group_name: &str) -> usize {
        let order = self
            .table
            .condition_groups
            .iter()
            .map(|g| g.order + 1)
            .max()
            .unwrap_or(0);
        self.table
            .condition_groups
            .push(ConditionGroup::new(group_name, "", order));
        self.routes.push(RouteEdit {
            loaded_role: None,
            edited: true,
        });
        self.table.recompute_validity();
        self.table.condition_groups.len() - 1
    }

    pub fn remove_group(&mut self, index: usize) -> bool {
        if index >= self.table.condition_groups.len() {
            tracing::warn!(index, "Ignoring removal of missing condition group");
            return false;
        }
        self.table.condition_groups.remove(index);
        if index < self.routes.len() {
            self.routes.remove(index);
        }
        self.table.recompute_validity();
        true
    }

    pub fn rename_group(&mut self, index: usize, group_name: &str) -> bool {
        self.edit_group(index, |g| g.group_name = group_name.to_string())
    }

    pub fn set_expression(&mut self, index: usize, expression: &str) -> bool {
        self.edit_group(index, |g| g.expression = expression.to_string())
    }

    pub fn set_group_type(&mut self, index: usize, group_type: GroupType) -> bool {
        self.edit_group(index, |g| g.group_type = group_type)
    }

    pub fn set_manipulation(&mut self, index: usize, manipulation: Option<String>) -> bool {
        self.edit_group(index, |g| g.manipulation = manipulation)
    }

    pub fn set_next_node(&mut self, index: usize, next_node: Option<String>) -> bool {
        if !self.edit_group(index, |g| g.next_node = next_node) {
            return false;
        }
        if let Some(route) = self.routes.get_mut(index) {
            route.edited = true;
        }
        true
    }

    pub fn set_order(&mut self, index: usize, order: u32) -> bool {
        self.edit_group(index, |g| g.order = order)
    }

    pub fn add_condition(&mut self, index: usize, condition_name: &str, condition: &str) -> bool {
        self.edit_group(index, |g| {
            g.conditions.push(Condition {
                condition_name: condition_name.to_string(),
                condition: condition.to_string(),
            })
        })
    }

    pub fn remove_condition(&mut self, index: usize, condition_index: usize) -> bool {
        let Some(group) = self.table.condition_groups.get_mut(index) else {
            return false;
        };
        if condition_index >= group.conditions.len() {
            return false;
        }
        group.conditions.remove(condition_index);
        true
    }

    pub fn set_default_next_node(&mut self, next_node: Option<String>) {
        self.table.default_next_node = next_node;
        self.default_route_edited = true;
    }

    pub fn set_next_error_node(&mut self, next_node: Option<String>) {
        self.table.next_error_node = next_node;
        self.error_route_edited = true;
    }

    /// Copies the stored routes the panel has not touched into `table`.
    fn keep_stored_routes(&self, table: &mut DecisionTableData, stored: &DecisionTableData) {
        for (group, route) in table.condition_groups.iter_mut().zip(&self.routes) {
            if route.edited {
                continue;
            }
            let Some(role) = &route.loaded_role else {
                continue;
            };
            if let Some(current) = stored.condition_groups.iter().find(|g| &g.port_role() == role) {
                group.next_node = current.next_node.clone();
            }
        }
        if !self.default_route_edited {
            table.default_next_node = stored.default_next_node.clone();
        }
        if !self.error_route_edited {
            table.next_error_node = stored.next_error_node.clone();
        }
    }

    fn edit_group(&mut self, index: usize, edit: impl FnOnce(&mut ConditionGroup)) -> bool {
        let Some(group) = self.table.condition_groups.get_mut(index) else {
            tracing::warn!(index, "Ignoring edit of missing condition group");
            return false;
        };
        edit(group);
        self.table.recompute_validity();
        true
    }
}

impl BaseSidePanel for DecisionTablePanel {
    panel_plumbing!(NodeKind::DecisionTable);

    fn initialize_form(&mut self, node: &NodeModel) {
        self.core = PanelCore::seeded(node, vec![VisualField::text(TABLE_NAME)]);
        self.table = node.data.as_decision_table().cloned().unwrap_or_default();
        self.table.recompute_validity();
        self.routes = self
            .table
            .condition_groups
            .iter()
            .map(|g| RouteEdit {
                loaded_role: Some(g.port_role()),
                edited: false,
            })
            .collect();
        self.default_route_edited = false;
        self.error_route_edited = false;
        self.core.form.update_value(TABLE_NAME, self.table.name.clone());
    }

    fn create_updated_node(&self, node: &NodeModel) -> Result<NodeModel, FormError> {
        if node.kind() != NodeKind::DecisionTable {
            return Err(kind_mismatch(NodeKind::DecisionTable, node));
        }
        let mut table = self.table.clone();
        table.name = self.core.form.string(TABLE_NAME)?;
        if let Some(stored) = node.data.as_decision_table() {
            self.keep_stored_routes(&mut table, stored);
        }
        let mut updated = self.core.apply_common(node)?;
        updated.data = NodePayload::DecisionTable(table);
        updated.ports = updated.default_ports();
        Ok(updated)
    }
}
