//! # Decision tables
//!
//! A decision-table node routes to one output port per valid condition group,
//! plus a default and an error port. Group names are free text; port roles are
//! derived from them with [`normalize_decision_port_role`], so every role
//! comparison in this crate goes through that function.

use crate::model::{NodeId, PortId, PortRole, ViewPort};
use crate::rules;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Prefix of the role of every per-group output port.
pub const DECISION_OUT_PREFIX: &str = "decision-out-";
/// Template role that dynamically named decision ports fall back to.
pub const DECISION_OUT_ROLE: &str = "decision-out";
pub const DECISION_DEFAULT_ROLE: &str = "decision-default";
pub const DECISION_ERROR_ROLE: &str = "decision-error";
pub const TABLE_IN_ROLE: &str = "table-in";

/// Lowercases `role` and replaces each run of whitespace with one hyphen.
///
/// No trimming happens: `"decision-out-Group 1 "` becomes `"decision-out-group-1-"`.
pub fn normalize_decision_port_role(role: &str) -> String {
    let mut normalized = String::with_capacity(role.len());
    let mut in_whitespace = false;
    for ch in role.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                normalized.push('-');
            }
            in_whitespace = true;
        } else {
            normalized.extend(ch.to_lowercase());
            in_whitespace = false;
        }
    }
    normalized
}

/// Role of the output port generated for a condition group.
pub fn decision_port_role(group_name: &str) -> PortRole {
    PortRole(normalize_decision_port_role(&format!(
        "{DECISION_OUT_PREFIX}{group_name}"
    )))
}

/// True for the group, default and error outputs of a decision table.
pub fn is_decision_output(role: &PortRole) -> bool {
    let role = role.as_str();
    role.starts_with(DECISION_OUT_PREFIX)
        || role == DECISION_DEFAULT_ROLE
        || role == DECISION_ERROR_ROLE
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    #[default]
    Simple,
    Complex,
}

/// One named condition inside a group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub condition_name: String,
    pub condition: String,
}

/// One row of the table's branching logic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionGroup {
    pub group_name: String,
    pub group_type: GroupType,
    pub expression: String,
    pub conditions: Vec<Condition>,
    pub manipulation: Option<String>,
    /// Name of the node this group routes to.
    pub next_node: Option<String>,
    /// Derived by [`DecisionTableData::recompute_validity`].
    pub valid: bool,
    pub order: u32,
}

impl ConditionGroup {
    pub fn new(group_name: impl Into<String>, expression: impl Into<String>, order: u32) -> Self {
        Self {
            group_name: group_name.into(),
            expression: expression.into(),
            order,
            ..Default::default()
        }
    }

    pub fn port_role(&self) -> PortRole {
        decision_port_role(&self.group_name)
    }
}

/// Payload of a decision-table node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionTableData {
    pub name: String,
    pub condition_groups: Vec<ConditionGroup>,
    pub default_next_node: Option<String>,
    pub next_error_node: Option<String>,
}

impl DecisionTableData {
    /// Recomputes `valid` for every group.
    ///
    /// A group is valid with a non-blank name, a non-blank expression and a
    /// port role no sibling shares.
    pub fn recompute_validity(&mut self) {
        let mut role_counts: HashMap<PortRole, usize> = HashMap::new();
        for group in &self.condition_groups {
            *role_counts.entry(group.port_role()).or_default() += 1;
        }
        for group in &mut self.condition_groups {
            let unique = role_counts.get(&group.port_role()).copied().unwrap_or(0) == 1;
            group.valid = !group.group_name.trim().is_empty()
                && !group.expression.trim().is_empty()
                && unique;
        }
    }

    /// Valid groups sorted by `order`; ties keep their stored position.
    pub fn ordered_valid_groups(&self) -> Vec<&ConditionGroup> {
        let mut groups: Vec<&ConditionGroup> =
            self.condition_groups.iter().filter(|g| g.valid).collect();
        groups.sort_by_key(|g| g.order);
        groups
    }

    /// Every output role paired with the node name it routes to.
    pub fn bindings(&self) -> Vec<(PortRole, Option<String>)> {
        let mut bindings: Vec<(PortRole, Option<String>)> = self
            .ordered_valid_groups()
            .into_iter()
            .map(|g| (g.port_role(), g.next_node.clone()))
            .collect();
        bindings.push((PortRole::from(DECISION_DEFAULT_ROLE), self.default_next_node.clone()));
        bindings.push((PortRole::from(DECISION_ERROR_ROLE), self.next_error_node.clone()));
        bindings
    }

    /// Points the output matching `role` at `target`. Returns false when no
    /// output matches.
    pub fn set_binding(&mut self, role: &PortRole, target: Option<String>) -> bool {
        let normalized = normalize_decision_port_role(role.as_str());
        if normalized == DECISION_DEFAULT_ROLE {
            self.default_next_node = target;
            return true;
        }
        if normalized == DECISION_ERROR_ROLE {
            self.next_error_node = target;
            return true;
        }
        match self
            .condition_groups
            .iter_mut()
            .find(|g| g.port_role().as_str() == normalized)
        {
            Some(group) => {
                group.next_node = target;
                true
            }
            None => false,
        }
    }

    pub fn clear_binding(&mut self, role: &PortRole) -> bool {
        self.set_binding(role, None)
    }
}

/// Builds the table's current port list: the input, one output per valid
/// group in order, then the default and error outputs.
pub fn generate_decision_ports(node_id: &NodeId, table: &DecisionTableData) -> Vec<ViewPort> {
    let mut table = table.clone();
    table.recompute_validity();

    let mut ports: Vec<ViewPort> = rules::default_ports(node_id, crate::payload::NodeKind::DecisionTable)
        .into_iter()
        .filter(|p| p.role().as_str() == TABLE_IN_ROLE)
        .collect();

    let template = rules::decision_template();
    for group in table.ordered_valid_groups() {
        let mut base = template.to_base();
        base.role = group.port_role();
        ports.push(ViewPort {
            id: PortId::new(node_id.clone(), base.role.clone()),
            base,
        });
    }

    for role in [DECISION_DEFAULT_ROLE, DECISION_ERROR_ROLE] {
        if let Some(template) = rules::template_for_role(role) {
            ports.push(template.instantiate(node_id));
        }
    }
    ports
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(groups: Vec<ConditionGroup>) -> DecisionTableData {
        let mut table = DecisionTableData {
            condition_groups: groups,
            ..Default::default()
        };
        table.recompute_validity();
        table
    }

    #[test]
    fn normalization_is_lowercase_and_hyphenated_without_trim() {
        assert_eq!(
            normalize_decision_port_role("decision-out-Group 1"),
            "decision-out-group-1"
        );
        assert_eq!(
            normalize_decision_port_role("decision-out-Group 1 "),
            "decision-out-group-1-"
        );
        assert_ne!(
            normalize_decision_port_role("decision-out-Group 1"),
            normalize_decision_port_role("decision-out-Group 1 ")
        );
        assert_eq!(normalize_decision_port_role("A  \tB"), "a-b");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_decision_port_role("decision-out-High Risk");
        assert_eq!(normalize_decision_port_role(&once), once);
    }

    #[test]
    fn validity_requires_name_expression_and_uniqueness() {
        let t = table(vec![
            ConditionGroup::new("Approve", "score > 5", 0),
            ConditionGroup::new("", "x", 1),
            ConditionGroup::new("Reject", "  ", 2),
            ConditionGroup::new("dup", "a", 3),
            ConditionGroup::new("DUP", "b", 4),
        ]);
        let validity: Vec<bool> = t.condition_groups.iter().map(|g| g.valid).collect();
        assert_eq!(validity, vec![true, false, false, false, false]);
    }

    #[test]
    fn ports_follow_group_order() {
        let t = table(vec![
            ConditionGroup::new("Second", "b", 2),
            ConditionGroup::new("First", "a", 1),
            ConditionGroup::new("", "skipped", 0),
        ]);
        let ports = generate_decision_ports(&NodeId::from("dt"), &t);
        let ids: Vec<String> = ports.iter().map(|p| p.id.to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "dt_table-in",
                "dt_decision-out-first",
                "dt_decision-out-second",
                "dt_decision-default",
                "dt_decision-error",
            ]
        );
    }

    #[test]
    fn bindings_match_by_normalized_role() {
        let mut t = table(vec![ConditionGroup::new("Group 1", "x > 1", 0)]);
        assert!(t.set_binding(&PortRole::from("decision-out-Group 1"), Some("End".into())));
        assert_eq!(t.condition_groups[0].next_node.as_deref(), Some("End"));

        assert!(t.clear_binding(&PortRole::from("decision-out-group-1")));
        assert_eq!(t.condition_groups[0].next_node, None);

        assert!(t.set_binding(&PortRole::from(DECISION_ERROR_ROLE), Some("Oops".into())));
        assert_eq!(t.next_error_node.as_deref(), Some("Oops"));
        assert!(!t.set_binding(&PortRole::from("decision-out-missing"), None));
    }
}
