use flow_graph::decision::ConditionGroup;
use flow_graph::model::PortId;
use flow_graph::payload::PythonCode;
use flow_graph::{EditorConfig, FlowStore, NodeKind, NodePayload};
use flow_panels::panels::DecisionTablePanel;
use flow_panels::{BaseSidePanel, PanelShell, panel_for};
use glam::Vec2;

fn store_with_python() -> (FlowStore, flow_graph::NodeId, flow_graph::NodeId) {
    let mut store = FlowStore::new();
    let a = store.create_node(NodeKind::Python, "Parse", Vec2::ZERO);
    let b = store.create_node(NodeKind::Python, "Report", Vec2::new(400.0, 0.0));
    (store, a, b)
}

#[test]
fn test_switching_nodes_autosaves() -> anyhow::Result<()> {
    let (mut store, a, b) = store_with_python();
    let mut shell = PanelShell::default();

    // 1. Open A and edit it
    shell.select_node(&mut store, Some(&a));
    assert_eq!(shell.selected_node(), Some(&a));
    let panel = shell.panel_mut().ok_or_else(|| anyhow::anyhow!("no panel"))?;
    panel.form_mut().update_value("code", "def main(state):\n    return state");
    panel.form_mut().update_value("node_name", "Parse input");

    // 2. Switching to B saves A
    shell.select_node(&mut store, Some(&b));
    let saved = store.node(&a).ok_or_else(|| anyhow::anyhow!("node A missing"))?;
    assert_eq!(saved.node_name, "Parse input");
    match &saved.data {
        NodePayload::Python(PythonCode { code, entrypoint, .. }) => {
            assert!(code.starts_with("def main"));
            assert_eq!(entrypoint, "main");
        }
        other => panic!("unexpected payload {other:?}"),
    }
    assert_eq!(shell.selected_node(), Some(&b));
    Ok(())
}

#[test]
fn test_invalid_form_is_not_saved() {
    let (mut store, a, b) = store_with_python();
    let before = store.node(&a).cloned();
    let mut shell = PanelShell::default();

    shell.select_node(&mut store, Some(&a));
    if let Some(panel) = shell.panel_mut() {
        // Code is still empty, so the form stays invalid
        panel.form_mut().update_value("node_name", "Renamed");
        assert!(!panel.is_valid());
    }
    shell.select_node(&mut store, Some(&b));

    assert_eq!(store.node(&a).cloned(), before);
}

#[test]
fn test_escape_saves_and_closes() {
    let (mut store, a, _) = store_with_python();
    let mut shell = PanelShell::default();
    shell.select_node(&mut store, Some(&a));
    if let Some(panel) = shell.panel_mut() {
        panel.form_mut().update_value("code", "pass");
        panel.input_map_mut().set(0, "query", "state.query");
    }

    assert!(shell.on_escape(&mut store));
    assert!(shell.selected_node().is_none());
    assert!(shell.panel().is_none());
    let node = store.node(&a).unwrap();
    assert_eq!(node.input_map.get("query").map(String::as_str), Some("state.query"));
}

#[test]
fn test_escape_without_autosave_discards() {
    let (mut store, a, _) = store_with_python();
    let config = EditorConfig {
        autosave_on_escape: false,
        ..EditorConfig::default()
    };
    let mut shell = PanelShell::new(&config);
    shell.select_node(&mut store, Some(&a));
    if let Some(panel) = shell.panel_mut() {
        panel.form_mut().update_value("code", "pass");
    }

    assert!(!shell.on_escape(&mut store));
    match &store.node(&a).unwrap().data {
        NodePayload::Python(code) => assert!(code.code.is_empty()),
        other => panic!("unexpected payload {other:?}"),
    }
}

#[test]
fn test_autosave_trigger_saves_in_place() {
    let (mut store, a, _) = store_with_python();
    let mut shell = PanelShell::default();
    shell.select_node(&mut store, Some(&a));
    if let Some(panel) = shell.panel_mut() {
        panel.form_mut().update_value("code", "pass");
    }

    assert!(shell.on_autosave_trigger(&mut store));
    assert!(!shell.is_autosaving());
    assert!(!shell.is_updating_node());
    assert_eq!(shell.selected_node(), Some(&a));
    // Nothing changed since the last save
    assert!(!shell.on_autosave_trigger(&mut store));
}

#[test]
fn test_nodes_without_panel_open_nothing() {
    let mut store = FlowStore::new();
    let note = store.create_node(NodeKind::Note, "Remember", Vec2::ZERO);
    let mut shell = PanelShell::default();

    shell.select_node(&mut store, Some(&note));
    assert_eq!(shell.selected_node(), Some(&note));
    assert!(shell.panel().is_none());
    assert!(!shell.on_autosave_trigger(&mut store));
    assert!(panel_for(NodeKind::Note).is_none());
}

#[test]
fn test_decision_table_save_rewires_connections() {
    let mut store = FlowStore::new();
    let router = store.create_node(NodeKind::DecisionTable, "Router", Vec2::ZERO);
    let approve = store.create_node(NodeKind::Python, "Approve", Vec2::new(400.0, 0.0));
    let mut shell = PanelShell::default();

    // 1. Add a routed group through the panel
    shell.select_node(&mut store, Some(&router));
    let mut panel = DecisionTablePanel::default();
    if let Some(node) = store.node(&router) {
        panel.initialize_form(node);
        let index = panel.add_group("Fast Track");
        panel.set_expression(index, "amount < 100");
        panel.set_next_node(index, Some("Approve".into()));
        let updated = panel.on_save(node);
        store.update_node(updated, Default::default());
    }

    // 2. The store built the connection from the routing
    let ids: Vec<String> = store.connections().map(|c| c.id.to_string()).collect();
    assert_eq!(
        ids,
        vec![format!("{router}_decision-out-fast-track+{approve}_python-in")]
    );
    assert!(
        store
            .port_connections_map()
            .is_blocked(&PortId::new(router.clone(), "decision-out-fast-track"))
    );

    // 3. Reopening shows the stored table
    shell.close();
    shell.select_node(&mut store, Some(&router));
    assert_eq!(shell.panel().map(|p| p.kind()), Some(NodeKind::DecisionTable));

    let mut expected = ConditionGroup::new("Fast Track", "amount < 100", 0);
    expected.next_node = Some("Approve".into());
    expected.valid = true;
    let table = store.node(&router).and_then(|n| n.data.as_decision_table()).unwrap();
    assert_eq!(table.condition_groups, vec![expected]);
}

#[test]
fn test_edge_drawn_while_table_is_open_survives_switch() -> anyhow::Result<()> {
    let mut store = FlowStore::new();
    let router = store.create_node(NodeKind::DecisionTable, "Router", Vec2::ZERO);
    let approve = store.create_node(NodeKind::Python, "Approve", Vec2::new(400.0, 0.0));
    let mut node = store.node(&router).cloned().ok_or_else(|| anyhow::anyhow!("router missing"))?;
    if let Some(table) = node.data.as_decision_table_mut() {
        table.condition_groups.push(ConditionGroup::new("Fast", "amount < 100", 0));
    }
    store.update_node(node, Default::default());

    // 1. Open the table, then draw its output on the canvas
    let mut shell = PanelShell::default();
    shell.select_node(&mut store, Some(&router));
    assert!(store.connect(
        &PortId::new(router.clone(), "decision-out-fast"),
        &PortId::new(approve.clone(), "python-in")
    ));

    // 2. Edit something unrelated in the panel and switch away
    let panel = shell.panel_mut().ok_or_else(|| anyhow::anyhow!("no panel"))?;
    panel.form_mut().update_value("table_name", "Routing");
    shell.select_node(&mut store, Some(&approve));

    assert_eq!(store.connection_count(), 1);
    let table = store
        .node(&router)
        .and_then(|n| n.data.as_decision_table())
        .ok_or_else(|| anyhow::anyhow!("router lost its table"))?;
    assert_eq!(table.name, "Routing");
    assert_eq!(table.condition_groups[0].next_node.as_deref(), Some("Approve"));
    Ok(())
}
