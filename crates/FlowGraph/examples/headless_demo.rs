use flow_graph::decision::{ConditionGroup, DecisionTableData};
use flow_graph::model::{NodeModel, PortId};
use flow_graph::{FlowStore, History, NodeKind, NodePayload, Selection};
use glam::Vec2;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    println!("=== FlowGraph Headless Demo ===");

    // 1. Initialize Store and History
    let mut store = FlowStore::new();
    let mut history = History::from_config(store.config());

    // 2. Populate the flow
    history.on_state_changed(&store.get_flow_state());
    let start = store.create_node(NodeKind::Start, "Start", Vec2::new(0.0, 0.0));
    let parse = store.create_node(NodeKind::Python, "Parse", Vec2::new(400.0, 0.0));
    let approve = store.create_node(NodeKind::Python, "Approve", Vec2::new(1200.0, -100.0));
    let review = store.create_node(NodeKind::Python, "Review", Vec2::new(1200.0, 100.0));

    let table = DecisionTableData {
        name: "Risk".into(),
        condition_groups: vec![ConditionGroup::new("Low Risk", "risk < 0.3", 0)],
        default_next_node: Some("Review".into()),
        ..Default::default()
    };
    let router = NodeModel::new(NodeKind::DecisionTable, "Risk")
        .with_position(Vec2::new(800.0, 0.0))
        .with_data(NodePayload::DecisionTable(table));
    let router_id = router.id.clone();
    store.add_node(router);

    // 3. Wire it up
    history.on_state_changed(&store.get_flow_state());
    store.connect(
        &PortId::new(start.clone(), "start-start"),
        &PortId::new(parse.clone(), "python-in"),
    );
    store.connect(
        &PortId::new(parse.clone(), "python-out"),
        &PortId::new(router_id.clone(), "table-in"),
    );
    store.connect(
        &PortId::new(router_id.clone(), "decision-out-low-risk"),
        &PortId::new(approve, "python-in"),
    );
    // The default route only exists in the table data so far
    store.reset_decision_table_connections(&router_id);
    println!("Connections after wiring: {}", store.connection_count());
    for connection in store.connections() {
        println!("  {}", connection.id);
    }

    // 4. Group and collapse the start of the flow
    history.on_state_changed(&store.get_flow_state());
    let group = store.create_group("Ingest", Vec2::new(-50.0, -50.0), &[start, parse]);
    store.toggle_group_collapsed(&group);
    println!("Visible connections with 'Ingest' collapsed:");
    for connection in store.visible_connections() {
        println!("  {} ({:?})", connection.id, connection.behavior);
    }

    // 5. Delete the collapsed group, then undo
    history.on_state_changed(&store.get_flow_state());
    let deleted = store.delete_selections(Selection {
        group_ids: vec![group],
        ..Default::default()
    });
    println!(
        "Deleted {} nodes and {} connections",
        deleted.node_ids.len(),
        deleted.connection_ids.len()
    );
    history.on_undo(&mut store);
    println!("After undo: {} nodes", store.node_count());

    // 6. Serialize
    println!("{}", store.get_flow_state().to_json_pretty()?);
    if let Some(node) = store.find_node_by_name("Review") {
        println!("Review is reachable as {} ({})", node.id, review);
    }
    Ok(())
}
