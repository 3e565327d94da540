use flow_graph::decision::{ConditionGroup, DecisionTableData};
use flow_graph::model::{FlowModel, GroupNodeModel, NodeId, NodeModel, PortId};
use flow_graph::{FlowError, FlowStore, NodeKind, NodePayload};
use glam::Vec2;
use serde_json::json;

fn sample_store() -> FlowStore {
    let mut store = FlowStore::new();
    store.add_group(GroupNodeModel::new("Stage").with_id("grp"));
    store.add_node(
        NodeModel::new(NodeKind::Python, "Parse")
            .with_id("node_a")
            .with_position(Vec2::new(10.0, 20.0))
            .with_parent(Some(NodeId::from("grp"))),
    );
    let table = DecisionTableData {
        condition_groups: vec![ConditionGroup::new("High Risk", "risk > 0.8", 0)],
        ..Default::default()
    };
    store.add_node(
        NodeModel::new(NodeKind::DecisionTable, "Router")
            .with_id("dt")
            .with_data(NodePayload::DecisionTable(table)),
    );
    assert!(store.connect(
        &PortId::new("node_a", "python-out"),
        &PortId::new("dt", "table-in")
    ));
    store
}

#[test]
fn test_roundtrip_persistence() -> anyhow::Result<()> {
    // 1. Save
    let store = sample_store();
    let saved = store.get_flow_state();
    let json = saved.to_json()?;

    // 2. Load into a fresh store
    let mut loaded = FlowStore::new();
    loaded.load_json(&json)?;

    // 3. Same graph, same ids
    assert_eq!(loaded.get_flow_state(), saved);
    let node = loaded.node(&NodeId::from("node_a")).unwrap();
    assert!(node.ports.iter().all(|p| p.id.node_id.as_str() == "node_a"));
    let connection = loaded.connections().next().unwrap();
    assert_eq!(connection.source_node_id.as_str(), "node_a");
    assert_eq!(connection.id.to_string(), "node_a_python-out+dt_table-in");
    Ok(())
}

#[test]
fn test_collapsed_group_ids_survive_reload() -> anyhow::Result<()> {
    let mut store = sample_store();
    let group_id = NodeId::from("grp");
    assert!(store.toggle_group_collapsed(&group_id));
    let saved = store.get_flow_state();

    // 1. Reload: the recorded id matches the stored connection again
    let mut loaded = FlowStore::new();
    loaded.load_json(&saved.to_json()?)?;
    assert_eq!(loaded.get_flow_state(), saved);
    let connection_id = loaded
        .connections()
        .next()
        .map(|c| c.id.clone())
        .ok_or_else(|| anyhow::anyhow!("connection missing"))?;
    let recorded = &loaded.group(&group_id).unwrap().connection_data;
    assert_eq!(recorded.outputs, vec![connection_id.clone()]);

    // 2. Removing the connection prunes the record
    assert!(loaded.remove_connection(&connection_id));
    assert!(loaded.group(&group_id).unwrap().connection_data.is_empty());
    Ok(())
}

#[test]
fn test_wire_shape() -> anyhow::Result<()> {
    let value: serde_json::Value = serde_json::from_str(&sample_store().get_flow_state().to_json()?)?;

    let node = &value["nodes"][0];
    assert_eq!(node["type"], json!("python"));
    assert_eq!(node["parentId"], json!("grp"));
    assert_eq!(node["ports"][0]["id"], json!("node_a_python-in"));
    assert_eq!(node["ports"][0]["port_type"], json!("input"));

    let table = &value["nodes"][1];
    assert_eq!(table["type"], json!("decision-table"));
    assert_eq!(table["ports"][1]["role"], json!("decision-out-high-risk"));

    let connection = &value["connections"][0];
    assert_eq!(connection["sourcePortId"], json!("node_a_python-out"));
    assert_eq!(connection["targetNodeId"], json!("dt"));
    assert_eq!(connection["behavior"], json!("default"));

    assert_eq!(value["groups"][0]["collapsed"], json!(false));
    Ok(())
}

#[test]
fn test_minimal_document_loads_with_defaults() -> anyhow::Result<()> {
    let json = r#"{
        "nodes": [
            {"id": "s", "type": "start", "data": {}},
            {"id": "e", "type": "end", "data": {}, "node_name": "Finish"}
        ]
    }"#;
    let mut store = FlowStore::new();
    store.load_json(json)?;

    assert_eq!(store.node_count(), 2);
    let start = store.node(&NodeId::from("s")).unwrap();
    assert_eq!(start.kind(), NodeKind::Start);
    assert!(start.ports.is_empty());
    assert_eq!(store.node(&NodeId::from("e")).unwrap().title(), "Finish");
    assert_eq!(store.connection_count(), 0);
    Ok(())
}

#[test]
fn test_malformed_json_leaves_store_untouched() {
    let mut store = sample_store();
    let before = store.get_flow_state();

    let err = store.load_json("{\"nodes\": [").unwrap_err();
    assert!(matches!(err, FlowError::JsonParseError(_)));
    assert_eq!(store.get_flow_state(), before);
}

#[test]
fn test_save_and_load_file() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(format!("flow_graph_{}.json", uuid_like()));
    let flow = sample_store().get_flow_state();

    flow.save(&path)?;
    let loaded = FlowModel::load(&path)?;
    std::fs::remove_file(&path)?;

    assert_eq!(loaded, flow);
    assert!(matches!(
        FlowModel::load(&path),
        Err(FlowError::Io { .. })
    ));
    Ok(())
}

fn uuid_like() -> String {
    NodeId::new_v4().to_string()
}
