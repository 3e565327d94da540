use flow_graph::model::{ConnectionModel, FlowModel, GroupNodeModel, NodeId, NodeModel, PortId};
use flow_graph::{FlowStore, NodeKind, Selection, is_connection_valid};
use glam::Vec2;

fn python(id: &str, name: &str) -> NodeModel {
    NodeModel::new(NodeKind::Python, name).with_id(id)
}

fn two_python_nodes() -> FlowStore {
    let mut store = FlowStore::new();
    store.add_node(python("a", "A"));
    store.add_node(python("b", "B"));
    store
}

#[test]
fn test_connect_python_nodes_end_to_end() {
    let mut store = two_python_nodes();
    let out = PortId::new("a", "python-out");
    let input = PortId::new("b", "python-in");

    // 1. Eligible before connecting
    assert!(store.port_connections_map().can_connect(&out, &input));
    assert!(store.can_ports_connect(&out, &input));

    // 2. Connect
    assert!(store.connect(&out, &input));
    assert_eq!(store.connection_count(), 1);
    let stored: Vec<String> = store.connections().map(|c| c.id.to_string()).collect();
    assert_eq!(stored, vec!["a_python-out+b_python-in"]);

    // 3. The pair is no longer eligible in any direction
    assert!(!store.port_connections_map().can_connect(&out, &input));
    assert!(!store.can_ports_connect(
        &PortId::new("b", "python-out"),
        &PortId::new("a", "python-in")
    ));
}

#[test]
fn test_same_port_type_is_never_valid() {
    assert!(is_connection_valid("a_python-out", "b_python-in"));
    assert!(!is_connection_valid("a_python-out", "b_llm-out"));
    assert!(!is_connection_valid("a_python-in", "b_end-in"));
    assert!(!is_connection_valid("a_python-out", "a_python-in"));
    assert!(!is_connection_valid("garbage", "b_python-in"));
}

#[test]
fn test_second_connection_between_joined_nodes_is_rejected() {
    let mut store = two_python_nodes();
    assert!(store.connect(&PortId::new("a", "python-out"), &PortId::new("b", "python-in")));

    // Reverse direction is still the same node pair
    assert!(!store.connect(&PortId::new("b", "python-out"), &PortId::new("a", "python-in")));
    assert_eq!(store.connection_count(), 1);

    let map = store.port_connections_map();
    let b_out = map.get(&PortId::new("b", "python-out")).unwrap();
    assert!(!b_out.contains(&"a_python-in".to_string()));
}

#[test]
fn test_occupied_single_port_maps_to_sentinel() {
    let mut store = FlowStore::new();
    store.add_node(NodeModel::new(NodeKind::Task, "T").with_id("t"));
    store.add_node(NodeModel::new(NodeKind::Agent, "G1").with_id("g1"));
    store.add_node(NodeModel::new(NodeKind::Agent, "G2").with_id("g2"));

    let task_agent = PortId::new("t", "task-agent");
    assert!(!store.port_connections_map().is_blocked(&task_agent));

    assert!(store.connect(&PortId::new("g1", "agent-task"), &task_agent));

    let map = store.port_connections_map();
    assert!(map.is_blocked(&task_agent));
    assert_eq!(map.get(&task_agent).unwrap(), &[flow_graph::NONE_SENTINEL.to_string()]);
    // The other agent has nowhere left to go
    assert!(map.is_blocked(&PortId::new("g2", "agent-task")));
    assert!(!store.connect(&PortId::new("g2", "agent-task"), &task_agent));
}

#[test]
fn test_rejected_connections_leave_state_untouched() {
    let mut store = two_python_nodes();
    let before = store.get_flow_state();

    assert!(!store.connect(&PortId::new("a", "python-out"), &PortId::new("missing", "python-in")));
    assert!(!store.connect(&PortId::new("a", "python-out"), &PortId::new("b", "llm-in")));
    assert!(!store.connect(&PortId::new("a", "python-in"), &PortId::new("b", "python-out")));
    assert!(!store.connect(&PortId::new("g", "group-output"), &PortId::new("b", "python-in")));

    assert_eq!(store.get_flow_state(), before);
}

#[test]
fn test_batch_add_counts_accepted_connections() {
    let mut store = two_python_nodes();
    store.add_node(python("c", "C"));

    let added = store.add_connections_in_batch(vec![
        ConnectionModel::new(PortId::new("a", "python-out"), PortId::new("b", "python-in")),
        ConnectionModel::new(PortId::new("b", "python-out"), PortId::new("c", "python-in")),
        ConnectionModel::new(PortId::new("a", "python-out"), PortId::new("b", "python-in")),
    ]);
    assert_eq!(added, 2);
    assert_eq!(store.connection_count(), 2);
}

#[test]
fn test_unknown_ids_are_ignored() {
    let mut store = two_python_nodes();
    let before = store.get_flow_state();

    let ghost = python("ghost", "Ghost");
    assert!(!store.update_node(ghost, Default::default()));
    assert!(!store.toggle_group_collapsed(&NodeId::from("nope")));
    let removed = store.remove_connection(&flow_graph::ConnectionId::new(
        PortId::new("a", "python-out"),
        PortId::new("b", "python-in"),
    ));
    assert!(!removed);

    let deleted = store.delete_selections(Selection {
        node_ids: vec![NodeId::from("nope")],
        ..Default::default()
    });
    assert!(deleted.node_ids.is_empty());
    assert_eq!(store.get_flow_state(), before);
}

#[test]
fn test_set_flow_replaces_everything_and_skips_virtual_edges() {
    let mut store = two_python_nodes();
    assert!(store.connect(&PortId::new("a", "python-out"), &PortId::new("b", "python-in")));

    let flow = FlowModel {
        nodes: vec![python("x_1", "X"), python("y", "Y")],
        connections: vec![
            ConnectionModel::new(PortId::new("x_1", "python-out"), PortId::new("y", "python-in")),
            ConnectionModel::new(PortId::new("g", "group-output"), PortId::new("y", "python-in")),
        ],
        groups: vec![],
    };
    store.set_flow(flow);

    assert_eq!(store.node_count(), 2);
    assert!(store.node(&NodeId::from("a")).is_none());
    assert_eq!(store.connection_count(), 1);
    let x = store.node(&NodeId::from("x_1")).unwrap();
    assert!(x.ports.iter().all(|p| p.id.node_id.as_str() == "x_1"));
}

#[test]
fn test_create_node_uses_configured_size() {
    let mut config = flow_graph::EditorConfig::default();
    config.default_node_size = Vec2::new(200.0, 80.0);
    let mut store = FlowStore::with_config(config);

    let id = store.create_node(NodeKind::Llm, "Summarize", Vec2::new(10.0, 20.0));
    let node = store.node(&id).unwrap();
    assert_eq!(node.size, Vec2::new(200.0, 80.0));
    assert_eq!(node.position, Vec2::new(10.0, 20.0));
    assert_eq!(node.ports.len(), 2);
    assert_eq!(store.find_node_by_name("Summarize").map(|n| &n.id), Some(&id));
}

#[test]
fn test_batch_updates_skip_unknown_items() {
    let mut store = two_python_nodes();
    store.add_group(GroupNodeModel::new("G").with_id("g"));

    let mut a = store.node(&NodeId::from("a")).unwrap().clone();
    a.position = Vec2::new(5.0, 5.0);
    assert_eq!(store.update_nodes_in_batch(vec![a, python("zzz", "Z")]), 1);
    assert_eq!(store.node(&NodeId::from("a")).unwrap().position, Vec2::new(5.0, 5.0));

    let mut g = store.group(&NodeId::from("g")).unwrap().clone();
    g.title = "Renamed".into();
    assert_eq!(
        store.update_groups_in_batch(vec![g, GroupNodeModel::new("other")]),
        1
    );
    assert_eq!(store.group(&NodeId::from("g")).unwrap().title, "Renamed");
}
