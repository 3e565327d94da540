use flow_graph::model::{NodeId, PortId};
use flow_graph::{EditorConfig, FlowStore, History, NodeKind, Selection};
use glam::Vec2;

#[test]
fn test_history_basic() {
    let mut store = FlowStore::new();
    let mut history = History::default();
    let original = store.get_flow_state();

    // 1. Three recorded mutations
    for i in 0..3 {
        history.on_state_changed(&store.get_flow_state());
        store.create_node(NodeKind::Python, &format!("step {i}"), Vec2::ZERO);
    }
    assert_eq!(store.node_count(), 3);

    // --- UNDO ---
    for expected in (0..3).rev() {
        assert!(history.on_undo(&mut store));
        assert_eq!(store.node_count(), expected);
    }
    assert_eq!(store.get_flow_state(), original);
    assert!(!history.on_undo(&mut store));

    // --- REDO ---
    assert!(history.on_redo(&mut store));
    assert_eq!(store.node_count(), 1);

    // A new change drops the redo branch
    history.on_state_changed(&store.get_flow_state());
    assert!(!history.can_redo());
    assert!(!history.on_redo(&mut store));
}

#[test]
fn test_undo_restores_connections_and_ids() {
    let mut store = FlowStore::new();
    let mut history = History::default();
    let a = store.create_node(NodeKind::Python, "A", Vec2::ZERO);
    let b = store.create_node(NodeKind::Python, "B", Vec2::new(400.0, 0.0));
    assert!(store.connect(&PortId::new(a.clone(), "python-out"), &PortId::new(b.clone(), "python-in")));
    let before_delete = store.get_flow_state();

    history.on_state_changed(&store.get_flow_state());
    store.delete_selections(Selection {
        node_ids: vec![a.clone()],
        ..Default::default()
    });
    assert_eq!(store.connection_count(), 0);

    assert!(history.on_undo(&mut store));
    assert_eq!(store.get_flow_state(), before_delete);
    assert!(store.node(&a).is_some());
    assert!(store.node(&NodeId::from("missing")).is_none());

    // Eligibility is recomputed after the restore
    assert!(!store.can_ports_connect(
        &PortId::new(b.clone(), "python-out"),
        &PortId::new(a, "python-in")
    ));
}

#[test]
fn test_history_is_bounded_by_config() {
    let config = EditorConfig {
        max_history: 2,
        ..EditorConfig::default()
    };
    let mut store = FlowStore::with_config(config.clone());
    let mut history = History::from_config(&config);

    for i in 0..5 {
        history.on_state_changed(&store.get_flow_state());
        store.create_node(NodeKind::Note, &format!("note {i}"), Vec2::ZERO);
    }

    assert!(history.on_undo(&mut store));
    assert!(history.on_undo(&mut store));
    assert!(!history.on_undo(&mut store));
    assert_eq!(store.node_count(), 3);

    history.clear();
    assert!(!history.can_undo());
    assert!(!history.can_redo());
}
