//! # FlowGraph
//!
//! `flow_graph` is the headless state model of a visual workflow editor.
//! It owns the graph of typed nodes, ports, connections and nested groups,
//! enforces which ports may be joined, keeps decision-table routing in sync
//! with its output connections, and derives what the canvas should show.
//!
//! ## Core Architecture
//! - **Model (`src/model.rs`)**: Identifiers, ports, nodes, connections and groups.
//! - **Rules (`src/rules.rs`)**: Static port tables per node type.
//! - **Decision (`src/decision.rs`)**: Condition groups and their output ports.
//! - **Store (`src/store.rs`)**: The single mutable graph with memoized views.
//! - **History (`src/history.rs`)**: Snapshot undo/redo.

mod arena;
pub mod config;
pub mod decision;
pub mod error;
pub mod history;
pub mod model;
pub mod payload;
pub mod persistence;
pub mod rules;
pub mod store;
pub mod view;

// Re-exports for convenience
pub use config::EditorConfig;
pub use error::{ConnectionRejected, FlowError};
pub use history::History;
pub use model::{
    ConnectionId, ConnectionModel, FlowModel, GroupId, GroupNodeModel, NodeId, NodeModel, PortId,
    PortRole, PortType, ViewPort,
};
pub use payload::{NodeKind, NodePayload};
pub use rules::is_connection_valid;
pub use store::{DeletedItems, FlowStore, Selection, UpdateNodeOptions};
pub use view::{NONE_SENTINEL, PortConnectionsMap, VisibleGraph};
