use thiserror::Error;

/// Errors raised while parsing identifiers or loading flow documents.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error("Malformed port id '{0}': expected '<nodeId>_<role>'")]
    MalformedPortId(String),

    #[error("Port id '{port_id}' does not belong to node '{node_id}'")]
    PortNodeMismatch { port_id: String, node_id: String },

    #[error("Malformed connection id '{0}': expected '<sourcePortId>+<targetPortId>'")]
    MalformedConnectionId(String),

    #[error("Failed to parse flow JSON: {0}")]
    JsonParseError(String),

    #[error("Failed to read or write '{path}': {message}")]
    Io { path: String, message: String },
}

/// Reasons a proposed connection is refused by the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionRejected {
    #[error("connection '{0}' already exists")]
    Duplicate(String),

    #[error("node '{0}' cannot connect to itself")]
    SelfConnection(String),

    #[error("node '{0}' not found")]
    UnknownNode(String),

    #[error("port '{0}' not found on its node")]
    UnknownPort(String),

    #[error("nodes '{0}' and '{1}' are already connected")]
    NodesAlreadyJoined(String, String),

    #[error("port '{0}' accepts a single connection and is occupied")]
    PortOccupied(String),

    #[error("roles of '{0}' and '{1}' are not compatible")]
    IncompatibleRoles(String, String),

    #[error("virtual connection '{0}' cannot be stored")]
    Virtual(String),
}
