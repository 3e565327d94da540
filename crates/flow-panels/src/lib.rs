//! # Flow Panels
//!
//! Headless logic of the node configuration panels: form state with
//! validation, the per-type panels that map a form onto a node's payload, and
//! the shell that saves the open panel when the selection changes.

pub mod form;
pub mod key_value;
pub mod panel;
pub mod panels;
pub mod schema;
pub mod shell;

pub use form::{FormError, FormState};
pub use key_value::KeyValueRows;
pub use panel::{BaseSidePanel, PanelCore};
pub use panels::panel_for;
pub use shell::PanelShell;
