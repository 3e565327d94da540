//! One panel per configurable node type.

/// Implements the plumbing accessors of [`BaseSidePanel`] for a panel with a
/// `core: PanelCore` field.
macro_rules! panel_plumbing {
    ($kind:expr) => {
        fn kind(&self) -> flow_graph::NodeKind {
            $kind
        }

        fn core(&self) -> &crate::panel::PanelCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut crate::panel::PanelCore {
            &mut self.core
        }
    };
}

mod code;
mod decision_table;
mod io;
mod sources;

pub use code::{CodeAgentPanel, ConditionalEdgePanel, PythonPanel, WebhookTriggerPanel};
pub use decision_table::DecisionTablePanel;
pub use io::{EndPanel, StartPanel};
pub use sources::{FileExtractorPanel, ProjectPanel, SubgraphPanel, WebScraperPanel};

use crate::panel::BaseSidePanel;
use flow_graph::NodeKind;

/// The panel editing nodes of `kind`, or `None` for types edited elsewhere.
pub fn panel_for(kind: NodeKind) -> Option<Box<dyn BaseSidePanel>> {
    let panel: Box<dyn BaseSidePanel> = match kind {
        NodeKind::Start => Box::new(StartPanel::default()),
        NodeKind::End => Box::new(EndPanel::default()),
        NodeKind::Python => Box::new(PythonPanel::default()),
        NodeKind::Project => Box::new(ProjectPanel::default()),
        NodeKind::ConditionalEdge => Box::new(ConditionalEdgePanel::default()),
        NodeKind::DecisionTable => Box::new(DecisionTablePanel::default()),
        NodeKind::FileExtractor => Box::new(FileExtractorPanel::default()),
        NodeKind::WebScraper => Box::new(WebScraperPanel::default()),
        NodeKind::CodeAgent => Box::new(CodeAgentPanel::default()),
        NodeKind::WebhookTrigger => Box::new(WebhookTriggerPanel::default()),
        NodeKind::Subgraph => Box::new(SubgraphPanel::default()),
        NodeKind::Task
        | NodeKind::Agent
        | NodeKind::Tool
        | NodeKind::Llm
        | NodeKind::Note
        | NodeKind::TelegramTrigger => return None,
    };
    Some(panel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_kind_matches_requested_kind() {
        for kind in NodeKind::ALL {
            if let Some(panel) = panel_for(kind) {
                assert_eq!(panel.kind(), kind);
            }
        }
        assert!(panel_for(NodeKind::Note).is_none());
    }
}
