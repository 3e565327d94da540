use crate::form::FormError;
use crate::panel::{BaseSidePanel, PanelCore, kind_mismatch};
use crate::schema::{FieldType, Validator, VisualField};
use flow_graph::payload::{FileExtractorData, ProjectData, SubgraphData, WebScraperData};
use flow_graph::{NodeKind, NodeModel, NodePayload};
use serde_json::json;

const FILE_PATHS: &str = "file_paths";
const OUTPUT_FORMAT: &str = "output_format";
const OUTPUT_FORMATS: [&str; 3] = ["text", "markdown", "json"];

#[derive(Debug, Default)]
pub struct FileExtractorPanel {
    core: PanelCore,
}

impl BaseSidePanel for FileExtractorPanel {
    panel_plumbing!(NodeKind::FileExtractor);

    fn initialize_form(&mut self, node: &NodeModel) {
        self.core = PanelCore::seeded(
            node,
            vec![
                VisualField::text(FILE_PATHS).required(),
                VisualField::new(
                    OUTPUT_FORMAT,
                    FieldType::Select {
                        options: OUTPUT_FORMATS.iter().map(|s| s.to_string()).collect(),
                    },
                )
                .required()
                .with_default(json!(FileExtractorData::default().output_format)),
            ],
        );
        if let NodePayload::FileExtractor(data) = &node.data {
            let form = &mut self.core.form;
            form.update_value(FILE_PATHS, data.file_paths.join("\n"));
            form.update_value(OUTPUT_FORMAT, data.output_format.clone());
        }
    }

    fn create_updated_node(&self, node: &NodeModel) -> Result<NodeModel, FormError> {
        if node.kind() != NodeKind::FileExtractor {
            return Err(kind_mismatch(NodeKind::FileExtractor, node));
        }
        let form = &self.core.form;
        let data = FileExtractorData {
            file_paths: form.list(FILE_PATHS)?,
            output_format: form.string(OUTPUT_FORMAT)?,
        };
        let mut updated = self.core.apply_common(node)?;
        updated.data = NodePayload::FileExtractor(data);
        Ok(updated)
    }
}

const URL: &str = "url";
const SELECTOR: &str = "selector";
const MAX_PAGES: &str = "max_pages";

#[derive(Debug, Default)]
pub struct WebScraperPanel {
    core: PanelCore,
}

impl BaseSidePanel for WebScraperPanel {
    panel_plumbing!(NodeKind::WebScraper);

    fn initialize_form(&mut self, node: &NodeModel) {
        self.core = PanelCore::seeded(
            node,
            vec![
                VisualField::text(URL).required(),
                VisualField::text(SELECTOR),
                VisualField::number(MAX_PAGES)
                    .required()
                    .validate(Validator::Positive)
                    .with_default(json!(WebScraperData::default().max_pages)),
            ],
        );
        if let NodePayload::WebScraper(data) = &node.data {
            let form = &mut self.core.form;
            form.update_value(URL, data.url.clone());
            form.update_value(SELECTOR, data.selector.clone().unwrap_or_default());
            form.update_value(MAX_PAGES, data.max_pages);
        }
    }

    fn create_updated_node(&self, node: &NodeModel) -> Result<NodeModel, FormError> {
        if node.kind() != NodeKind::WebScraper {
            return Err(kind_mismatch(NodeKind::WebScraper, node));
        }
        let form = &self.core.form;
        let max_pages = u32::try_from(form.u64(MAX_PAGES)?).map_err(|_| FormError::TypeMismatch {
            field: MAX_PAGES.to_string(),
            expected: "a page count",
        })?;
        let data = WebScraperData {
            url: form.string(URL)?.trim().to_string(),
            selector: form.optional_string(SELECTOR)?,
            max_pages,
        };
        let mut updated = self.core.apply_common(node)?;
        updated.data = NodePayload::WebScraper(data);
        Ok(updated)
    }
}

const PROJECT_ID: &str = "project_id";
const PROJECT_NAME: &str = "name";

#[derive(Debug, Default)]
pub struct ProjectPanel {
    core: PanelCore,
}

impl BaseSidePanel for ProjectPanel {
    panel_plumbing!(NodeKind::Project);

    fn initialize_form(&mut self, node: &NodeModel) {
        self.core = PanelCore::seeded(
            node,
            vec![
                VisualField::number(PROJECT_ID)
                    .required()
                    .validate(Validator::Positive),
                VisualField::text(PROJECT_NAME),
            ],
        );
        if let NodePayload::Project(data) = &node.data {
            let form = &mut self.core.form;
            // 0 means "not chosen yet" on the wire
            if data.project_id > 0 {
                form.update_value(PROJECT_ID, data.project_id);
            }
            form.update_value(PROJECT_NAME, data.name.clone());
        }
    }

    fn create_updated_node(&self, node: &NodeModel) -> Result<NodeModel, FormError> {
        if node.kind() != NodeKind::Project {
            return Err(kind_mismatch(NodeKind::Project, node));
        }
        let form = &self.core.form;
        let data = ProjectData {
            project_id: form.u64(PROJECT_ID)?,
            name: form.string(PROJECT_NAME)?,
        };
        let mut updated = self.core.apply_common(node)?;
        updated.data = NodePayload::Project(data);
        Ok(updated)
    }
}

const GRAPH_ID: &str = "graph_id";

#[derive(Debug, Default)]
pub struct SubgraphPanel {
    core: PanelCore,
}

impl BaseSidePanel for SubgraphPanel {
    panel_plumbing!(NodeKind::Subgraph);

    fn initialize_form(&mut self, node: &NodeModel) {
        self.core = PanelCore::seeded(
            node,
            vec![VisualField::number(GRAPH_ID)
                .required()
                .validate(Validator::Positive)],
        );
        if let NodePayload::Subgraph(data) = &node.data {
            if data.graph_id > 0 {
                self.core.form.update_value(GRAPH_ID, data.graph_id);
            }
        }
    }

    fn create_updated_node(&self, node: &NodeModel) -> Result<NodeModel, FormError> {
        if node.kind() != NodeKind::Subgraph {
            return Err(kind_mismatch(NodeKind::Subgraph, node));
        }
        let data = SubgraphData {
            graph_id: self.core.form.u64(GRAPH_ID)?,
        };
        let mut updated = self.core.apply_common(node)?;
        updated.data = NodePayload::Subgraph(data);
        Ok(updated)
    }
}
