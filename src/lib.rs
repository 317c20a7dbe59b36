//! Artboard Batch - generate design artboards from spreadsheet rows
//!
//! Designers keep one master set of template variants in a design document
//! and a spreadsheet of creative variations. This library turns each row into
//! a finished artboard: it validates the rows, picks the template variant the
//! row names, fills the variant's image and text slots, and packs the results
//! onto the canvas in rows.
//!
//! The host document is reached only through the [`Document`] and
//! [`PluginStore`] traits; [`MemoryDocument`] is an in-memory implementation.
//!
//! # Example
//!
//! ```rust
//! use artboard_batch::document::memory::{NodeKind, NodeSpec};
//! use artboard_batch::{import, Document, MemoryDocument, PipelineConfig, Row, VariantField};
//!
//! let mut doc = MemoryDocument::new("Canvas");
//! let templates = doc.add_page("Templates");
//! doc.add_node(
//!     templates,
//!     NodeSpec::new("300x250", NodeKind::Frame)
//!         .with_child(NodeSpec::new("colour=red", NodeKind::Component)),
//! )
//! .unwrap();
//!
//! let config = PipelineConfig::new()
//!     .with_variant_fields(vec![VariantField::new("colour", "colour")])
//!     .with_content_fields(Vec::new())
//!     .with_required_fields(["size", "reportingLabel", "colour"])
//!     .with_fonts(Vec::new());
//!
//! let rows = vec![Row::new()
//!     .with("size", "300x250")
//!     .with("reportingLabel", "Ad-300x250-red")
//!     .with("colour", "red")];
//!
//! let report = import(&mut doc, &rows, &config).unwrap();
//! assert_eq!(doc.name(report.placed[0].node).unwrap(), "Ad-300x250-red");
//! ```

pub mod config;
pub mod data;
pub mod document;
pub mod error;
pub mod fill;
pub mod layout;
pub mod pipeline;
pub mod session;
pub mod size;
pub mod variant;

pub use config::{ConfigError, ContentField, ContentKind, PipelineConfig, VariantField};
pub use data::{validate_rows, Row};
pub use document::{Document, DocumentError, FontName, MemoryDocument, NodeId, PluginStore};
pub use error::{PipelineError, PipelineResult};
pub use layout::{LayoutConfig, LayoutCursor, Point};
pub use pipeline::{Phase, Pipeline, PlacedInstance, RunReport};
pub use session::{Request, Response, Session};
pub use size::{parse_size, Size};
pub use variant::{resolve_variant, variant_key};

/// Bulk-import rows into the document with the given configuration
///
/// Runs the whole pipeline: validation, font loading, then one instance per
/// non-blank row, laid out on the canvas.
pub fn import<D: Document + ?Sized>(
    doc: &mut D,
    rows: &[Row],
    config: &PipelineConfig,
) -> PipelineResult<RunReport> {
    Pipeline::new(config).import(doc, rows)
}

/// Regenerate the document's selected instances from matching rows
pub fn update_selection<D: Document + ?Sized>(
    doc: &mut D,
    rows: &[Row],
    config: &PipelineConfig,
) -> PipelineResult<RunReport> {
    Pipeline::new(config).update(doc, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::memory::{NodeKind, NodeSpec};

    fn document() -> MemoryDocument {
        let mut doc = MemoryDocument::new("Canvas");
        let templates = doc.add_page("Templates");
        doc.add_node(
            templates,
            NodeSpec::new("300x250", NodeKind::Frame).with_child(
                NodeSpec::new("colour=red", NodeKind::Component).with_child(
                    NodeSpec::new("content", NodeKind::Frame)
                        .with_child(NodeSpec::new("headline", NodeKind::Text)),
                ),
            ),
        )
        .unwrap();
        doc
    }

    fn config() -> PipelineConfig {
        PipelineConfig::new()
            .with_variant_fields(vec![VariantField::new("colour", "colour")])
            .with_content_fields(vec![ContentField::new(
                "headline",
                "headline_txt",
                ContentKind::Text,
            )])
            .with_required_fields(["size", "reportingLabel", "colour"])
            .with_fonts(Vec::new())
    }

    #[test]
    fn test_import_simple_row() {
        let mut doc = document();
        let rows = vec![Row::new()
            .with("size", "300x250")
            .with("reportingLabel", "A")
            .with("colour", "red")
            .with("headline_txt", "Hello")];

        let report = import(&mut doc, &rows, &config()).unwrap();
        assert_eq!(report.placed.len(), 1);
        assert_eq!(report.placed[0].label, "A");
    }

    #[test]
    fn test_import_unknown_variant() {
        let mut doc = document();
        let rows = vec![Row::new()
            .with("size", "300x250")
            .with("reportingLabel", "A")
            .with("colour", "blue")];

        let err = import(&mut doc, &rows, &config()).unwrap_err();
        assert!(matches!(err, PipelineError::VariantNotFound { .. }));
    }

    #[test]
    fn test_update_selection_replaces_node() {
        let mut doc = document();
        let rows = vec![Row::new()
            .with("size", "300x250")
            .with("reportingLabel", "A")
            .with("colour", "red")
            .with("headline_txt", "First")];
        let report = import(&mut doc, &rows, &config()).unwrap();
        doc.select(vec![report.placed[0].node]);

        let rows = vec![rows[0].clone().with("headline_txt", "Second")];
        let report = update_selection(&mut doc, &rows, &config()).unwrap();

        assert_eq!(doc.canvas_nodes(), vec![report.placed[0].node]);
    }
}
