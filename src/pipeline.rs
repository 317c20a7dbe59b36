//! Pipeline orchestration - bulk import and update in place
//!
//! A run goes through a fixed sequence of phases:
//!
//! ```text
//! Idle -> Validating -> FontLoading -> RowLoop -> Done
//!              |             |            |
//!              +-------------+------------+--> Reporting
//! ```
//!
//! Rows are processed strictly in order because the layout cursor and the
//! document lookups depend on the previous row. The first error ends the run;
//! instances already appended stay on the canvas.

use std::collections::HashSet;

use crate::config::PipelineConfig;
use crate::data::{find_by_reporting_label, validate_rows, Row, FRAME_FIELD};
use crate::document::{Document, DocumentError, NodeId};
use crate::error::{PipelineError, PipelineResult};
use crate::fill::fill_instance;
use crate::layout::{FrameHint, LayoutCursor, Point};
use crate::size::parse_size;
use crate::variant::resolve_variant;

/// Where a pipeline run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    FontLoading,
    RowLoop,
    Done,
    /// The run failed and the error was handed back to the caller
    Reporting,
}

/// An instance created, filled and placed by a run
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedInstance {
    pub node: NodeId,
    pub label: String,
    pub position: Point,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunReport {
    pub placed: Vec<PlacedInstance>,
}

/// Drives validation, resolution, filling and layout for one run
#[derive(Debug)]
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    phase: Phase,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
        }
    }

    /// Current phase of the run
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Generate one instance per non-blank row and lay them out on the canvas
    #[tracing::instrument(skip_all, fields(rows = rows.len()))]
    pub fn import<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        rows: &[Row],
    ) -> PipelineResult<RunReport> {
        let result = self.run_import(doc, rows);
        self.finish(result)
    }

    /// Replace every selected canvas node with a freshly filled instance
    ///
    /// Each selected node is matched to the row whose reporting label equals
    /// the node's name. The replacement keeps the node's name and position.
    #[tracing::instrument(skip_all, fields(rows = rows.len()))]
    pub fn update<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        rows: &[Row],
    ) -> PipelineResult<RunReport> {
        let result = self.run_update(doc, rows);
        self.finish(result)
    }

    fn run_import<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        rows: &[Row],
    ) -> PipelineResult<RunReport> {
        self.enter(Phase::Validating);
        validate_rows(rows, &self.config.required_fields)?;

        self.enter(Phase::FontLoading);
        self.load_fonts(doc)?;

        self.enter(Phase::RowLoop);
        let gap = self.config.layout.gap;
        let mut report = RunReport::default();

        let Some(first) = rows.iter().find(|row| !row.is_blank()) else {
            return Ok(report);
        };
        let mut cursor = LayoutCursor::seed(parse_size(&first.size())?, gap);

        for row in rows.iter().filter(|row| !row.is_blank()) {
            let size = parse_size(&row.size())?;
            let frame = FrameHint::from_value(row.get(FRAME_FIELD));
            let (next, at) = cursor.advance(size, frame, gap);
            cursor = next;

            let variant = resolve_variant(&*doc, self.config, row)?;
            let instance = self.materialize(doc, variant, row)?;
            let label = row.reporting_label().unwrap_or_default();

            doc.set_position(instance, at.x, at.y)?;
            doc.set_name(instance, &label)?;
            doc.append_to_canvas(instance)?;

            tracing::debug!(%label, x = at.x, y = at.y, "imported row");
            report.placed.push(PlacedInstance {
                node: instance,
                label,
                position: at,
            });
        }

        Ok(report)
    }

    fn run_update<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        rows: &[Row],
    ) -> PipelineResult<RunReport> {
        self.enter(Phase::Validating);
        let mut selection = doc.selection();
        let mut seen = HashSet::new();
        selection.retain(|&id| seen.insert(id));
        if selection.is_empty() {
            return Err(PipelineError::NoSelection);
        }
        validate_rows(rows, &self.config.required_fields)?;

        self.enter(Phase::FontLoading);
        self.load_fonts(doc)?;

        self.enter(Phase::RowLoop);
        let mut report = RunReport::default();

        for selected in selection {
            let name = doc.name(selected)?.to_string();
            let row = find_by_reporting_label(rows, &name)
                .ok_or_else(|| PipelineError::NoMatchingRow { name: name.clone() })?;

            let variant = resolve_variant(&*doc, self.config, row)?;
            let instance = self.materialize(doc, variant, row)?;
            let (x, y) = doc.position(selected)?;

            doc.set_position(instance, x, y)?;
            doc.set_name(instance, &name)?;
            doc.append_to_canvas(instance)?;
            doc.remove(selected)?;

            tracing::debug!(%name, "replaced selected node");
            report.placed.push(PlacedInstance {
                node: instance,
                label: name,
                position: Point::new(x, y),
            });
        }

        Ok(report)
    }

    /// Instantiate and fill a variant; a half-filled instance is discarded
    fn materialize<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        variant: NodeId,
        row: &Row,
    ) -> PipelineResult<NodeId> {
        let instance = doc.create_instance(variant)?;
        if let Err(err) = fill_instance(doc, instance, row, &self.config.content_fields) {
            doc.remove(instance)?;
            return Err(err);
        }
        Ok(instance)
    }

    fn load_fonts<D: Document + ?Sized>(&self, doc: &mut D) -> PipelineResult<()> {
        for font in &self.config.fonts {
            doc.load_font(font).map_err(|err| match err {
                DocumentError::FontNotAvailable { family, style } => {
                    PipelineError::FontUnavailable { family, style }
                }
                other => PipelineError::Document(other),
            })?;
        }
        Ok(())
    }

    fn enter(&mut self, phase: Phase) {
        tracing::trace!(from = ?self.phase, to = ?phase, "pipeline phase");
        self.phase = phase;
    }

    fn finish(&mut self, result: PipelineResult<RunReport>) -> PipelineResult<RunReport> {
        match &result {
            Ok(report) => {
                self.enter(Phase::Done);
                tracing::info!(placed = report.placed.len(), "pipeline finished");
            }
            Err(err) => {
                self.enter(Phase::Reporting);
                tracing::error!(kind = err.kind(), "pipeline failed: {}", err);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContentField, ContentKind, VariantField};
    use crate::document::memory::{NodeKind, NodeSpec};
    use crate::document::{FontName, MemoryDocument};

    fn config() -> PipelineConfig {
        PipelineConfig::new()
            .with_variant_fields(vec![VariantField::new("colour", "colour")])
            .with_content_fields(vec![ContentField::new(
                "headline",
                "headline",
                ContentKind::Text,
            )])
            .with_required_fields(["size", "reportingLabel", "colour"])
            .with_fonts(vec![FontName::new("Sans", "Bold")])
    }

    fn document() -> MemoryDocument {
        let mut doc = MemoryDocument::new("Canvas");
        let templates = doc.add_page("Templates");
        for (size, w, h) in [("300x250", 300.0, 250.0), ("160x600", 160.0, 600.0)] {
            doc.add_node(
                templates,
                NodeSpec::new(size, NodeKind::Frame).with_child(
                    NodeSpec::new("colour=red", NodeKind::Component)
                        .with_size(w, h)
                        .with_child(
                            NodeSpec::new("content", NodeKind::Frame)
                                .with_child(NodeSpec::new("headline", NodeKind::Text)),
                        ),
                ),
            )
            .unwrap();
        }
        doc
    }

    fn row(size: &str, label: &str) -> Row {
        Row::new()
            .with("size", size)
            .with("reportingLabel", label)
            .with("colour", "red")
            .with("headline", format!("{label} headline"))
    }

    #[test]
    fn test_phase_starts_idle() {
        let config = config();
        assert_eq!(Pipeline::new(&config).phase(), Phase::Idle);
    }

    #[test]
    fn test_import_places_rows() {
        let config = config();
        let mut doc = document();
        let rows = vec![row("300x250", "A"), row("160x600", "B")];

        let mut pipeline = Pipeline::new(&config);
        let report = pipeline.import(&mut doc, &rows).unwrap();

        assert_eq!(pipeline.phase(), Phase::Done);
        assert_eq!(report.placed.len(), 2);
        assert_eq!(report.placed[0].position, Point::new(0.0, 0.0));
        assert_eq!(report.placed[1].position, Point::new(0.0, 270.0));
        assert_eq!(doc.canvas_nodes().len(), 2);
        assert_eq!(doc.name(report.placed[1].node).unwrap(), "B");
    }

    #[test]
    fn test_import_validation_failure_reports() {
        let config = config();
        let mut doc = document();
        let rows = vec![row("300x250", "A").with("colour", "")];

        let mut pipeline = Pipeline::new(&config);
        let err = pipeline.import(&mut doc, &rows).unwrap_err();

        assert_eq!(pipeline.phase(), Phase::Reporting);
        assert!(matches!(err, PipelineError::EmptyRequiredField { .. }));
        assert!(doc.canvas_nodes().is_empty());
    }

    #[test]
    fn test_missing_font_is_fatal() {
        let config = config();
        let mut doc = document();
        doc.set_available_fonts([FontName::new("Sans", "Regular")]);

        let err = Pipeline::new(&config)
            .import(&mut doc, &[row("300x250", "A")])
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::FontUnavailable { ref style, .. } if style == "Bold"
        ));
    }

    #[test]
    fn test_empty_row_set_is_a_no_op() {
        let config = config();
        let mut doc = document();
        let report = Pipeline::new(&config).import(&mut doc, &[]).unwrap();
        assert!(report.placed.is_empty());
    }

    #[test]
    fn test_failed_fill_leaves_no_orphan() {
        let config = config().with_content_fields(vec![ContentField::new(
            "headline",
            "headline",
            ContentKind::Unsupported("video".to_string()),
        )]);
        let mut doc = document();

        let err = Pipeline::new(&config)
            .import(&mut doc, &[row("300x250", "A")])
            .unwrap_err();
        assert_eq!(err.kind(), "unsupported-content-kind");
        assert!(doc.canvas_nodes().is_empty());
    }

    #[test]
    fn test_update_without_selection() {
        let config = config();
        let mut doc = document();
        let err = Pipeline::new(&config)
            .update(&mut doc, &[row("300x250", "A")])
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoSelection));
    }
}
