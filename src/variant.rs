//! Variant resolution - maps a row to a template node
//!
//! Template authors name each variant node after its variant values, in the
//! configured axis order:
//!
//! ```text
//! car type=sedan, alignment=left, colour=red
//! ```
//!
//! Variants live under a group named after the artboard size, somewhere
//! inside the template page. Lookup is an exact string match; there is no
//! closest-match fallback.

use crate::config::{PipelineConfig, VariantField};
use crate::data::Row;
use crate::document::{Document, NodeId};
use crate::error::{PipelineError, PipelineResult};

const SEPARATOR: &str = ", ";

/// Build the canonical variant key for a row
///
/// Each axis contributes `<display name>=<row value>`, joined with `", "`
/// in configuration order. Missing or null cells contribute an empty value.
pub fn variant_key(row: &Row, fields: &[VariantField]) -> String {
    fields
        .iter()
        .map(|field| {
            let value = row.text(&field.row_field).unwrap_or_default();
            format!("{}={}", field.display_name, value)
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Locate the template variant for a row
pub fn resolve_variant<D: Document + ?Sized>(
    doc: &D,
    config: &PipelineConfig,
    row: &Row,
) -> PipelineResult<NodeId> {
    let page = doc
        .find_child(doc.root(), &config.templates_page)?
        .ok_or_else(|| PipelineError::TemplateRootMissing {
            page: config.templates_page.clone(),
        })?;

    let size = row.size();
    let group = doc
        .find_descendant(page, &size)?
        .ok_or_else(|| PipelineError::SizeGroupMissing { size: size.clone() })?;

    let key = variant_key(row, &config.variant_fields);
    let variant = doc
        .find_child(group, &key)?
        .ok_or_else(|| PipelineError::VariantNotFound {
            key: key.clone(),
            size: size.clone(),
        })?;

    tracing::debug!(%size, %key, "resolved variant");
    Ok(variant)
}
