//! Content filling - writes row values into an instance's slots

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::config::{ContentField, ContentKind};
use crate::data::Row;
use crate::document::{Document, NodeId, ScaleMode};
use crate::error::{PipelineError, PipelineResult};

/// Fill every configured slot of `instance` from `row`
///
/// Slots are searched inside the instance's first child. A slot the template
/// does not have is skipped, as are image cells that are blank.
pub fn fill_instance<D: Document + ?Sized>(
    doc: &mut D,
    instance: NodeId,
    row: &Row,
    fields: &[ContentField],
) -> PipelineResult<()> {
    let container = doc.children(instance)?.first().copied();

    for field in fields {
        match &field.kind {
            ContentKind::Image => {
                if let Some(slot) = find_slot(&*doc, container, field)? {
                    fill_image(doc, slot, row, field)?;
                }
            }
            ContentKind::Text => {
                if let Some(slot) = find_slot(&*doc, container, field)? {
                    let text = row.text(&field.row_field).unwrap_or_default();
                    doc.set_text(slot, &br_to_newline(&text))?;
                }
            }
            ContentKind::Unsupported(kind) => {
                return Err(PipelineError::UnsupportedContentKind {
                    kind: kind.clone(),
                    field: field.row_field.clone(),
                });
            }
        }
    }
    Ok(())
}

fn find_slot<D: Document + ?Sized>(
    doc: &D,
    container: Option<NodeId>,
    field: &ContentField,
) -> PipelineResult<Option<NodeId>> {
    let slot = match container {
        Some(container) => doc.find_descendant(container, &field.slot)?,
        None => None,
    };
    if slot.is_none() {
        tracing::warn!(slot = %field.slot, "template has no such slot, skipping");
    }
    Ok(slot)
}

fn fill_image<D: Document + ?Sized>(
    doc: &mut D,
    slot: NodeId,
    row: &Row,
    field: &ContentField,
) -> PipelineResult<()> {
    let Some(payload) = row.text(&field.row_field) else {
        return Ok(());
    };
    if payload.trim().is_empty() {
        return Ok(());
    }

    let bytes = decode_image(&payload).map_err(|source| PipelineError::InvalidImageData {
        field: field.row_field.clone(),
        source,
    })?;
    let image = doc.create_image(&bytes)?;
    doc.set_image_fill(slot, &image, ScaleMode::Fill)?;
    Ok(())
}

/// Decode a base64 image payload, tolerating a `data:` URL prefix
pub fn decode_image(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let encoded = strip_data_url(payload);
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact.as_bytes())
}

/// Drop a leading `data:<mime>;base64,` header if present
pub fn strip_data_url(payload: &str) -> &str {
    let trimmed = payload.trim();
    if trimmed.starts_with("data:") {
        if let Some((_, data)) = trimmed.split_once(',') {
            return data;
        }
    }
    trimmed
}

/// Replace `<br>` markers (any letter case) with newlines
pub fn br_to_newline(text: &str) -> String {
    const MARKER: &str = "<br>";

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = find_ignore_case(rest, MARKER) {
        out.push_str(&rest[..pos]);
        out.push('\n');
        rest = &rest[pos + MARKER.len()..];
    }
    out.push_str(rest);
    out
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}
