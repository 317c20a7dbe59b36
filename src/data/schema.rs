//! Required-field validation for spreadsheet rows

use crate::error::{PipelineError, PipelineResult};

use super::row::Row;

/// Check every row against the required fields
///
/// Each required column must exist on every row, blank rows included. Rows
/// with a non-empty size must also have a non-empty value in it. The check
/// walks field by field and stops at the first violation.
pub fn validate_rows<S: AsRef<str>>(rows: &[Row], required: &[S]) -> PipelineResult<()> {
    for field in required {
        let field = field.as_ref();
        for row in rows {
            if !row.contains(field) {
                return Err(PipelineError::missing_field(field, row.label()));
            }

            if row.is_blank() {
                continue;
            }

            if row.is_empty_value(field) {
                return Err(PipelineError::empty_field(field, row.label()));
            }
        }
    }
    Ok(())
}
