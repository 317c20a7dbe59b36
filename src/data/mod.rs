//! Tabular input: rows and their validation

pub mod row;
pub mod schema;

pub use row::{find_by_reporting_label, Row, FRAME_FIELD, REPORTING_LABEL_FIELD, SIZE_FIELD};
pub use schema::validate_rows;
