//! Message surface for the UI
//!
//! The UI talks to the pipeline through tagged JSON messages, one request at
//! a time. A [`Session`] owns the document for the lifetime of the UI and
//! turns each [`Request`] into a [`Response`]. A successful import or update,
//! or a cancel, closes the session.

use serde::{Deserialize, Serialize};

use crate::config::{ContentKind, PipelineConfig};
use crate::data::{validate_rows, Row};
use crate::document::{Document, PluginStore};
use crate::error::{PipelineError, PipelineResult};
use crate::fill::strip_data_url;
use crate::pipeline::Pipeline;

/// Messages sent by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    /// Generate instances for every row
    ImportData { rows: Vec<Row> },
    /// Regenerate the selected instances from matching rows
    UpdateData { rows: Vec<Row> },
    /// Run the schema check only; `function` is echoed back
    ValidateJson {
        payload: Vec<Row>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        function: Option<String>,
    },
    /// Cache an image payload under a name
    CacheWrite { key: String, value: String },
    /// Replace cached image names in the rows with their payloads
    CacheRead {
        rows: Vec<Row>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        function: Option<String>,
    },
    CacheClear,
    Cancel,
}

/// Messages sent back to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Response {
    /// The session is over
    Closed { message: String },
    ValidationError { message: String },
    NoSelection,
    NoMatchingRow { name: String },
    ValidateSuccess {
        payload: Vec<Row>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        function: Option<String>,
    },
    CacheReadSuccess {
        rows: Vec<Row>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        function: Option<String>,
    },
    CacheMiss { key: String },
    /// Request handled, nothing to report
    Ack,
}

/// Resolve cached image names in `rows` into inline payloads
///
/// Blank rows are left alone. For every image column with a value, the value
/// is taken as a cache key and replaced by the cached payload without its
/// `data:` URL header.
pub fn read_cached_images<S: PluginStore + ?Sized>(
    store: &S,
    config: &PipelineConfig,
    mut rows: Vec<Row>,
) -> PipelineResult<Vec<Row>> {
    let image_fields: Vec<&str> = config
        .content_fields
        .iter()
        .filter(|field| field.kind == ContentKind::Image)
        .map(|field| field.row_field.as_str())
        .collect();

    for row in rows.iter_mut().filter(|row| !row.is_blank()) {
        for &field in &image_fields {
            if row.is_empty_value(field) {
                continue;
            }
            let Some(key) = row.text(field) else {
                continue;
            };
            let cached = store
                .get(&key)
                .ok_or_else(|| PipelineError::CacheMiss { key: key.clone() })?;
            row.set(field, strip_data_url(&cached));
        }
    }
    Ok(rows)
}

/// A UI session bound to one document
#[derive(Debug)]
pub struct Session<D> {
    doc: D,
    config: PipelineConfig,
    closed: bool,
}

impl<D: Document + PluginStore> Session<D> {
    pub fn new(doc: D, config: PipelineConfig) -> Self {
        Self {
            doc,
            config,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Give the document back, e.g. to persist it
    pub fn into_document(self) -> D {
        self.doc
    }

    /// Handle one request
    ///
    /// Pipeline failures become failure responses; only requests arriving
    /// after the session closed are refused with an error.
    pub fn handle(&mut self, request: Request) -> PipelineResult<Response> {
        if self.closed {
            return Err(PipelineError::SessionClosed);
        }

        let response = match request {
            Request::ImportData { rows } => {
                let result = Pipeline::new(&self.config).import(&mut self.doc, &rows);
                match result {
                    Ok(_) => self.close("Successfully imported"),
                    Err(err) => failure(err),
                }
            }
            Request::UpdateData { rows } => {
                let result = Pipeline::new(&self.config).update(&mut self.doc, &rows);
                match result {
                    Ok(_) => self.close("Successfully updated"),
                    Err(err) => failure(err),
                }
            }
            Request::ValidateJson { payload, function } => {
                let result = validate_rows(&payload, &self.config.required_fields);
                match result {
                    Ok(()) => Response::ValidateSuccess { payload, function },
                    Err(err) => failure(err),
                }
            }
            Request::CacheWrite { key, value } => {
                self.doc.set(&key, &value);
                Response::Ack
            }
            Request::CacheRead { rows, function } => {
                match read_cached_images(&self.doc, &self.config, rows) {
                    Ok(rows) => Response::CacheReadSuccess { rows, function },
                    Err(err) => failure(err),
                }
            }
            Request::CacheClear => {
                self.doc.clear();
                Response::Ack
            }
            Request::Cancel => self.close("Cancelled"),
        };
        Ok(response)
    }

    fn close(&mut self, message: &str) -> Response {
        self.closed = true;
        Response::Closed {
            message: message.to_string(),
        }
    }
}

/// Map a pipeline error onto the response the UI understands
fn failure(err: PipelineError) -> Response {
    match err {
        PipelineError::NoSelection => Response::NoSelection,
        PipelineError::NoMatchingRow { name } => Response::NoMatchingRow { name },
        PipelineError::CacheMiss { key } => Response::CacheMiss { key },
        other => Response::ValidationError {
            message: other.to_string(),
        },
    }
}
