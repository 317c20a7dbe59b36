//! Host document interfaces
//!
//! The pipeline never touches a scene graph directly. Everything it needs
//! from the host (template lookup, instancing, canvas mutation, images, fonts)
//! goes through the [`Document`] trait, and the persistent image cache goes
//! through [`PluginStore`]. [`MemoryDocument`] implements both in memory.

pub mod memory;

pub use memory::MemoryDocument;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque handle to a node in the host document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Opaque, reusable handle to an image registered with the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(pub String);

/// How an image fill is fitted into its node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleMode {
    /// Stretch to cover the node's bounds
    #[default]
    Fill,
    Fit,
    Crop,
    Tile,
}

/// A font family/style pair the host must load before text is assigned
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
}

impl FontName {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
        }
    }
}

/// Failures reported by the host document
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The handle does not refer to a live node
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// Text was assigned to a node that cannot hold text
    #[error("node '{name}' is not a text node")]
    NotText { name: String },

    /// The requested font is not installed
    #[error("font {family} {style} is not available")]
    FontNotAvailable { family: String, style: String },

    /// Reading or writing the serialized document failed
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    /// The serialized document is malformed
    #[error("failed to parse document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Scene-graph operations the pipeline consumes
pub trait Document {
    /// The document root; pages are its direct children
    fn root(&self) -> NodeId;

    /// Node name
    fn name(&self, node: NodeId) -> Result<&str, DocumentError>;

    fn set_name(&mut self, node: NodeId, name: &str) -> Result<(), DocumentError>;

    /// Direct children in document order
    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DocumentError>;

    /// First direct child named exactly `name`
    fn find_child(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>, DocumentError> {
        for child in self.children(parent)? {
            if self.name(child)? == name {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// First descendant named exactly `name`, depth-first in pre-order,
    /// not including `parent` itself
    fn find_descendant(
        &self,
        parent: NodeId,
        name: &str,
    ) -> Result<Option<NodeId>, DocumentError> {
        for child in self.children(parent)? {
            if self.name(child)? == name {
                return Ok(Some(child));
            }
            if let Some(found) = self.find_descendant(child, name)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Position of the node as `(x, y)`
    fn position(&self, node: NodeId) -> Result<(f64, f64), DocumentError>;

    fn set_position(&mut self, node: NodeId, x: f64, y: f64) -> Result<(), DocumentError>;

    /// Clone a template node into a detached, placeable instance
    fn create_instance(&mut self, template: NodeId) -> Result<NodeId, DocumentError>;

    /// Append a node to the current canvas
    fn append_to_canvas(&mut self, node: NodeId) -> Result<(), DocumentError>;

    /// Remove a node from wherever it is attached
    fn remove(&mut self, node: NodeId) -> Result<(), DocumentError>;

    /// Currently selected canvas nodes, in selection order
    fn selection(&self) -> Vec<NodeId>;

    /// Register raw image bytes and return a reusable handle
    fn create_image(&mut self, bytes: &[u8]) -> Result<ImageHandle, DocumentError>;

    /// Replace the node's fills with a single image fill
    fn set_image_fill(
        &mut self,
        node: NodeId,
        image: &ImageHandle,
        scale_mode: ScaleMode,
    ) -> Result<(), DocumentError>;

    /// Replace the characters of a text node
    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DocumentError>;

    /// Ensure a font is available before any text is assigned
    fn load_font(&mut self, font: &FontName) -> Result<(), DocumentError>;
}

/// Key-value storage scoped to the document, persisted between sessions
pub trait PluginStore {
    /// Stored value, `None` when absent or empty
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str);

    fn keys(&self) -> Vec<String>;

    /// Blank every stored value
    fn clear(&mut self) {
        for key in self.keys() {
            self.set(&key, "");
        }
    }
}
