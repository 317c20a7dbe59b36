//! In-memory scene graph
//!
//! An arena of nodes that implements [`Document`] and [`PluginStore`]. It is
//! what the CLI runs against and what the tests drive. On disk it is a JSON
//! tree ([`DocumentSpec`]); images are stored base64-encoded and keyed by the
//! SHA-256 of their bytes, so identical payloads share one handle.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{
    Document, DocumentError, FontName, ImageHandle, NodeId, PluginStore, ScaleMode,
};

/// Node categories the in-memory graph distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Document,
    Page,
    #[default]
    Frame,
    Group,
    Component,
    Instance,
    Rectangle,
    Text,
}

/// An image fill on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFill {
    pub image: ImageHandle,
    #[serde(default)]
    pub scale_mode: ScaleMode,
}

/// A live node in the arena
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: Option<String>,
    pub fills: Vec<ImageFill>,
    /// Name of the template an instance was created from
    pub component: Option<String>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

/// Serialized form of a node and its subtree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fills: Vec<ImageFill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// Serialized form of a whole document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentSpec {
    /// Top-level pages, each a subtree
    #[serde(default)]
    pub pages: Vec<NodeSpec>,
    /// Name of the page new instances are appended to
    #[serde(default = "default_canvas")]
    pub canvas: String,
    /// Names of selected nodes on the canvas page
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selection: Vec<String>,
    /// Installed fonts; every font counts as installed when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonts: Option<Vec<FontName>>,
    /// Registered images, base64 keyed by handle
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub images: BTreeMap<String, String>,
    /// Persistent key-value store
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub plugin_data: BTreeMap<String, String>,
}

fn default_canvas() -> String {
    "Page 1".to_string()
}

/// Arena-backed document
///
/// Removed nodes leave a `None` slot behind and slots are never reused, so a
/// stale `NodeId` always reports `UnknownNode` instead of aliasing a newer
/// node. The arena grows with every instance created over the document's
/// lifetime; `to_spec` and a reload compact it.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    canvas: NodeId,
    selection: Vec<NodeId>,
    fonts: Option<HashSet<FontName>>,
    images: BTreeMap<String, Vec<u8>>,
    plugin_data: BTreeMap<String, String>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new(default_canvas())
    }
}

impl MemoryDocument {
    /// Create an empty document with a single canvas page
    pub fn new(canvas: impl Into<String>) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            canvas: NodeId(0),
            selection: Vec::new(),
            fonts: None,
            images: BTreeMap::new(),
            plugin_data: BTreeMap::new(),
        };
        doc.root = doc.alloc(NodeSpec::new("Document", NodeKind::Document), None);
        doc.canvas = doc.add_page(canvas);
        doc
    }

    /// Build a document from its serialized form
    pub fn from_spec(spec: DocumentSpec) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            canvas: NodeId(0),
            selection: Vec::new(),
            fonts: spec.fonts.map(|fonts| fonts.into_iter().collect()),
            images: BTreeMap::new(),
            plugin_data: spec.plugin_data,
        };
        doc.root = doc.alloc(NodeSpec::new("Document", NodeKind::Document), None);
        let root = doc.root;

        let mut canvas = None;
        for page in spec.pages {
            let is_canvas = page.name == spec.canvas;
            let id = doc.insert_subtree(root, page);
            if is_canvas && canvas.is_none() {
                canvas = Some(id);
            }
        }
        doc.canvas = match canvas {
            Some(id) => id,
            None => doc.add_page(spec.canvas),
        };

        let selection = spec
            .selection
            .iter()
            .filter_map(|name| doc.canvas_child_named(name))
            .collect();
        doc.select(selection);

        for (handle, encoded) in spec.images {
            match STANDARD.decode(encoded.as_bytes()) {
                Ok(bytes) => {
                    doc.images.insert(handle, bytes);
                }
                Err(err) => tracing::warn!(%handle, "dropping undecodable image: {}", err),
            }
        }

        doc
    }

    /// Parse a document from JSON
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let spec: DocumentSpec = serde_json::from_str(json)?;
        Ok(Self::from_spec(spec))
    }

    /// Load a document from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize back to the on-disk form
    pub fn to_spec(&self) -> DocumentSpec {
        let pages = self
            .node_ref(self.root)
            .map(|root| root.children.iter().map(|&id| self.subtree_spec(id)).collect())
            .unwrap_or_default();

        DocumentSpec {
            pages,
            canvas: self
                .node_ref(self.canvas)
                .map(|n| n.name.clone())
                .unwrap_or_else(default_canvas),
            selection: self
                .selection
                .iter()
                .filter_map(|&id| self.node_ref(id).map(|n| n.name.clone()))
                .collect(),
            fonts: self.fonts.as_ref().map(|fonts| {
                let mut list: Vec<FontName> = fonts.iter().cloned().collect();
                list.sort_by(|a, b| (&a.family, &a.style).cmp(&(&b.family, &b.style)));
                list
            }),
            images: self
                .images
                .iter()
                .map(|(handle, bytes)| (handle.clone(), STANDARD.encode(bytes)))
                .collect(),
            plugin_data: self.plugin_data.clone(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(&self.to_spec())?)
    }

    /// Write the document as pretty JSON
    pub fn write_file(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Add a new, empty top-level page
    pub fn add_page(&mut self, name: impl Into<String>) -> NodeId {
        let root = self.root;
        self.insert_subtree(root, NodeSpec::new(name, NodeKind::Page))
    }

    /// Attach a serialized subtree under `parent`
    pub fn add_node(&mut self, parent: NodeId, spec: NodeSpec) -> Result<NodeId, DocumentError> {
        self.node_ref(parent).ok_or(DocumentError::UnknownNode(parent))?;
        Ok(self.insert_subtree(parent, spec))
    }

    /// The page new instances land on
    pub fn canvas(&self) -> NodeId {
        self.canvas
    }

    /// Live node by handle
    pub fn node(&self, id: NodeId) -> Result<&Node, DocumentError> {
        self.node_ref(id).ok_or(DocumentError::UnknownNode(id))
    }

    /// Top-level nodes on the canvas page
    pub fn canvas_nodes(&self) -> Vec<NodeId> {
        self.node_ref(self.canvas)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Replace the selection, keeping the first occurrence of each node
    pub fn select(&mut self, nodes: Vec<NodeId>) {
        self.selection.clear();
        for node in nodes {
            if !self.selection.contains(&node) {
                self.selection.push(node);
            }
        }
    }

    /// Restrict installed fonts to the given list
    pub fn set_available_fonts(&mut self, fonts: impl IntoIterator<Item = FontName>) {
        self.fonts = Some(fonts.into_iter().collect());
    }

    /// Bytes registered under an image handle
    pub fn image_bytes(&self, handle: &ImageHandle) -> Option<&[u8]> {
        self.images.get(&handle.0).map(|b| b.as_slice())
    }

    fn canvas_child_named(&self, name: &str) -> Option<NodeId> {
        self.node_ref(self.canvas)?
            .children
            .iter()
            .copied()
            .find(|&id| self.node_ref(id).is_some_and(|n| n.name == name))
    }

    fn node_ref(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(|n| n.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DocumentError> {
        self.nodes
            .get_mut(id.0)
            .and_then(|n| n.as_mut())
            .ok_or(DocumentError::UnknownNode(id))
    }

    fn alloc(&mut self, spec: NodeSpec, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            name: spec.name,
            kind: spec.kind,
            x: spec.x,
            y: spec.y,
            width: spec.width,
            height: spec.height,
            text: spec.text,
            fills: spec.fills,
            component: spec.component,
            children: Vec::new(),
            parent,
        }));
        id
    }

    fn insert_subtree(&mut self, parent: NodeId, mut spec: NodeSpec) -> NodeId {
        let children = std::mem::take(&mut spec.children);
        let id = self.alloc(spec, Some(parent));
        if let Some(Some(p)) = self.nodes.get_mut(parent.0) {
            p.children.push(id);
        }
        for child in children {
            self.insert_subtree(id, child);
        }
        id
    }

    fn subtree_spec(&self, id: NodeId) -> NodeSpec {
        let Some(node) = self.node_ref(id) else {
            return NodeSpec::default();
        };
        NodeSpec {
            name: node.name.clone(),
            kind: node.kind,
            x: node.x,
            y: node.y,
            width: node.width,
            height: node.height,
            text: node.text.clone(),
            fills: node.fills.clone(),
            component: node.component.clone(),
            children: node.children.iter().map(|&c| self.subtree_spec(c)).collect(),
        }
    }

    fn detach(&mut self, id: NodeId) -> Result<(), DocumentError> {
        let parent = self.node_mut(id)?.parent.take();
        if let Some(parent) = parent {
            let p = self.node_mut(parent)?;
            p.children.retain(|&c| c != id);
        }
        Ok(())
    }

    fn drop_subtree(&mut self, id: NodeId) {
        let children = self.node_ref(id).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.drop_subtree(child);
        }
        if let Some(slot) = self.nodes.get_mut(id.0) {
            *slot = None;
        }
    }
}

impl Document for MemoryDocument {
    fn root(&self) -> NodeId {
        self.root
    }

    fn name(&self, node: NodeId) -> Result<&str, DocumentError> {
        Ok(self.node(node)?.name.as_str())
    }

    fn set_name(&mut self, node: NodeId, name: &str) -> Result<(), DocumentError> {
        self.node_mut(node)?.name = name.to_string();
        Ok(())
    }

    fn children(&self, node: NodeId) -> Result<Vec<NodeId>, DocumentError> {
        Ok(self.node(node)?.children.clone())
    }

    fn position(&self, node: NodeId) -> Result<(f64, f64), DocumentError> {
        let n = self.node(node)?;
        Ok((n.x, n.y))
    }

    fn set_position(&mut self, node: NodeId, x: f64, y: f64) -> Result<(), DocumentError> {
        let n = self.node_mut(node)?;
        n.x = x;
        n.y = y;
        Ok(())
    }

    fn create_instance(&mut self, template: NodeId) -> Result<NodeId, DocumentError> {
        self.node(template)?;
        let mut spec = self.subtree_spec(template);
        spec.component = Some(spec.name.clone());
        spec.kind = NodeKind::Instance;
        spec.x = 0.0;
        spec.y = 0.0;

        let children = std::mem::take(&mut spec.children);
        let id = self.alloc(spec, None);
        for child in children {
            self.insert_subtree(id, child);
        }
        Ok(id)
    }

    fn append_to_canvas(&mut self, node: NodeId) -> Result<(), DocumentError> {
        self.detach(node)?;
        let canvas = self.canvas;
        self.node_mut(node)?.parent = Some(canvas);
        self.node_mut(canvas)?.children.push(node);
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<(), DocumentError> {
        self.detach(node)?;
        self.selection.retain(|&id| id != node);
        self.drop_subtree(node);
        Ok(())
    }

    fn selection(&self) -> Vec<NodeId> {
        self.selection.clone()
    }

    fn create_image(&mut self, bytes: &[u8]) -> Result<ImageHandle, DocumentError> {
        let digest = Sha256::digest(bytes);
        let mut hash = String::with_capacity(digest.len() * 2);
        for b in digest {
            hash.push_str(&format!("{:02x}", b));
        }
        self.images.entry(hash.clone()).or_insert_with(|| bytes.to_vec());
        Ok(ImageHandle(hash))
    }

    fn set_image_fill(
        &mut self,
        node: NodeId,
        image: &ImageHandle,
        scale_mode: ScaleMode,
    ) -> Result<(), DocumentError> {
        self.node_mut(node)?.fills = vec![ImageFill {
            image: image.clone(),
            scale_mode,
        }];
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DocumentError> {
        let n = self.node_mut(node)?;
        if n.kind != NodeKind::Text {
            return Err(DocumentError::NotText {
                name: n.name.clone(),
            });
        }
        n.text = Some(text.to_string());
        Ok(())
    }

    fn load_font(&mut self, font: &FontName) -> Result<(), DocumentError> {
        match &self.fonts {
            Some(fonts) if !fonts.contains(font) => Err(DocumentError::FontNotAvailable {
                family: font.family.clone(),
                style: font.style.clone(),
            }),
            _ => Ok(()),
        }
    }
}

impl PluginStore for MemoryDocument {
    fn get(&self, key: &str) -> Option<String> {
        self.plugin_data
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.plugin_data.insert(key.to_string(), value.to_string());
    }

    fn keys(&self) -> Vec<String> {
        self.plugin_data.keys().cloned().collect()
    }
}
