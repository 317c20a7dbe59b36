//! Pipeline configuration
//!
//! Field mappings, the template page name, fonts and layout spacing are read
//! once into an immutable [`PipelineConfig`] and handed to the pipeline. The
//! built-in default mirrors the production spreadsheet layout.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::document::FontName;
use crate::layout::LayoutConfig;

/// Errors that can occur when loading or parsing a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// One axis of template selection
///
/// `display_name` is what template authors write in variant node names,
/// `row_field` is the spreadsheet column holding the value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VariantField {
    pub display_name: String,
    pub row_field: String,
}

impl VariantField {
    pub fn new(display_name: impl Into<String>, row_field: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            row_field: row_field.into(),
        }
    }
}

/// What a content slot receives
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ContentKind {
    Image,
    Text,
    /// Anything else; rejected when the filler reaches it
    Unsupported(String),
}

impl From<String> for ContentKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "image" => ContentKind::Image,
            "text" => ContentKind::Text,
            _ => ContentKind::Unsupported(kind),
        }
    }
}

/// One fillable region inside a template
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentField {
    /// Node name of the slot inside the template
    pub slot: String,
    /// Spreadsheet column holding the value
    pub row_field: String,
    pub kind: ContentKind,
}

impl ContentField {
    pub fn new(slot: impl Into<String>, row_field: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            slot: slot.into(),
            row_field: row_field.into(),
            kind,
        }
    }
}

/// Immutable configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Name of the page holding the template library
    pub templates_page: String,
    /// Layout spacing
    pub layout: LayoutConfig,
    /// Ordered variant axes; order fixes the canonical key
    pub variant_fields: Vec<VariantField>,
    pub content_fields: Vec<ContentField>,
    /// Fields every row must carry
    pub required_fields: Vec<String>,
    /// Fonts loaded before the row loop
    pub fonts: Vec<FontName>,
}

/// TOML structure for deserializing configurations
#[derive(Deserialize)]
struct TomlConfig {
    templates_page: Option<String>,
    gap: Option<f64>,
    #[serde(default)]
    variant_fields: Vec<VariantField>,
    #[serde(default)]
    content_fields: Vec<ContentField>,
    #[serde(default)]
    required_fields: Vec<String>,
    #[serde(default)]
    fonts: Vec<FontName>,
}

/// Default mapping for the car campaign spreadsheets
const DEFAULT_CONFIG: &str = r#"
templates_page = "Templates"
gap = 20

# [name in the template, column in the spreadsheet]
variant_fields = [
    { display_name = "car type", row_field = "car type" },
    { display_name = "alignment", row_field = "alignment" },
    { display_name = "version", row_field = "version" },
    { display_name = "disclaimer", row_field = "disclaimer" },
    { display_name = "call to action", row_field = "cta" },
    { display_name = "colour", row_field = "colour" },
]

content_fields = [
    { slot = "image", row_field = "image", kind = "image" },
    { slot = "iconisation-image", row_field = "iconisation-image", kind = "image" },
    { slot = "disclaimer", row_field = "disclaimer_txt", kind = "text" },
    { slot = "cta", row_field = "cta_txt", kind = "text" },
    { slot = "subline", row_field = "subline_txt", kind = "text" },
    { slot = "headline", row_field = "headline_txt", kind = "text" },
]

required_fields = [
    "size",
    "reportingLabel",
    "car type",
    "alignment",
    "version",
    "disclaimer",
    "cta",
    "image",
    "colour",
]

fonts = [
    { family = "BMWTypeNext Pro", style = "Bold" },
    { family = "BMWTypeNext Pro", style = "Light" },
    { family = "BMWTypeNext Pro", style = "Regular" },
]
"#;

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    ///
    /// Keys left out of the document keep an empty mapping, except
    /// `templates_page` and `gap` which fall back to their defaults.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let layout = match parsed.gap {
            Some(gap) => LayoutConfig::new().with_gap(gap),
            None => LayoutConfig::default(),
        };

        Ok(PipelineConfig {
            templates_page: parsed
                .templates_page
                .unwrap_or_else(|| "Templates".to_string()),
            layout,
            variant_fields: parsed.variant_fields,
            content_fields: parsed.content_fields,
            required_fields: parsed.required_fields,
            fonts: parsed.fonts,
        })
    }

    /// Create a new configuration with the default mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name of the template page
    pub fn with_templates_page(mut self, page: impl Into<String>) -> Self {
        self.templates_page = page.into();
        self
    }

    /// Set the layout configuration
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Set the variant axes
    pub fn with_variant_fields(mut self, fields: Vec<VariantField>) -> Self {
        self.variant_fields = fields;
        self
    }

    /// Set the content slots
    pub fn with_content_fields(mut self, fields: Vec<ContentField>) -> Self {
        self.content_fields = fields;
        self
    }

    /// Set the required fields
    pub fn with_required_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the fonts to load
    pub fn with_fonts(mut self, fonts: Vec<FontName>) -> Self {
        self.fonts = fonts;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_str(DEFAULT_CONFIG).expect("Default config should be valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.templates_page, "Templates");
        assert_eq!(config.layout.gap, 20.0);
        assert_eq!(config.variant_fields.len(), 6);
        assert_eq!(
            config.variant_fields[4],
            VariantField::new("call to action", "cta")
        );
        assert_eq!(config.content_fields.len(), 6);
        assert_eq!(config.content_fields[0].kind, ContentKind::Image);
        assert_eq!(config.content_fields[5].row_field, "headline_txt");
        assert_eq!(config.required_fields[0], "size");
        assert_eq!(config.required_fields.len(), 9);
        assert_eq!(config.fonts.len(), 3);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new()
            .with_templates_page("Masters")
            .with_layout(LayoutConfig::new().with_gap(40.0))
            .with_required_fields(["size", "reportingLabel"]);

        assert_eq!(config.templates_page, "Masters");
        assert_eq!(config.layout.gap, 40.0);
        assert_eq!(config.required_fields, vec!["size", "reportingLabel"]);
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
variant_fields = [{ display_name = "colour", row_field = "colour" }]
content_fields = [{ slot = "headline", row_field = "headline", kind = "text" }]
"#;
        let config = PipelineConfig::from_str(toml_str).expect("Should parse");
        assert_eq!(config.templates_page, "Templates");
        assert_eq!(config.layout.gap, 20.0);
        assert_eq!(config.variant_fields.len(), 1);
        assert!(config.required_fields.is_empty());
        assert!(config.fonts.is_empty());
    }

    #[test]
    fn test_unknown_content_kind_is_kept() {
        let toml_str = r#"
content_fields = [{ slot = "clip", row_field = "clip", kind = "video" }]
"#;
        let config = PipelineConfig::from_str(toml_str).expect("Should parse");
        assert_eq!(
            config.content_fields[0].kind,
            ContentKind::Unsupported("video".to_string())
        );
    }

    #[test]
    fn test_invalid_toml_error() {
        let invalid = "this is not valid toml {{{{";
        let result = PipelineConfig::from_str(invalid);
        assert!(result.is_err());
    }
}
