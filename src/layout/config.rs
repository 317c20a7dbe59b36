//! Configuration for the layout engine

/// Configuration options for placing generated instances
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Spacing between neighbouring instances, horizontally and between rows
    pub gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { gap: 20.0 }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the spacing between instances
    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.gap, 20.0);
    }

    #[test]
    fn test_builder_pattern() {
        let config = LayoutConfig::new().with_gap(8.0);
        assert_eq!(config.gap, 8.0);
    }
}
