use serde::{Deserialize, Serialize};

/// Top-level configuration for Arbor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArborConfig {
    pub forest: ForestConfig,
    pub logging: LoggingConfig,
}

/// Forest scope settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// File extensions eligible for forest membership
    #[serde(default = "default_extensions")]
    pub allowed_extensions: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether the store layer traces every emitted event
    #[serde(default = "default_true")]
    pub trace_events: bool,
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "markdown".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for ArborConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            logging: LoggingConfig {
                trace_events: true,
            },
        }
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_extensions(),
        }
    }
}

impl ArborConfig {
    /// Load config from YAML content
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roundtrips_through_yaml() {
        let config = ArborConfig::default();
        let yaml = config.to_yaml().unwrap();
        let loaded = ArborConfig::from_yaml(&yaml).unwrap();
        assert_eq!(loaded.forest.allowed_extensions, vec!["md", "markdown"]);
        assert!(loaded.logging.trace_events);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let loaded = ArborConfig::from_yaml("forest: {}\nlogging: {}\n").unwrap();
        assert_eq!(loaded.forest.allowed_extensions, vec!["md", "markdown"]);
    }
}
