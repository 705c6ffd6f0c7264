use serde::{Deserialize, Serialize};

/// Configuration from ghboard.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Field names to show as columns, in order. Empty shows every field.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Query applied when none is given on the command line
    #[serde(default)]
    pub default_query: Option<String>,
    #[serde(default = "default_max_title_width")]
    pub max_title_width: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            fields: Vec::new(),
            default_query: None,
            max_title_width: default_max_title_width(),
        }
    }
}

fn default_max_title_width() -> usize {
    60
}
