use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::EditorError;
use crate::schema::StaticSchema;

pub const DEFAULT_CONFIG_NAME: &str = "csledit.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
    /// Storage key the style snapshot lives under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Paths every loaded style must contain and that cannot be deleted
    #[serde(default)]
    pub required_nodes: Vec<String>,

    /// Stamp `style/info/updated` on every write
    #[serde(default)]
    pub update_time: bool,

    /// Markup to load on startup instead of the stored style
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_markup: Option<String>,

    /// Where to fetch a style from when none is stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_style_url: Option<String>,

    /// Defaults for newly inserted nodes
    #[serde(default)]
    pub schema: StaticSchema,
}

fn default_storage_key() -> String {
    "CSLEDIT_cslData".to_string()
}

impl EditorOptions {
    /// Load config from a directory, falling back to defaults
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EditorError> {
        let config_path = PathBuf::from(dir.as_ref()).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            Self::from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            required_nodes: Vec::new(),
            update_time: false,
            initial_markup: None,
            default_style_url: None,
            schema: StaticSchema::default(),
        }
    }
}
