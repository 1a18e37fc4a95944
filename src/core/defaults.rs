use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::paths;
use crate::utils::io;

/// Root configuration structure for gostamp.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GostampConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via gostamp.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    /// Prefix of every generated file name. Files starting with it are
    /// never loaded as templates.
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Extra glob patterns of template files to ignore.
    #[serde(default)]
    pub skip: Vec<String>,

    #[serde(default = "default_left_delim")]
    pub left_delim: String,

    #[serde(default = "default_right_delim")]
    pub right_delim: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output_prefix: default_output_prefix(),
            skip: Vec::new(),
            left_delim: default_left_delim(),
            right_delim: default_right_delim(),
        }
    }
}

fn default_output_prefix() -> String {
    "generated_".to_string()
}

fn default_left_delim() -> String {
    "{{".to_string()
}

fn default_right_delim() -> String {
    "}}".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults, merging file config with built-in defaults.
/// If gostamp.json is missing or invalid, silently returns built-in defaults.
pub fn load_defaults() -> Defaults {
    load_config().defaults
}

/// Load the full gostamp.json config, falling back to defaults on any error.
pub fn load_config() -> GostampConfig {
    paths::gostamp_json()
        .and_then(|path| load_config_from_file(&path))
        .unwrap_or_default()
}

/// Attempt to load config from a gostamp.json file.
pub fn load_config_from_file(path: &Path) -> crate::Result<GostampConfig> {
    if !path.exists() {
        return Err(crate::Error::other("gostamp.json not found"));
    }

    let content = io::read_file(path, &format!("read {}", path.display()))?;

    serde_json::from_str(&content)
        .map_err(|e| crate::Error::config_invalid_json(path.display().to_string(), e))
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}
