//! Element configuration shared by host and sandbox.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layout::{HeightPolicy, LINE_HEIGHT};

pub const DEFAULT_LIB_PATH: &str = "/node_modules/monaco-editor/min/vs";
pub const DEFAULT_CONTROLLER_MODULE: &str = "/monaco_element_js.js";
pub const DEFAULT_DEBOUNCE_MS: u32 = 100;

/// Deployment and behavior settings for one element.
///
/// The sandbox receives the same config through its bootstrap script, so
/// both endpoints agree on line height and height policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementConfig {
    /// Base path of the engine's `vs` directory. The AMD loader is expected
    /// at `{lib_path}/loader.js`.
    pub lib_path: String,
    /// URL of the wasm-bindgen JS module exporting `startSandbox`.
    pub controller_module: String,
    /// Coalescing window for attribute writes, in milliseconds.
    pub debounce_ms: u32,
    pub line_height: u32,
    pub height_policy: HeightPolicy,
    pub minimap: bool,
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self {
            lib_path: DEFAULT_LIB_PATH.to_owned(),
            controller_module: DEFAULT_CONTROLLER_MODULE.to_owned(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            line_height: LINE_HEIGHT,
            height_policy: HeightPolicy::default(),
            minimap: false,
        }
    }
}

impl ElementConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lib_path.trim().is_empty() {
            return Err(ConfigError::Empty { field: "libPath" });
        }
        if self.controller_module.trim().is_empty() {
            return Err(ConfigError::Empty {
                field: "controllerModule",
            });
        }
        if self.line_height == 0 {
            return Err(ConfigError::NotPositive {
                field: "lineHeight",
            });
        }
        Ok(())
    }

    /// `lib_path` without a trailing slash, as the AMD `vs` path.
    pub fn vs_path(&self) -> &str {
        self.lib_path.trim_end_matches('/')
    }

    /// URL of the engine's AMD loader script.
    pub fn loader_url(&self) -> String {
        format!("{}/loader.js", self.vs_path())
    }
}
