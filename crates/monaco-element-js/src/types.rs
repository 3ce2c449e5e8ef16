//! Types exposed to JavaScript via wasm-bindgen.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

use monaco_element_browser::{ElementConfig, HeightPolicy};

/// Deployment options for `defineMonacoElement` and `new MonacoElement`.
///
/// Every field is optional; missing ones take the element defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct ElementOptions {
    /// Base path of Monaco's `vs` directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lib_path: Option<String>,
    /// URL of this package's JS glue module, imported inside the sandbox.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<u32>,
    #[tsify(type = "\"clamp\" | \"skip-overflow\"")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_policy: Option<HeightPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimap: Option<bool>,
}

impl ElementOptions {
    /// Merge over the defaults.
    pub fn into_config(self) -> ElementConfig {
        let defaults = ElementConfig::default();
        ElementConfig {
            lib_path: self.lib_path.unwrap_or(defaults.lib_path),
            controller_module: self
                .controller_module
                .unwrap_or(defaults.controller_module),
            debounce_ms: self.debounce_ms.unwrap_or(defaults.debounce_ms),
            line_height: self.line_height.unwrap_or(defaults.line_height),
            height_policy: self.height_policy.unwrap_or(defaults.height_policy),
            minimap: self.minimap.unwrap_or(defaults.minimap),
        }
    }
}

/// Current editor state, as returned by `MonacoElement.state`.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsEditorState {
    pub value: String,
    pub language: String,
    pub theme: String,
    pub autogrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<u32>,
}

impl From<monaco_element_browser::EditorState> for JsEditorState {
    fn from(state: monaco_element_browser::EditorState) -> Self {
        Self {
            value: state.value,
            language: state.language.to_string(),
            theme: state.theme.to_string(),
            autogrow: state.autogrow,
            max_height: state.max_height,
            min_height: state.min_height,
        }
    }
}
