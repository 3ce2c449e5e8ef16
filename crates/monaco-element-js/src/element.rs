//! MonacoElement - the custom element's backing object for JavaScript.

use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use monaco_element_browser::{
    EditorState, ElementConfig, FrameHost, bound_from_px, parse_attribute,
};

use crate::types::{ElementOptions, JsEditorState};

/// Backing object for one `<monaco-element>`.
///
/// The registered element class forwards its lifecycle callbacks and
/// properties here; it can also be driven directly from JavaScript.
#[wasm_bindgen]
pub struct MonacoElement {
    host: FrameHost,
}

impl MonacoElement {
    pub fn with_config(element: HtmlElement, config: ElementConfig) -> Self {
        Self {
            host: FrameHost::new(element, EditorState::default(), config),
        }
    }
}

#[wasm_bindgen]
impl MonacoElement {
    /// Bind to `element`. Nothing is created until `connected()`.
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlElement, options: Option<ElementOptions>) -> Result<MonacoElement, JsError> {
        let config = options.unwrap_or_default().into_config();
        config.validate()?;
        Ok(Self::with_config(element, config))
    }

    // === Lifecycle ===

    /// `connectedCallback`: create the sandbox frame and bootstrap it.
    #[wasm_bindgen]
    pub fn connected(&self) -> Result<(), JsError> {
        self.host.mount()?;
        Ok(())
    }

    /// `disconnectedCallback`: tear the frame down. State is kept for a
    /// later reconnect.
    #[wasm_bindgen]
    pub fn disconnected(&self) {
        self.host.unmount();
    }

    /// `attributeChangedCallback`. `value` is null when removed.
    ///
    /// Invalid values are logged and ignored.
    #[wasm_bindgen(js_name = attributeChanged)]
    pub fn attribute_changed(&self, name: &str, value: Option<String>) {
        match parse_attribute(name, value.as_deref()) {
            Ok(Some(change)) => self.host.apply(change),
            Ok(None) => tracing::debug!(name, "unobserved attribute"),
            Err(e) => tracing::warn!(error = %e, "ignoring attribute"),
        }
    }

    // === Properties ===

    #[wasm_bindgen(getter)]
    pub fn value(&self) -> String {
        self.host.state().value
    }

    #[wasm_bindgen(setter)]
    pub fn set_value(&self, value: String) {
        self.host.set_value(&value);
    }

    #[wasm_bindgen(getter)]
    pub fn language(&self) -> String {
        self.host.state().language.to_string()
    }

    #[wasm_bindgen(setter)]
    pub fn set_language(&self, language: String) {
        self.host.set_language(&language);
    }

    #[wasm_bindgen(getter)]
    pub fn theme(&self) -> String {
        self.host.state().theme.to_string()
    }

    #[wasm_bindgen(setter)]
    pub fn set_theme(&self, theme: String) {
        self.host.set_theme(&theme);
    }

    #[wasm_bindgen(getter)]
    pub fn autogrow(&self) -> bool {
        self.host.state().autogrow
    }

    #[wasm_bindgen(setter)]
    pub fn set_autogrow(&self, autogrow: bool) {
        self.host.set_autogrow(autogrow);
    }

    #[wasm_bindgen(getter = maxHeight)]
    pub fn max_height(&self) -> Option<u32> {
        self.host.state().max_height
    }

    /// Zero, negative or null clears the bound.
    #[wasm_bindgen(setter = maxHeight)]
    pub fn set_max_height(&self, max_height: Option<f64>) {
        self.host.set_max_height(max_height.and_then(bound_from_px));
    }

    #[wasm_bindgen(getter = minHeight)]
    pub fn min_height(&self) -> Option<u32> {
        self.host.state().min_height
    }

    #[wasm_bindgen(setter = minHeight)]
    pub fn set_min_height(&self, min_height: Option<f64>) {
        self.host.set_min_height(min_height.and_then(bound_from_px));
    }

    #[wasm_bindgen(getter = libPath)]
    pub fn lib_path(&self) -> String {
        self.host.config().lib_path
    }

    /// Takes effect the next time the element is connected.
    #[wasm_bindgen(setter = libPath)]
    pub fn set_lib_path(&self, lib_path: Option<String>) {
        self.host
            .set_lib_path(lib_path.filter(|path| !path.trim().is_empty()));
    }

    /// Height last reported by the sandbox, if autogrow has run.
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> Option<u32> {
        self.host.height()
    }

    /// Whether the sandbox has signaled `ready` on the current frame.
    #[wasm_bindgen(getter = isReady)]
    pub fn is_ready(&self) -> bool {
        self.host.is_ready()
    }

    /// Reason the editor failed to load, as carried by `load-failed`.
    #[wasm_bindgen(getter = loadError)]
    pub fn load_error(&self) -> Option<String> {
        self.host.failure()
    }

    /// Snapshot of the host's copy of the editor state.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> JsEditorState {
        self.host.state().into()
    }

    /// Send pending property writes without waiting for the debounce.
    /// Returns the number of messages sent.
    #[wasm_bindgen]
    pub fn flush(&self) -> u32 {
        self.host.flush() as u32
    }
}
