//! Entry point run by the bootstrap script inside the sandbox frame.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use monaco_element_browser::{ElementConfig, SandboxRuntime};

use crate::telemetry;

thread_local! {
    static RUNTIME: RefCell<Option<SandboxRuntime>> = const { RefCell::new(None) };
}

/// Start the sandbox controller with the host's element config.
///
/// Called once per frame; later calls are ignored.
#[wasm_bindgen(js_name = startSandbox)]
pub fn start_sandbox(options: JsValue) -> Result<(), JsError> {
    telemetry::init(None);

    let config: ElementConfig = if options.is_undefined() || options.is_null() {
        ElementConfig::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsError::new(&format!("invalid sandbox config: {}", e)))?
    };
    config.validate()?;

    RUNTIME.with(|slot| -> Result<(), JsError> {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            tracing::warn!("sandbox already started");
            return Ok(());
        }
        *slot = Some(SandboxRuntime::start(config)?);
        tracing::debug!("sandbox controller started");
        Ok(())
    })
}

/// Controller state name, for diagnostics: `unloaded`, `engine-loading`,
/// `editor-ready`, `syncing` or `failed`.
#[wasm_bindgen(js_name = sandboxState)]
pub fn sandbox_state() -> Option<String> {
    RUNTIME.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|runtime| runtime.state_name().to_owned())
    })
}
