//! WASM bindings for the monaco element.
//!
//! One module serves both sides of the frame boundary:
//!
//! - on the host page, `defineMonacoElement()` registers `<monaco-element>`
//! - inside the sandbox frame, the bootstrap script calls `startSandbox()`

mod define;
mod element;
mod sandbox;
mod telemetry;
mod types;

pub use define::*;
pub use element::*;
pub use sandbox::*;
pub use telemetry::init_logging;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}
