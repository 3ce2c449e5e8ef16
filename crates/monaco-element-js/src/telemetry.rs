//! Console logging for both the host page and the sandbox frame.

use std::sync::Once;

use tracing::Level;
use tracing::subscriber::set_global_default;
use tracing_subscriber::Registry;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use wasm_bindgen::prelude::*;

static INIT: Once = Once::new();

fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Install the console subscriber. Only the first call has an effect.
pub fn init(filter: Option<&str>) {
    INIT.call_once(|| {
        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };

        let wasm_layer = tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(console_level)
                .build(),
        );

        let filter = filter
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(default_filter()));

        let reg = Registry::default().with(filter).with(wasm_layer);

        let _ = set_global_default(reg);
    });
}

/// Configure console logging with `EnvFilter` directives, e.g.
/// `"monaco_element_core=debug,warn"`.
///
/// Must run before `defineMonacoElement` or `startSandbox`, which install the
/// default filter otherwise.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(filter: Option<String>) {
    init(filter.as_deref());
}
