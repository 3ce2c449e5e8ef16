//! DOM events the element emits to its own listeners.
//!
//! All events bubble and are composed, so they cross the element's shadow
//! boundary. The detail is a plain object:
//!
//! - `value-changed`: `{ value }`
//! - `height-changed`: `{ height }`
//! - `load-failed`: `{ message }`

use serde::Serialize;
use web_sys::{CustomEvent, CustomEventInit, EventTarget};

use monaco_element_core::HostEvent;

pub const VALUE_CHANGED: &str = "value-changed";
pub const HEIGHT_CHANGED: &str = "height-changed";
pub const LOAD_FAILED: &str = "load-failed";

#[derive(Serialize)]
#[serde(untagged)]
enum Detail<'a> {
    Value { value: &'a str },
    Height { height: u32 },
    Failure { message: &'a str },
}

/// DOM event name for a host event.
pub fn event_name(event: &HostEvent) -> &'static str {
    match event {
        HostEvent::ValueChanged(_) => VALUE_CHANGED,
        HostEvent::HeightChanged(_) => HEIGHT_CHANGED,
        HostEvent::LoadFailed(_) => LOAD_FAILED,
    }
}

fn detail(event: &HostEvent) -> Detail<'_> {
    match event {
        HostEvent::ValueChanged(value) => Detail::Value { value },
        HostEvent::HeightChanged(height) => Detail::Height { height: *height },
        HostEvent::LoadFailed(message) => Detail::Failure { message },
    }
}

/// Dispatch `event` on `target`. Failures are logged.
pub fn dispatch(target: &EventTarget, event: &HostEvent) {
    let name = event_name(event);
    let detail = match serde_wasm_bindgen::to_value(&detail(event)) {
        Ok(detail) => detail,
        Err(e) => {
            tracing::warn!(event = name, error = %e, "failed to build event detail");
            return;
        }
    };

    let init = CustomEventInit::new();
    init.set_bubbles(true);
    init.set_composed(true);
    init.set_detail(&detail);

    match CustomEvent::new_with_event_init_dict(name, &init) {
        Ok(custom) => {
            if let Err(e) = target.dispatch_event(&custom) {
                tracing::warn!(event = name, error = ?e, "listener threw");
            }
        }
        Err(e) => tracing::warn!(event = name, error = ?e, "failed to create event"),
    }
}
