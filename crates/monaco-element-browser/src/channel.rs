//! `postMessage` transport between the host page and the sandbox frame.

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{MessageEvent, Window};

use monaco_element_core::{ChannelError, FrameChannel};

/// Posts envelope text to one peer window.
#[derive(Clone, Debug)]
pub struct WindowChannel {
    target: Window,
    target_origin: String,
}

impl WindowChannel {
    /// Channel to `target`, restricted to `target_origin`.
    ///
    /// Host and sandbox share an origin (the frame is same-origin so the
    /// host can inject into it), so both ends pass their own origin.
    pub fn new(target: Window, target_origin: impl Into<String>) -> Self {
        Self {
            target,
            target_origin: target_origin.into(),
        }
    }

    pub fn target(&self) -> &Window {
        &self.target
    }
}

impl FrameChannel for WindowChannel {
    fn post(&self, text: &str) -> Result<(), ChannelError> {
        self.target
            .post_message(&JsValue::from_str(text), &self.target_origin)
            .map_err(|e| ChannelError::Post(format!("{:?}", e)))
    }
}

/// Origin to post to from `window`.
///
/// `window.origin` is used rather than `location.origin` because an
/// `about:blank` frame inherits its creator's origin but reports `"null"`
/// from its location.
pub fn own_origin(window: &Window) -> String {
    let origin = window.origin();
    if origin == "null" {
        "*".to_owned()
    } else {
        origin
    }
}

/// A scoped `message` listener that only accepts text from one peer window.
///
/// Dropping the subscription removes the listener, so a torn-down endpoint
/// never sees another message.
pub struct MessageSubscription {
    _listener: EventListener,
}

impl MessageSubscription {
    /// Listen on `window` for string messages whose `source` is `peer`.
    pub fn new(window: &Window, peer: &Window, mut on_message: impl FnMut(String) + 'static) -> Self {
        let peer: JsValue = peer.clone().into();
        let listener = EventListener::new(window, "message", move |event| {
            let Some(event) = event.dyn_ref::<MessageEvent>() else {
                return;
            };
            let from_peer = event
                .source()
                .is_some_and(|source| js_sys::Object::is(source.as_ref(), &peer));
            if !from_peer {
                return;
            }
            match event.data().as_string() {
                Some(text) => on_message(text),
                None => tracing::warn!("dropping non-text message from peer frame"),
            }
        });
        Self {
            _listener: listener,
        }
    }
}
