//! Host-side frame management for the custom element.
//!
//! `FrameHost` owns the sandbox iframe inside the element's shadow root,
//! routes attribute writes through a [`HostAdapter`] with a debounced flush,
//! and turns the sandbox's reports into DOM events on the element.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, HtmlIFrameElement, Node, ShadowRootInit, ShadowRootMode};

use monaco_element_core::config::DEFAULT_LIB_PATH;
use monaco_element_core::{
    AttributeChange, BootstrapError, BootstrapPlan, EditorState, ElementConfig, HostAdapter,
    HostEvent, bootstrap,
};

use crate::channel::{MessageSubscription, WindowChannel, own_origin};
use crate::events;
use crate::inject::FrameInjector;

/// Styles for the element's shadow root.
const SHADOW_STYLE: &str = ":host { display: block; } \
iframe { display: block; width: 100%; height: 100%; border: 0; }";

/// Sandbox flags: scripts run, and the frame stays same-origin so the host
/// can inject into its document.
const FRAME_SANDBOX: &str = "allow-scripts allow-same-origin";

struct HostInner {
    adapter: HostAdapter<WindowChannel>,
    config: ElementConfig,
    element: HtmlElement,
    frame: Option<HtmlIFrameElement>,
    listener: Option<MessageSubscription>,
    debounce: Option<Timeout>,
    flush_scheduled: bool,
}

/// Host endpoint bound to one element.
#[derive(Clone)]
pub struct FrameHost {
    inner: Rc<RefCell<HostInner>>,
}

impl FrameHost {
    pub fn new(element: HtmlElement, state: EditorState, config: ElementConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(HostInner {
                adapter: HostAdapter::new(state),
                config,
                element,
                frame: None,
                listener: None,
                debounce: None,
                flush_scheduled: false,
            })),
        }
    }

    pub fn state(&self) -> EditorState {
        self.inner.borrow().adapter.state().clone()
    }

    pub fn config(&self) -> ElementConfig {
        self.inner.borrow().config.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.borrow().frame.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.borrow().adapter.is_ready()
    }

    /// Last height reported by the sandbox.
    pub fn height(&self) -> Option<u32> {
        self.inner.borrow().adapter.height()
    }

    /// Why the current frame has no editor, if loading failed.
    pub fn failure(&self) -> Option<String> {
        self.inner.borrow().adapter.failure().map(str::to_owned)
    }

    /// Create the sandbox frame and start bootstrapping it.
    ///
    /// A no-op if already mounted. Script load failures are reported
    /// asynchronously as a `load-failed` event.
    pub fn mount(&self) -> Result<(), BootstrapError> {
        let mut inner = self.inner.borrow_mut();
        if inner.frame.is_some() {
            return Ok(());
        }
        inner.config.validate().map_err(|e| BootstrapError::Dom {
            what: "configuration",
            reason: e.to_string(),
        })?;
        let plan = BootstrapPlan::from_config(&inner.config)?;

        let window = web_sys::window().ok_or(BootstrapError::NoDocument)?;
        let document = inner
            .element
            .owner_document()
            .ok_or(BootstrapError::NoDocument)?;

        let root: Node = match inner.element.shadow_root() {
            Some(root) => root.into(),
            None => inner
                .element
                .attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))
                .map_err(|e| dom_error("shadow root", e))?
                .into(),
        };
        if !root.has_child_nodes() {
            let style = document
                .create_element("style")
                .map_err(|e| dom_error("style", e))?;
            style.set_text_content(Some(SHADOW_STYLE));
            root.append_child(&style)
                .map_err(|e| dom_error("style", e))?;
        }

        let frame: HtmlIFrameElement = document
            .create_element("iframe")
            .map_err(|e| dom_error("frame", e))?
            .unchecked_into();
        frame
            .set_attribute("sandbox", FRAME_SANDBOX)
            .map_err(|e| dom_error("frame", e))?;
        frame.set_title("code editor");
        root.append_child(&frame)
            .map_err(|e| dom_error("frame", e))?;

        let attached = frame
            .content_window()
            .ok_or(BootstrapError::NoDocument)
            .and_then(|content_window| {
                FrameInjector::for_frame(&frame).map(|injector| (content_window, injector))
            });
        let (content_window, injector) = match attached {
            Ok(attached) => attached,
            Err(e) => {
                frame.remove();
                return Err(e);
            }
        };
        inner.adapter.attach(WindowChannel::new(
            content_window.clone(),
            own_origin(&window),
        ));
        inner.listener = Some(MessageSubscription::new(
            &window,
            &content_window,
            inbound_handler(Rc::downgrade(&self.inner)),
        ));

        inner.frame = Some(frame);
        drop(inner);

        let weak = Rc::downgrade(&self.inner);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = bootstrap(&injector, &plan).await {
                tracing::warn!(error = %e, "sandbox bootstrap failed");
                if let Some(inner) = weak.upgrade() {
                    let (event, element) = {
                        let mut inner = inner.borrow_mut();
                        (inner.adapter.fail(e.to_string()), inner.element.clone())
                    };
                    events::dispatch(&element, &event);
                }
            }
        });
        tracing::debug!("sandbox frame mounted");
        Ok(())
    }

    /// Tear down the frame. Pending writes are dropped; the state is kept
    /// and pushed again after the next [`mount`](Self::mount).
    pub fn unmount(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.adapter.detach();
        inner.listener = None;
        inner.debounce = None;
        inner.flush_scheduled = false;
        if let Some(frame) = inner.frame.take() {
            frame.remove();
            tracing::debug!("sandbox frame removed");
        }
    }

    pub fn set_value(&self, value: &str) {
        self.write(|adapter| adapter.set_value(value));
    }

    pub fn set_language(&self, language: &str) {
        self.write(|adapter| adapter.set_language(language));
    }

    pub fn set_theme(&self, theme: &str) {
        self.write(|adapter| adapter.set_theme(theme));
    }

    pub fn set_autogrow(&self, autogrow: bool) {
        self.write(|adapter| adapter.set_autogrow(autogrow));
    }

    pub fn set_min_height(&self, min_height: Option<u32>) {
        self.write(|adapter| adapter.set_min_height(min_height));
    }

    pub fn set_max_height(&self, max_height: Option<u32>) {
        self.write(|adapter| adapter.set_max_height(max_height));
    }

    /// Engine location used by the next [`mount`](Self::mount).
    pub fn set_lib_path(&self, lib_path: Option<String>) {
        self.inner.borrow_mut().config.lib_path =
            lib_path.unwrap_or_else(|| DEFAULT_LIB_PATH.to_owned());
    }

    /// Apply a parsed attribute write.
    pub fn apply(&self, change: AttributeChange) {
        match change {
            AttributeChange::Value(value) => self.set_value(&value),
            AttributeChange::Language(language) => self.set_language(&language),
            AttributeChange::Theme(theme) => self.set_theme(&theme),
            AttributeChange::Autogrow(autogrow) => self.set_autogrow(autogrow),
            AttributeChange::MaxHeight(max) => self.set_max_height(max),
            AttributeChange::MinHeight(min) => self.set_min_height(min),
            AttributeChange::LibPath(path) => self.set_lib_path(path),
        }
    }

    /// Send pending writes now instead of waiting for the debounce.
    pub fn flush(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        inner.debounce = None;
        inner.flush_scheduled = false;
        inner.adapter.flush()
    }

    fn write(&self, f: impl FnOnce(&mut HostAdapter<WindowChannel>) -> bool) {
        let mut inner = self.inner.borrow_mut();
        if !f(&mut inner.adapter) || inner.flush_scheduled {
            return;
        }
        if inner.config.debounce_ms == 0 {
            inner.adapter.flush();
            return;
        }
        inner.flush_scheduled = true;
        let weak = Rc::downgrade(&self.inner);
        // Replacing a fired timeout is harmless; one still pending is never
        // replaced because `flush_scheduled` is set.
        inner.debounce = Some(Timeout::new(inner.config.debounce_ms, move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let mut inner = inner.borrow_mut();
            inner.flush_scheduled = false;
            let sent = inner.adapter.flush();
            tracing::trace!(sent, "debounced flush");
        }));
    }
}

fn dom_error(what: &'static str, e: JsValue) -> BootstrapError {
    BootstrapError::Dom {
        what,
        reason: format!("{:?}", e),
    }
}

fn inbound_handler(weak: Weak<RefCell<HostInner>>) -> impl FnMut(String) + 'static {
    move |text| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        // Release the borrow before dispatching; listeners may write back.
        let (host_events, element) = {
            let Ok(mut inner) = inner.try_borrow_mut() else {
                tracing::warn!("host busy, sandbox message dropped");
                return;
            };
            (inner.adapter.handle_message(&text), inner.element.clone())
        };
        for event in &host_events {
            if let HostEvent::HeightChanged(px) = event {
                if let Err(e) = element.style().set_property("height", &format!("{px}px")) {
                    tracing::warn!(error = ?e, "failed to resize element");
                }
            }
            events::dispatch(&element, event);
        }
    }
}
