//! The controller's runtime inside the sandbox frame.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use monaco_element_core::{
    CONTAINER_ID, ChannelError, ElementConfig, EngineError, SandboxController,
};

use crate::channel::{MessageSubscription, WindowChannel, own_origin};
use crate::monaco::{ContentSubscription, MonacoEditor, MonacoEngine, load_engine};

type Controller = SandboxController<MonacoEditor, WindowChannel>;

struct SandboxInner {
    controller: Controller,
    _messages: Option<MessageSubscription>,
    _content: Option<ContentSubscription>,
}

/// Owns the sandbox controller and the listeners feeding it.
///
/// Keep it alive for the lifetime of the frame; dropping it unregisters
/// every listener.
pub struct SandboxRuntime {
    inner: Rc<RefCell<SandboxInner>>,
}

impl SandboxRuntime {
    /// Connect to the parent window and start loading the engine.
    pub fn start(config: ElementConfig) -> Result<Self, ChannelError> {
        let window = web_sys::window().ok_or(ChannelError::Detached)?;
        let parent = window
            .parent()
            .ok()
            .flatten()
            .ok_or(ChannelError::Detached)?;

        let channel = WindowChannel::new(parent.clone(), own_origin(&window));
        let mut controller = Controller::new(channel, &config);
        let started = controller.start();

        let inner = Rc::new(RefCell::new(SandboxInner {
            controller,
            _messages: None,
            _content: None,
        }));

        let weak = Rc::downgrade(&inner);
        let subscription = MessageSubscription::new(&window, &parent, move |text| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            match inner.try_borrow_mut() {
                Ok(mut inner) => inner.controller.handle_message(&text),
                Err(_) => tracing::warn!("controller busy, host message dropped"),
            };
        });
        inner.borrow_mut()._messages = Some(subscription);

        if started {
            let weak = Rc::downgrade(&inner);
            let vs_path = config.vs_path().to_owned();
            wasm_bindgen_futures::spawn_local(async move {
                let loaded = load_engine(&window, &vs_path).await;
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let engine = loaded.and_then(|()| {
                    let document = window
                        .document()
                        .ok_or_else(|| EngineError::Load("no document".into()))?;
                    MonacoEngine::new(&document, CONTAINER_ID)
                });
                match engine {
                    Ok(engine) => create_editor(&inner, &engine),
                    Err(e) => inner.borrow_mut().controller.engine_failed(e.to_string()),
                }
            });
        }

        Ok(Self { inner })
    }

    /// Name of the controller's current state.
    pub fn state_name(&self) -> &'static str {
        self.inner.borrow().controller.state().name()
    }
}

fn create_editor(inner: &Rc<RefCell<SandboxInner>>, engine: &MonacoEngine) {
    let mut guard = inner.borrow_mut();
    if guard.controller.engine_loaded(engine).is_err() {
        return;
    }
    let Some(editor) = guard.controller.editor() else {
        return;
    };
    let subscription = editor.on_content_changed(content_listener(Rc::downgrade(inner)));
    guard._content = Some(subscription);
}

/// Monaco fires content changes synchronously from `setValue`, while the
/// controller is already borrowed to apply a host message. Those are
/// skipped; the controller updated its state before touching the editor.
fn content_listener(weak: Weak<RefCell<SandboxInner>>) -> impl FnMut() + 'static {
    move || {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if let Ok(mut inner) = inner.try_borrow_mut() {
            inner.controller.on_content_changed();
        }
    }
}
