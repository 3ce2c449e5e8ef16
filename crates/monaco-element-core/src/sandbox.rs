//! Sandbox-side endpoint of the sync protocol.
//!
//! `SandboxController` runs inside the isolated frame. It owns the single
//! editor instance, applies inbound `*Changed` messages to it, and reports
//! user edits and auto-grow heights back to the host.

use smol_str::SmolStr;

use crate::config::ElementConfig;
use crate::error::{ChannelError, EngineError};
use crate::layout::{HeightBounds, HeightPolicy, resolve_height};
use crate::platform::{EditorEngine, EditorHandle, EditorOptions, FrameChannel};
use crate::protocol::Message;
use crate::state::EditorState;

/// Controller lifecycle.
///
/// Frame teardown is the implicit end state; `Failed` is terminal.
#[derive(Debug)]
pub enum ControllerState<H> {
    /// Entry point not run yet.
    Unloaded,
    /// Waiting for the engine's async module load.
    EngineLoading,
    /// Editor created and `ready` sent; no host state applied yet.
    EditorReady(H),
    /// Exchanging changes with the host.
    Syncing(H),
    /// Engine could not be loaded or could not create an editor.
    Failed(SmolStr),
}

impl<H> ControllerState<H> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::EngineLoading => "engine-loading",
            Self::EditorReady(_) => "editor-ready",
            Self::Syncing(_) => "syncing",
            Self::Failed(_) => "failed",
        }
    }

    pub fn editor(&self) -> Option<&H> {
        match self {
            Self::EditorReady(editor) | Self::Syncing(editor) => Some(editor),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the failure reason if in failed state.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason.as_str()),
            _ => None,
        }
    }
}

/// Sandbox-side protocol state.
pub struct SandboxController<H, C> {
    state: ControllerState<H>,
    editor_state: EditorState,
    channel: C,
    line_height: u32,
    policy: HeightPolicy,
    minimap: bool,
    /// Last height applied and reported.
    height: Option<u32>,
}

impl<H: EditorHandle, C: FrameChannel> SandboxController<H, C> {
    pub fn new(channel: C, config: &ElementConfig) -> Self {
        Self {
            state: ControllerState::Unloaded,
            editor_state: EditorState::default(),
            channel,
            line_height: config.line_height,
            policy: config.height_policy,
            minimap: config.minimap,
            height: None,
        }
    }

    pub fn state(&self) -> &ControllerState<H> {
        &self.state
    }

    pub fn editor_state(&self) -> &EditorState {
        &self.editor_state
    }

    pub fn editor(&self) -> Option<&H> {
        self.state.editor()
    }

    /// `Unloaded → EngineLoading`. Returns false if already started; the
    /// caller requests the engine module only on true.
    pub fn start(&mut self) -> bool {
        if !matches!(self.state, ControllerState::Unloaded) {
            return false;
        }
        tracing::debug!("requesting editor engine");
        self.state = ControllerState::EngineLoading;
        true
    }

    /// `EngineLoading → EditorReady`: create the editor and signal `ready`.
    pub fn engine_loaded<E>(&mut self, engine: &E) -> Result<(), EngineError>
    where
        E: EditorEngine<Editor = H>,
    {
        if !matches!(self.state, ControllerState::EngineLoading) {
            tracing::warn!(state = self.state.name(), "engine loaded in unexpected state");
            return Ok(());
        }
        let options = EditorOptions {
            initial_value: self.editor_state.value.clone(),
            language: self.editor_state.language.clone(),
            theme: self.editor_state.theme.clone(),
            minimap: self.minimap,
            scroll_beyond_last_line: false,
            automatic_layout: true,
        };
        match engine.create_editor(&options) {
            Ok(editor) => {
                self.state = ControllerState::EditorReady(editor);
                if self.editor_state.autogrow {
                    self.grow();
                }
                self.send(&Message::Ready);
                Ok(())
            }
            Err(e) => {
                self.engine_failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Enter the terminal failed state and tell the host.
    pub fn engine_failed(&mut self, reason: impl Into<SmolStr>) {
        let reason = reason.into();
        tracing::warn!(%reason, "editor engine failed");
        self.state = ControllerState::Failed(reason.clone());
        self.send(&Message::LoadFailed(reason.to_string()));
    }

    /// Handle envelope text received from the host.
    pub fn handle_message(&mut self, text: &str) {
        match Message::decode(text) {
            Ok(msg) => self.apply(msg),
            Err(e) => tracing::warn!(error = %e, "dropping message from host"),
        }
    }

    /// Apply one host message.
    ///
    /// Local state is updated before the editor is touched, so the
    /// content-change callback the engine fires for `set_value` sees no
    /// difference and does not echo the value back.
    pub fn apply(&mut self, msg: Message) {
        tracing::debug!(event = %msg.kind(), state = self.state.name(), "sandbox received");
        if self.state.is_failed() {
            tracing::debug!("controller failed, message ignored");
            return;
        }
        if !msg_is_host_state(&msg) {
            tracing::warn!(event = %msg.kind(), "unexpected event from host");
            return;
        }
        if let ControllerState::EditorReady(_) = self.state {
            self.state = match std::mem::replace(&mut self.state, ControllerState::Unloaded) {
                ControllerState::EditorReady(editor) => ControllerState::Syncing(editor),
                other => other,
            };
        }

        let Some(field) = self.editor_state.apply(&msg) else {
            return;
        };
        // Before the editor exists the local state is the buffer; creation
        // picks it up.
        let Some(editor) = self.state.editor() else {
            tracing::debug!(?field, "editor not created yet, buffered");
            return;
        };
        match msg {
            Message::ValueChanged(value) => {
                editor.set_value(&value);
                if self.editor_state.autogrow {
                    self.grow();
                }
            }
            Message::LanguageChanged(language) => editor.set_language(&language),
            Message::ThemeChanged(theme) => editor.set_theme(&theme),
            Message::AutogrowChanged(true)
            | Message::MaxHeightChanged(_)
            | Message::MinHeightChanged(_) => {
                if self.editor_state.autogrow {
                    self.grow();
                }
            }
            _ => {}
        }
    }

    /// Called by the platform layer when the user edits the editor.
    pub fn on_content_changed(&mut self) {
        let Some(editor) = self.state.editor() else {
            return;
        };
        let value = editor.get_value();
        if self.editor_state.autogrow {
            self.grow();
        }
        if value != self.editor_state.value {
            self.editor_state.value = value.clone();
            self.send(&Message::ValueChanged(value));
        }
    }

    /// Recompute the auto-grow height and report it if it changed.
    fn grow(&mut self) {
        let Some(editor) = self.state.editor() else {
            return;
        };
        let bounds = HeightBounds::new(self.editor_state.min_height, self.editor_state.max_height);
        let Some(height) = resolve_height(editor.line_count(), self.line_height, bounds, self.policy)
        else {
            tracing::debug!("content exceeds max height, frame size kept");
            return;
        };
        if self.height == Some(height) {
            return;
        }
        editor.resize(height);
        self.height = Some(height);
        self.send(&Message::HeightChanged(height));
    }

    fn send(&self, msg: &Message) {
        let result = msg
            .encode()
            .map_err(ChannelError::from)
            .and_then(|text| self.channel.post(&text));
        if let Err(e) = result {
            tracing::warn!(event = %msg.kind(), error = %e, "failed to post to host");
        }
    }
}

/// Messages the host is allowed to send.
fn msg_is_host_state(msg: &Message) -> bool {
    !matches!(
        msg,
        Message::Ready | Message::HeightChanged(_) | Message::LoadFailed(_)
    )
}
