//! Platform abstraction traits.
//!
//! These traits define the interface between the sync logic and the
//! platform: the browser `postMessage` channel, the wrapped editing engine,
//! and the frame document the engine is bootstrapped into. The browser crate
//! implements them with web-sys; tests implement them with plain structs.

use std::future::Future;

use smol_str::SmolStr;

use crate::bootstrap::ScriptSource;
use crate::error::{BootstrapError, ChannelError, EngineError};

/// One direction of the cross-frame channel.
pub trait FrameChannel {
    /// Post already-encoded envelope text to the peer.
    fn post(&self, text: &str) -> Result<(), ChannelError>;
}

/// Options for creating the single editor instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorOptions {
    pub initial_value: String,
    pub language: SmolStr,
    pub theme: SmolStr,
    pub minimap: bool,
    pub scroll_beyond_last_line: bool,
    pub automatic_layout: bool,
}

/// The third-party engine, once its modules are loaded.
pub trait EditorEngine {
    type Editor: EditorHandle;

    /// Create an editor bound to the sandbox container.
    fn create_editor(&self, options: &EditorOptions) -> Result<Self::Editor, EngineError>;
}

/// A live editor instance.
///
/// Content-change notification is wired by the platform layer, which calls
/// [`SandboxController::on_content_changed`](crate::SandboxController::on_content_changed).
pub trait EditorHandle {
    fn get_value(&self) -> String;

    /// Replace the whole document. May synchronously fire the engine's
    /// content-change callback.
    fn set_value(&self, value: &str);

    fn set_language(&self, language: &str);

    fn set_theme(&self, theme: &str);

    fn line_count(&self) -> u32;

    fn relayout(&self);

    /// Resize the editor container to `height` pixels and relayout.
    fn resize(&self, height: u32);
}

/// Mutation access to the sandbox document.
pub trait DocumentInjector {
    /// Create the root element the editor mounts into.
    fn create_container(&self, id: &str) -> Result<(), BootstrapError>;

    fn inject_stylesheet(&self, rules: &str) -> Result<(), BootstrapError>;

    /// Insert a script and resolve once it has run (or failed to load).
    fn inject_script(
        &self,
        source: &ScriptSource,
    ) -> impl Future<Output = Result<(), BootstrapError>>;
}
