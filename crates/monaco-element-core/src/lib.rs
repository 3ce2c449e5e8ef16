//! monaco-element-core: the cross-frame sync protocol without browser
//! dependencies.
//!
//! This crate provides:
//! - `Message` / `EventKind` - the envelope vocabulary and its JSON codec
//! - `EditorState` - the state each endpoint mirrors
//! - `HostAdapter` - host-side endpoint (handshake, buffering, echo suppression)
//! - `SandboxController` - sandbox-side endpoint, an explicit state machine
//!   around the wrapped editor
//! - `bootstrap` - the two-phase loader/controller injection sequence
//! - Platform traits implemented by `monaco-element-browser`

pub mod attributes;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod host;
pub mod layout;
pub mod platform;
pub mod protocol;
pub mod sandbox;
pub mod state;

#[cfg(test)]
mod log_capture;

pub use attributes::{AttributeChange, OBSERVED_ATTRIBUTES, parse_attribute};
pub use bootstrap::{BootstrapPlan, CONTAINER_ID, SANDBOX_STYLESHEET, ScriptSource, bootstrap};
pub use config::ElementConfig;
pub use error::{BootstrapError, ChannelError, ConfigError, EngineError, ProtocolError};
pub use host::{HostAdapter, HostEvent};
pub use layout::{HeightBounds, HeightPolicy, LINE_HEIGHT, bound_from_px, resolve_height};
pub use platform::{DocumentInjector, EditorEngine, EditorHandle, EditorOptions, FrameChannel};
pub use protocol::{Envelope, EventKind, Message};
pub use sandbox::{ControllerState, SandboxController};
pub use smol_str::SmolStr;
pub use state::{EditorState, StateField};
