//! Error types for the sync protocol and its endpoints.

use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

/// Errors decoding or encoding a cross-frame envelope.
///
/// None of these are fatal: endpoints log them and drop the message.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ProtocolError {
    /// The text was not a JSON `{event, payload}` object.
    #[error("malformed envelope: {0}")]
    #[diagnostic(code(monaco_element::protocol::malformed))]
    Malformed(#[source] serde_json::Error),

    /// The `event` field named no known event kind.
    #[error("unrecognized event kind {0:?}")]
    #[diagnostic(
        code(monaco_element::protocol::unknown_event),
        help("host and sandbox must be built from the same protocol version")
    )]
    UnknownEvent(SmolStr),

    /// The payload did not have the type the event kind requires.
    #[error("invalid payload for {event}: expected {expected}")]
    #[diagnostic(code(monaco_element::protocol::payload))]
    InvalidPayload {
        event: &'static str,
        expected: &'static str,
    },

    /// Serializing an outbound envelope failed.
    #[error("failed to encode envelope: {0}")]
    #[diagnostic(code(monaco_element::protocol::encode))]
    Encode(#[source] serde_json::Error),
}

/// Errors sending over a frame channel.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ChannelError {
    /// The peer window is gone (frame not created yet, or torn down).
    #[error("frame is detached")]
    Detached,

    /// The platform refused to post the message.
    #[error("postMessage failed: {0}")]
    Post(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Errors from the wrapped editing engine.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum EngineError {
    /// The engine's modules could not be loaded.
    #[error("engine failed to load: {0}")]
    #[diagnostic(code(monaco_element::engine::load))]
    Load(String),

    /// The engine loaded but refused to create an editor.
    #[error("failed to create editor: {0}")]
    #[diagnostic(code(monaco_element::engine::create))]
    Create(String),

    /// No container element to mount the editor into.
    #[error("editor container #{0} not found")]
    MissingContainer(SmolStr),
}

/// Errors preparing the sandbox document.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum BootstrapError {
    /// The frame has no reachable document.
    #[error("sandbox document is not available")]
    #[diagnostic(help("the frame must be attached to the page before bootstrapping"))]
    NoDocument,

    /// Creating or inserting an element failed.
    #[error("failed to inject {what}: {reason}")]
    Dom { what: &'static str, reason: String },

    /// A script resource failed to load.
    #[error("failed to load script {src}")]
    #[diagnostic(
        code(monaco_element::bootstrap::script),
        help("check that libPath points at the engine's `vs` directory")
    )]
    ScriptLoad { src: String },
}

/// Invalid configuration or attribute values.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    /// An attribute value that could not be parsed.
    #[error("invalid value {value:?} for attribute {attribute}")]
    InvalidAttribute { attribute: &'static str, value: String },

    #[error("invalid configuration object: {0}")]
    Deserialize(String),
}
