//! Browser layer for the monaco element.
//!
//! This crate implements the platform traits from `monaco-element-core`
//! with web-sys. It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `channel`: `postMessage` transport and peer-filtered message listener
//! - `inject`: script/stylesheet injection into the sandbox document
//! - `monaco`: bindings to the Monaco AMD bundle
//! - `host`: the element's frame lifecycle and debounced attribute flush
//! - `sandbox`: the controller runtime inside the frame
//! - `events`: DOM events dispatched on the element
//!
//! # Re-exports
//!
//! This crate re-exports `monaco-element-core` for convenience, so consumers
//! only need to depend on `monaco-element-browser`.

// Re-export core crate
pub use monaco_element_core;
pub use monaco_element_core::*;

pub mod channel;
pub mod events;
pub mod host;
pub mod inject;
pub mod monaco;
pub mod sandbox;

pub use channel::{MessageSubscription, WindowChannel, own_origin};
pub use host::FrameHost;
pub use inject::FrameInjector;
pub use monaco::{MonacoEditor, MonacoEngine, load_engine};
pub use sandbox::SandboxRuntime;
