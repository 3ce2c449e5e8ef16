//! Host-side endpoint of the sync protocol.
//!
//! `HostAdapter` owns the host's copy of the editor state and the channel to
//! the sandbox frame. It is platform-agnostic: the browser layer feeds it
//! attribute writes and inbound message text, schedules [`HostAdapter::flush`]
//! after the debounce window, and turns returned [`HostEvent`]s into DOM
//! events.
//!
//! # Example
//!
//! ```ignore
//! let mut adapter = HostAdapter::new(EditorState::default());
//! adapter.attach(channel);
//! if adapter.set_value("fn main() {}") {
//!     // schedule adapter.flush() after the debounce window
//! }
//! for event in adapter.handle_message(&text) {
//!     match event {
//!         HostEvent::ValueChanged(value) => { /* dispatch value-changed */ }
//!         HostEvent::HeightChanged(px) => { /* resize the element */ }
//!         HostEvent::LoadFailed(reason) => { /* dispatch load-failed */ }
//!     }
//! }
//! ```

use std::collections::BTreeSet;

use smol_str::SmolStr;

use crate::error::ChannelError;
use crate::platform::FrameChannel;
use crate::protocol::Message;
use crate::state::{EditorState, StateField};

/// Notifications for the element's own listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// The user edited the text inside the sandbox.
    ValueChanged(String),
    /// Autogrow resized the sandbox.
    HeightChanged(u32),
    /// The sandbox could not load the engine.
    LoadFailed(String),
}

/// Host-side protocol state.
pub struct HostAdapter<C> {
    state: EditorState,
    channel: Option<C>,
    /// Sandbox has signaled `ready` on the current frame.
    ready: bool,
    /// Value the sandbox is known to hold: the last one it reported or the
    /// last one sent to it. Used for echo suppression.
    sandbox_value: Option<String>,
    /// Fields written since the last flush, in push order.
    dirty: BTreeSet<StateField>,
    height: Option<u32>,
    failure: Option<String>,
}

impl<C: FrameChannel> HostAdapter<C> {
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            channel: None,
            ready: false,
            sandbox_value: None,
            dirty: BTreeSet::new(),
            height: None,
            failure: None,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_attached(&self) -> bool {
        self.channel.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Last height reported by the sandbox.
    pub fn height(&self) -> Option<u32> {
        self.height
    }

    /// Engine load failure reported by the sandbox, if any.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Attach a new sandbox frame. Nothing is sent until it reports `ready`.
    pub fn attach(&mut self, channel: C) {
        self.channel = Some(channel);
        self.ready = false;
        self.sandbox_value = None;
        self.dirty.clear();
        self.failure = None;
    }

    /// Drop the frame channel. Subsequent sends and inbound messages are
    /// ignored until the next [`attach`](Self::attach).
    pub fn detach(&mut self) -> Option<C> {
        self.ready = false;
        self.dirty.clear();
        self.channel.take()
    }

    // === Attribute writes ===
    //
    // Each setter returns true when a flush should be scheduled.

    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        self.write(Message::ValueChanged(value.into()))
    }

    pub fn set_language(&mut self, language: impl Into<SmolStr>) -> bool {
        self.write(Message::LanguageChanged(language.into()))
    }

    pub fn set_theme(&mut self, theme: impl Into<SmolStr>) -> bool {
        self.write(Message::ThemeChanged(theme.into()))
    }

    pub fn set_autogrow(&mut self, autogrow: bool) -> bool {
        self.write(Message::AutogrowChanged(autogrow))
    }

    pub fn set_min_height(&mut self, min_height: Option<u32>) -> bool {
        self.write(Message::MinHeightChanged(min_height))
    }

    pub fn set_max_height(&mut self, max_height: Option<u32>) -> bool {
        self.write(Message::MaxHeightChanged(max_height))
    }

    fn write(&mut self, msg: Message) -> bool {
        let Some(field) = self.state.apply(&msg) else {
            return false;
        };
        // Before ready the state itself is the buffer; the ready handler
        // pushes whatever is latest.
        if !self.ready {
            return false;
        }
        self.dirty.insert(field);
        true
    }

    /// Whether writes are waiting for [`flush`](Self::flush).
    pub fn has_pending(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Send the latest value of every field written since the last flush.
    /// Returns the number of messages sent.
    pub fn flush(&mut self) -> usize {
        let dirty = std::mem::take(&mut self.dirty);
        let mut sent = 0;
        for field in dirty {
            if field == StateField::Value
                && self.sandbox_value.as_deref() == Some(self.state.value.as_str())
            {
                tracing::debug!("value matches sandbox copy, not echoing");
                continue;
            }
            if self.send(&self.state.message_for(field)) {
                if field == StateField::Value {
                    self.sandbox_value = Some(self.state.value.clone());
                }
                sent += 1;
            }
        }
        sent
    }

    /// Record that the frame cannot host an editor, whether the sandbox
    /// reported it or the host failed to bootstrap the frame.
    pub fn fail(&mut self, reason: impl Into<String>) -> HostEvent {
        let reason = reason.into();
        self.ready = false;
        self.dirty.clear();
        self.failure = Some(reason.clone());
        HostEvent::LoadFailed(reason)
    }

    // === Inbound ===

    /// Handle envelope text received from the sandbox frame.
    ///
    /// Malformed or unrecognized messages are logged and dropped.
    pub fn handle_message(&mut self, text: &str) -> Vec<HostEvent> {
        if self.channel.is_none() {
            tracing::debug!("message for detached frame ignored");
            return Vec::new();
        }
        match Message::decode(text) {
            Ok(msg) => self.handle(msg),
            Err(e) => {
                tracing::warn!(error = %e, "dropping message from sandbox");
                Vec::new()
            }
        }
    }

    fn handle(&mut self, msg: Message) -> Vec<HostEvent> {
        tracing::debug!(event = %msg.kind(), "host received");
        match msg {
            Message::Ready => {
                self.ready = true;
                self.sandbox_value = None;
                self.dirty.clear();
                self.push_state();
                Vec::new()
            }
            Message::ValueChanged(value) => {
                self.sandbox_value = Some(value.clone());
                // The sandbox copy is newer than any unsent host write.
                self.dirty.remove(&StateField::Value);
                if value == self.state.value {
                    return Vec::new();
                }
                self.state.value = value.clone();
                vec![HostEvent::ValueChanged(value)]
            }
            Message::HeightChanged(px) => {
                if self.height == Some(px) {
                    return Vec::new();
                }
                self.height = Some(px);
                vec![HostEvent::HeightChanged(px)]
            }
            Message::LoadFailed(reason) => {
                tracing::warn!(%reason, "sandbox failed to load the editor engine");
                vec![self.fail(reason)]
            }
            other => {
                tracing::warn!(event = %other.kind(), "unexpected event from sandbox");
                Vec::new()
            }
        }
    }

    /// Push the full state in fixed order.
    fn push_state(&mut self) {
        for msg in self.state.sync_messages() {
            if self.send(&msg) {
                if let Message::ValueChanged(value) = msg {
                    self.sandbox_value = Some(value);
                }
            }
        }
    }

    /// Send one message. A missing channel is a silent no-op.
    fn send(&self, msg: &Message) -> bool {
        let Some(channel) = &self.channel else {
            tracing::debug!(event = %msg.kind(), "no frame, send skipped");
            return false;
        };
        let result = msg
            .encode()
            .map_err(ChannelError::from)
            .and_then(|text| channel.post(&text));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(event = %msg.kind(), error = %e, "failed to post to sandbox");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_capture;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Channel that records decoded messages.
    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Message>>>);

    impl Recorder {
        fn take(&self) -> Vec<Message> {
            std::mem::take(&mut *self.0.borrow_mut())
        }
    }

    impl FrameChannel for Recorder {
        fn post(&self, text: &str) -> Result<(), ChannelError> {
            self.0.borrow_mut().push(Message::decode(text).unwrap());
            Ok(())
        }
    }

    fn encoded(msg: Message) -> String {
        msg.encode().unwrap()
    }

    fn ready_adapter(state: EditorState) -> (HostAdapter<Recorder>, Recorder) {
        let recorder = Recorder::default();
        let mut adapter = HostAdapter::new(state);
        adapter.attach(recorder.clone());
        adapter.handle_message(&encoded(Message::Ready));
        recorder.take();
        (adapter, recorder)
    }

    #[test]
    fn test_writes_before_attach_are_noops() {
        let mut adapter: HostAdapter<Recorder> = HostAdapter::new(EditorState::default());
        assert!(!adapter.set_value("x"));
        assert_eq!(adapter.flush(), 0);
        assert_eq!(adapter.state().value, "x");
    }

    #[test]
    fn test_ready_pushes_full_state_in_order() {
        let recorder = Recorder::default();
        let mut adapter = HostAdapter::new(EditorState::default());
        adapter.attach(recorder.clone());
        adapter.set_autogrow(true);
        adapter.set_max_height(Some(300));
        assert!(recorder.take().is_empty());

        adapter.handle_message(&encoded(Message::Ready));
        assert_eq!(
            recorder.take(),
            vec![
                Message::ValueChanged(String::new()),
                Message::LanguageChanged("javascript".into()),
                Message::ThemeChanged("vs-dark".into()),
                Message::AutogrowChanged(true),
                Message::MinHeightChanged(None),
                Message::MaxHeightChanged(Some(300)),
            ]
        );
    }

    #[test]
    fn test_buffered_writes_collapse_to_latest() {
        let recorder = Recorder::default();
        let mut adapter = HostAdapter::new(EditorState {
            value: "a".into(),
            language: "python".into(),
            theme: "vs-dark".into(),
            ..Default::default()
        });
        adapter.attach(recorder.clone());
        adapter.set_value("b");

        adapter.handle_message(&encoded(Message::Ready));
        let sent = recorder.take();
        let values: Vec<_> = sent
            .iter()
            .filter(|m| matches!(m, Message::ValueChanged(_)))
            .collect();
        assert_eq!(values, [&Message::ValueChanged("b".into())]);
        assert_eq!(sent[1], Message::LanguageChanged("python".into()));
    }

    #[test]
    fn test_flush_sends_dirty_fields_once() {
        let (mut adapter, recorder) = ready_adapter(EditorState::default());
        assert!(adapter.set_theme("vs"));
        assert!(adapter.set_value("one"));
        assert!(adapter.set_value("two"));
        assert!(adapter.has_pending());

        assert_eq!(adapter.flush(), 2);
        assert_eq!(
            recorder.take(),
            vec![
                Message::ValueChanged("two".into()),
                Message::ThemeChanged("vs".into()),
            ]
        );
        assert!(!adapter.has_pending());
        assert_eq!(adapter.flush(), 0);
    }

    #[test]
    fn test_unchanged_write_does_not_schedule() {
        let (mut adapter, _recorder) = ready_adapter(EditorState::default());
        assert!(!adapter.set_language("javascript"));
    }

    #[test]
    fn test_sandbox_edit_notifies_once_without_echo() {
        let (mut adapter, recorder) = ready_adapter(EditorState::default());

        let events = adapter.handle_message(&encoded(Message::ValueChanged("typed".into())));
        assert_eq!(events, vec![HostEvent::ValueChanged("typed".into())]);
        assert_eq!(adapter.state().value, "typed");

        // A duplicate report is not a new change.
        let events = adapter.handle_message(&encoded(Message::ValueChanged("typed".into())));
        assert!(events.is_empty());

        // The host framework reflecting the property back is not sent.
        assert!(!adapter.set_value("typed"));
        assert_eq!(adapter.flush(), 0);
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_host_write_back_to_received_value_is_suppressed() {
        let (mut adapter, recorder) = ready_adapter(EditorState::default());
        adapter.handle_message(&encoded(Message::ValueChanged("typed".into())));

        adapter.set_value("host");
        adapter.set_value("typed");
        assert_eq!(adapter.flush(), 0);
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_host_value_sent_after_edit_replaces_echo_baseline() {
        let (mut adapter, recorder) = ready_adapter(EditorState::default());
        adapter.handle_message(&encoded(Message::ValueChanged("typed".into())));

        adapter.set_value("host");
        assert_eq!(adapter.flush(), 1);
        // The sandbox now holds "host", so going back is a real change.
        adapter.set_value("typed");
        assert_eq!(adapter.flush(), 1);
        assert_eq!(
            recorder.take(),
            vec![
                Message::ValueChanged("host".into()),
                Message::ValueChanged("typed".into()),
            ]
        );
        // Writing what was just sent is still an echo.
        assert!(!adapter.set_value("typed"));
    }

    #[test]
    fn test_ready_push_sets_echo_baseline() {
        let (mut adapter, recorder) = ready_adapter(EditorState {
            value: "initial".into(),
            ..Default::default()
        });
        adapter.set_value("other");
        adapter.set_value("initial");
        assert_eq!(adapter.flush(), 0);
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_sandbox_value_overrides_pending_write() {
        let (mut adapter, recorder) = ready_adapter(EditorState::default());
        adapter.set_value("host");
        adapter.handle_message(&encoded(Message::ValueChanged("typed".into())));
        assert_eq!(adapter.flush(), 0);
        assert!(recorder.take().is_empty());
        assert_eq!(adapter.state().value, "typed");
    }

    #[test]
    fn test_height_changes_are_deduplicated() {
        let (mut adapter, _recorder) = ready_adapter(EditorState::default());
        assert_eq!(
            adapter.handle_message(&encoded(Message::HeightChanged(190))),
            vec![HostEvent::HeightChanged(190)]
        );
        assert!(adapter.handle_message(&encoded(Message::HeightChanged(190))).is_empty());
        assert_eq!(adapter.height(), Some(190));
    }

    #[test]
    fn test_load_failure_is_surfaced() {
        let (mut adapter, _recorder) = ready_adapter(EditorState::default());
        let events = adapter.handle_message(&encoded(Message::LoadFailed("timeout".into())));
        assert_eq!(events, vec![HostEvent::LoadFailed("timeout".into())]);
        assert_eq!(adapter.failure(), Some("timeout"));
        assert!(!adapter.is_ready());
    }

    #[test]
    fn test_local_failure_matches_reported_failure() {
        let (mut adapter, recorder) = ready_adapter(EditorState::default());
        adapter.set_theme("vs");
        let event = adapter.fail("failed to load script /missing/vs/loader.js");
        assert_eq!(
            event,
            HostEvent::LoadFailed("failed to load script /missing/vs/loader.js".into())
        );
        assert_eq!(adapter.failure(), Some("failed to load script /missing/vs/loader.js"));
        assert!(!adapter.is_ready());
        assert!(!adapter.has_pending());
        assert_eq!(adapter.flush(), 0);
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_unknown_event_is_logged_and_ignored() {
        let (mut adapter, recorder) = ready_adapter(EditorState::default());
        let before = adapter.state().clone();

        let (events, logs) = log_capture::capture(|| {
            adapter.handle_message(r#"{"event":"sizeChanged","payload":12}"#)
        });

        assert!(events.is_empty());
        assert_eq!(adapter.state(), &before);
        assert!(recorder.take().is_empty());
        assert!(
            logs.iter()
                .any(|line| line.starts_with("[WARN]") && line.contains("sizeChanged")),
            "no warning in {logs:?}"
        );
    }

    #[test]
    fn test_malformed_message_is_logged() {
        let (mut adapter, _recorder) = ready_adapter(EditorState::default());
        let (events, logs) = log_capture::capture(|| adapter.handle_message("{oops"));
        assert!(events.is_empty());
        assert!(logs.iter().any(|line| line.starts_with("[WARN]")));
    }

    #[test]
    fn test_detached_adapter_ignores_inbound() {
        let (mut adapter, recorder) = ready_adapter(EditorState::default());
        assert!(adapter.detach().is_some());

        let events = adapter.handle_message(&encoded(Message::ValueChanged("late".into())));
        assert!(events.is_empty());
        assert_eq!(adapter.state().value, "");

        assert!(!adapter.set_value("after"));
        assert_eq!(adapter.flush(), 0);
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_reattach_waits_for_new_ready() {
        let (mut adapter, _old) = ready_adapter(EditorState::default());
        adapter.detach();

        let recorder = Recorder::default();
        adapter.attach(recorder.clone());
        assert!(!adapter.set_value("x"));
        assert!(recorder.take().is_empty());

        adapter.handle_message(&encoded(Message::Ready));
        assert_eq!(recorder.take()[0], Message::ValueChanged("x".into()));
    }
}
