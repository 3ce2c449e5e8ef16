//! Log capture for asserting on diagnostics in tests.
//!
//! Provides a tracing Layer that records formatted events to a thread-local
//! buffer while a closure runs under a scoped subscriber.

use std::cell::RefCell;
use std::fmt::Write as FmtWrite;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

thread_local! {
    static LOG_BUFFER: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// A tracing Layer that captures log messages to the thread-local buffer.
pub struct LogCaptureLayer;

impl<S: Subscriber> Layer<S> for LogCaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut message = String::new();
        let mut visitor = MessageVisitor(&mut message);
        event.record(&mut visitor);

        let formatted = format!(
            "[{}] {}: {}",
            level_str(metadata.level()),
            metadata.target(),
            message
        );
        LOG_BUFFER.with(|buf| buf.borrow_mut().push(formatted));
    }
}

/// Visitor that extracts the message and fields from a tracing event.
struct MessageVisitor<'a>(&'a mut String);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if !self.0.is_empty() {
            self.0.push_str(", ");
        }
        if field.name() == "message" {
            let _ = write!(self.0, "{:?}", value);
        } else {
            let _ = write!(self.0, "{}={:?}", field.name(), value);
        }
    }
}

fn level_str(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

/// Run `f` with a capturing subscriber; return its result and the log lines
/// it emitted.
pub fn capture<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    LOG_BUFFER.with(|buf| buf.borrow_mut().clear());
    let subscriber = tracing_subscriber::registry().with(LogCaptureLayer);
    let out = tracing::subscriber::with_default(subscriber, f);
    let logs = LOG_BUFFER.with(|buf| std::mem::take(&mut *buf.borrow_mut()));
    (out, logs)
}
