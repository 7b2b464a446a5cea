//! Observability for cattery
//!
//! Structured JSON logging of lifecycle and table events.
//!
//! ```ignore
//! use cattery::observability::{log_event, log_event_with_fields, Event};
//!
//! log_event(Event::BootStart);
//! log_event_with_fields(Event::RecordCreated, &[("id", "3")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event at its default severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
