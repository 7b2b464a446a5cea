//! Observable events
//!
//! Every log line names exactly one of these. Names are stable
//! SCREAMING_SNAKE_CASE strings so log consumers can match on them.

use std::fmt;

use super::logger::Severity;

/// Observable events in cattery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Process startup begins
    BootStart,
    /// Configuration resolved
    ConfigLoaded,
    /// Startup aborted (FATAL)
    StartupFailed,
    /// Listening for requests
    Serving,
    /// Graceful shutdown requested
    ShutdownStart,
    /// Server stopped
    ShutdownComplete,

    // Table
    /// Table scanned and id counter seeded
    TableOpened,
    /// Empty table file created by `init`
    TableInitialized,
    /// Row appended
    RecordCreated,
    /// Row replaced and table rewritten
    RecordReplaced,
    /// Row removed and table rewritten
    RecordDeleted,

    // Requests
    /// A request ended in a server-side error
    RequestFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "CATTERY_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StartupFailed => "CATTERY_STARTUP_FAILED",
            Event::Serving => "CATTERY_SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::TableOpened => "TABLE_OPENED",
            Event::TableInitialized => "TABLE_INITIALIZED",
            Event::RecordCreated => "RECORD_CREATED",
            Event::RecordReplaced => "RECORD_REPLACED",
            Event::RecordDeleted => "RECORD_DELETED",

            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StartupFailed)
    }

    /// Default severity for the event
    pub fn severity(&self) -> Severity {
        match self {
            Event::StartupFailed => Severity::Fatal,
            Event::RequestFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
