//! Fault records and the recorder that collects them for the UI.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

/// How an untrusted call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CauseKind {
    /// The module returned an error.
    Error,
    /// The module panicked; the panic was caught at the host boundary.
    Panic,
}

impl fmt::Display for CauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CauseKind::Error => write!(f, "error"),
            CauseKind::Panic => write!(f, "panic"),
        }
    }
}

/// A failure captured from a module call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FaultCause {
    pub kind: CauseKind,
    pub message: String,
}

impl FaultCause {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: CauseKind::Error,
            message: message.into(),
        }
    }

    pub fn panic(message: impl Into<String>) -> Self {
        Self {
            kind: CauseKind::Panic,
            message: message.into(),
        }
    }
}

/// Which module call produced a fault.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FaultOrigin {
    /// Setup call made from `prepare`.
    Configure,
    /// Tile rendering over the given subrange of the region list.
    Render { regions: Range<usize> },
}

impl fmt::Display for FaultOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultOrigin::Configure => write!(f, "configure"),
            FaultOrigin::Render { regions } => {
                write!(f, "render_tile[{}..{}]", regions.start, regions.end)
            }
        }
    }
}

/// An immutable record of one contained fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{origin} failed with {cause}")]
pub struct FaultRecord {
    pub origin: FaultOrigin,
    pub cause: FaultCause,
}

impl FaultRecord {
    pub fn configure(cause: FaultCause) -> Self {
        Self {
            origin: FaultOrigin::Configure,
            cause,
        }
    }

    pub fn render(regions: Range<usize>, cause: FaultCause) -> Self {
        Self {
            origin: FaultOrigin::Render { regions },
            cause,
        }
    }

    pub fn is_configure(&self) -> bool {
        matches!(self.origin, FaultOrigin::Configure)
    }

    pub fn is_render(&self) -> bool {
        matches!(self.origin, FaultOrigin::Render { .. })
    }
}

/// Append-only fault log shared between the host and the UI.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct FaultRecorder {
    records: Arc<Mutex<Vec<FaultRecord>>>,
}

impl FaultRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn record(&self, record: FaultRecord) {
        self.records.lock().push(record);
    }

    /// Snapshot of all records in the order they were appended.
    pub fn records(&self) -> Vec<FaultRecord> {
        self.records.lock().clone()
    }

    pub fn last(&self) -> Option<FaultRecord> {
        self.records.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
