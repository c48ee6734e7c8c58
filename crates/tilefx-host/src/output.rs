//! Diagnostic output log shown to the user next to the fault list.

use std::sync::Arc;

use parking_lot::Mutex;

/// Append-only log of diagnostic text. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct OutputLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, text: impl Into<String>) {
        self.entries.lock().push(text.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
