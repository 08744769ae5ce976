// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded recency list used to suppress reprocessing of already-seen
//! identifiers (processed event ids, rooms that received a welcome message).

/// Maximum number of identifiers retained per list.
pub const MAX_TRACKED: usize = 1000;

/// Newest-first list of recently seen identifiers.
///
/// New entries go to the head; `trim` drops the oldest tail once the list
/// exceeds [`MAX_TRACKED`]. Callers trim before consulting the list.
#[derive(Debug, Default)]
pub struct DedupList {
    entries: Vec<String>,
}

impl DedupList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the oldest tail so at most [`MAX_TRACKED`] entries remain.
    pub fn trim(&mut self) {
        self.entries.truncate(MAX_TRACKED);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e == id)
    }

    /// Record an identifier at the head of the list.
    pub fn record(&mut self, id: impl Into<String>) {
        self.entries.insert(0, id.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
