// SPDX-FileCopyrightText: 2026 Mixdown Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin-defined help shortcuts.
//!
//! A mutable trigger-to-reply mapping, editable only through the
//! admin-gated dialogue sub-flow. Lives for the process lifetime; no
//! persistence across restarts.

use std::collections::HashMap;
use std::sync::Mutex;

/// Process-wide shortcut registry, guarded by a single mutex.
#[derive(Debug, Default)]
pub struct HelpRegistry {
    entries: Mutex<HashMap<String, String>>,
}

impl HelpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent upsert of a shortcut.
    pub fn set(&self, trigger: impl Into<String>, reply: impl Into<String>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(trigger.into(), reply.into());
    }

    /// Exact-match lookup against free text. A miss is not an error.
    pub fn lookup(&self, text: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(text.trim()).cloned()
    }

    /// Number of stored shortcuts.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
