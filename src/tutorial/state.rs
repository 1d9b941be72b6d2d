//! Per-session trigger state
//!
//! Trigger flags live in an injected key-value store rather than ambient
//! globals. Every key defaults to off; the store lives for one session and is
//! discarded at session end.

use std::collections::HashMap;

/// Key-value store for per-step trigger flags.
pub trait TriggerStore {
    /// Current state of a trigger; unknown keys are off.
    fn get(&self, key: &str) -> bool;

    /// Set a trigger's state.
    fn set(&mut self, key: &str, on: bool);
}

/// In-memory trigger store scoped to one session.
#[derive(Debug, Default)]
pub struct SessionState {
    flags: HashMap<String, bool>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a trigger and return its new state.
    pub fn toggle(&mut self, key: &str) -> bool {
        let next = !self.get(key);
        self.set(key, next);
        next
    }
}

impl TriggerStore for SessionState {
    fn get(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    fn set(&mut self, key: &str, on: bool) {
        self.flags.insert(key.to_string(), on);
    }
}
