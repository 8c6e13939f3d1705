// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded conversation history.

use std::collections::VecDeque;

use mimic_core::types::Turn;

/// The recent turns of one conversation, oldest first.
///
/// Holds at most `capacity` turns; recording past that evicts the oldest.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: String,
    capacity: usize,
    turns: VecDeque<Turn>,
}

impl ConversationSession {
    pub fn new(id: impl Into<String>, capacity: usize) -> Self {
        Self {
            id: id.into(),
            capacity,
            turns: VecDeque::with_capacity(capacity),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the window, oldest first.
    pub fn history(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn record(&mut self, message: impl Into<String>, reply: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        while self.turns.len() >= self.capacity {
            self.turns.pop_front();
        }
        self.turns.push_back(Turn::now(message, reply));
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_turn_evicted_past_capacity() {
        let mut session = ConversationSession::new("s", 3);
        for i in 0..4 {
            session.record(format!("m{i}"), format!("r{i}"));
        }
        let history = session.history();
        assert_eq!(history.len(), 3);
        assert_eq!(
            history.iter().map(|t| t.message.as_str()).collect::<Vec<_>>(),
            vec!["m1", "m2", "m3"]
        );
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut session = ConversationSession::new("s", 0);
        session.record("a", "b");
        assert!(session.is_empty());
    }

    #[test]
    fn history_is_a_snapshot() {
        let mut session = ConversationSession::new("s", 2);
        session.record("a", "b");
        let before = session.history();
        session.record("c", "d");
        assert_eq!(before.len(), 1);
        assert_eq!(session.len(), 2);
        session.clear();
        assert!(session.is_empty());
        assert_eq!(session.id(), "s");
    }
}
