// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concurrent map of web chat sessions with least-recently-used eviction.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::session::ConversationSession;

/// Client-supplied ids longer than this are replaced with a fresh one.
const MAX_SESSION_ID_LEN: usize = 128;

/// A session shared between requests. The mutex gives each session a
/// single writer at a time.
pub type SharedSession = Arc<Mutex<ConversationSession>>;

struct Entry {
    session: SharedSession,
    last_used: AtomicU64,
}

/// Session store for the web front end.
pub struct SessionRegistry {
    sessions: DashMap<String, Entry>,
    history_capacity: usize,
    max_sessions: usize,
    clock: AtomicU64,
}

impl SessionRegistry {
    pub fn new(history_capacity: usize, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            history_capacity,
            max_sessions: max_sessions.max(1),
            clock: AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the session for `id`, creating it if unknown. `None` or an
    /// unusable id gets a fresh random id.
    pub fn get_or_create(&self, id: Option<&str>) -> (String, SharedSession) {
        let id = match id.map(str::trim) {
            Some(id) if !id.is_empty() && id.len() <= MAX_SESSION_ID_LEN => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };

        if let Some(entry) = self.sessions.get(&id) {
            entry.last_used.store(self.tick(), Ordering::Relaxed);
            return (id, entry.session.clone());
        }

        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|e| e.value().last_used.load(Ordering::Relaxed))
                .map(|e| e.key().clone());
            match oldest {
                Some(key) => {
                    self.sessions.remove(&key);
                    debug!(session_id = %key, "evicted least recently used session");
                }
                None => break,
            }
        }

        let session = self
            .sessions
            .entry(id.clone())
            .or_insert_with(|| Entry {
                session: Arc::new(Mutex::new(ConversationSession::new(
                    id.clone(),
                    self.history_capacity,
                ))),
                last_used: AtomicU64::new(0),
            });
        session.last_used.store(self.tick(), Ordering::Relaxed);
        let shared = session.session.clone();
        (id, shared)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }
}
