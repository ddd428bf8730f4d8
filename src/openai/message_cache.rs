//! Process-wide record of messages already written to Zep threads.
//!
//! A streamed reply is only stored when it has not been seen recently.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Entries kept per thread before the oldest are evicted
pub const MAX_ENTRIES_PER_THREAD: usize = 1000;
/// Same role and content within this many seconds counts as a duplicate
const DUPLICATE_WINDOW_SECS: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
struct CacheEntry {
    role: String,
    content_hash: String,
    timestamp: f64,
}

#[derive(Debug, Default)]
pub struct MessageCache {
    threads: Mutex<HashMap<String, Vec<CacheEntry>>>,
}

impl MessageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared cache used by every wrapper in this process
    pub fn global() -> &'static MessageCache {
        static CACHE: OnceLock<MessageCache> = OnceLock::new();
        CACHE.get_or_init(MessageCache::new)
    }

    /// True if the message was already recorded; otherwise records it.
    ///
    /// Blank content always counts as seen.
    pub fn is_message_seen(
        &self,
        thread_id: &str,
        role: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> bool {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return true;
        }

        let entry = CacheEntry {
            role: role.to_string(),
            content_hash: hex::encode(Sha256::digest(trimmed.as_bytes())),
            timestamp: created_at.timestamp_millis() as f64 / 1000.0,
        };

        let mut threads = self.threads.lock();
        let cached = threads.entry(thread_id.to_string()).or_default();

        let seen = cached.iter().any(|c| {
            c.role == entry.role
                && c.content_hash == entry.content_hash
                && (c.timestamp - entry.timestamp).abs() < DUPLICATE_WINDOW_SECS
        });
        if seen {
            return true;
        }

        cached.push(entry);
        if cached.len() > MAX_ENTRIES_PER_THREAD {
            cached.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
            let excess = cached.len() - MAX_ENTRIES_PER_THREAD;
            cached.drain(..excess);
        }
        false
    }

    pub fn clear_thread(&self, thread_id: &str) {
        self.threads.lock().remove(thread_id);
    }

    pub fn clear_all(&self) {
        self.threads.lock().clear();
    }

    /// Number of entries recorded for a thread
    pub fn len(&self, thread_id: &str) -> usize {
        self.threads.lock().get(thread_id).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, thread_id: &str) -> bool {
        self.len(thread_id) == 0
    }
}
