//! Remembers the ids of the messages already handled.
//!
//! Meta delivers the same message more than once when the webhook answers
//! slowly or fails, so every message id goes through [`DedupTracker::mark_seen`]
//! before a reply is sent. Ids are kept for a retention window and the set is
//! capped, the oldest ids are evicted first.

use std::{
    collections::{HashMap, VecDeque},
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

pub struct DedupTracker {
    retention: Duration,
    capacity: usize,
    inner: Mutex<SeenIds>,
}

#[derive(Default)]
struct SeenIds {
    seen_at: HashMap<String, Instant>,
    /// Insertion order, holds the same ids as `seen_at`
    order: VecDeque<(String, Instant)>,
}

impl SeenIds {
    fn is_current(&self, id: &str, at: Instant) -> bool {
        self.seen_at.get(id).is_some_and(|seen| *seen == at)
    }

    fn purge_expired(&mut self, now: Instant, retention: Duration) {
        while let Some((id, at)) = self.order.front() {
            if now.saturating_duration_since(*at) < retention {
                break;
            }
            if self.is_current(id, *at) {
                self.seen_at.remove(id);
            }
            self.order.pop_front();
        }
    }

    fn evict_oldest(&mut self) {
        while let Some((id, at)) = self.order.pop_front() {
            if self.is_current(&id, at) {
                self.seen_at.remove(&id);
                return;
            }
        }
    }
}

impl DedupTracker {
    pub fn new(retention: Duration, capacity: usize) -> Self {
        Self {
            retention,
            capacity: capacity.max(1),
            inner: Mutex::new(SeenIds::default()),
        }
    }

    /// Records `id` as seen. Returns `true` when the id was not seen inside
    /// the retention window, i.e. when the caller should handle the message.
    pub async fn mark_seen(&self, id: &str) -> bool {
        self.mark_seen_at(id, Instant::now()).await
    }

    async fn mark_seen_at(&self, id: &str, now: Instant) -> bool {
        let mut seen = self.inner.lock().await;
        seen.purge_expired(now, self.retention);

        if seen.seen_at.contains_key(id) {
            return false;
        }

        while seen.seen_at.len() >= self.capacity {
            seen.evict_oldest();
        }

        seen.seen_at.insert(id.to_string(), now);
        seen.order.push_back((id.to_string(), now));
        true
    }

    /// Releases `id` so a redelivery of the message is handled again
    pub async fn forget(&self, id: &str) {
        let mut seen = self.inner.lock().await;
        if seen.seen_at.remove(id).is_some() {
            seen.order.retain(|(seen_id, _)| seen_id != id);
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.seen_at.len()
    }
}
