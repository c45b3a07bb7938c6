//! TTL cache with single-flight generation (SPEC_FULL §4.8/§5).
//!
//! Grounded on `original_source/fleet_command_center.py`'s in-process
//! dashboard cache, generalized to a keyed cache shared by `/dashboard` and
//! `/actions` (30 s and 15 s TTLs respectively). Two concurrent misses for
//! the same key share one in-flight generation rather than computing twice.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

struct Entry<T> {
    value: T,
    stored_at: DateTime<Utc>,
}

enum Slot<T> {
    Generating(Arc<Notify>),
    Ready(Entry<T>),
}

/// A keyed TTL cache where concurrent misses for the same key collapse into
/// one call to the supplied generator.
pub struct TtlCache<K, T> {
    ttl: Duration,
    slots: Mutex<HashMap<K, Slot<T>>>,
}

impl<K, T> TtlCache<K, T>
where
    K: std::hash::Hash + Eq + Clone,
    T: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slots: Mutex::new(HashMap::new()) }
    }

    /// Fetch `key`, regenerating via `generate` on a miss or expiry. Returns
    /// `(value, was_cached)`. `bypass` forces regeneration regardless of TTL.
    pub async fn get_or_generate<F, Fut>(&self, key: K, bypass: bool, generate: F) -> (T, bool)
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        loop {
            let notify = {
                let mut slots = self.slots.lock().await;
                match slots.get(&key) {
                    Some(Slot::Ready(entry)) if !bypass => {
                        let age = Utc::now().signed_duration_since(entry.stored_at);
                        if age.num_milliseconds() >= 0 && (age.to_std().unwrap_or(Duration::MAX) < self.ttl) {
                            return (entry.value.clone(), true);
                        }
                        let notify = Arc::new(Notify::new());
                        slots.insert(key.clone(), Slot::Generating(notify.clone()));
                        None
                    }
                    Some(Slot::Generating(notify)) => Some(notify.clone()),
                    _ => {
                        let notify = Arc::new(Notify::new());
                        slots.insert(key.clone(), Slot::Generating(notify.clone()));
                        None
                    }
                }
            };

            if let Some(notify) = notify {
                notify.notified().await;
                continue;
            }

            let value = generate().await;
            let mut slots = self.slots.lock().await;
            if let Some(Slot::Generating(notify)) = slots.insert(key.clone(), Slot::Ready(Entry { value: value.clone(), stored_at: Utc::now() })) {
                notify.notify_waiters();
            }
            return (value, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn second_call_within_ttl_is_cached() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(30));
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let (v1, cached1) = cache.get_or_generate("dashboard", false, || async move {
            c.fetch_add(1, Ordering::SeqCst);
            42
        }).await;
        let c = calls.clone();
        let (v2, cached2) = cache.get_or_generate("dashboard", false, || async move {
            c.fetch_add(1, Ordering::SeqCst);
            43
        }).await;
        assert_eq!(v1, 42);
        assert_eq!(v2, 42);
        assert!(!cached1);
        assert!(cached2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bypass_forces_regeneration() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(30));
        cache.get_or_generate("dashboard", false, || async { 1 }).await;
        let (v, cached) = cache.get_or_generate("dashboard", true, || async { 2 }).await;
        assert_eq!(v, 2);
        assert!(!cached);
    }
}
