use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Entries expire `ttl` after insertion. Expired entries are dropped on read.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<String, (Instant, V)>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&mut self, key: &str, now: Instant) -> Option<V> {
        let fresh = match self.entries.get(key) {
            Some((at, _)) => now.saturating_duration_since(*at) < self.ttl,
            None => return None,
        };
        if fresh {
            self.entries.get(key).map(|(_, v)| v.clone())
        } else {
            self.entries.remove(key);
            None
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.entries.insert(key.into(), (Instant::now(), value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_expire_after_ttl() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("k", 1);
        let inserted = Instant::now();
        assert_eq!(cache.get_at("k", inserted), Some(1));
        assert_eq!(cache.get_at("k", inserted + Duration::from_secs(120)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_never_hits() {
        let mut cache = TtlCache::new(Duration::ZERO);
        cache.insert("k", "v");
        assert_eq!(cache.get("k"), None);
    }
}
