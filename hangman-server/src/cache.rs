use dashmap::DashMap;

/// Cache key for the average-attempts summary. Single fixed key; the cache
/// lives for the process lifetime and has no eviction.
pub const AVERAGE_ATTEMPTS_KEY: &str = "MOVES_REMAINING";

/// Process-wide string key-value cache for precomputed statistics.
#[derive(Debug, Default)]
pub struct AttemptsCache {
    entries: DashMap<String, String>,
}

impl AttemptsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn set(&self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}
