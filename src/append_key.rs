use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use uuid::Uuid;

/// Child key generated by an append to a time-series log.
///
/// Keys are opaque to readers, but their lexical order matches the order in
/// which they were generated within a process: a fixed-width hex millisecond
/// clock, a fixed-width hex sequence number for appends within the same
/// millisecond, then a short random suffix to keep keys from different
/// writers apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppendKey(String);

// (last millisecond handed out, sequence within it)
static CLOCK: Mutex<(u64, u32)> = Mutex::new((0, 0));

impl AppendKey {
    /// Generate a new key, ordered after every key generated before it.
    pub fn generate() -> Self {
        // ---
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;

        let (millis, seq) = {
            let mut clock = match CLOCK.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if now > clock.0 {
                *clock = (now, 0);
            } else {
                // same millisecond, or the wall clock stepped backwards
                clock.1 += 1;
            }
            *clock
        };

        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{millis:012x}{seq:06x}{}", &suffix[..8]))
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for AppendKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AppendKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for AppendKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_generate_unique() {
        // ---
        let id1 = AppendKey::generate();
        let id2 = AppendKey::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generated_keys_sort_in_arrival_order() {
        // ---
        let keys: Vec<AppendKey> = (0..200).map(|_| AppendKey::generate()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_format() {
        // ---
        let key = AppendKey::generate();
        assert_eq!(key.as_str().len(), 26);
    }
}
