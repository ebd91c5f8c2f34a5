use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::Config;

/// Live view of a registered integer item. Reads always see the value from
/// the most recent `ConfTable::apply`.
#[derive(Debug, Clone)]
pub struct UintHandle(Arc<AtomicU32>);

impl UintHandle {
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

struct UintItem {
    min: u32,
    max: u32,
    default: u32,
    value: Arc<AtomicU32>,
}

/// Integer configuration items registered by modules, keyed by
/// `(block, key)`, e.g. `("operserv", "safe_connections")`.
pub struct ConfTable {
    items: Mutex<HashMap<(String, String), UintItem>>,
}

impl ConfTable {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
        }
    }

    /// Register a bounded item. It holds `default` until the next `apply`.
    pub fn add_uint(&self, block: &str, key: &str, min: u32, max: u32, default: u32) -> UintHandle {
        let value = Arc::new(AtomicU32::new(default));
        let item = UintItem {
            min,
            max,
            default,
            value: Arc::clone(&value),
        };
        let mut items = self.items.lock().unwrap();
        if items
            .insert((block.to_string(), key.to_string()), item)
            .is_some()
        {
            log::warn!("Conf item {}::{} registered twice, replacing", block, key);
        }
        log::debug!("Registered conf item {}::{} [{}..={}] default {}", block, key, min, max, default);
        UintHandle(value)
    }

    pub fn remove(&self, block: &str, key: &str) -> bool {
        let removed = self
            .items
            .lock()
            .unwrap()
            .remove(&(block.to_string(), key.to_string()))
            .is_some();
        if removed {
            log::debug!("Unregistered conf item {}::{}", block, key);
        }
        removed
    }

    #[allow(dead_code)]
    pub fn get(&self, block: &str, key: &str) -> Option<u32> {
        self.items
            .lock()
            .unwrap()
            .get(&(block.to_string(), key.to_string()))
            .map(|item| item.value.load(Ordering::Relaxed))
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    /// Load every registered item from `config`. Missing, mistyped or
    /// out-of-range values leave the item at its default.
    pub fn apply(&self, config: &Config) {
        let items = self.items.lock().unwrap();
        for ((block, key), item) in items.iter() {
            let value = match config.block_value(block, key) {
                None => item.default,
                Some(raw) => match raw.as_integer() {
                    Some(v) if v >= i64::from(item.min) && v <= i64::from(item.max) => v as u32,
                    Some(v) => {
                        log::warn!(
                            "{}::{} = {} is out of range [{}..={}], using default {}",
                            block,
                            key,
                            v,
                            item.min,
                            item.max,
                            item.default
                        );
                        item.default
                    }
                    None => {
                        log::warn!(
                            "{}::{} must be an integer, using default {}",
                            block,
                            key,
                            item.default
                        );
                        item.default
                    }
                },
            };
            item.value.store(value, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(block: &str) -> Config {
        Config::parse(&format!("[server]\nname = \"s\"\n{}", block)).unwrap()
    }

    #[test]
    fn test_add_uint_starts_at_default() {
        let table = ConfTable::new();
        let handle = table.add_uint("operserv", "safe_connections", 1, i32::MAX as u32, 5);
        assert_eq!(handle.get(), 5);
        assert_eq!(table.get("operserv", "safe_connections"), Some(5));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_apply_updates_live_handle() {
        let table = ConfTable::new();
        let handle = table.add_uint("operserv", "safe_connections", 1, i32::MAX as u32, 5);

        table.apply(&config_with("[operserv]\nsafe_connections = 20\n"));
        assert_eq!(handle.get(), 20);

        table.apply(&config_with("[operserv]\nsafe_connections = 7\n"));
        assert_eq!(handle.get(), 7);
    }

    #[test]
    fn test_apply_missing_value_restores_default() {
        let table = ConfTable::new();
        let handle = table.add_uint("operserv", "safe_connections", 1, 100, 5);
        table.apply(&config_with("[operserv]\nsafe_connections = 50\n"));
        assert_eq!(handle.get(), 50);

        table.apply(&config_with(""));
        assert_eq!(handle.get(), 5);
    }

    #[test]
    fn test_apply_rejects_out_of_range() {
        let table = ConfTable::new();
        let handle = table.add_uint("operserv", "safe_connections", 1, i32::MAX as u32, 5);

        table.apply(&config_with("[operserv]\nsafe_connections = 0\n"));
        assert_eq!(handle.get(), 5);

        table.apply(&config_with("[operserv]\nsafe_connections = -3\n"));
        assert_eq!(handle.get(), 5);

        table.apply(&config_with("[operserv]\nsafe_connections = 4294967296\n"));
        assert_eq!(handle.get(), 5);
    }

    #[test]
    fn test_apply_accepts_bounds() {
        let table = ConfTable::new();
        let handle = table.add_uint("operserv", "safe_connections", 1, i32::MAX as u32, 5);

        table.apply(&config_with("[operserv]\nsafe_connections = 1\n"));
        assert_eq!(handle.get(), 1);

        table.apply(&config_with("[operserv]\nsafe_connections = 2147483647\n"));
        assert_eq!(handle.get(), i32::MAX as u32);
    }

    #[test]
    fn test_apply_rejects_wrong_type() {
        let table = ConfTable::new();
        let handle = table.add_uint("operserv", "safe_connections", 1, 100, 5);
        table.apply(&config_with("[operserv]\nsafe_connections = \"ten\"\n"));
        assert_eq!(handle.get(), 5);
    }

    #[test]
    fn test_remove() {
        let table = ConfTable::new();
        table.add_uint("operserv", "safe_connections", 1, 100, 5);
        assert!(table.remove("operserv", "safe_connections"));
        assert!(!table.remove("operserv", "safe_connections"));
        assert_eq!(table.get("operserv", "safe_connections"), None);
        assert_eq!(table.len(), 0);
    }
}
