//! Property tests for the expiring map.

use expiring_map::{Cache, CacheConfig, CacheError};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use std::collections::HashSet;

fn cache() -> Cache<u32> {
    Cache::new(CacheConfig::default()).unwrap()
}

proptest! {
    #[test]
    fn set_then_get_returns_value(key in "[a-z0-9:_]{1,16}", value in any::<u32>()) {
        let cache = cache();
        cache.set(key.clone(), value);
        prop_assert_eq!(cache.get(&key), Some(value));
    }

    #[test]
    fn last_write_wins(key in "[a-z]{1,8}", values in vec(any::<u32>(), 1..20)) {
        let cache = cache();
        for value in &values {
            cache.set(key.clone(), *value);
        }
        prop_assert_eq!(cache.get(&key), values.last().copied());
        prop_assert_eq!(cache.len(), 1);
    }

    #[test]
    fn add_never_overwrites(key in "[a-z]{1,8}", first in any::<u32>(), second in any::<u32>()) {
        let cache = cache();
        cache.add(key.clone(), first).unwrap();
        let is_already_exists = matches!(cache.add(key.clone(), second), Err(CacheError::AlreadyExists(_)));
        prop_assert!(is_already_exists);
        prop_assert_eq!(cache.get(&key), Some(first));
    }

    #[test]
    fn sweep_removes_exactly_the_expired(
        entries in btree_map("[a-z]{1,8}", any::<bool>(), 0..64),
    ) {
        let cache = cache();
        for key in entries.keys() {
            cache.set(key.clone(), 0);
        }
        let mut expired = 0;
        for (key, expire) in &entries {
            if *expire {
                cache.get_and_expire(key).unwrap();
                expired += 1;
            }
        }

        prop_assert_eq!(cache.delete_expired(), expired);
        prop_assert_eq!(cache.len(), entries.len() - expired);

        let remaining: HashSet<String> = cache.keys().into_iter().collect();
        for (key, expire) in &entries {
            prop_assert_eq!(remaining.contains(key), !*expire);
        }
    }

    #[test]
    fn keys_reflect_membership_not_liveness(keys in vec("[a-z]{1,8}", 1..32)) {
        let cache = cache();
        for key in &keys {
            cache.set(key.clone(), 1);
            cache.get_and_expire(key);
        }
        let unique: HashSet<&String> = keys.iter().collect();
        prop_assert_eq!(cache.keys().len(), unique.len());
        for key in &keys {
            prop_assert!(cache.get(key).is_none());
        }
    }
}
