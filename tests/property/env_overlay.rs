// tests/property/env_overlay.rs

use std::ffi::OsString;

use proptest::prelude::*;

use delaystart::engine::prepare::{accepted_overrides, overlay_env};

fn entry_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z_]{1,8}=[a-z0-9 ]{0,8}",
        "[A-Z_]{1,8}",
        "[A-Z_]{1,4}=[a-z]{0,4}=[a-z]{0,4}",
        " {0,2}[A-Z]{1,4}=[a-z]{1,4} {0,2}",
    ]
}

proptest! {
    #[test]
    fn only_single_equals_entries_survive(entries in proptest::collection::vec(entry_strategy(), 0..12)) {
        let accepted = accepted_overrides(&entries);

        let expected: Vec<&str> = entries
            .iter()
            .filter(|e| e.chars().filter(|c| *c == '=').count() == 1)
            .map(|e| e.trim())
            .collect();
        prop_assert_eq!(&accepted, &expected);

        let base = vec![(OsString::from("HOME"), OsString::from("/root"))];
        let env = overlay_env(&base, &entries);
        prop_assert_eq!(env.len(), 1 + expected.len());
        prop_assert_eq!(&env[0], &base[0]);
        for ((key, value), original) in env[1..].iter().zip(expected.iter()) {
            let rebuilt = format!("{}={}", key.to_string_lossy(), value.to_string_lossy());
            prop_assert_eq!(rebuilt.as_str(), *original);
        }
    }
}
