//! Property-based tests for the composition pipeline.
//!
//! These tests use proptest to generate random configuration maps and verify
//! that the pipeline's determinism and structural invariants hold for all
//! possible inputs.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use crate::fragment::classify_key;
    use crate::fragment::KeyClass;
    use crate::pipeline::Pipeline;

    /// Strategy producing a mix of recognized, malformed, and unrelated keys.
    fn config_key() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("cloud-init.user-data".to_string()),
            Just("user.user-data".to_string()),
            Just("cloud-init.vendor-data".to_string()),
            Just("user.vendor-data".to_string()),
            "[a-z0-9.]{0,8}".prop_map(|label| format!("user.user-data.{}", label)),
            "[a-z0-9.]{0,8}".prop_map(|label| format!("cloud-init.vendor-data.{}", label)),
            "[a-z.]{1,16}",
        ]
    }

    fn config_map() -> impl Strategy<Value = BTreeMap<String, String>> {
        proptest::collection::btree_map(config_key(), ".{0,40}", 0..8)
    }

    fn profiles() -> impl Strategy<Value = Vec<(String, Option<BTreeMap<String, String>>)>> {
        proptest::collection::vec(("[a-z]{1,8}", proptest::option::of(config_map())), 0..4)
    }

    proptest! {
        /// Property: identical inputs always yield byte-identical output.
        #[test]
        fn fetch_is_deterministic(profiles in profiles(), instance in config_map()) {
            let first = Pipeline::default()
                .fetch(profiles.clone(), Some(instance.clone()))
                .unwrap();
            let second = Pipeline::default().fetch(profiles, Some(instance)).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Property: the pipeline never fails once an instance map exists,
        /// whatever the keys look like.
        #[test]
        fn fetch_never_fails_with_instance_map(profiles in profiles(), instance in config_map()) {
            let result = Pipeline::default().fetch(profiles, Some(instance));
            prop_assert!(result.is_ok());
        }

        /// Property: key classification is total — every key lands in exactly
        /// one class, and classification is deterministic.
        #[test]
        fn classify_key_is_total_and_deterministic(key in ".{0,64}") {
            let first = classify_key(&key);
            let second = classify_key(&key);
            prop_assert_eq!(first, second);
        }

        /// Property: keys without a recognized namespace prefix are never
        /// claimed by this pipeline.
        #[test]
        fn unprefixed_keys_are_unrecognized(key in "[a-z]{1,10}") {
            prop_assume!(!key.starts_with("user") && !key.starts_with("cloud-init"));
            prop_assert_eq!(classify_key(&key), KeyClass::Unrecognized);
        }
    }
}
