//! Property-based tests for logical paths and override resolution.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::overrides::{Override, OverrideableRule};
    use crate::path::{ancestor_directories, normalize, parent, segments, validate_path};
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = String> {
        "[a-z0-9_-]{1,8}"
    }

    fn logical_path() -> impl Strategy<Value = String> {
        (prop::collection::vec(segment(), 0..6), any::<bool>(), any::<bool>()).prop_map(
            |(parts, leading, trailing)| {
                let mut path = parts.join("/");
                if leading {
                    path.insert(0, '/');
                }
                if trailing && !parts.is_empty() {
                    path.push('/');
                }
                path
            },
        )
    }

    // ============================================================================
    // normalize property tests
    // ============================================================================

    proptest! {
        /// Property: normalize is idempotent
        #[test]
        fn normalize_is_idempotent(path in ".*") {
            let once = normalize(&path);
            prop_assert_eq!(normalize(&once), once);
        }

        /// Property: normalized keys start with a slash and never end with one
        #[test]
        fn normalize_shape(path in logical_path()) {
            let key = normalize(&path);
            prop_assert!(key.starts_with('/'));
            prop_assert!(key == "/" || !key.ends_with('/'));
            prop_assert!(!key.contains("//"));
        }

        /// Property: a trailing slash does not change the key
        #[test]
        fn trailing_slash_names_same_chamber(path in logical_path()) {
            let with_slash = format!("{}/", path);
            prop_assert_eq!(normalize(&with_slash), normalize(&path));
        }
    }

    // ============================================================================
    // validate_path property tests
    // ============================================================================

    proptest! {
        /// Property: generated paths without parent references are valid
        #[test]
        fn plain_paths_validate(path in logical_path()) {
            prop_assert!(validate_path(&path).is_ok());
        }

        /// Property: any parent reference is rejected
        #[test]
        fn parent_reference_rejected(prefix in logical_path(), suffix in logical_path()) {
            let path = format!("{}/../{}", prefix, suffix);
            prop_assert!(validate_path(&path).is_err());
        }
    }

    // ============================================================================
    // ancestor_directories property tests
    // ============================================================================

    proptest! {
        /// Property: one ancestor per segment above the leaf, shallowest first
        #[test]
        fn ancestors_are_ordered_prefixes(path in logical_path()) {
            let ancestors = ancestor_directories(&path);
            let depth = segments(&path).len();
            prop_assert_eq!(ancestors.len(), depth.saturating_sub(1));

            for pair in ancestors.windows(2) {
                prop_assert!(pair[1].starts_with(pair[0].as_str()));
                prop_assert!(pair[1].len() > pair[0].len());
            }
            for dir in &ancestors {
                prop_assert!(dir.ends_with('/'));
            }
        }

        /// Property: the deepest ancestor is the parent directory
        #[test]
        fn deepest_ancestor_is_parent(path in logical_path()) {
            let ancestors = ancestor_directories(&path);
            if let Some(last) = ancestors.last() {
                prop_assert_eq!(normalize(last), parent(&path));
            }
        }
    }

    // ============================================================================
    // override resolution property tests
    // ============================================================================

    fn version() -> impl Strategy<Value = (u64, u64, u64)> {
        (0u64..5, 0u64..5, 0u64..5)
    }

    fn literal((major, minor, patch): (u64, u64, u64)) -> String {
        format!("{}.{}.{}", major, minor, patch)
    }

    proptest! {
        /// Property: a version outside every override resolves to the base value
        #[test]
        fn outside_ranges_resolves_base(lo in version(), hi in version(), at in version()) {
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            let rule = OverrideableRule::with_overrides(
                false,
                vec![Override::new(&literal(lo), &literal(hi), true).unwrap()],
            )
            .unwrap();

            let (value, _) = rule.bool_value(&literal(at), false);
            prop_assert_eq!(value, lo <= at && at <= hi);
        }

        /// Property: the empty version always resolves to the base value
        #[test]
        fn empty_version_resolves_base(lo in version()) {
            let rule = OverrideableRule::with_overrides(
                1.0,
                vec![Override::new(&literal(lo), "", 2.0).unwrap()],
            )
            .unwrap();
            prop_assert_eq!(rule.number_value("", 0.0), (1.0, true));
        }

        /// Property: sorted disjoint ranges are accepted and resolve to the
        /// range that contains the version
        #[test]
        fn disjoint_ranges_resolve_to_container(split in 1u64..9, at in 0u64..10) {
            let rule = OverrideableRule::with_overrides(
                "base",
                vec![
                    Override::new("0.0.0", &format!("{}.0.0", split - 1), "low").unwrap(),
                    Override::new(&format!("{}.0.0", split), "", "high").unwrap(),
                ],
            )
            .unwrap();

            let (value, _) = rule.string_value(&format!("{}.0.0", at), "");
            let expected = if at < split { "low" } else { "high" };
            prop_assert_eq!(value, expected);
        }
    }
}
