//! Ordering laws for the Debian version engine.

use std::cmp::Ordering;

use proptest::prelude::*;

use runepkg_lib::core::version::Version;

fn v(s: &str) -> Version {
    s.parse().expect("test version parses")
}

#[test]
fn dpkg_comparison_corpus() {
    // (left, right, expected) triples lifted from dpkg behavior.
    let cases = [
        ("1.0", "1.0", Ordering::Equal),
        ("1.0", "1.1", Ordering::Less),
        ("1.1", "1.0", Ordering::Greater),
        ("2.12-1", "2.10-1", Ordering::Greater),
        ("1.0-1", "1.0-2", Ordering::Less),
        ("1.9", "1.10", Ordering::Less),
        ("1.09", "1.9", Ordering::Equal),
        ("1.0+b1", "1.0", Ordering::Greater),
        ("1.0~rc1", "1.0", Ordering::Less),
        ("1.0~rc1-1", "1.0-1", Ordering::Less),
        ("1.0~~", "1.0~", Ordering::Less),
        ("1.0a", "1.0+", Ordering::Less),
        ("1.2a", "1.23", Ordering::Less),
        ("1:0.1", "999.9", Ordering::Greater),
        ("2:1.0", "999.0", Ordering::Greater),
        ("0:1.0", "1.0", Ordering::Equal),
        ("1.0-1ubuntu1", "1.0-1", Ordering::Greater),
        ("1.0", "1.0-0", Ordering::Equal),
    ];

    for (left, right, expected) in cases {
        let cmp = v(left).cmp(&v(right));
        assert_eq!(
            cmp, expected,
            "{left} vs {right}: expected {expected:?}, got {cmp:?}"
        );
    }
}

#[test]
fn epoch_always_dominates() {
    assert!(v("1:0.0") > v("999999.999"));
    assert!(v("2:1.0") > v("1:999.0"));
}

#[test]
fn tilde_sorts_before_everything() {
    assert!(v("1.0~rc1") < v("1.0"));
    assert!(v("1.0~rc1") < v("1.0~rc2"));
    assert!(v("1.0~") < v("1.0"));
    assert!(v("1.0~") < v("1.0a"));
}

/// Version fragments drawn from the characters dpkg allows.
fn version_string() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[0-9][A-Za-z0-9.+~]{0,12}").expect("valid regex")
}

proptest! {
    #[test]
    fn order_is_total(a in version_string(), b in version_string()) {
        let (va, vb) = (v(&a), v(&b));
        let forward = va.cmp(&vb);
        let backward = vb.cmp(&va);
        prop_assert_eq!(forward, backward.reverse());
        prop_assert_eq!(forward == Ordering::Equal, va == vb);
    }

    #[test]
    fn order_is_transitive(a in version_string(), b in version_string(), c in version_string()) {
        let (va, vb, vc) = (v(&a), v(&b), v(&c));
        if va <= vb && vb <= vc {
            prop_assert!(va <= vc, "{} <= {} <= {} but not {} <= {}", a, b, c, a, c);
        }
    }

    #[test]
    fn order_is_reflexive(a in version_string()) {
        let va = v(&a);
        prop_assert_eq!(va.cmp(&v(&a)), Ordering::Equal);
    }
}
