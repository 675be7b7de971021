//! Property-based tests for the identifier invariants
//!
//! Complements the unit tests in each module by checking the check-digit,
//! normalization and conversion guarantees over generated inputs.

use proptest::prelude::*;
use tillscan_core::checksum::{gs1_check_digit, verify};
use tillscan_core::gtin::{normalize, Gtin};
use tillscan_core::isbn::{isbn10_to_gtin, to_isbn10};

fn with_check_digit(data: &str) -> String {
    let check = gs1_check_digit(data).unwrap();
    format!("{}{}", data, check)
}

/// Data digits for GTIN-8/12/13/14, check digit excluded.
fn gtin_data() -> impl Strategy<Value = String> {
    prop_oneof!["[0-9]{7}", "[0-9]{11}", "[0-9]{12}", "[0-9]{13}"]
}

proptest! {
    #[test]
    fn prop_normalize_is_idempotent(data in gtin_data()) {
        let gtin = normalize(&with_check_digit(&data)).unwrap();
        let again = normalize(&gtin.to_string()).unwrap();
        prop_assert_eq!(again, gtin);
    }

    #[test]
    fn prop_upc_a_gains_leading_zero(data in "[0-9]{11}") {
        let upc = with_check_digit(&data);
        let gtin = Gtin::parse(&upc).unwrap();
        let expected = format!("0{}", upc);
        prop_assert_eq!(gtin.as_gtin_13(), Some(expected.as_str()));
    }

    #[test]
    fn prop_single_digit_change_is_detected(
        data in "[0-9]{7,17}",
        index in any::<prop::sample::Index>(),
        delta in 1u8..10,
    ) {
        let full = with_check_digit(&data);
        prop_assert!(verify(&full));

        let mut digits = full.into_bytes();
        let i = index.index(digits.len());
        digits[i] = b'0' + (digits[i] - b'0' + delta) % 10;
        let altered = String::from_utf8(digits).unwrap();
        prop_assert!(!verify(&altered));
    }

    #[test]
    fn prop_isbn10_round_trip(data in "[0-9]{9}") {
        let gtin = Gtin::parse(&with_check_digit(&format!("978{}", data))).unwrap();
        let isbn10 = to_isbn10(&gtin).unwrap();
        prop_assert_eq!(isbn10_to_gtin(&isbn10.value).unwrap(), gtin);
    }

    #[test]
    fn prop_scan_never_panics(raw in "\\PC{0,40}") {
        let _ = tillscan_core::parse(&raw);
    }

    #[test]
    fn prop_digit_scans_never_panic(raw in "(\\]C1)?[0-9\\x1d]{0,48}") {
        let _ = tillscan_core::parse(&raw);
    }
}
