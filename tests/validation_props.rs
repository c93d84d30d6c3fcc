//! Property-based tests for credential validation.
//!
//! The validators gate every remote signup call, so they get the
//! arbitrary-input treatment: shapes that must never validate, shapes
//! that must always validate, and the length bounds under arbitrary
//! content.

use proptest::prelude::*;

use tasksync::validate::{validate_email, validate_password};

// ─── Arbitrary Strategies ───────────────────────────────────────────────────

/// Well-formed `local@domain.tld` addresses, always within length bounds.
fn arb_valid_email() -> impl Strategy<Value = String> {
    ("[a-z0-9]{1,16}", "[a-z0-9]{1,16}", "[a-z]{2,6}")
        .prop_map(|(local, domain, tld)| format!("{local}@{domain}.{tld}"))
}

proptest! {
    #[test]
    fn strings_without_an_at_sign_never_validate(s in "[^@]{0,60}") {
        prop_assert!(validate_email(&s).is_err());
    }

    #[test]
    fn addresses_without_a_dotted_domain_never_validate(
        local in "[a-z0-9]{1,16}",
        domain in "[a-z0-9]{1,16}",
    ) {
        let email = format!("{local}@{domain}");
        prop_assert!(validate_email(&email).is_err());
    }

    #[test]
    fn well_formed_addresses_always_validate(email in arb_valid_email()) {
        prop_assert!(validate_email(&email).is_ok());
    }

    #[test]
    fn whitespace_anywhere_invalidates(email in arb_valid_email(), pos in 0usize..10) {
        let mut chars: Vec<char> = email.chars().collect();
        let pos = pos % (chars.len() + 1);
        chars.insert(pos, ' ');
        let spaced: String = chars.into_iter().collect();
        prop_assert!(validate_email(&spaced).is_err());
    }

    #[test]
    fn passwords_within_bounds_always_validate(password in ".{6,100}") {
        prop_assert!(validate_password(&password).is_ok());
    }

    #[test]
    fn short_passwords_never_validate(password in ".{0,5}") {
        prop_assert!(validate_password(&password).is_err());
    }

    #[test]
    fn oversized_passwords_never_validate(extra in 0usize..40) {
        let password = "p".repeat(256 + extra);
        prop_assert!(validate_password(&password).is_err());
    }
}
