//! # osq-verify
//!
//! Kani harnesses for the comparison laws in `osq-core`. Every handler
//! delegates to these pure functions, so proving them over all inputs
//! covers every resource type at once.
//!
//! - The four integer presets partition the number line consistently.
//! - `not_any_in` is the exact negation of `any_in`.
//! - `older_than` and `younger_than` are complements, with the boundary
//!   instant counted as older.

extern crate osq_core;

#[cfg(kani)]
use osq_core::{contains, DateTimePreset, GenericPreset, IntegerPreset};

#[cfg(kani)]
mod proofs {
    use super::*;

    /// `less_than` is `<`, and the other three presets are derived from it.
    #[kani::proof]
    fn verify_integer_partition() {
        let v: i64 = kani::any();
        let t: i64 = kani::any();

        let lt = IntegerPreset::LessThan.compare(v, t);
        let le = IntegerPreset::LessOrEqual.compare(v, t);
        let gt = IntegerPreset::GreaterThan.compare(v, t);
        let ge = IntegerPreset::GreaterOrEqual.compare(v, t);

        assert!(lt == (v < t));
        assert!(le == (lt || v == t));
        assert!(ge == !lt);
        assert!(gt == !le);
    }

    /// Membership over a bounded list: `any_in` holds iff some element
    /// equals the value, and `not_any_in` negates it for every value and list.
    #[kani::proof]
    #[kani::unwind(5)]
    fn verify_membership_negation() {
        let list: [i32; 4] = kani::any();
        let len: usize = kani::any();
        kani::assume(len >= 1 && len <= list.len());
        let value: i32 = kani::any();
        let slice = &list[..len];

        let any_in = GenericPreset::AnyIn.matches(slice, &value);
        let witness: usize = kani::any();
        kani::assume(witness < len);
        if slice[witness] == value {
            assert!(any_in);
        }
        if any_in {
            assert!(contains(slice, &value));
        }
        assert!(GenericPreset::NotAnyIn.matches(slice, &value) == !any_in);
    }

    #[kani::proof]
    fn verify_datetime_complements() {
        let elapsed: i64 = kani::any();
        let threshold: i64 = kani::any();

        let older = DateTimePreset::OlderThan.compare(elapsed, threshold);
        let younger = DateTimePreset::YoungerThan.compare(elapsed, threshold);
        let older_eq = DateTimePreset::OlderThanOrEqual.compare(elapsed, threshold);
        let younger_eq = DateTimePreset::YoungerThanOrEqual.compare(elapsed, threshold);

        assert!(older != younger);
        assert!(older == older_eq);
        assert!(younger_eq == (younger || elapsed == threshold));
        if elapsed == threshold {
            assert!(older, "the boundary instant counts as older");
        }
    }
}

#[cfg(not(kani))]
pub fn _proof_placeholder() {
    // Harnesses compile only under cfg(kani): `cargo kani --package osq-verify`.
}
