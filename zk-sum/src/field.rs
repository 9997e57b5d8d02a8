//! Mapping of signed amounts into the BN254 scalar field.

use crate::constants::field_modulus;
use crate::types::{Amount, FieldElement};
use num_bigint::BigUint;

/// Wrap a signed amount into `[0, p)`.
///
/// Non-negative amounts map to themselves, negative amounts to `amount + p`.
pub fn normalize(amount: Amount) -> FieldElement {
    let magnitude = BigUint::from(amount.unsigned_abs());
    if amount >= 0 {
        magnitude
    } else {
        field_modulus() - magnitude
    }
}
