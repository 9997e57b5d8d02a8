//! Crate-wide constants shared by the masking scheme, the circuit and the prover backends.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use num_bigint::BigUint;

/// Decimal form of the BN254 scalar field modulus.
///
/// External tooling (ZoKrates, snarkjs) prints the modulus in this form, so we keep the literal
/// around for cross-checking.
pub const FIELD_MODULUS_DEC: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// Number of transaction amounts in one run.
///
/// The circuit is compiled for exactly this many amounts.
pub const NUM_AMOUNTS: usize = 5;

/// Length of the witness argument vector: key, amounts, clear sum, ciphertexts, encrypted sum.
pub const NUM_WITNESS_ARGS: usize = 1 + NUM_AMOUNTS + 1 + NUM_AMOUNTS + 1;

/// Number of public inputs exposed by the circuit: clear sum, ciphertexts, encrypted sum.
pub const NUM_PUBLIC_INPUTS: usize = 1 + NUM_AMOUNTS + 1;

/// Inclusive lower bound of the masking key range.
pub const KEY_MIN: u64 = 10_000;

/// Exclusive upper bound of the masking key range.
pub const KEY_MAX: u64 = 1_000_000;

/// The prime modulus `p` as an arbitrary-precision integer.
pub fn field_modulus() -> BigUint {
    Fr::MODULUS.into()
}
