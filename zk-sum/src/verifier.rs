//! Host-side sum check run before anything is handed to a prover.

use crate::cipher::AdditiveMasking;
use crate::constants::NUM_AMOUNTS;
use crate::error::ZkError;
use crate::field::normalize;
use crate::types::{Amount, Ciphertext, VerifiedBundle};
use num_bigint::BigUint;
use tracing::debug;

/// Mask the amounts and check that unmasking the masked sum gives back the clear sum.
///
/// Sums are plain integer sums; nothing is reduced modulo `p` here. The check is a tautology for a
/// correct cipher, but it runs anyway so bad witness data never reaches the prover.
pub fn verify<C: AdditiveMasking>(amounts: &[Amount; NUM_AMOUNTS], cipher: &C) -> Result<VerifiedBundle, ZkError> {
    let normalized = amounts.map(normalize);
    let clear_sum: BigUint = normalized.iter().sum();

    let encrypted = normalized.each_ref().map(|f| cipher.encrypt(f));
    let enc_sum = encrypted
        .iter()
        .fold(Ciphertext::default(), |acc, c| cipher.add_encrypted(&acc, c));

    let decrypted_sum = cipher.decrypt(&enc_sum)?;
    if decrypted_sum != clear_sum {
        return Err(ZkError::SumMismatch { clear_sum, decrypted_sum });
    }

    debug!("masked sum matches clear sum");

    Ok(VerifiedBundle {
        key: cipher.key().value(),
        normalized,
        clear_sum,
        encrypted,
        enc_sum,
    })
}
