//! End-to-end run: key → mask → sum check → witness → prover → artifact.

use crate::artifact::serialize_witness_args;
use crate::cipher::{generate_key, HomomorphicCipher};
use crate::constants::NUM_AMOUNTS;
use crate::error::ZkError;
use crate::prover::ProverService;
use crate::types::{Amount, ProofArtifact, VerifiedBundle, WitnessArgs};
use crate::verifier::verify;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

#[derive(Clone, Copy, Debug)]
pub struct PipelineOptions {
    /// Shuffle the amounts before masking so the witness order does not leak input order.
    pub shuffle: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { shuffle: true }
    }
}

/// Output of a completed run.
#[derive(Clone, Debug)]
pub struct ProofRun {
    pub bundle: VerifiedBundle,
    pub witness: WitnessArgs,
    pub artifact: ProofArtifact,
}

/// Check the amount count, draw a key, mask and sum-check. Nothing is proved yet.
pub fn prepare_witness<R: Rng + ?Sized>(
    amounts: &[Amount],
    rng: &mut R,
    opts: PipelineOptions,
) -> Result<(VerifiedBundle, WitnessArgs), ZkError> {
    let mut amounts: [Amount; NUM_AMOUNTS] = amounts.try_into().map_err(|_| ZkError::InvalidArgumentCount {
        expected: NUM_AMOUNTS,
        got: amounts.len(),
    })?;

    let key = generate_key(rng);
    let cipher = HomomorphicCipher::new(key);

    if opts.shuffle {
        amounts.shuffle(rng);
    }

    let bundle = verify(&amounts, &cipher)?;
    let witness = serialize_witness_args(&bundle);
    Ok((bundle, witness))
}

/// Run the whole pipeline against a prover. Any error abandons the run.
pub fn run_pipeline<R, P>(amounts: &[Amount], rng: &mut R, prover: &P, opts: PipelineOptions) -> Result<ProofRun, ZkError>
where
    R: Rng + ?Sized,
    P: ProverService + ?Sized,
{
    let (bundle, witness) = prepare_witness(amounts, rng, opts)?;
    info!(shuffled = opts.shuffle, "sum check passed, submitting witness to prover");

    let artifact = prover.prove(&witness)?;
    info!(public_inputs = artifact.inputs.len(), "proof artifact received");

    Ok(ProofRun { bundle, witness, artifact })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{KEY_MAX, KEY_MIN};
    use crate::field::normalize;
    use num_bigint::BigUint;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn wrong_amount_count_is_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let err = prepare_witness(&[1, 2, 3], &mut rng, PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, ZkError::InvalidArgumentCount { expected: 5, got: 3 }));
    }

    #[test]
    fn unshuffled_run_keeps_order() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let amounts = [100, 250, -10, 0, 10];
        let (bundle, witness) = prepare_witness(&amounts, &mut rng, PipelineOptions { shuffle: false }).unwrap();

        assert_eq!(bundle.normalized, amounts.map(normalize));
        assert!((KEY_MIN..KEY_MAX).contains(&witness.key));
    }

    #[test]
    fn shuffle_permutes_but_preserves_sum() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let amounts = [1, 2, 3, 4, 5];
        let (bundle, _) = prepare_witness(&amounts, &mut rng, PipelineOptions::default()).unwrap();

        let mut sorted = bundle.normalized.clone();
        sorted.sort();
        assert_eq!(sorted, amounts.map(normalize));
        assert_eq!(bundle.clear_sum, BigUint::from(15u32));
    }

    #[test]
    fn same_seed_same_witness() {
        let amounts = [7, -7, 70, -70, 700];
        let a = prepare_witness(&amounts, &mut ChaCha20Rng::seed_from_u64(9), PipelineOptions::default()).unwrap();
        let b = prepare_witness(&amounts, &mut ChaCha20Rng::seed_from_u64(9), PipelineOptions::default()).unwrap();
        assert_eq!(a.1, b.1);
    }
}
