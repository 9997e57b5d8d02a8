use num_bigint::BigUint;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::Mutex;
use zk_sum::artifact::parse_proof_artifact;
use zk_sum::constants::{field_modulus, NUM_PUBLIC_INPUTS};
use zk_sum::groth16::{deserialize_pk, deserialize_vk, serialize_pk, serialize_vk, Groth16Prover};
use zk_sum::pipeline::{run_pipeline, PipelineOptions};
use zk_sum::prover::ProverService;
use zk_sum::types::{GroupElement, ProofArtifact, ProofScalar, ProofTriple, WitnessArgs};
use zk_sum::ZkError;

/// Records the witness it was handed and answers with a fixed artifact.
struct RecordingProver {
    seen: Mutex<Vec<WitnessArgs>>,
}

impl ProverService for RecordingProver {
    fn prove(&self, witness: &WitnessArgs) -> Result<ProofArtifact, ZkError> {
        self.seen.lock().unwrap().push(witness.clone());
        let s = |v: &str| ProofScalar::Text(v.to_string());
        Ok(ProofArtifact {
            proof: ProofTriple {
                a: GroupElement::Pair([s("0x1"), s("0x2")]),
                b: GroupElement::PairOfPairs([[s("0x3"), s("0x4")], [s("0x5"), s("0x6")]]),
                c: GroupElement::Pair([s("0x7"), s("0x8")]),
            },
            inputs: vec![s("0x2d")],
        })
    }
}

struct FailingProver;

impl ProverService for FailingProver {
    fn prove(&self, _witness: &WitnessArgs) -> Result<ProofArtifact, ZkError> {
        Err(ZkError::ExternalProverFailure("exit status 1".to_string()))
    }
}

#[test]
fn prover_receives_verified_witness() {
    let prover = RecordingProver { seen: Mutex::new(Vec::new()) };
    let mut rng = ChaCha20Rng::seed_from_u64(42);

    let run = run_pipeline(&[10, 15, 20, -10, 10], &mut rng, &prover, PipelineOptions { shuffle: false }).unwrap();

    let seen = prover.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], run.witness);
    assert_eq!(run.witness.clear_sum, field_modulus() + 45u32);
    assert_eq!(run.witness.enc_sum, &run.witness.clear_sum * run.witness.key);
    assert_eq!(run.artifact.inputs.len(), 1);
}

#[test]
fn prover_failure_aborts_the_run() {
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    let err = run_pipeline(&[1, 2, 3, 4, 5], &mut rng, &FailingProver, PipelineOptions::default()).unwrap_err();
    assert!(matches!(err, ZkError::ExternalProverFailure(_)));
}

#[test]
fn bad_argument_count_never_reaches_prover() {
    let prover = RecordingProver { seen: Mutex::new(Vec::new()) };
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    let err = run_pipeline(&[1, 2, 3, 4, 5, 6], &mut rng, &prover, PipelineOptions::default()).unwrap_err();

    assert!(matches!(err, ZkError::InvalidArgumentCount { expected: 5, got: 6 }));
    assert!(prover.seen.lock().unwrap().is_empty());
}

#[test]
fn groth16_end_to_end() {
    let mut rng = ChaCha20Rng::seed_from_u64(2024);
    let prover = Groth16Prover::setup(&mut rng).unwrap();

    let run = run_pipeline(&[10, 15, 20, -10, 10], &mut rng, &prover, PipelineOptions::default()).unwrap();

    let artifact = run.artifact;
    assert_eq!(artifact.inputs.len(), NUM_PUBLIC_INPUTS);
    // clear sum is 45 + p, which the circuit sees as 45.
    assert_eq!(
        artifact.inputs[0],
        ProofScalar::Text(format!("0x{:064x}", BigUint::from(45u32)))
    );
    assert!(matches!(artifact.proof.b, GroupElement::PairOfPairs(_)));

    // The artifact survives the same parser used for ZoKrates output.
    let raw = serde_json::to_vec(&artifact).unwrap();
    assert_eq!(parse_proof_artifact(&raw).unwrap(), artifact);
}

#[test]
fn groth16_keys_survive_serialization() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let prover = Groth16Prover::setup(&mut rng).unwrap();

    let pk = deserialize_pk(&serialize_pk(prover.proving_key()).unwrap()).unwrap();
    let vk = deserialize_vk(&serialize_vk(prover.verifying_key()).unwrap()).unwrap();
    let reloaded = Groth16Prover::from_keys(pk, vk);

    let run = run_pipeline(&[0, 0, 0, 0, -1], &mut rng, &reloaded, PipelineOptions::default()).unwrap();
    assert_eq!(run.artifact.inputs.len(), NUM_PUBLIC_INPUTS);
}

#[test]
fn groth16_rejects_proof_for_other_inputs() {
    use zk_sum::circuit::to_fr;
    use zk_sum::groth16::verify_masked_sum_proof;

    let mut rng = ChaCha20Rng::seed_from_u64(11);
    let prover = Groth16Prover::setup(&mut rng).unwrap();
    let (_, witness) =
        zk_sum::pipeline::prepare_witness(&[5, 5, 5, 5, 5], &mut rng, PipelineOptions::default()).unwrap();

    let (proof, mut inputs) = prover.prove_raw(&mut rng, &witness).unwrap();
    verify_masked_sum_proof(prover.verifying_key(), &proof, &inputs).unwrap();

    inputs[0] = to_fr(&BigUint::from(26u32));
    let err = verify_masked_sum_proof(prover.verifying_key(), &proof, &inputs).unwrap_err();
    assert!(matches!(err, ZkError::VerificationFailed));
}
