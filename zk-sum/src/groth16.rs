//! In-process Groth16 prover for the masked-sum circuit.
//!
//! SECURITY NOTE (prototype): Groth16 requires a trusted setup that produces a proving key (PK)
//! and verifying key (VK). This backend generates keys locally.

use crate::circuit::MaskedSumCircuit;
use crate::error::ZkError;
use crate::prover::ProverService;
use crate::types::{GroupElement, ProofArtifact, ProofScalar, ProofTriple, WitnessArgs};
use ark_bn254::{Bn254, Fr, G1Affine, G2Affine};
use ark_ff::PrimeField;
use ark_groth16::{prepare_verifying_key, Groth16, Proof, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use num_bigint::BigUint;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{debug, warn};

pub struct Groth16Prover {
    pk: ProvingKey<Bn254>,
    vk: VerifyingKey<Bn254>,
    self_verify: bool,
}

impl Groth16Prover {
    /// Run the (local, prototype) trusted setup for the circuit.
    pub fn setup(rng: &mut impl RngCore) -> Result<Self, ZkError> {
        let pk = Groth16::<Bn254>::generate_random_parameters_with_reduction(MaskedSumCircuit::blank(), rng)
            .map_err(|e| ZkError::Ark(format!("{e}")))?;
        let vk = pk.vk.clone();
        Ok(Self::from_keys(pk, vk))
    }

    pub fn from_keys(pk: ProvingKey<Bn254>, vk: VerifyingKey<Bn254>) -> Self {
        Self { pk, vk, self_verify: true }
    }

    /// Whether each proof is checked against the verifying key before it is returned.
    pub fn with_self_verify(mut self, self_verify: bool) -> Self {
        self.self_verify = self_verify;
        self
    }

    pub fn proving_key(&self) -> &ProvingKey<Bn254> {
        &self.pk
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.vk
    }

    /// Prove a witness and return the raw arkworks proof plus the public inputs it binds.
    pub fn prove_raw(&self, rng: &mut impl RngCore, witness: &WitnessArgs) -> Result<(Proof<Bn254>, Vec<Fr>), ZkError> {
        let circuit = MaskedSumCircuit::from_witness(witness);
        let public_inputs = circuit.public_inputs();

        let proof = Groth16::<Bn254>::create_random_proof_with_reduction(circuit, &self.pk, rng)
            .map_err(|e| ZkError::Ark(format!("{e}")))?;

        Ok((proof, public_inputs))
    }
}

impl ProverService for Groth16Prover {
    fn prove(&self, witness: &WitnessArgs) -> Result<ProofArtifact, ZkError> {
        // Use OS randomness for the proof to avoid deterministic proofs.
        let (proof, public_inputs) = self.prove_raw(&mut OsRng, witness)?;

        if self.self_verify {
            // Fail closed if the proof doesn't verify.
            verify_masked_sum_proof(&self.vk, &proof, &public_inputs).inspect_err(|e| {
                warn!(error = %e, "groth16 self-verification failed");
            })?;
            debug!("groth16 proof self-verified");
        }

        Ok(proof_artifact(&proof, &public_inputs))
    }
}

/// Verify a masked-sum proof against its public inputs.
pub fn verify_masked_sum_proof(vk: &VerifyingKey<Bn254>, proof: &Proof<Bn254>, public_inputs: &[Fr]) -> Result<(), ZkError> {
    let pvk = prepare_verifying_key(vk);
    let ok = Groth16::<Bn254>::verify_proof(&pvk, proof, public_inputs)
        .map_err(|e| ZkError::Ark(format!("{e}")))?;
    if !ok {
        return Err(ZkError::VerificationFailed);
    }
    Ok(())
}

/// Render a proof the way ZoKrates writes `proof.json`: `0x`-prefixed, 32-byte big-endian hex.
pub fn proof_artifact(proof: &Proof<Bn254>, public_inputs: &[Fr]) -> ProofArtifact {
    ProofArtifact {
        proof: ProofTriple {
            a: g1_element(&proof.a),
            b: g2_element(&proof.b),
            c: g1_element(&proof.c),
        },
        inputs: public_inputs.iter().map(hex_scalar).collect(),
    }
}

fn hex_scalar<F: PrimeField>(x: &F) -> ProofScalar {
    let n: BigUint = x.into_bigint().into();
    let bytes = n.to_bytes_be();
    let mut padded = [0u8; 32];
    padded[32 - bytes.len()..].copy_from_slice(&bytes);
    ProofScalar::Text(format!("0x{}", hex::encode(padded)))
}

fn g1_element(p: &G1Affine) -> GroupElement {
    GroupElement::Pair([hex_scalar(&p.x), hex_scalar(&p.y)])
}

fn g2_element(p: &G2Affine) -> GroupElement {
    GroupElement::PairOfPairs([
        [hex_scalar(&p.x.c0), hex_scalar(&p.x.c1)],
        [hex_scalar(&p.y.c0), hex_scalar(&p.y.c1)],
    ])
}

/// Serialize a proving key to bytes.
pub fn serialize_pk(pk: &ProvingKey<Bn254>) -> Result<Vec<u8>, ZkError> {
    let mut out = Vec::new();
    pk.serialize_compressed(&mut out)
        .map_err(|e| ZkError::Serialization(format!("{e}")))?;
    Ok(out)
}

pub fn deserialize_pk(bytes: &[u8]) -> Result<ProvingKey<Bn254>, ZkError> {
    ProvingKey::<Bn254>::deserialize_compressed(bytes)
        .map_err(|e| ZkError::Serialization(format!("{e}")))
}

pub fn serialize_vk(vk: &VerifyingKey<Bn254>) -> Result<Vec<u8>, ZkError> {
    let mut out = Vec::new();
    vk.serialize_compressed(&mut out)
        .map_err(|e| ZkError::Serialization(format!("{e}")))?;
    Ok(out)
}

pub fn deserialize_vk(bytes: &[u8]) -> Result<VerifyingKey<Bn254>, ZkError> {
    VerifyingKey::<Bn254>::deserialize_compressed(bytes)
        .map_err(|e| ZkError::Serialization(format!("{e}")))
}
