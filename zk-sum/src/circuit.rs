//! R1CS circuit for the masked-sum relation.
//!
//! What this circuit proves:
//! 1) The prover knows a key and five amounts (private).
//! 2) Each public ciphertext equals `amount * key`.
//! 3) The public clear sum equals the sum of the amounts, and the public encrypted sum equals the
//!    sum of the ciphertexts.
//!
//! All arithmetic is in BN254's scalar field, so host-side values larger than `p` (ciphertexts,
//! sums) enter the circuit reduced modulo `p`. Integer equalities on the host imply the same
//! equalities mod `p`, so an honest witness always satisfies the constraints.

use crate::constants::{NUM_AMOUNTS, NUM_PUBLIC_INPUTS};
use crate::types::WitnessArgs;
use ark_bn254::Fr;
use ark_ff::PrimeField;
use ark_r1cs_std::prelude::*;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use num_bigint::BigUint;

/// Reduce an arbitrary-size integer into the scalar field.
pub fn to_fr(x: &BigUint) -> Fr {
    Fr::from_le_bytes_mod_order(&x.to_bytes_le())
}

#[derive(Clone, Debug)]
pub struct MaskedSumCircuit {
    /// Private masking key.
    pub key: Fr,
    /// Private normalized amounts.
    pub amounts: [Fr; NUM_AMOUNTS],

    /// Public outputs.
    pub clear_sum: Fr,
    pub encrypted: [Fr; NUM_AMOUNTS],
    pub enc_sum: Fr,
}

impl MaskedSumCircuit {
    pub fn from_witness(w: &WitnessArgs) -> Self {
        Self {
            key: Fr::from(w.key),
            amounts: w.amounts.each_ref().map(to_fr),
            clear_sum: to_fr(&w.clear_sum),
            encrypted: w.encrypted.each_ref().map(to_fr),
            enc_sum: to_fr(&w.enc_sum),
        }
    }

    /// An all-zero instance. It is satisfiable, which is all key generation needs.
    pub fn blank() -> Self {
        Self {
            key: Fr::from(0u64),
            amounts: [Fr::from(0u64); NUM_AMOUNTS],
            clear_sum: Fr::from(0u64),
            encrypted: [Fr::from(0u64); NUM_AMOUNTS],
            enc_sum: Fr::from(0u64),
        }
    }

    /// Public inputs in allocation order: clear sum, ciphertexts, encrypted sum.
    pub fn public_inputs(&self) -> Vec<Fr> {
        let mut v = Vec::with_capacity(NUM_PUBLIC_INPUTS);
        v.push(self.clear_sum);
        v.extend_from_slice(&self.encrypted);
        v.push(self.enc_sum);
        v
    }
}

impl ConstraintSynthesizer<Fr> for MaskedSumCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        // --- Public inputs ---
        // IMPORTANT: ordering MUST match `public_inputs`.
        let clear_sum = FpVar::<Fr>::new_input(cs.clone(), || Ok(self.clear_sum))?;
        let mut encrypted = Vec::<FpVar<Fr>>::with_capacity(NUM_AMOUNTS);
        for c in self.encrypted {
            encrypted.push(FpVar::<Fr>::new_input(cs.clone(), || Ok(c))?);
        }
        let enc_sum = FpVar::<Fr>::new_input(cs.clone(), || Ok(self.enc_sum))?;

        // --- Witness ---
        let key = FpVar::<Fr>::new_witness(cs.clone(), || Ok(self.key))?;

        let mut amount_acc = FpVar::<Fr>::zero();
        let mut enc_acc = FpVar::<Fr>::zero();

        for (amount, ciphertext) in self.amounts.into_iter().zip(encrypted.iter()) {
            let amount = FpVar::<Fr>::new_witness(cs.clone(), || Ok(amount))?;

            // Masking: ciphertext == amount * key.
            let masked = &amount * &key;
            masked.enforce_equal(ciphertext)?;

            amount_acc += amount;
            enc_acc += ciphertext.clone();
        }

        amount_acc.enforce_equal(&clear_sum)?;
        enc_acc.enforce_equal(&enc_sum)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::serialize_witness_args;
    use crate::cipher::{HomomorphicCipher, MaskingKey};
    use crate::verifier::verify;
    use ark_relations::r1cs::ConstraintSystem;

    fn honest_circuit() -> MaskedSumCircuit {
        let cipher = HomomorphicCipher::new(MaskingKey::new(12345).unwrap());
        let bundle = verify(&[10, 15, 20, -10, 10], &cipher).unwrap();
        MaskedSumCircuit::from_witness(&serialize_witness_args(&bundle))
    }

    fn is_satisfied(circuit: MaskedSumCircuit) -> bool {
        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        cs.is_satisfied().unwrap()
    }

    #[test]
    fn honest_witness_satisfies() {
        let circuit = honest_circuit();
        // -10 wraps, so the clear sum is 45 once reduced.
        assert_eq!(circuit.clear_sum, Fr::from(45u64));
        assert!(is_satisfied(circuit));
    }

    #[test]
    fn blank_instance_satisfies() {
        assert!(is_satisfied(MaskedSumCircuit::blank()));
    }

    #[test]
    fn tampered_ciphertext_is_unsatisfied() {
        let mut circuit = honest_circuit();
        circuit.encrypted[2] += Fr::from(1u64);
        assert!(!is_satisfied(circuit));
    }

    #[test]
    fn wrong_clear_sum_is_unsatisfied() {
        let mut circuit = honest_circuit();
        circuit.clear_sum = Fr::from(46u64);
        assert!(!is_satisfied(circuit));
    }

    #[test]
    fn public_input_count() {
        assert_eq!(honest_circuit().public_inputs().len(), NUM_PUBLIC_INPUTS);
    }
}
