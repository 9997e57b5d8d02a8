//! Types shared between the masking scheme, the proof adapters and the prover backends.

use crate::constants::{NUM_AMOUNTS, NUM_WITNESS_ARGS};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A signed transaction value.
///
/// Amounts are 64-bit, which keeps `|amount| < p` true for every representable value.
pub type Amount = i64;

/// An amount mapped into `[0, p)`.
pub type FieldElement = BigUint;

/// A masked field element: `field_element * key`, never reduced modulo `p`.
pub type Ciphertext = BigUint;

/// Everything the sum check produced for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedBundle {
    pub key: u64,
    pub normalized: [FieldElement; NUM_AMOUNTS],
    pub clear_sum: BigUint,
    pub encrypted: [Ciphertext; NUM_AMOUNTS],
    pub enc_sum: Ciphertext,
}

/// The witness handed to a prover.
///
/// Field order follows the circuit's parameter order and is a contract with the prover:
/// key, normalized amounts, clear sum, ciphertexts, encrypted sum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WitnessArgs {
    pub key: u64,
    pub amounts: [FieldElement; NUM_AMOUNTS],
    pub clear_sum: BigUint,
    pub encrypted: [Ciphertext; NUM_AMOUNTS],
    pub enc_sum: Ciphertext,
}

impl WitnessArgs {
    /// The witness as an ordered vector of integers.
    pub fn to_values(&self) -> Vec<BigUint> {
        let mut v = Vec::with_capacity(NUM_WITNESS_ARGS);
        v.push(BigUint::from(self.key));
        v.extend(self.amounts.iter().cloned());
        v.push(self.clear_sum.clone());
        v.extend(self.encrypted.iter().cloned());
        v.push(self.enc_sum.clone());
        v
    }
}

/// Renders the single-line, space separated decimal form the prover CLI consumes.
impl fmt::Display for WitnessArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.to_values().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// One coordinate or public input as emitted by the prover, kept verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProofScalar {
    Text(String),
    Number(serde_json::Number),
}

impl ProofScalar {
    /// False for numbers `serde_json` could only hold as `f64`: fractions, and integers too wide
    /// for 64 bits, which have already lost digits.
    pub fn is_exact(&self) -> bool {
        !matches!(self, ProofScalar::Number(n) if n.is_f64())
    }
}

impl fmt::Display for ProofScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofScalar::Text(s) => f.write_str(s),
            ProofScalar::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A curve point encoding.
///
/// G1 points arrive as `[x, y]`, G2 points as `[[x0, x1], [y0, y1]]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupElement {
    Pair([ProofScalar; 2]),
    PairOfPairs([[ProofScalar; 2]; 2]),
}

impl GroupElement {
    pub fn scalars(&self) -> &[ProofScalar] {
        match self {
            GroupElement::Pair(p) => p.as_slice(),
            GroupElement::PairOfPairs(pp) => pp.as_flattened(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProofTriple {
    pub a: GroupElement,
    pub b: GroupElement,
    pub c: GroupElement,
}

/// The prover's output record: the proof triple plus the public inputs it attests to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProofArtifact {
    pub proof: ProofTriple,
    pub inputs: Vec<ProofScalar>,
}

impl ProofArtifact {
    /// `[a, b, c]` as a JSON array, the form verifier contracts take.
    pub fn proof_json(&self) -> serde_json::Value {
        serde_json::json!([self.proof.a, self.proof.b, self.proof.c])
    }

    pub fn inputs_json(&self) -> serde_json::Value {
        serde_json::json!(self.inputs)
    }
}
