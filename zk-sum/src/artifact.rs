//! Boundary transforms between the host pipeline and a prover.
//!
//! Outbound: the verified bundle becomes the ordered witness vector. Inbound: the prover's JSON
//! artifact becomes a typed [`ProofArtifact`]. Point encodings are kept exactly as emitted.

use crate::error::ZkError;
use crate::types::{GroupElement, ProofArtifact, ProofScalar, ProofTriple, VerifiedBundle, WitnessArgs};
use serde_json::{Map, Value};

/// Lay out a verified bundle in circuit parameter order.
pub fn serialize_witness_args(bundle: &VerifiedBundle) -> WitnessArgs {
    WitnessArgs {
        key: bundle.key,
        amounts: bundle.normalized.clone(),
        clear_sum: bundle.clear_sum.clone(),
        encrypted: bundle.encrypted.clone(),
        enc_sum: bundle.enc_sum.clone(),
    }
}

/// Parse a prover artifact of the form `{"proof": {"a", "b", "c"}, "inputs": [...]}`.
///
/// Extra top-level fields (`scheme`, `curve`, ...) are ignored.
pub fn parse_proof_artifact(raw: &[u8]) -> Result<ProofArtifact, ZkError> {
    let root: Value =
        serde_json::from_slice(raw).map_err(|e| ZkError::malformed("<root>", format!("invalid JSON: {e}")))?;
    let root = root
        .as_object()
        .ok_or_else(|| ZkError::malformed("<root>", "expected an object"))?;

    let proof = root
        .get("proof")
        .ok_or_else(|| ZkError::malformed("proof", "missing"))?
        .as_object()
        .ok_or_else(|| ZkError::malformed("proof", "expected an object"))?;

    let triple = ProofTriple {
        a: group_element(proof, "a")?,
        b: group_element(proof, "b")?,
        c: group_element(proof, "c")?,
    };

    let inputs = root
        .get("inputs")
        .ok_or_else(|| ZkError::malformed("inputs", "missing"))?;
    let inputs: Vec<ProofScalar> = serde_json::from_value(inputs.clone())
        .map_err(|_| ZkError::malformed("inputs", "expected an array of strings or numbers"))?;
    exact("inputs", &inputs)?;

    Ok(ProofArtifact { proof: triple, inputs })
}

fn group_element(proof: &Map<String, Value>, name: &str) -> Result<GroupElement, ZkError> {
    let field = format!("proof.{name}");
    let value = proof
        .get(name)
        .ok_or_else(|| ZkError::malformed(&field, "missing"))?;
    let point: GroupElement = serde_json::from_value(value.clone())
        .map_err(|_| ZkError::malformed(&field, "expected [x, y] or [[x0, x1], [y0, y1]]"))?;
    exact(&field, point.scalars())?;
    Ok(point)
}

fn exact(field: &str, scalars: &[ProofScalar]) -> Result<(), ZkError> {
    match scalars.iter().find(|s| !s.is_exact()) {
        Some(s) => Err(ZkError::malformed(
            field,
            format!("{s} is not an exact integer; field elements must be emitted as strings"),
        )),
        None => Ok(()),
    }
}
