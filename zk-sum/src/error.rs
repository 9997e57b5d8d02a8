use num_bigint::BigUint;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZkError {
    #[error("invalid argument count: expected {expected}, got {got}")]
    InvalidArgumentCount { expected: usize, got: usize },

    #[error("invalid ciphertext: {ciphertext} is not a multiple of the masking key {key}")]
    InvalidCiphertext { ciphertext: BigUint, key: u64 },

    #[error("sum mismatch: clear sum {clear_sum} != decrypted sum {decrypted_sum}")]
    SumMismatch {
        clear_sum: BigUint,
        decrypted_sum: BigUint,
    },

    #[error("external prover failure: {0}")]
    ExternalProverFailure(String),

    #[error("malformed proof artifact: field `{field}`: {reason}")]
    MalformedProofArtifact { field: String, reason: String },

    #[error("proof verification failed")]
    VerificationFailed,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("arkworks error: {0}")]
    Ark(String),
}

impl ZkError {
    pub(crate) fn malformed(field: &str, reason: impl Into<String>) -> Self {
        ZkError::MalformedProofArtifact {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
