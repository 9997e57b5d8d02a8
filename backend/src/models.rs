use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zk_sum::types::{ProofArtifact, ProofScalar};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProofRequest {
    /// Exactly five signed transaction amounts.
    pub amounts: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProofResponse {
    pub run_id: Uuid,
    pub prover: String,

    /// `[a, b, c]`, point encodings exactly as the prover emitted them.
    pub proof: serde_json::Value,

    /// Public inputs: clear sum, ciphertexts, encrypted sum.
    pub inputs: Vec<ProofScalar>,
}

impl ProofResponse {
    pub fn new(run_id: Uuid, prover: &str, artifact: &ProofArtifact) -> Self {
        Self {
            run_id,
            prover: prover.to_string(),
            proof: artifact.proof_json(),
            inputs: artifact.inputs.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunGetResponse {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub prover: String,
    pub status: RunStatus,

    pub proof: Option<serde_json::Value>,
    pub inputs: Option<Vec<ProofScalar>>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ZkVkResponse {
    pub curve: String,
    pub proof_system: String,
    pub vk_b64: String,
}
