//! The prover boundary.
//!
//! A [`ProverService`] takes a witness and blocks until it has a proof artifact or an error. The
//! process-backed [`ZokratesProver`] runs the ZoKrates toolchain in a container, one scratch
//! directory per run; `crate::groth16::Groth16Prover` proves in process.

use crate::artifact::parse_proof_artifact;
use crate::error::ZkError;
use crate::types::{ProofArtifact, WitnessArgs};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

/// Circuit source expected inside the circuit directory.
pub const CIRCUIT_FILE: &str = "root.zok";

/// Artifact ZoKrates writes into the run directory.
pub const ARTIFACT_FILE: &str = "proof.json";

pub const DEFAULT_ZOKRATES_IMAGE: &str = "zokrates/zokrates";

pub trait ProverService: Send + Sync {
    /// Submit a witness and block until the prover yields an artifact or fails.
    fn prove(&self, witness: &WitnessArgs) -> Result<ProofArtifact, ZkError>;
}

/// Runs `compile → setup → compute-witness → generate-proof [→ verify]` in the ZoKrates image.
#[derive(Clone, Debug)]
pub struct ZokratesProver {
    circuit_dir: PathBuf,
    work_root: Option<PathBuf>,
    image: String,
    docker_bin: PathBuf,
    self_verify: bool,
}

impl ZokratesProver {
    pub fn new(circuit_dir: impl Into<PathBuf>) -> Self {
        Self {
            circuit_dir: circuit_dir.into(),
            work_root: None,
            image: DEFAULT_ZOKRATES_IMAGE.to_string(),
            docker_bin: PathBuf::from("docker"),
            self_verify: true,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Container runtime binary; anything CLI-compatible with `docker run` works.
    pub fn with_docker_bin(mut self, docker_bin: impl Into<PathBuf>) -> Self {
        self.docker_bin = docker_bin.into();
        self
    }

    /// Where per-run directories are created. Defaults to the system temp dir; set it when the
    /// container runtime can only mount paths below a shared root.
    pub fn with_work_root(mut self, work_root: impl Into<PathBuf>) -> Self {
        self.work_root = Some(work_root.into());
        self
    }

    pub fn with_self_verify(mut self, self_verify: bool) -> Self {
        self.self_verify = self_verify;
        self
    }

    pub fn circuit_dir(&self) -> &Path {
        &self.circuit_dir
    }

    /// The shell command run inside the container.
    pub fn script(&self, witness: &WitnessArgs) -> String {
        let mut steps = vec![
            format!("zokrates compile -i {CIRCUIT_FILE}"),
            "zokrates setup".to_string(),
            format!("zokrates compute-witness -a {witness}"),
            "zokrates generate-proof".to_string(),
        ];
        if self.self_verify {
            steps.push("zokrates verify".to_string());
        }
        steps.join(" && ")
    }

    /// Fresh directory holding only a copy of the circuit.
    ///
    /// ZoKrates writes `out`, `proving.key`, `witness` and `proof.json` next to the circuit, so
    /// runs must not share a directory.
    fn run_dir(&self) -> Result<tempfile::TempDir, ZkError> {
        let source = self.circuit_dir.join(CIRCUIT_FILE);
        let mut builder = tempfile::Builder::new();
        builder.prefix("zk-sum-run-");
        let dir = match &self.work_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| ZkError::ExternalProverFailure(format!("cannot create run dir: {e}")))?;

        std::fs::copy(&source, dir.path().join(CIRCUIT_FILE))
            .map_err(|e| ZkError::ExternalProverFailure(format!("circuit {}: {e}", source.display())))?;
        Ok(dir)
    }
}

impl ProverService for ZokratesProver {
    fn prove(&self, witness: &WitnessArgs) -> Result<ProofArtifact, ZkError> {
        let run_dir = self.run_dir()?;
        let dir = std::fs::canonicalize(run_dir.path())
            .map_err(|e| ZkError::ExternalProverFailure(format!("run dir {}: {e}", run_dir.path().display())))?;

        info!(image = %self.image, dir = %dir.display(), "running zokrates");

        let volume = format!("{}:/work", dir.display());
        let output = Command::new(&self.docker_bin)
            .args(["run", "--rm", "-v", &volume, "-w", "/work", &self.image, "/bin/bash", "-c"])
            .arg(self.script(witness))
            .output()
            .map_err(|e| {
                ZkError::ExternalProverFailure(format!("failed to execute {}: {e}", self.docker_bin.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "zokrates run failed");
            return Err(ZkError::ExternalProverFailure(format!(
                "prover exited with status {}\nstderr: {}",
                output.status, stderr
            )));
        }

        let artifact_path = dir.join(ARTIFACT_FILE);
        let raw = std::fs::read(&artifact_path).map_err(|e| {
            ZkError::ExternalProverFailure(format!("no artifact at {}: {e}", artifact_path.display()))
        })?;

        parse_proof_artifact(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::serialize_witness_args;
    use crate::cipher::{HomomorphicCipher, MaskingKey};
    use crate::verifier::verify;

    fn witness() -> WitnessArgs {
        let cipher = HomomorphicCipher::new(MaskingKey::new(12345).unwrap());
        serialize_witness_args(&verify(&[10, 15, 20, -10, 10], &cipher).unwrap())
    }

    #[test]
    fn script_passes_witness_line() {
        let w = witness();
        let script = ZokratesProver::new("circuits").script(&w);
        assert!(script.starts_with("zokrates compile -i root.zok && zokrates setup"));
        assert!(script.contains(&format!("compute-witness -a {w} &&")));
        assert!(script.ends_with("zokrates verify"));
    }

    #[test]
    fn script_without_self_verify() {
        let script = ZokratesProver::new("circuits").with_self_verify(false).script(&witness());
        assert!(script.ends_with("zokrates generate-proof"));
    }

    #[test]
    fn missing_circuit_dir_fails() {
        let err = ZokratesProver::new("/nonexistent/zk-sum-circuits").prove(&witness()).unwrap_err();
        assert!(matches!(err, ZkError::ExternalProverFailure(_)));
    }
}
