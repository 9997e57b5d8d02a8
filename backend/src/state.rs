use crate::config::{ProverArgs, ProverBackend};
use crate::db::Db;
use crate::errors::ApiError;
use anyhow::Context;
use ark_bn254::Bn254;
use ark_groth16::VerifyingKey;
use rand::rngs::OsRng;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;
use zk_sum::groth16::{deserialize_pk, deserialize_vk, serialize_pk, serialize_vk, Groth16Prover};
use zk_sum::pipeline::PipelineOptions;
use zk_sum::prover::{ProverService, ZokratesProver};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub api_key: Arc<str>,
    pub options: PipelineOptions,
    prover_args: Arc<ProverArgs>,
    prover: Arc<OnceCell<ProverHandle>>,
}

#[derive(Clone)]
pub struct ProverHandle {
    pub name: &'static str,
    pub service: Arc<dyn ProverService>,
    /// Present for the Groth16 backend only; ZoKrates keeps its keys in the circuit dir.
    pub vk: Option<Arc<VerifyingKey<Bn254>>>,
}

impl AppState {
    pub fn new(db: Db, api_key: String, options: PipelineOptions, prover_args: ProverArgs) -> Self {
        Self {
            db,
            api_key: api_key.into(),
            options,
            prover_args: Arc::new(prover_args),
            prover: Arc::new(OnceCell::new()),
        }
    }

    /// Build the configured prover on first use.
    ///
    /// For Groth16 this runs the trusted setup (prototype) unless keys are cached on disk.
    pub async fn ensure_prover(&self) -> Result<ProverHandle, ApiError> {
        let args = self.prover_args.clone();

        self.prover
            .get_or_try_init(|| async move {
                tokio::task::spawn_blocking(move || {
                    build_prover(&args).map_err(|e| {
                        tracing::error!(error = %format!("{e:#}"), "failed to initialise prover");
                        ApiError::Internal
                    })
                })
                .await
                .map_err(|_| ApiError::Internal)?
            })
            .await
            .cloned()
    }
}

pub fn build_prover(args: &ProverArgs) -> anyhow::Result<ProverHandle> {
    match args.prover {
        ProverBackend::Groth16 => {
            let prover = load_or_setup_groth16(&args.data_dir)?.with_self_verify(!args.skip_self_verify);
            let vk = Arc::new(prover.verifying_key().clone());
            Ok(ProverHandle { name: "groth16", service: Arc::new(prover), vk: Some(vk) })
        }
        ProverBackend::Zokrates => {
            let mut prover = ZokratesProver::new(&args.circuit_dir)
                .with_image(args.zokrates_image.clone())
                .with_docker_bin(args.docker_bin.clone())
                .with_self_verify(!args.skip_self_verify);
            if let Some(work_dir) = &args.work_dir {
                prover = prover.with_work_root(work_dir);
            }
            Ok(ProverHandle { name: "zokrates", service: Arc::new(prover), vk: None })
        }
    }
}

/// Load Groth16 keys from `<data_dir>/keys`, running setup and caching them if absent.
pub fn load_or_setup_groth16(data_dir: &Path) -> anyhow::Result<Groth16Prover> {
    let keys_dir = data_dir.join("keys");
    std::fs::create_dir_all(&keys_dir).with_context(|| format!("creating {}", keys_dir.display()))?;

    let pk_path = keys_dir.join("groth16_pk.bin");
    let vk_path = keys_dir.join("groth16_vk.bin");

    if pk_path.exists() && vk_path.exists() {
        let pk_bytes = std::fs::read(&pk_path).with_context(|| format!("reading {}", pk_path.display()))?;
        let vk_bytes = std::fs::read(&vk_path).with_context(|| format!("reading {}", vk_path.display()))?;

        let pk = deserialize_pk(&pk_bytes).context("decoding proving key")?;
        let vk = deserialize_vk(&vk_bytes).context("decoding verifying key")?;

        tracing::debug!(dir = %keys_dir.display(), "loaded cached groth16 keys");
        return Ok(Groth16Prover::from_keys(pk, vk));
    }

    // Trusted setup randomness (prototype).
    let prover = Groth16Prover::setup(&mut OsRng)?;

    std::fs::write(&pk_path, serialize_pk(prover.proving_key())?).with_context(|| format!("writing {}", pk_path.display()))?;
    std::fs::write(&vk_path, serialize_vk(prover.verifying_key())?).with_context(|| format!("writing {}", vk_path.display()))?;

    tracing::info!(dir = %keys_dir.display(), "generated groth16 keys");
    Ok(prover)
}
