//! Command-line and environment configuration.

use clap::{Args, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::path::PathBuf;
use zk_sum::pipeline::PipelineOptions;
use zk_sum::prover::DEFAULT_ZOKRATES_IMAGE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProverBackend {
    /// In-process arkworks Groth16 prover.
    Groth16,
    /// ZoKrates toolchain in a container.
    Zokrates,
}

#[derive(Args, Clone, Debug)]
pub struct ProverArgs {
    #[arg(long, env = "PROVER", value_enum, default_value_t = ProverBackend::Groth16)]
    pub prover: ProverBackend,

    /// Local state: Groth16 keys and the run ledger.
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory holding root.zok. Each run compiles a private copy.
    #[arg(long, env = "CIRCUIT_DIR", default_value = "zk-sum/circuits")]
    pub circuit_dir: PathBuf,

    /// Parent of the per-run ZoKrates directories (system temp dir if unset).
    #[arg(long, env = "ZOKRATES_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_ZOKRATES_IMAGE)]
    pub zokrates_image: String,

    #[arg(long, default_value = "docker")]
    pub docker_bin: PathBuf,

    /// Return proofs without checking them against the verifying key first.
    #[arg(long)]
    pub skip_self_verify: bool,
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Seed the key/shuffle RNG for a reproducible run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep the amounts in the order given.
    #[arg(long)]
    pub no_shuffle: bool,
}

impl RunArgs {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions { shuffle: !self.no_shuffle }
    }

    pub fn rng(&self) -> ChaCha20Rng {
        match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct AmountArgs {
    /// The five transaction amounts; negative values are allowed.
    #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
    pub amounts: Vec<i64>,
}

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "BACKEND_ADDR", default_value = "127.0.0.1:8080")]
    pub addr: String,

    /// Required in the X-API-KEY header of POST requests.
    #[arg(long, env = "API_KEY", default_value = "dev-secret-key")]
    pub api_key: String,

    #[arg(long)]
    pub no_shuffle: bool,

    #[command(flatten)]
    pub prover: ProverArgs,
}

#[derive(Args, Clone, Debug)]
pub struct ProveArgs {
    #[command(flatten)]
    pub amounts: AmountArgs,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(flatten)]
    pub prover: ProverArgs,
}

#[derive(Args, Clone, Debug)]
pub struct WitnessCmdArgs {
    #[command(flatten)]
    pub amounts: AmountArgs,

    #[command(flatten)]
    pub run: RunArgs,

    /// Also write the witness line to this file.
    #[arg(long)]
    pub out: Option<PathBuf>,
}
