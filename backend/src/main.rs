mod api;
mod config;
mod db;
mod errors;
mod models;
mod state;

use crate::config::{ProveArgs, ServeArgs, WitnessCmdArgs};
use crate::state::{build_prover, AppState};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zk_sum::pipeline::{prepare_witness, run_pipeline, PipelineOptions};

/// Masked transaction sums, proved in zero knowledge.
#[derive(Parser, Debug)]
#[command(name = "sum-backend", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the proof API over HTTP.
    Serve(ServeArgs),
    /// Mask five amounts, prove the sum check and print the proof.
    Prove(ProveArgs),
    /// Mask five amounts and print the prover witness line without proving.
    Witness(WitnessCmdArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Serve(args) => serve(args).await,
        Commands::Prove(args) => tokio::task::spawn_blocking(move || prove(args)).await?,
        Commands::Witness(args) => witness(args),
    }
}

/// `RUST_LOG` if it parses, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let data_dir = args.prover.data_dir.clone();
    std::fs::create_dir_all(&data_dir).with_context(|| format!("creating {}", data_dir.display()))?;

    let db_path = data_dir.join("runs.sqlite");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.to_string_lossy());

    let db = db::connect(&db_url).await?;
    db::init_schema(&db).await?;

    let options = PipelineOptions { shuffle: !args.no_shuffle };
    let state = AppState::new(db, args.api_key, options, args.prover);

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("binding {}", args.addr))?;

    tracing::info!(addr = %args.addr, "backend listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn prove(args: ProveArgs) -> anyhow::Result<()> {
    let handle = build_prover(&args.prover)?;
    let mut rng = args.run.rng();

    let run = run_pipeline(&args.amounts.amounts, &mut rng, handle.service.as_ref(), args.run.pipeline_options())?;

    println!("PROOF:");
    println!("{}", run.artifact.proof_json());
    println!("INPUT:");
    println!("{}", run.artifact.inputs_json());
    Ok(())
}

fn witness(args: WitnessCmdArgs) -> anyhow::Result<()> {
    let mut rng = args.run.rng();
    let (_, witness) = prepare_witness(&args.amounts.amounts, &mut rng, args.run.pipeline_options())?;

    let line = witness.to_string();
    println!("{line}");

    if let Some(out) = args.out {
        std::fs::write(&out, &line).with_context(|| format!("writing {}", out.display()))?;
    }
    Ok(())
}
