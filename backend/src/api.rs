use crate::db::{self, RunOutcome};
use crate::errors::ApiError;
use crate::models::*;
use crate::state::AppState;
use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use zk_sum::groth16::serialize_vk;
use zk_sum::pipeline::run_pipeline;

pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/v1/proofs", post(create_proof))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/v1/proofs/:id", get(get_proof))
        .route("/api/v1/zk/vk", get(get_vk))
        .merge(protected_routes)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(provided_key) = headers.get("X-API-KEY") {
        if provided_key == &*state.api_key {
            return Ok(next.run(request).await);
        }
    }

    tracing::warn!("unauthorized access attempt");
    Err(StatusCode::UNAUTHORIZED)
}

async fn create_proof(State(state): State<AppState>, Json(req): Json<ProofRequest>) -> Result<Json<ProofResponse>, ApiError> {
    let handle = state.ensure_prover().await?;
    let prover_name = handle.name;
    let options = state.options;

    // Proving blocks for as long as the prover takes; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || {
        let mut rng = ChaCha20Rng::from_entropy();
        run_pipeline(&req.amounts, &mut rng, handle.service.as_ref(), options)
    })
    .await
    .map_err(|_| ApiError::Internal)?;

    let run_id = Uuid::new_v4();
    match result {
        Ok(run) => {
            let response = ProofResponse::new(run_id, prover_name, &run.artifact);
            let outcome = RunOutcome::Completed { artifact: run.artifact };
            db::insert_run(&state.db, run_id, prover_name, &outcome).await?;
            tracing::info!(%run_id, prover = prover_name, "proof run completed");

            Ok(Json(response))
        }
        Err(e) => {
            tracing::warn!(%run_id, error = %e, "proof run failed");
            let outcome = RunOutcome::Failed { error: e.to_string() };
            // The caller gets the prover's error even if the ledger is down.
            if let Err(db_err) = db::insert_run(&state.db, run_id, prover_name, &outcome).await {
                tracing::error!(%run_id, error = %db_err, "failed to record failed run");
            }
            Err(e.into())
        }
    }
}

async fn get_proof(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<RunGetResponse>, ApiError> {
    let Some(row) = db::get_run(&state.db, id).await? else {
        return Err(ApiError::NotFound("run not found".to_string()));
    };

    let response = match row.outcome {
        RunOutcome::Completed { artifact } => RunGetResponse {
            run_id: id,
            created_at: row.created_at,
            prover: row.prover,
            status: RunStatus::Completed,
            proof: Some(artifact.proof_json()),
            inputs: Some(artifact.inputs),
            error: None,
        },
        RunOutcome::Failed { error } => RunGetResponse {
            run_id: id,
            created_at: row.created_at,
            prover: row.prover,
            status: RunStatus::Failed,
            proof: None,
            inputs: None,
            error: Some(error),
        },
    };

    Ok(Json(response))
}

async fn get_vk(State(state): State<AppState>) -> Result<Json<ZkVkResponse>, ApiError> {
    let handle = state.ensure_prover().await?;
    let Some(vk) = handle.vk else {
        return Err(ApiError::NotFound("the configured prover keeps its verifying key outside this service".to_string()));
    };

    let vk_bytes = serialize_vk(vk.as_ref()).map_err(|_| ApiError::Internal)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(vk_bytes);

    Ok(Json(ZkVkResponse {
        curve: "bn254".to_string(),
        proof_system: "groth16".to_string(),
        vk_b64: b64,
    }))
}
