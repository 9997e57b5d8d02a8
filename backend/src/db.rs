use crate::errors::ApiError;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use uuid::Uuid;
use zk_sum::types::ProofArtifact;

pub type Db = Pool<Sqlite>;

pub async fn connect(db_url: &str) -> Result<Db, ApiError> {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .map_err(|_| ApiError::Internal)
}

pub async fn init_schema(db: &Db) -> Result<(), ApiError> {
    // A run is written once, when it has finished one way or the other. The witness holds the
    // masking key and the amounts, so it is never stored.
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS runs (
  id TEXT PRIMARY KEY,
  created_at TEXT NOT NULL,
  status TEXT NOT NULL,
  prover TEXT NOT NULL,
  artifact_json TEXT,
  error TEXT
);
"#,
    )
    .execute(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed { artifact: ProofArtifact },
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct RunRow {
    pub created_at: DateTime<Utc>,
    pub prover: String,
    pub outcome: RunOutcome,
}

pub async fn insert_run(db: &Db, run_id: Uuid, prover: &str, outcome: &RunOutcome) -> Result<(), ApiError> {
    let created_at = Utc::now().to_rfc3339();

    let (status, artifact_json, error) = match outcome {
        RunOutcome::Completed { artifact } => {
            let json = serde_json::to_string(artifact).map_err(|_| ApiError::Internal)?;
            ("completed", Some(json), None)
        }
        RunOutcome::Failed { error } => ("failed", None, Some(error.clone())),
    };

    sqlx::query(
        r#"INSERT INTO runs (id, created_at, status, prover, artifact_json, error)
           VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(run_id.to_string())
    .bind(created_at)
    .bind(status)
    .bind(prover)
    .bind(artifact_json)
    .bind(error)
    .execute(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    Ok(())
}

pub async fn get_run(db: &Db, run_id: Uuid) -> Result<Option<RunRow>, ApiError> {
    let row = sqlx::query(
        r#"SELECT created_at, status, prover, artifact_json, error
           FROM runs WHERE id = ?"#,
    )
    .bind(run_id.to_string())
    .fetch_optional(db)
    .await
    .map_err(|_| ApiError::Internal)?;

    let Some(row) = row else { return Ok(None); };

    let created_at: String = row.get(0);
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|_| ApiError::Internal)?
        .with_timezone(&Utc);

    let status: String = row.get(1);
    let prover: String = row.get(2);
    let artifact_json: Option<String> = row.get(3);
    let error: Option<String> = row.get(4);

    let outcome = match (status.as_str(), artifact_json) {
        ("completed", Some(json)) => {
            let artifact = serde_json::from_str(&json).map_err(|_| ApiError::Internal)?;
            RunOutcome::Completed { artifact }
        }
        _ => RunOutcome::Failed {
            error: error.unwrap_or_else(|| "unknown error".to_string()),
        },
    };

    Ok(Some(RunRow { created_at, prover, outcome }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zk_sum::artifact::parse_proof_artifact;

    async fn memory_db() -> Db {
        // Every pooled connection would get its own in-memory database.
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_schema(&db).await.unwrap();
        db
    }

    #[tokio::test]
    async fn completed_run_round_trips() {
        let db = memory_db().await;
        let artifact = parse_proof_artifact(
            br#"{"proof":{"a":["0x1","0x2"],"b":[["0x3","0x4"],["0x5","0x6"]],"c":["0x7","0x8"]},"inputs":["0x2d"]}"#,
        )
        .unwrap();
        let outcome = RunOutcome::Completed { artifact };

        let id = Uuid::new_v4();
        insert_run(&db, id, "groth16", &outcome).await.unwrap();

        let row = get_run(&db, id).await.unwrap().unwrap();
        assert_eq!(row.prover, "groth16");
        assert_eq!(row.outcome, outcome);
    }

    #[tokio::test]
    async fn failed_run_keeps_only_the_error() {
        let db = memory_db().await;
        let id = Uuid::new_v4();
        let outcome = RunOutcome::Failed { error: "external prover failure: exit status 1".into() };
        insert_run(&db, id, "zokrates", &outcome).await.unwrap();

        assert_eq!(get_run(&db, id).await.unwrap().unwrap().outcome, outcome);
        assert!(get_run(&db, Uuid::new_v4()).await.unwrap().is_none());
    }
}
