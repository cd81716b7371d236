use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::errors::AppError;
use crate::models::prediction::{PredictionRecord, PredictionRow};

/// Read-only access to stored prediction records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// `Ok(None)` when no record has this id. Rows that exist but cannot be
    /// validated surface as `RenderFailure`.
    async fn find(&self, prediction_id: &str) -> Result<Option<PredictionRecord>, AppError>;
}

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find(&self, prediction_id: &str) -> Result<Option<PredictionRecord>, AppError> {
        let row: Option<PredictionRow> = sqlx::query_as(
            r#"
            SELECT prediction_id, user_id, user_snapshot, kind, prediction, confidence,
                   model_metrics, gradcam, input_data, timestamp
            FROM results
            WHERE prediction_id = $1
            "#,
        )
        .bind(prediction_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                debug!(prediction_id, kind = %row.kind, "Loaded prediction record");
                Ok(Some(PredictionRecord::try_from(row)?))
            }
            None => Ok(None),
        }
    }
}
