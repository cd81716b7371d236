use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::resolver::{AccessRequest, Authorize, GrantPath, SessionAuthorizer};
use crate::auth::session::resolve_request;
use crate::errors::AppError;
use crate::models::prediction::PredictionRecord;
use crate::report::{render_report, CONTENT_TYPE};
use crate::state::AppState;

const MAX_ID_LEN: usize = 128;

#[derive(Debug, Deserialize)]
pub struct PdfQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub token: String,
    pub share_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Ids are opaque. One the store could never hold is simply not found.
fn check_id(id: &str) -> Result<(), AppError> {
    if id.is_empty() || id.len() > MAX_ID_LEN {
        return Err(AppError::RecordNotFound(id.to_string()));
    }
    Ok(())
}

async fn load_record(state: &AppState, id: &str) -> Result<PredictionRecord, AppError> {
    state
        .records
        .find(id)
        .await?
        .ok_or_else(|| AppError::RecordNotFound(id.to_string()))
}

/// GET /api/results/:id/pdf
pub async fn handle_download_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PdfQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    check_id(&id)?;

    // A token decides on its own; the session is only looked up without one.
    let request = match AccessRequest::from_parts(query.token, None) {
        AccessRequest::Session(_) => {
            AccessRequest::Session(resolve_request(state.sessions.as_ref(), &headers).await?)
        }
        token_request => token_request,
    };

    let record = load_record(&state, &id).await?;
    let grant = request.authorize(&record, &state.tokens, Utc::now())?;
    match &grant.path {
        GrantPath::SharedToken { expires_at } => {
            info!(prediction_id = %grant.record_id, %expires_at, "Report download via sharing token")
        }
        GrantPath::Session { user_id, role } => {
            info!(prediction_id = %grant.record_id, %user_id, ?role, "Report download via session")
        }
    }

    let generated_at = Utc::now();
    let document = tokio::task::spawn_blocking(move || render_report(&record, generated_at))
        .await
        .map_err(|e| AppError::RenderFailure(format!("render task failed: {e}")))??;

    Ok((
        [
            (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, document.content_disposition()),
            (header::CACHE_CONTROL, "private, no-store".to_string()),
        ],
        document.bytes,
    )
        .into_response())
}

/// POST /api/results/:id/share
pub async fn handle_share(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ShareResponse>, AppError> {
    check_id(&id)?;

    let session = resolve_request(state.sessions.as_ref(), &headers).await?;
    let record = load_record(&state, &id).await?;
    SessionAuthorizer::new(session.as_ref()).authorize(&record)?;

    let ttl = Duration::hours(state.config.share_token_ttl_hours);
    let issued = state.tokens.issue(&record.id, ttl, Utc::now()).map_err(|e| {
        warn!(prediction_id = %id, "Could not sign sharing token: {e}");
        AppError::Internal(anyhow::anyhow!("token signing failed: {e}"))
    })?;

    let share_url = format!(
        "{}/api/results/{}/pdf?token={}",
        state.config.public_base_url, record.id, issued.token
    );
    info!(prediction_id = %id, expires_at = %issued.expires_at, "Sharing link issued");

    Ok(Json(ShareResponse {
        token: issued.token,
        share_url,
        expires_at: issued.expires_at,
    }))
}
