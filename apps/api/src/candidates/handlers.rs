use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::candidates::models::{Candidate, CandidateDetail, CandidateId, CandidatePayload};
use crate::candidates::repository::{find_candidate, StoreError};
use crate::candidates::service::{add_candidate, CandidateError};
use crate::candidates::validation::validate_candidate;
use crate::errors::AppError;
use crate::state::AppState;

/// POST /candidates
///
/// The payload is validated before a connection is taken from the pool. All
/// writes of one request share a transaction; it is committed only when every
/// save succeeded.
pub async fn handle_add_candidate(
    State(state): State<AppState>,
    payload: Result<Json<CandidatePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Candidate>), AppError> {
    let Json(payload) = payload?;
    validate_candidate(&payload).map_err(CandidateError::from)?;

    let mut tx = state.db.begin().await.map_err(StoreError::from)?;
    let candidate = add_candidate(&mut *tx, payload).await?;
    tx.commit().await.map_err(StoreError::from)?;

    info!("Candidate {} committed", candidate.id);
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// GET /candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<CandidateId>,
) -> Result<Json<CandidateDetail>, AppError> {
    match find_candidate(&state.db, id).await {
        Ok(detail) => Ok(Json(detail)),
        Err(StoreError::NotFound) => Err(AppError::NotFound(format!("Candidate {id} not found"))),
        Err(e) => Err(e.into()),
    }
}
