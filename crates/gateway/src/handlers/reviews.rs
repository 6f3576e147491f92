//! Reviewer assignment and review handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use scholarflow_common::{
    auth::{Role, RoleContext},
    errors::Result,
};
use scholarflow_workflow::{
    engine::ReviewSubmission, model::Manuscript, review::Recommendation, state::WorkflowState,
};

/// Request to assign the current round's reviewers
#[derive(Debug, Deserialize)]
pub struct AssignReviewersRequest {
    pub reviewers: Vec<Uuid>,
}

/// Review submission; the caller is the reviewer
#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub round: u32,
    #[serde(flatten)]
    pub review: ReviewSubmission,
}

#[derive(Serialize)]
pub struct CloseRoundResponse {
    pub round: u32,
    pub decision: Recommendation,
    pub status: WorkflowState,
}

/// Assign reviewers and open the round for review
pub async fn assign_reviewers(
    State(state): State<AppState>,
    ctx: RoleContext,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignReviewersRequest>,
) -> Result<Json<Manuscript>> {
    ctx.require_role(Role::Editor)?;

    let manuscript = state
        .engine
        .assign_reviewers(id, request.reviewers, ctx.actor_id)
        .await?;
    Ok(Json(manuscript))
}

/// Record the calling reviewer's evaluation
pub async fn submit_review(
    State(state): State<AppState>,
    ctx: RoleContext,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<Json<Manuscript>> {
    ctx.require_role(Role::Reviewer)?;

    let manuscript = state
        .engine
        .record_review(id, request.round, ctx.actor_id, request.review)
        .await?;
    Ok(Json(manuscript.redacted()))
}

/// Close a round and advance on the aggregate decision
pub async fn close_round(
    State(state): State<AppState>,
    ctx: RoleContext,
    Path((id, round)): Path<(Uuid, u32)>,
) -> Result<Json<CloseRoundResponse>> {
    ctx.require_role(Role::Editor)?;

    let decision = state.engine.close_round(id, round, ctx.actor_id).await?;
    let manuscript = state.engine.manuscript(id).await?;

    Ok(Json(CloseRoundResponse {
        round,
        decision,
        status: manuscript.status,
    }))
}
