//! Final decision handler

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use scholarflow_common::{
    auth::{Role, RoleContext},
    errors::Result,
};
use scholarflow_workflow::{engine::FinalVerdict, model::Manuscript};

/// The editor's binding decision. A decision contradicting the reviewer
/// aggregate must carry an `override_reason`.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: FinalVerdict,
    #[serde(default)]
    pub override_reason: Option<String>,
}

/// Record the final editorial decision
pub async fn record_decision(
    State(state): State<AppState>,
    ctx: RoleContext,
    Path(id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<Manuscript>> {
    ctx.require_role(Role::Editor)?;

    let manuscript = state
        .engine
        .record_decision(id, request.decision, request.override_reason, ctx.actor_id)
        .await?;
    Ok(Json(manuscript))
}
