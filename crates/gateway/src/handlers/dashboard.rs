//! Publisher dashboard handler

use axum::{extract::State, Json};

use crate::AppState;
use scholarflow_common::{
    auth::{Role, RoleContext},
    errors::Result,
};
use scholarflow_workflow::reporting::DashboardSummary;

/// Reporting summary for the publisher dashboard
pub async fn summary(
    State(state): State<AppState>,
    ctx: RoleContext,
) -> Result<Json<DashboardSummary>> {
    ctx.require_role(Role::Publisher)?;

    let manuscripts = state.engine.list().await;
    Ok(Json(DashboardSummary::compute(&manuscripts)))
}
