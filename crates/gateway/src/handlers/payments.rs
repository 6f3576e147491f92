//! Payment checkout and verification handlers

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
use scholarflow_workflow::payment::{Checkout, PaymentRecord};

/// Checkout initiation; a plan id selects a configured plan fee
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub plan_id: Option<String>,
}

/// Gateway callback carrying the ids and checkout signature
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Initiate checkout for a manuscript awaiting payment
pub async fn checkout(
    State(state): State<AppState>,
    ctx: RoleContext,
    Path(id): Path<Uuid>,
    request: Option<Json<CheckoutRequest>>,
) -> Result<Json<Checkout>> {
    ctx.require_role(Role::Publisher)?;

    let plan = request.as_ref().and_then(|r| r.plan_id.as_deref());
    let checkout = state.gate.initiate_checkout(id, plan).await?;
    Ok(Json(checkout))
}

/// Verify a payment callback; the signature is the proof of authenticity,
/// so no role beyond an authenticated caller is required
pub async fn verify(
    State(state): State<AppState>,
    ctx: RoleContext,
    Path(id): Path<Uuid>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<PaymentRecord>> {
    let record = state
        .gate
        .verify(
            id,
            &request.payment_id,
            &request.order_id,
            &request.signature,
            ctx.actor_id,
        )
        .await?;
    Ok(Json(record))
}
