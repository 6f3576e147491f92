//! Role-gated navigation menu handler

use axum::Json;
use serde::Serialize;

use scholarflow_common::{
    auth::{Role, RoleContext},
    errors::Result,
    nav::{menu_for_role, MenuNode},
};

#[derive(Serialize)]
pub struct NavigationResponse {
    pub role: Role,
    pub menu: Vec<MenuNode>,
}

/// The caller's dashboard menu tree
pub async fn menu(ctx: RoleContext) -> Result<Json<NavigationResponse>> {
    Ok(Json(NavigationResponse {
        role: ctx.role,
        menu: menu_for_role(ctx.role),
    }))
}
