//! Manuscript management handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use scholarflow_common::{
    auth::{Role, RoleContext},
    errors::{AppError, Result},
};
use scholarflow_workflow::{
    engine::{Resubmission, Submission},
    model::{Author, Files, Manuscript, Sections, TransitionEvent},
    state::WorkflowState,
};

/// Request to submit a new manuscript
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitManuscriptRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[validate(length(min = 1, max = 50000))]
    #[serde(rename = "abstract")]
    pub abstract_text: String,

    #[serde(default)]
    pub sections: Sections,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[validate(length(min = 1), nested)]
    pub authors: Vec<AuthorInput>,

    #[serde(default)]
    pub files: Files,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AuthorInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 300))]
    pub university: String,

    pub affiliation: Option<String>,
}

impl From<AuthorInput> for Author {
    fn from(a: AuthorInput) -> Self {
        Author {
            name: a.name,
            email: a.email,
            university: a.university,
            affiliation: a.affiliation,
        }
    }
}

/// Request to assign or replace the handling editor
#[derive(Debug, Deserialize)]
pub struct AssignEditorRequest {
    pub editor_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<WorkflowState>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub manuscripts: Vec<Manuscript>,
    pub total: usize,
}

/// Whether this caller may see confidential reviewer comments
fn sees_confidential(ctx: &RoleContext) -> bool {
    ctx.has_role(Role::Editor) || ctx.has_role(Role::Publisher)
}

/// Submit a new manuscript
pub async fn submit(
    State(state): State<AppState>,
    ctx: RoleContext,
    Json(request): Json<SubmitManuscriptRequest>,
) -> Result<(StatusCode, Json<Manuscript>)> {
    ctx.require_role(Role::Author)?;

    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let submission = Submission {
        title: request.title,
        abstract_text: request.abstract_text,
        sections: request.sections,
        keywords: request.keywords,
        authors: request.authors.into_iter().map(Author::from).collect(),
        files: request.files,
    };

    let manuscript = state.engine.submit(ctx.actor_id, submission).await?;
    Ok((StatusCode::CREATED, Json(manuscript)))
}

/// Get a manuscript by ID; confidential comments stripped for
/// author-facing callers
pub async fn get(
    State(state): State<AppState>,
    ctx: RoleContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Manuscript>> {
    let manuscript = state.engine.manuscript(id).await?;
    let manuscript = if sees_confidential(&ctx) {
        manuscript
    } else {
        manuscript.redacted()
    };
    Ok(Json(manuscript))
}

/// List manuscripts, scoped to the caller's role
pub async fn list(
    State(state): State<AppState>,
    ctx: RoleContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>> {
    let mut manuscripts = state.engine.list().await;

    if let Some(status) = query.status {
        manuscripts.retain(|m| m.status == status);
    }

    match ctx.role {
        Role::Editor => manuscripts.retain(|m| m.editor == Some(ctx.actor_id)),
        Role::Reviewer => manuscripts.retain(|m| {
            m.rounds
                .iter()
                .any(|r| r.entries.iter().any(|e| e.reviewer_id == ctx.actor_id))
        }),
        _ => {}
    }

    if !sees_confidential(&ctx) {
        manuscripts = manuscripts.iter().map(Manuscript::redacted).collect();
    }

    let total = manuscripts.len();
    Ok(Json(ListResponse { manuscripts, total }))
}

/// The transition history of a manuscript
pub async fn timeline(
    State(state): State<AppState>,
    _ctx: RoleContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TransitionEvent>>> {
    let events = state.engine.timeline(id).await?;
    Ok(Json(events))
}

/// Assign or replace the handling editor
pub async fn assign_editor(
    State(state): State<AppState>,
    ctx: RoleContext,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignEditorRequest>,
) -> Result<Json<Manuscript>> {
    ctx.require_any(&[Role::Publisher, Role::Admin])?;

    let manuscript = state
        .engine
        .assign_editor(id, request.editor_id, ctx.actor_id)
        .await?;
    Ok(Json(manuscript))
}

/// Resubmit a revised manuscript, opening the next round
pub async fn resubmit(
    State(state): State<AppState>,
    ctx: RoleContext,
    Path(id): Path<Uuid>,
    Json(request): Json<Resubmission>,
) -> Result<Json<Manuscript>> {
    ctx.require_role(Role::Author)?;

    let manuscript = state.engine.resubmit(id, request, ctx.actor_id).await?;
    Ok(Json(manuscript))
}
