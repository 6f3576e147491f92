//! Role and session context extraction
//!
//! Every workflow operation runs on behalf of an explicit actor; the
//! context is extracted per request rather than kept in ambient global
//! state. Token issuance and storage live with the identity provider,
//! outside this system.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, Result};

/// Platform roles, least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Author,
    Reviewer,
    Editor,
    Publisher,
    Admin,
}

impl Role {
    /// Parse a role from its wire string
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "author" => Some(Role::Author),
            "reviewer" => Some(Role::Reviewer),
            "editor" => Some(Role::Editor),
            "publisher" => Some(Role::Publisher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Wire string for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Author => "author",
            Role::Reviewer => "reviewer",
            Role::Editor => "editor",
            Role::Publisher => "publisher",
            Role::Admin => "admin",
        }
    }
}

/// Extracted actor context available to handlers
#[derive(Debug, Clone)]
pub struct RoleContext {
    /// Acting user id
    pub actor_id: Uuid,

    /// Actor role
    pub role: Role,

    /// Request ID for tracing
    pub request_id: String,
}

impl RoleContext {
    /// Check whether the actor holds the given role (admin passes all checks)
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role || self.role == Role::Admin
    }

    /// Require a specific role, rejected as a role mismatch if not held
    pub fn require_role(&self, role: Role) -> Result<()> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(AppError::RoleMismatch {
                required: role.as_str().to_string(),
            })
        }
    }

    /// Require any of the listed roles
    pub fn require_any(&self, roles: &[Role]) -> Result<()> {
        if roles.iter().any(|r| self.has_role(*r)) {
            Ok(())
        } else {
            let wanted: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
            Err(AppError::RoleMismatch {
                required: wanted.join(", "),
            })
        }
    }
}

/// Axum extractor for RoleContext
impl<S> FromRequestParts<S> for RoleContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        // Extract request ID
        let request_id = parts
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // Extract actor id
        let actor_id = parts
            .headers
            .get("x-actor-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| AppError::Forbidden {
                message: "Missing or invalid X-Actor-ID header".to_string(),
            })?;

        // Extract role
        let role = parts
            .headers
            .get("x-actor-role")
            .and_then(|v| v.to_str().ok())
            .and_then(Role::parse)
            .ok_or_else(|| AppError::Forbidden {
                message: "Missing or invalid X-Actor-Role header".to_string(),
            })?;

        Ok(RoleContext {
            actor_id,
            role,
            request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Role) -> RoleContext {
        RoleContext {
            actor_id: Uuid::new_v4(),
            role,
            request_id: "req-1".to_string(),
        }
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [
            Role::Author,
            Role::Reviewer,
            Role::Editor,
            Role::Publisher,
            Role::Admin,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("janitor"), None);
    }

    #[test]
    fn test_admin_passes_all_checks() {
        let ctx = ctx(Role::Admin);
        assert!(ctx.require_role(Role::Editor).is_ok());
        assert!(ctx.require_role(Role::Publisher).is_ok());
    }

    #[test]
    fn test_wrong_role_is_mismatch() {
        let ctx = ctx(Role::Reviewer);
        let err = ctx.require_role(Role::Editor).unwrap_err();
        assert!(matches!(err, AppError::RoleMismatch { required } if required == "editor"));
        assert!(ctx.require_any(&[Role::Editor, Role::Reviewer]).is_ok());
    }
}
