//! JWT-based authentication extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use aidlink_core::roles::ROLE_ADMIN;
use aidlink_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Caller identified by the `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Whether the caller owns `owner_id`'s resource or is an admin.
    pub fn can_manage(&self, owner_id: DbId) -> bool {
        self.user_id == owner_id || self.is_admin()
    }
}

/// Decode a Bearer token into an [`AuthUser`]. Shared with the WebSocket
/// upgrade, which passes the token as a query parameter.
pub fn authenticate(token: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;
    Ok(AuthUser {
        user_id: claims.sub,
        role: claims.role,
    })
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid Authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or_else(|| {
            AppError::unauthorized("Invalid Authorization format. Expected: Bearer <token>")
        })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;
        authenticate(token, state)
    }
}

/// Optional authentication for public endpoints whose output depends on
/// the viewer. A missing header yields `None`; a present but invalid token
/// is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(AuthUser::is_admin)
    }

    pub fn can_manage(&self, owner_id: DbId) -> bool {
        self.0.as_ref().is_some_and(|u| u.can_manage(owner_id))
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => authenticate(token, state).map(|u| MaybeAuthUser(Some(u))),
            None => Ok(MaybeAuthUser(None)),
        }
    }
}
