//! Role-based extractor guards.
//!
//! Handlers that belong to a single side of the conversation take one of these instead of
//! the bare `AuthenticatedUser`. Finer-grained rules (which operator role may perform which
//! hand-off) live in the services, which receive the principal explicitly.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn authenticated(parts: &Parts) -> Result<AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .copied()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for citizen-only endpoints (report submission, notifications).
pub struct RequireCitizen(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireCitizen
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_citizen() {
            return Err(AppError::Forbidden("Citizen access required".to_string()));
        }

        Ok(RequireCitizen(user))
    }
}

/// Guard for endpoints open to any operator role.
pub struct RequireOperator(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireOperator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_operator() {
            return Err(AppError::Forbidden("Operator access required".to_string()));
        }

        Ok(RequireOperator(user))
    }
}
