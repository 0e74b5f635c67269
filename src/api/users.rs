// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User registration endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::ApiError, models::User, state::AppState};

/// Request to register a new user.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Desired username, globally unique.
    pub username: String,
    /// Opaque credential, stored as given.
    pub password: String,
}

/// A registered user as returned to the caller.
///
/// The access token returned here is the caller's only credential; it is
/// shown exactly once, at registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Access token to present in `x-api-key` on every subsequent call.
    pub api_key: Uuid,
    pub username: String,
    pub password: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            api_key: user.api_key,
            username: user.username,
            password: user.password,
        }
    }
}

/// Envelope for a single user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

/// Register a new user and hand back their access token.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserEnvelope),
        (status = 409, description = "Username already taken"),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), ApiError> {
    let user = state
        .ledger
        .create_user(User::new(request.username, request.password))?;

    tracing::info!(username = %user.username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope { user: user.into() }),
    ))
}
