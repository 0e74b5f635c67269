// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the caller's access token.
//!
//! Possession of the token is the entire proof of identity: whoever presents
//! a user's key in the `x-api-key` header acts as that user. Whether the
//! token belongs to anyone is decided by the store, operation by operation.
//!
//! ```rust,ignore
//! async fn my_handler(ApiKey(api_key): ApiKey) -> impl IntoResponse {
//!     // api_key is the caller's Uuid token
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// Name of the header carrying the caller's access token.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extractor yielding the caller's access token as a [`Uuid`].
///
/// Rejects with 400 when the header is missing or not a valid UUID; an
/// unknown-but-well-formed token passes through and fails later at the
/// store.
#[derive(Debug)]
pub struct ApiKey(pub Uuid);

impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::bad_request("missing x-api-key header"))?;

        let api_key = raw
            .parse::<Uuid>()
            .map_err(|_| ApiError::bad_request("x-api-key is not a valid UUID"))?;

        Ok(Self(api_key))
    }
}
