// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Statistics endpoint, readable only by the privileged token.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{auth::ApiKey, error::ApiError, models::Statistic, state::AppState};

/// Envelope for the cumulative statistics row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatisticEnvelope {
    pub statistics: Statistic,
}

/// Read the cumulative transfer count and collected commission.
///
/// Gated on the privileged token the deployment was configured with; any
/// other caller gets 403 regardless of how much activity they generated.
#[utoipa::path(
    get,
    path = "/statistics",
    tag = "Statistics",
    responses(
        (status = 200, description = "Cumulative statistics", body = StatisticEnvelope),
        (status = 403, description = "Caller is not the privileged token"),
    )
)]
pub async fn show_statistics(
    ApiKey(api_key): ApiKey,
    State(state): State<AppState>,
) -> Result<Json<StatisticEnvelope>, ApiError> {
    let statistics = state.ledger.statistics(api_key)?;
    Ok(Json(StatisticEnvelope { statistics }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use uuid::Uuid;

    use super::*;
    use crate::api::test_support::{make_user, make_wallet, memory_state};
    use crate::api::transactions::{create_transaction, CreateTransferRequest};
    use crate::auth::ApiKey;
    use crate::config::COMMISSION_RATE;

    #[tokio::test]
    async fn only_privileged_token_may_read() {
        let (state, admin) = memory_state();
        let alice = make_user(&state, "alice");

        let err = show_statistics(ApiKey(alice), State(state.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let Json(envelope) = show_statistics(ApiKey(admin), State(state)).await.unwrap();
        assert_eq!(envelope.statistics.transaction_count, 0);
    }

    #[tokio::test]
    async fn commission_accumulates_per_transfer() {
        let (state, admin) = memory_state();
        let alice = make_user(&state, "alice");
        let bob = make_user(&state, "bob");
        let source = make_wallet(&state, alice);
        let dest = make_wallet(&state, bob);

        let amount = 10_000u64;
        create_transaction(
            ApiKey(alice),
            State(state.clone()),
            Json(CreateTransferRequest {
                wallet_from: source,
                wallet_to: dest,
                amount,
            }),
        )
        .await
        .unwrap();

        let Json(envelope) = show_statistics(ApiKey(admin), State(state)).await.unwrap();
        assert_eq!(envelope.statistics.transaction_count, 1);
        assert_eq!(
            envelope.statistics.commission_total,
            (amount as f64 * COMMISSION_RATE).round() as u64
        );
    }

    #[tokio::test]
    async fn unknown_token_is_forbidden_too() {
        let (state, _) = memory_state();
        let err = show_statistics(ApiKey(Uuid::new_v4()), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }
}
