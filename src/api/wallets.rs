// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet endpoints: creation, lookup, and per-wallet history.
//!
//! Balances are rendered in whole coins and, best effort, in USD via the
//! price oracle. Oracle failures omit the USD field; they never fail the
//! request.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    api::transactions::TransactionListEnvelope,
    auth::ApiKey,
    error::ApiError,
    models::Wallet,
    state::AppState,
};

/// A wallet as rendered to its owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WalletResponse {
    /// Wallet address; the handle used in transfers and lookups.
    pub address: Uuid,
    /// Balance in whole coins.
    pub balance_in_coins: f64,
    /// Balance in satoshi, the ledger's unit of account.
    pub balance_in_satoshi: u64,
    /// Balance in USD at the oracle's spot rate, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_in_usd: Option<f64>,
}

impl WalletResponse {
    fn render(wallet: &Wallet, usd_rate: Option<f64>) -> Self {
        let coins = wallet.balance_in_coins();
        Self {
            address: wallet.address,
            balance_in_coins: coins,
            balance_in_satoshi: wallet.balance,
            balance_in_usd: usd_rate.map(|rate| coins * rate),
        }
    }
}

/// Envelope for a single wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WalletEnvelope {
    pub wallet: WalletResponse,
}

/// Create a wallet for the calling user.
///
/// Every wallet starts with one whole coin. A user may own at most the
/// configured maximum number of wallets.
#[utoipa::path(
    post,
    path = "/wallets",
    tag = "Wallets",
    responses(
        (status = 201, description = "Wallet created", body = WalletEnvelope),
        (status = 403, description = "Wallet capacity reached"),
        (status = 404, description = "Unknown access token"),
    )
)]
pub async fn create_wallet(
    ApiKey(api_key): ApiKey,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<WalletEnvelope>), ApiError> {
    let wallet = state.ledger.create_wallet(api_key)?;

    tracing::info!(address = %wallet.address, "wallet created");

    let usd_rate = state.rates.usd_rate().await;
    Ok((
        StatusCode::CREATED,
        Json(WalletEnvelope {
            wallet: WalletResponse::render(&wallet, usd_rate),
        }),
    ))
}

/// Look up one of the caller's wallets by address.
#[utoipa::path(
    get,
    path = "/wallets/{address}",
    tag = "Wallets",
    params(("address" = Uuid, Path, description = "Wallet address")),
    responses(
        (status = 200, description = "Wallet details", body = WalletEnvelope),
        (status = 404, description = "No such wallet for this caller"),
    )
)]
pub async fn show_wallet(
    ApiKey(api_key): ApiKey,
    Path(address): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<WalletEnvelope>, ApiError> {
    let wallet = state.ledger.wallet_of_user(api_key, address)?;
    let usd_rate = state.rates.usd_rate().await;
    Ok(Json(WalletEnvelope {
        wallet: WalletResponse::render(&wallet, usd_rate),
    }))
}

/// Full history of one of the caller's wallets, undeduplicated.
#[utoipa::path(
    get,
    path = "/wallets/{address}/transactions",
    tag = "Wallets",
    params(("address" = Uuid, Path, description = "Wallet address")),
    responses(
        (status = 200, description = "Wallet transaction history", body = TransactionListEnvelope),
        (status = 404, description = "No such wallet for this caller"),
    )
)]
pub async fn show_wallet_transactions(
    ApiKey(api_key): ApiKey,
    Path(address): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<TransactionListEnvelope>, ApiError> {
    // Ownership gate first: someone else's wallet reads as missing.
    state.ledger.wallet_of_user(api_key, address)?;
    let transactions = state.ledger.transactions_of_wallet(address)?;
    Ok(Json(TransactionListEnvelope::from_transactions(
        transactions,
    )))
}
