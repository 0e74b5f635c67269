// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer endpoints: executing a transfer and the caller's history.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::ApiKey,
    error::ApiError,
    ledger::Transfer,
    models::Transaction,
    state::AppState,
};

/// Request to move satoshi between two wallets.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct CreateTransferRequest {
    /// Source wallet address; must be owned by the caller.
    pub wallet_from: Uuid,
    /// Destination wallet address.
    pub wallet_to: Uuid,
    /// Amount in satoshi to debit from the source.
    pub amount: u64,
}

/// A recorded transfer as rendered to callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionItem {
    pub id: Uuid,
    pub wallet_from: Uuid,
    pub wallet_to: Uuid,
    /// Amount debited from the source, in satoshi.
    pub amount: u64,
}

impl From<Transaction> for TransactionItem {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            wallet_from: tx.wallet_from,
            wallet_to: tx.wallet_to,
            amount: tx.amount,
        }
    }
}

/// Envelope for a transaction list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionListEnvelope {
    pub transactions: Vec<TransactionItem>,
}

impl TransactionListEnvelope {
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: transactions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Empty success body for an executed transfer; the commission stays
/// internal to the ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct TransferAccepted {}

/// Execute a transfer from one of the caller's wallets.
#[utoipa::path(
    post,
    path = "/transactions",
    tag = "Transactions",
    request_body = CreateTransferRequest,
    responses(
        (status = 201, description = "Transfer executed", body = TransferAccepted),
        (status = 400, description = "Self-transfer, zero amount, or insufficient balance"),
        (status = 404, description = "Wallet missing or not owned by caller"),
    )
)]
pub async fn create_transaction(
    ApiKey(api_key): ApiKey,
    State(state): State<AppState>,
    Json(request): Json<CreateTransferRequest>,
) -> Result<(StatusCode, Json<TransferAccepted>), ApiError> {
    // The data model requires a positive amount; the core never sees zero.
    if request.amount == 0 {
        return Err(ApiError::bad_request("amount must be positive"));
    }

    let commission = state.ledger.execute_transfer(Transfer {
        api_key,
        wallet_from: request.wallet_from,
        wallet_to: request.wallet_to,
        amount: request.amount,
    })?;

    tracing::info!(
        wallet_from = %request.wallet_from,
        wallet_to = %request.wallet_to,
        amount = request.amount,
        commission,
        "transfer executed"
    );

    Ok((StatusCode::CREATED, Json(TransferAccepted {})))
}

/// The caller's transaction history, one representative per unordered
/// wallet pair.
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "Transactions",
    responses(
        (status = 200, description = "Deduplicated user history", body = TransactionListEnvelope),
        (status = 404, description = "Unknown access token"),
    )
)]
pub async fn list_transactions(
    ApiKey(api_key): ApiKey,
    State(state): State<AppState>,
) -> Result<Json<TransactionListEnvelope>, ApiError> {
    let transactions = state.ledger.transactions_of_user(api_key)?;
    Ok(Json(TransactionListEnvelope::from_transactions(
        transactions,
    )))
}
