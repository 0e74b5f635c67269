// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::models::Statistic;
use crate::state::AppState;

pub mod health;
pub mod statistics;
pub mod transactions;
pub mod users;
pub mod wallets;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/users", post(users::create_user))
        .route("/wallets", post(wallets::create_wallet))
        .route("/wallets/{address}", get(wallets::show_wallet))
        .route(
            "/wallets/{address}/transactions",
            get(wallets::show_wallet_transactions),
        )
        .route(
            "/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route("/statistics", get(statistics::show_statistics))
        .route("/health", get(health::health))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        users::create_user,
        wallets::create_wallet,
        wallets::show_wallet,
        wallets::show_wallet_transactions,
        transactions::create_transaction,
        transactions::list_transactions,
        statistics::show_statistics,
        health::health
    ),
    components(
        schemas(
            users::CreateUserRequest,
            users::UserResponse,
            users::UserEnvelope,
            wallets::WalletResponse,
            wallets::WalletEnvelope,
            transactions::CreateTransferRequest,
            transactions::TransactionItem,
            transactions::TransactionListEnvelope,
            transactions::TransferAccepted,
            statistics::StatisticEnvelope,
            health::HealthResponse,
            Statistic
        )
    ),
    tags(
        (name = "Users", description = "User registration"),
        (name = "Wallets", description = "Wallet creation, lookup, and history"),
        (name = "Transactions", description = "Transfers and user history"),
        (name = "Statistics", description = "Privileged cumulative counters"),
        (name = "Health", description = "Liveness probes")
    )
)]
struct ApiDoc;
