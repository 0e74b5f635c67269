// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use satoshi_ledger::api::router;
use satoshi_ledger::config::{
    ADMIN_API_KEY_ENV, DATA_DIR_ENV, DEFAULT_ADMIN_API_KEY, DEFAULT_DATA_DIR, HOST_ENV,
    LEDGER_BACKEND_ENV, LEDGER_DB_FILE, PORT_ENV,
};
use satoshi_ledger::ledger::{durable::RedbLedger, memory::MemoryLedger, Ledger};
use satoshi_ledger::rates::RateClient;
use satoshi_ledger::state::AppState;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn admin_api_key() -> Uuid {
    let raw = env::var(ADMIN_API_KEY_ENV).unwrap_or_else(|_| DEFAULT_ADMIN_API_KEY.to_string());
    raw.parse()
        .expect("ADMIN_API_KEY must be a valid UUID")
}

/// Pick the storage backend from the environment. Anything other than
/// `durable` falls back to the in-memory store.
fn build_ledger(admin_key: Uuid) -> Arc<dyn Ledger> {
    let backend = env::var(LEDGER_BACKEND_ENV).unwrap_or_else(|_| "memory".to_string());
    match backend.as_str() {
        "durable" => {
            let data_dir =
                env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
            let path = PathBuf::from(data_dir).join(LEDGER_DB_FILE);
            tracing::info!(path = %path.display(), "opening durable ledger");
            let ledger =
                RedbLedger::open(&path, admin_key).expect("failed to open durable ledger");
            Arc::new(ledger)
        }
        other => {
            if other != "memory" {
                tracing::warn!(backend = %other, "unknown ledger backend, using memory");
            }
            Arc::new(MemoryLedger::new(admin_key))
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let admin_key = admin_api_key();
    let ledger = build_ledger(admin_key);
    let state = AppState::new(ledger, RateClient::from_env());
    let app = router(state);

    let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(PORT_ENV)
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!(%addr, "satoshi ledger listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app)
        .await
        .expect("HTTP server failed");
}
