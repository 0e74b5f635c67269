// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Satoshi Ledger - Custodial Ledger Service
//!
//! This crate tracks users, the wallets they own, and satoshi-denominated
//! transfers between wallets, charging a proportional commission on
//! inter-user transfers. The ledger can run on a volatile in-memory store or
//! an embedded durable database; both satisfy one capability contract and
//! are behaviorally equivalent.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Access-token extraction
//! - `ledger` - Store contract, transfer engine, and both backends
//! - `models` - Domain entities
//! - `rates` - Price oracle client (display only)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod rates;
pub mod state;
