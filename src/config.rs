// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names, default values, and the
//! fixed ledger constants used throughout the application. Configuration is
//! loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `LEDGER_BACKEND` | Storage backend (`memory` or `durable`) | `memory` |
//! | `DATA_DIR` | Root directory for the durable database | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `ADMIN_API_KEY` | Privileged token allowed to read statistics | dev default |
//! | `TICKER_URL` | Price oracle endpoint for USD display rates | blockchain.info |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable selecting the storage backend.
///
/// `memory` keeps the whole ledger in process memory and loses it on
/// restart; `durable` persists it to an embedded redb database under
/// [`DATA_DIR_ENV`]. Both backends satisfy the same store contract and are
/// observably equivalent.
pub const LEDGER_BACKEND_ENV: &str = "LEDGER_BACKEND";

/// Environment variable name for the durable database directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default durable database directory.
pub const DEFAULT_DATA_DIR: &str = "/data";

/// File name of the redb database inside the data directory.
pub const LEDGER_DB_FILE: &str = "ledger.redb";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable holding the privileged statistics token.
///
/// Only this access token may read `/statistics`. The value is parsed as a
/// UUID at startup and handed to the backend at construction; it is never a
/// global baked into the access check.
pub const ADMIN_API_KEY_ENV: &str = "ADMIN_API_KEY";

/// Well-known development default for [`ADMIN_API_KEY_ENV`].
///
/// Deployments must override this.
pub const DEFAULT_ADMIN_API_KEY: &str = "3caa8a54-9c26-4098-a1b1-0fd445e00000";

/// Environment variable overriding the price oracle endpoint.
pub const TICKER_URL_ENV: &str = "TICKER_URL";

/// Default price oracle endpoint (JSON ticker, `USD.last` field).
pub const DEFAULT_TICKER_URL: &str = "https://blockchain.info/ticker";

// =============================================================================
// Ledger Constants
// =============================================================================

/// Number of satoshi in one whole coin.
pub const SATOSHI_PER_COIN: u64 = 100_000_000;

/// Balance every newly created wallet starts with.
pub const STARTING_BALANCE: u64 = SATOSHI_PER_COIN;

/// Maximum number of wallets a single user may own.
pub const MAX_WALLETS_PER_USER: u32 = 3;

/// Proportional commission charged on transfers between different users.
///
/// Transfers between two wallets of the same owner are commission-free.
pub const COMMISSION_RATE: f64 = 0.015;
