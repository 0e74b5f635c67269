// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Entities
//!
//! Core ledger entities shared by every storage backend. All monetary values
//! are integer satoshi (`u64`); all identifiers are UUIDs.
//!
//! Transaction membership (which transactions a user or wallet participated
//! in) is deliberately **not** embedded in [`User`] or [`Wallet`]: the store
//! keeps a single record per transaction id plus per-wallet and per-user
//! indexes, so the volatile and durable backends cannot diverge through
//! aliased history lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{SATOSHI_PER_COIN, STARTING_BALANCE};

/// A registered user of the ledger.
///
/// Possession of `api_key` is the entire proof of identity; the password is
/// stored as given and never consulted after creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Access token identifying this user on every subsequent call.
    pub api_key: Uuid,
    /// Globally unique username.
    pub username: String,
    /// Opaque credential, stored as given.
    pub password: String,
    /// Denormalized count of wallets this user owns.
    ///
    /// Invariant: always equals the number of wallets whose owner token is
    /// `api_key`.
    pub wallet_count: u32,
}

impl User {
    /// Build a fresh user with a newly generated access token and no wallets.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            api_key: Uuid::new_v4(),
            username: username.into(),
            password: password.into(),
            wallet_count: 0,
        }
    }
}

/// A custodial wallet holding a satoshi balance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Wallet {
    /// Unique wallet address, generated at creation.
    pub address: Uuid,
    /// Access token of the owning user. A wallet belongs to exactly one user
    /// for its lifetime.
    pub api_key: Uuid,
    /// Current balance in satoshi. Never negative; mutated only by the
    /// transfer engine.
    pub balance: u64,
    /// When the wallet was created.
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    /// Build a fresh wallet for `api_key` with the configured starting balance.
    pub fn new(api_key: Uuid) -> Self {
        Self {
            address: Uuid::new_v4(),
            api_key,
            balance: STARTING_BALANCE,
            created_at: Utc::now(),
        }
    }

    /// Balance expressed in whole coins.
    pub fn balance_in_coins(&self) -> f64 {
        self.balance as f64 / SATOSHI_PER_COIN as f64
    }
}

/// An executed transfer between two wallets.
///
/// Immutable once recorded; equality is by `id` only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Unique transaction identifier.
    pub id: Uuid,
    /// Source wallet address.
    pub wallet_from: Uuid,
    /// Destination wallet address.
    pub wallet_to: Uuid,
    /// Amount debited from the source, in satoshi.
    pub amount: u64,
    /// When the transfer executed.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// The unordered wallet pair this transaction moved value between.
    ///
    /// `a→b` and `b→a` map to the same pair; user-level history is
    /// deduplicated on this key.
    pub fn wallet_pair(&self) -> (Uuid, Uuid) {
        if self.wallet_from <= self.wallet_to {
            (self.wallet_from, self.wallet_to)
        } else {
            (self.wallet_to, self.wallet_from)
        }
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Transaction {}

/// Cumulative ledger statistics, one row per store.
///
/// Zeroed at store initialization, bumped once per successful transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Statistic {
    /// Number of successfully executed transfers.
    pub transaction_count: u64,
    /// Total commission collected, in satoshi.
    pub commission_total: u64,
}
