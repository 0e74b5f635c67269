// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Durable ledger backend on redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: api_key → serialized User (JSON bytes)
//! - `usernames`: username → api_key (uniqueness guard)
//! - `wallets`: address → serialized Wallet
//! - `transactions`: tx_id → serialized Transaction
//! - `wallet_tx_index`: composite key (address_bytes|seq_be) → tx_id
//! - `user_tx_index`: composite key (api_key_bytes|seq_be) → tx_id
//! - `ledger_state`: key → u64 (tx sequence counter, statistics row)
//!
//! Every multi-effect operation (wallet creation, transfer execution) is a
//! single write transaction: it commits whole or not at all, so no observer
//! and no crash can ever see a debit without its matching credit, record,
//! and statistics bump. redb's single-writer discipline serializes
//! concurrent transfers touching the same wallets.

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::config::MAX_WALLETS_PER_USER;
use crate::models::{Statistic, Transaction, User, Wallet};

use super::{
    dedup_by_wallet_pair, validate_transfer, LedgerError, LedgerResult, StatisticStore,
    TransactionStore, Transfer, UserStore, WalletStore,
};

// =============================================================================
// Table Definitions
// =============================================================================

const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
const USERNAMES: TableDefinition<&str, &str> = TableDefinition::new("usernames");
const WALLETS: TableDefinition<&str, &[u8]> = TableDefinition::new("wallets");
const TRANSACTIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("transactions");

/// Index: (owner wallet address bytes | seq_be) → tx_id.
const WALLET_TX_INDEX: TableDefinition<&[u8], &str> = TableDefinition::new("wallet_tx_index");

/// Index: (owner api_key bytes | seq_be) → tx_id.
const USER_TX_INDEX: TableDefinition<&[u8], &str> = TableDefinition::new("user_tx_index");

/// Counters: `tx_seq`, `transaction_count`, `commission_total`.
const LEDGER_STATE: TableDefinition<&str, u64> = TableDefinition::new("ledger_state");

const TX_SEQ_KEY: &str = "tx_seq";
const TX_COUNT_KEY: &str = "transaction_count";
const COMMISSION_TOTAL_KEY: &str = "commission_total";

// =============================================================================
// Error Plumbing
// =============================================================================

macro_rules! storage_error_from {
    ($($ty:ty),* $(,)?) => {$(
        impl From<$ty> for LedgerError {
            fn from(err: $ty) -> Self {
                LedgerError::Storage(err.to_string())
            }
        }
    )*};
}

storage_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
    serde_json::Error,
);

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> LedgerResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Composite index key: 16 UUID bytes followed by a big-endian sequence
/// number, so a forward range scan yields execution order.
fn index_key(owner: Uuid, seq: u64) -> [u8; 24] {
    let mut key = [0u8; 24];
    key[..16].copy_from_slice(owner.as_bytes());
    key[16..].copy_from_slice(&seq.to_be_bytes());
    key
}

/// Inclusive range covering every index entry of one owner.
fn index_range(owner: Uuid) -> ([u8; 24], [u8; 24]) {
    (index_key(owner, 0), index_key(owner, u64::MAX))
}

// =============================================================================
// RedbLedger
// =============================================================================

/// Durable ledger store. Survives restarts; behaviorally equivalent to the
/// in-memory backend.
pub struct RedbLedger {
    db: Database,
    admin_key: Uuid,
}

impl RedbLedger {
    /// Open (or create) the database at `path`. Statistics are readable only
    /// by `admin_key`.
    pub fn open(path: &Path, admin_key: Uuid) -> LedgerResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail.
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERNAMES)?;
            let _ = write_txn.open_table(WALLETS)?;
            let _ = write_txn.open_table(TRANSACTIONS)?;
            let _ = write_txn.open_table(WALLET_TX_INDEX)?;
            let _ = write_txn.open_table(USER_TX_INDEX)?;
            let _ = write_txn.open_table(LEDGER_STATE)?;
        }
        write_txn.commit()?;

        Ok(Self { db, admin_key })
    }

    fn load_transactions(
        &self,
        index: TableDefinition<&[u8], &str>,
        owner: Uuid,
    ) -> LedgerResult<Vec<Transaction>> {
        let read_txn = self.db.begin_read()?;
        let index_table = read_txn.open_table(index)?;
        let tx_table = read_txn.open_table(TRANSACTIONS)?;

        let (start, end) = index_range(owner);
        let mut transactions = Vec::new();
        for entry in index_table.range::<&[u8]>(start.as_slice()..=end.as_slice())? {
            let (_, tx_id) = entry?;
            if let Some(guard) = tx_table.get(tx_id.value())? {
                transactions.push(decode::<Transaction>(guard.value())?);
            }
        }
        Ok(transactions)
    }
}

impl UserStore for RedbLedger {
    fn create_user(&self, user: User) -> LedgerResult<User> {
        let write_txn = self.db.begin_write()?;
        {
            let mut usernames = write_txn.open_table(USERNAMES)?;
            if usernames.get(user.username.as_str())?.is_some() {
                return Err(LedgerError::AlreadyExists);
            }
            let key = user.api_key.to_string();
            usernames.insert(user.username.as_str(), key.as_str())?;

            let mut users = write_txn.open_table(USERS)?;
            let json = serde_json::to_vec(&user)?;
            users.insert(key.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(user)
    }

    fn user_by_key(&self, api_key: Uuid) -> LedgerResult<User> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        match users.get(api_key.to_string().as_str())? {
            Some(guard) => decode(guard.value()),
            None => Err(LedgerError::NotFound("user")),
        }
    }

    fn wallet_of_user(&self, api_key: Uuid, address: Uuid) -> LedgerResult<Wallet> {
        self.user_by_key(api_key)?;
        let wallet = self.wallet(address)?;
        if wallet.api_key != api_key {
            return Err(LedgerError::NotFound("wallet"));
        }
        Ok(wallet)
    }

    fn transactions_of_user(&self, api_key: Uuid) -> LedgerResult<Vec<Transaction>> {
        self.user_by_key(api_key)?;
        let history = self.load_transactions(USER_TX_INDEX, api_key)?;
        Ok(dedup_by_wallet_pair(history))
    }
}

impl WalletStore for RedbLedger {
    fn create_wallet(&self, api_key: Uuid) -> LedgerResult<Wallet> {
        let wallet = Wallet::new(api_key);
        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let key = api_key.to_string();
            let mut user: User = match users.get(key.as_str())? {
                Some(guard) => decode(guard.value())?,
                None => return Err(LedgerError::NotFound("user")),
            };
            if user.wallet_count >= MAX_WALLETS_PER_USER {
                return Err(LedgerError::CapacityExceeded);
            }
            user.wallet_count += 1;
            let user_json = serde_json::to_vec(&user)?;
            users.insert(key.as_str(), user_json.as_slice())?;

            let mut wallets = write_txn.open_table(WALLETS)?;
            let address = wallet.address.to_string();
            let wallet_json = serde_json::to_vec(&wallet)?;
            wallets.insert(address.as_str(), wallet_json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(wallet)
    }

    fn wallet(&self, address: Uuid) -> LedgerResult<Wallet> {
        let read_txn = self.db.begin_read()?;
        let wallets = read_txn.open_table(WALLETS)?;
        match wallets.get(address.to_string().as_str())? {
            Some(guard) => decode(guard.value()),
            None => Err(LedgerError::NotFound("wallet")),
        }
    }
}

impl TransactionStore for RedbLedger {
    fn execute_transfer(&self, transfer: Transfer) -> LedgerResult<u64> {
        let write_txn = self.db.begin_write()?;
        let commission;
        {
            let mut wallets = write_txn.open_table(WALLETS)?;

            let from_key = transfer.wallet_from.to_string();
            let to_key = transfer.wallet_to.to_string();
            let mut source: Wallet = match wallets.get(from_key.as_str())? {
                Some(guard) => decode(guard.value())?,
                None => return Err(LedgerError::NotFound("wallet")),
            };
            let mut dest: Wallet = match wallets.get(to_key.as_str())? {
                Some(guard) => decode(guard.value())?,
                None => return Err(LedgerError::NotFound("wallet")),
            };

            // Bailing out here drops the uncommitted transaction; nothing
            // has been applied.
            commission = validate_transfer(&source, &dest, &transfer)?;

            source.balance -= transfer.amount;
            dest.balance += transfer.amount - commission;
            let source_json = serde_json::to_vec(&source)?;
            wallets.insert(from_key.as_str(), source_json.as_slice())?;
            let dest_json = serde_json::to_vec(&dest)?;
            wallets.insert(to_key.as_str(), dest_json.as_slice())?;

            let transaction = Transaction {
                id: Uuid::new_v4(),
                wallet_from: transfer.wallet_from,
                wallet_to: transfer.wallet_to,
                amount: transfer.amount,
                created_at: Utc::now(),
            };
            let tx_id = transaction.id.to_string();
            let mut transactions = write_txn.open_table(TRANSACTIONS)?;
            let tx_json = serde_json::to_vec(&transaction)?;
            transactions.insert(tx_id.as_str(), tx_json.as_slice())?;

            let mut state = write_txn.open_table(LEDGER_STATE)?;
            let seq = state.get(TX_SEQ_KEY)?.map(|g| g.value()).unwrap_or(0);
            state.insert(TX_SEQ_KEY, seq + 1)?;

            let mut wallet_index = write_txn.open_table(WALLET_TX_INDEX)?;
            wallet_index.insert(index_key(transfer.wallet_from, seq).as_slice(), tx_id.as_str())?;
            wallet_index.insert(index_key(transfer.wallet_to, seq).as_slice(), tx_id.as_str())?;

            let mut user_index = write_txn.open_table(USER_TX_INDEX)?;
            user_index.insert(index_key(source.api_key, seq).as_slice(), tx_id.as_str())?;
            if dest.api_key != source.api_key {
                user_index.insert(index_key(dest.api_key, seq).as_slice(), tx_id.as_str())?;
            }

            let count = state.get(TX_COUNT_KEY)?.map(|g| g.value()).unwrap_or(0);
            state.insert(TX_COUNT_KEY, count + 1)?;
            let total = state
                .get(COMMISSION_TOTAL_KEY)?
                .map(|g| g.value())
                .unwrap_or(0);
            state.insert(COMMISSION_TOTAL_KEY, total + commission)?;
        }
        write_txn.commit()?;
        Ok(commission)
    }

    fn transactions_of_wallet(&self, address: Uuid) -> LedgerResult<Vec<Transaction>> {
        self.wallet(address)?;
        self.load_transactions(WALLET_TX_INDEX, address)
    }
}

impl StatisticStore for RedbLedger {
    fn statistics(&self, api_key: Uuid) -> LedgerResult<Statistic> {
        if api_key != self.admin_key {
            return Err(LedgerError::AccessDenied);
        }
        let read_txn = self.db.begin_read()?;
        let state = read_txn.open_table(LEDGER_STATE)?;
        Ok(Statistic {
            transaction_count: state.get(TX_COUNT_KEY)?.map(|g| g.value()).unwrap_or(0),
            commission_total: state
                .get(COMMISSION_TOTAL_KEY)?
                .map(|g| g.value())
                .unwrap_or(0),
        })
    }

    fn record_commission(&self, commission: u64) -> LedgerResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut state = write_txn.open_table(LEDGER_STATE)?;
            let count = state.get(TX_COUNT_KEY)?.map(|g| g.value()).unwrap_or(0);
            state.insert(TX_COUNT_KEY, count + 1)?;
            let total = state
                .get(COMMISSION_TOTAL_KEY)?
                .map(|g| g.value())
                .unwrap_or(0);
            state.insert(COMMISSION_TOTAL_KEY, total + commission)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
