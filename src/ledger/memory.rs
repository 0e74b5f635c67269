// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Volatile ledger backend.
//!
//! Everything lives in one [`RwLock`]-guarded struct of maps: entities keyed
//! by their identifiers, plus per-wallet and per-user transaction-id index
//! lists in execution order. Holding the write lock across a whole transfer
//! gives the debit/credit/record/statistics sequence its required critical
//! section; it is coarser than a per-wallet-pair lock but observationally
//! identical.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::config::MAX_WALLETS_PER_USER;
use crate::models::{Statistic, Transaction, User, Wallet};

use super::{
    dedup_by_wallet_pair, validate_transfer, LedgerError, LedgerResult, StatisticStore,
    TransactionStore, Transfer, UserStore, WalletStore,
};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    wallets: HashMap<Uuid, Wallet>,
    transactions: HashMap<Uuid, Transaction>,
    /// Transaction ids touching each wallet, in execution order.
    wallet_index: HashMap<Uuid, Vec<Uuid>>,
    /// Transaction ids touching each user's wallets, in execution order.
    user_index: HashMap<Uuid, Vec<Uuid>>,
    statistic: Statistic,
}

/// In-memory ledger store. Lost on process exit.
pub struct MemoryLedger {
    admin_key: Uuid,
    inner: RwLock<Inner>,
}

impl MemoryLedger {
    /// Create an empty ledger whose statistics are readable only by
    /// `admin_key`.
    pub fn new(admin_key: Uuid) -> Self {
        Self {
            admin_key,
            inner: RwLock::new(Inner::default()),
        }
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Storage("ledger lock poisoned".into()))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Storage("ledger lock poisoned".into()))
    }
}

impl UserStore for MemoryLedger {
    fn create_user(&self, user: User) -> LedgerResult<User> {
        let mut inner = self.write()?;
        if inner
            .users
            .values()
            .any(|existing| existing.username == user.username)
        {
            return Err(LedgerError::AlreadyExists);
        }
        inner.users.insert(user.api_key, user.clone());
        Ok(user)
    }

    fn user_by_key(&self, api_key: Uuid) -> LedgerResult<User> {
        self.read()?
            .users
            .get(&api_key)
            .cloned()
            .ok_or(LedgerError::NotFound("user"))
    }

    fn wallet_of_user(&self, api_key: Uuid, address: Uuid) -> LedgerResult<Wallet> {
        let inner = self.read()?;
        if !inner.users.contains_key(&api_key) {
            return Err(LedgerError::NotFound("user"));
        }
        inner
            .wallets
            .get(&address)
            .filter(|wallet| wallet.api_key == api_key)
            .cloned()
            .ok_or(LedgerError::NotFound("wallet"))
    }

    fn transactions_of_user(&self, api_key: Uuid) -> LedgerResult<Vec<Transaction>> {
        let inner = self.read()?;
        if !inner.users.contains_key(&api_key) {
            return Err(LedgerError::NotFound("user"));
        }
        let history = inner
            .user_index
            .get(&api_key)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.transactions.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(dedup_by_wallet_pair(history))
    }
}

impl WalletStore for MemoryLedger {
    fn create_wallet(&self, api_key: Uuid) -> LedgerResult<Wallet> {
        let mut inner = self.write()?;
        let user = inner
            .users
            .get_mut(&api_key)
            .ok_or(LedgerError::NotFound("user"))?;
        if user.wallet_count >= MAX_WALLETS_PER_USER {
            return Err(LedgerError::CapacityExceeded);
        }
        user.wallet_count += 1;
        let wallet = Wallet::new(api_key);
        inner.wallets.insert(wallet.address, wallet.clone());
        Ok(wallet)
    }

    fn wallet(&self, address: Uuid) -> LedgerResult<Wallet> {
        self.read()?
            .wallets
            .get(&address)
            .cloned()
            .ok_or(LedgerError::NotFound("wallet"))
    }
}

impl TransactionStore for MemoryLedger {
    fn execute_transfer(&self, transfer: Transfer) -> LedgerResult<u64> {
        let mut inner = self.write()?;

        let source = inner
            .wallets
            .get(&transfer.wallet_from)
            .cloned()
            .ok_or(LedgerError::NotFound("wallet"))?;
        let dest = inner
            .wallets
            .get(&transfer.wallet_to)
            .cloned()
            .ok_or(LedgerError::NotFound("wallet"))?;

        // Validation precedes every mutation; bail here and nothing has
        // changed.
        let commission = validate_transfer(&source, &dest, &transfer)?;
        let credit = transfer.amount - commission;

        if let Some(wallet) = inner.wallets.get_mut(&transfer.wallet_from) {
            wallet.balance -= transfer.amount;
        }
        if let Some(wallet) = inner.wallets.get_mut(&transfer.wallet_to) {
            wallet.balance += credit;
        }

        let transaction = Transaction {
            id: Uuid::new_v4(),
            wallet_from: transfer.wallet_from,
            wallet_to: transfer.wallet_to,
            amount: transfer.amount,
            created_at: Utc::now(),
        };

        inner
            .wallet_index
            .entry(transfer.wallet_from)
            .or_default()
            .push(transaction.id);
        inner
            .wallet_index
            .entry(transfer.wallet_to)
            .or_default()
            .push(transaction.id);

        inner
            .user_index
            .entry(source.api_key)
            .or_default()
            .push(transaction.id);
        if dest.api_key != source.api_key {
            inner
                .user_index
                .entry(dest.api_key)
                .or_default()
                .push(transaction.id);
        }

        inner.transactions.insert(transaction.id, transaction);

        inner.statistic.transaction_count += 1;
        inner.statistic.commission_total += commission;

        Ok(commission)
    }

    fn transactions_of_wallet(&self, address: Uuid) -> LedgerResult<Vec<Transaction>> {
        let inner = self.read()?;
        if !inner.wallets.contains_key(&address) {
            return Err(LedgerError::NotFound("wallet"));
        }
        Ok(inner
            .wallet_index
            .get(&address)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.transactions.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl StatisticStore for MemoryLedger {
    fn statistics(&self, api_key: Uuid) -> LedgerResult<Statistic> {
        if api_key != self.admin_key {
            return Err(LedgerError::AccessDenied);
        }
        Ok(self.read()?.statistic)
    }

    fn record_commission(&self, commission: u64) -> LedgerResult<()> {
        let mut inner = self.write()?;
        inner.statistic.transaction_count += 1;
        inner.statistic.commission_total += commission;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::MemoryLedger;
    use crate::ledger::contract;

    fn ledger() -> (MemoryLedger, Uuid) {
        let admin = Uuid::new_v4();
        (MemoryLedger::new(admin), admin)
    }

    #[test]
    fn duplicate_username_rejected() {
        let (ledger, _) = ledger();
        contract::duplicate_username_rejected(&ledger);
    }

    #[test]
    fn unknown_token_is_not_found() {
        let (ledger, _) = ledger();
        contract::unknown_token_is_not_found(&ledger);
    }

    #[test]
    fn wallet_capacity_and_starting_balance() {
        let (ledger, _) = ledger();
        contract::wallet_capacity_and_starting_balance(&ledger);
    }

    #[test]
    fn wallet_creation_requires_known_user() {
        let (ledger, _) = ledger();
        contract::wallet_creation_requires_known_user(&ledger);
    }

    #[test]
    fn wallet_lookup_is_owner_scoped() {
        let (ledger, _) = ledger();
        contract::wallet_lookup_is_owner_scoped(&ledger);
    }

    #[test]
    fn balance_conservation_across_users() {
        let (ledger, admin) = ledger();
        contract::balance_conservation_across_users(&ledger, admin);
    }

    #[test]
    fn same_owner_transfer_is_free() {
        let (ledger, admin) = ledger();
        contract::same_owner_transfer_is_free(&ledger, admin);
    }

    #[test]
    fn same_wallet_transfer_mutates_nothing() {
        let (ledger, admin) = ledger();
        contract::same_wallet_transfer_mutates_nothing(&ledger, admin);
    }

    #[test]
    fn overdraft_mutates_nothing() {
        let (ledger, admin) = ledger();
        contract::overdraft_mutates_nothing(&ledger, admin);
    }

    #[test]
    fn foreign_source_wallet_is_not_found() {
        let (ledger, _) = ledger();
        contract::foreign_source_wallet_is_not_found(&ledger);
    }

    #[test]
    fn missing_wallet_is_not_found() {
        let (ledger, _) = ledger();
        contract::missing_wallet_is_not_found(&ledger);
    }

    #[test]
    fn statistics_read_is_privileged() {
        let (ledger, admin) = ledger();
        contract::statistics_read_is_privileged(&ledger, admin);
    }

    #[test]
    fn history_asymmetry() {
        let (ledger, _) = ledger();
        contract::history_asymmetry(&ledger);
    }

    #[test]
    fn transfer_reaches_both_user_histories() {
        let (ledger, _) = ledger();
        contract::transfer_reaches_both_user_histories(&ledger);
    }

    #[test]
    fn record_commission_is_unconditional() {
        let (ledger, admin) = ledger();
        contract::record_commission_is_unconditional(&ledger, admin);
    }

    #[test]
    fn concurrent_transfers_never_overdraw() {
        let (ledger, _) = ledger();
        contract::concurrent_transfers_never_overdraw(Arc::new(ledger));
    }
}
