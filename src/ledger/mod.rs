// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Store Contract
//!
//! Capability traits every storage backend must satisfy, the error kinds
//! every operation resolves to, and the transfer rules shared by the
//! backends.
//!
//! Two backends exist: [`memory::MemoryLedger`] (volatile) and
//! [`durable::RedbLedger`] (embedded redb database). Given identical inputs
//! and call order they must produce identical observable results; the
//! contract test suite in this module runs unchanged against both.
//!
//! ## Transfer semantics
//!
//! `execute_transfer` validates against current state before touching
//! anything: resolve both wallets, verify the caller owns the source, reject
//! self-transfers, reject overdrafts. A transfer that passes validation
//! debits the source by the full amount, credits the destination with the
//! amount minus commission, records the immutable [`Transaction`], indexes
//! it for both wallets and both owners, and bumps the statistics row — all
//! as one atomic unit. A rejected transfer mutates nothing, statistics
//! included.
//!
//! Commission is `round(amount × COMMISSION_RATE)`, rounded half-up exactly
//! once; the destination credit is derived from that single rounded value so
//! total ledger value is conserved to the satoshi. Transfers between two
//! wallets of the same owner carry no commission.

pub mod durable;
pub mod memory;

use uuid::Uuid;

use crate::config::COMMISSION_RATE;
use crate::models::{Statistic, Transaction, User, Wallet};

/// Everything a ledger operation can fail with.
///
/// The first six kinds are the domain vocabulary surfaced to callers;
/// `Storage` wraps backend I/O faults and never carries domain meaning.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("user already exists")]
    AlreadyExists,

    #[error("{0} does not exist")]
    NotFound(&'static str),

    #[error("transfer within the same wallet is not allowed")]
    SameWallet,

    #[error("not enough balance to complete the transfer")]
    InsufficientBalance,

    #[error("maximum wallet capacity reached")]
    CapacityExceeded,

    #[error("access token is not allowed to read statistics")]
    AccessDenied,

    #[error("storage backend failure: {0}")]
    Storage(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// A transfer request as the engine sees it: the caller's token plus the
/// addresses and amount. Wallet resolution happens inside the backend.
#[derive(Debug, Clone, Copy)]
pub struct Transfer {
    /// Access token of the caller; must own `wallet_from`.
    pub api_key: Uuid,
    pub wallet_from: Uuid,
    pub wallet_to: Uuid,
    /// Amount to debit from the source, in satoshi.
    pub amount: u64,
}

/// User-family operations.
pub trait UserStore {
    /// Persist a new user. Fails with [`LedgerError::AlreadyExists`] if the
    /// username is taken.
    fn create_user(&self, user: User) -> LedgerResult<User>;

    /// Look up a user by access token.
    fn user_by_key(&self, api_key: Uuid) -> LedgerResult<User>;

    /// Look up a wallet owned by the given token. A wallet that exists but
    /// belongs to someone else is reported as not found.
    fn wallet_of_user(&self, api_key: Uuid, address: Uuid) -> LedgerResult<Wallet>;

    /// The user's transaction history across all owned wallets, collapsed to
    /// one representative transaction per unordered wallet pair.
    fn transactions_of_user(&self, api_key: Uuid) -> LedgerResult<Vec<Transaction>>;
}

/// Wallet-family operations.
pub trait WalletStore {
    /// Create a wallet for the user holding `api_key`, with the configured
    /// starting balance. Persisting the wallet, attaching it to the user,
    /// and incrementing the user's wallet count happen as one atomic unit.
    /// Fails with [`LedgerError::CapacityExceeded`] once the user owns the
    /// configured maximum.
    fn create_wallet(&self, api_key: Uuid) -> LedgerResult<Wallet>;

    /// Look up a wallet by address, regardless of owner.
    fn wallet(&self, address: Uuid) -> LedgerResult<Wallet>;
}

/// Transfer-family operations.
pub trait TransactionStore {
    /// Validate and execute a transfer, returning the commission charged.
    /// See the module docs for the full rules.
    fn execute_transfer(&self, transfer: Transfer) -> LedgerResult<u64>;

    /// Every transaction touching the wallet as source or destination, in
    /// execution order, undeduplicated.
    fn transactions_of_wallet(&self, address: Uuid) -> LedgerResult<Vec<Transaction>>;
}

/// Statistics operations.
pub trait StatisticStore {
    /// Read the cumulative statistics row. Only the privileged token the
    /// backend was constructed with may read; everyone else gets
    /// [`LedgerError::AccessDenied`].
    fn statistics(&self, api_key: Uuid) -> LedgerResult<Statistic>;

    /// Bump the transfer count by one and the commission total by
    /// `commission`. Not access-checked; driven by `execute_transfer` and by
    /// test fixtures.
    fn record_commission(&self, commission: u64) -> LedgerResult<()>;
}

/// The full store contract, suitable for dynamic dispatch at the HTTP seam.
pub trait Ledger: UserStore + WalletStore + TransactionStore + StatisticStore + Send + Sync {}

impl<T> Ledger for T where T: UserStore + WalletStore + TransactionStore + StatisticStore + Send + Sync {}

/// Commission for a transfer of `amount`, rounded half-up.
///
/// Same-owner transfers are free.
pub fn commission_for(amount: u64, same_owner: bool) -> u64 {
    if same_owner {
        0
    } else {
        (amount as f64 * COMMISSION_RATE).round() as u64
    }
}

/// Validate a resolved transfer and compute its commission.
///
/// Shared by both backends so the rule order (ownership, self-transfer,
/// balance) cannot drift between them. `source` and `dest` are the wallets
/// resolved from `transfer.wallet_from` / `transfer.wallet_to`.
pub(crate) fn validate_transfer(
    source: &Wallet,
    dest: &Wallet,
    transfer: &Transfer,
) -> LedgerResult<u64> {
    // Ownership and existence are deliberately conflated: a source wallet
    // owned by someone else looks exactly like a missing wallet.
    if source.api_key != transfer.api_key {
        return Err(LedgerError::NotFound("wallet"));
    }
    if transfer.wallet_from == transfer.wallet_to {
        return Err(LedgerError::SameWallet);
    }
    if source.balance < transfer.amount {
        return Err(LedgerError::InsufficientBalance);
    }
    Ok(commission_for(transfer.amount, source.api_key == dest.api_key))
}

/// Collapse a history to one representative transaction per unordered wallet
/// pair, keeping the first occurrence.
pub(crate) fn dedup_by_wallet_pair(transactions: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen = std::collections::HashSet::new();
    transactions
        .into_iter()
        .filter(|tx| seen.insert(tx.wallet_pair()))
        .collect()
}


#[cfg(test)]
pub(crate) mod contract {
    //! Backend equivalence suite.
    //!
    //! Every function here exercises one observable property of the store
    //! contract against `&dyn Ledger`; the memory and durable test modules
    //! call each of them, so a behavioral difference between backends fails
    //! the same named test in both places.

    use std::sync::Arc;

    use uuid::Uuid;

    use super::{Ledger, LedgerError, Transfer};
    use crate::config::{COMMISSION_RATE, MAX_WALLETS_PER_USER, STARTING_BALANCE};
    use crate::models::User;

    fn make_user(ledger: &dyn Ledger, name: &str) -> Uuid {
        ledger
            .create_user(User::new(name, "pw"))
            .expect("user creation")
            .api_key
    }

    pub fn duplicate_username_rejected(ledger: &dyn Ledger) {
        make_user(ledger, "alice");
        let err = ledger.create_user(User::new("alice", "other")).unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyExists));
    }

    pub fn unknown_token_is_not_found(ledger: &dyn Ledger) {
        let err = ledger.user_by_key(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
        let err = ledger.transactions_of_user(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    pub fn wallet_capacity_and_starting_balance(ledger: &dyn Ledger) {
        let key = make_user(ledger, "capacity");
        for n in 1..=MAX_WALLETS_PER_USER {
            let wallet = ledger.create_wallet(key).expect("within capacity");
            assert_eq!(wallet.balance, STARTING_BALANCE);
            assert_eq!(ledger.user_by_key(key).unwrap().wallet_count, n);
        }
        let err = ledger.create_wallet(key).unwrap_err();
        assert!(matches!(err, LedgerError::CapacityExceeded));
        // The failed attempt must not bump the count.
        assert_eq!(
            ledger.user_by_key(key).unwrap().wallet_count,
            MAX_WALLETS_PER_USER
        );
    }

    pub fn wallet_creation_requires_known_user(ledger: &dyn Ledger) {
        let err = ledger.create_wallet(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    pub fn wallet_lookup_is_owner_scoped(ledger: &dyn Ledger) {
        let alice = make_user(ledger, "owner-alice");
        let bob = make_user(ledger, "owner-bob");
        let wallet = ledger.create_wallet(alice).unwrap();

        let found = ledger.wallet_of_user(alice, wallet.address).unwrap();
        assert_eq!(found.address, wallet.address);
        assert_eq!(found.api_key, alice);

        // Existing wallet, wrong owner: indistinguishable from missing.
        let err = ledger.wallet_of_user(bob, wallet.address).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
        let err = ledger.wallet_of_user(alice, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    pub fn balance_conservation_across_users(ledger: &dyn Ledger, admin: Uuid) {
        let alice = make_user(ledger, "conserve-alice");
        let bob = make_user(ledger, "conserve-bob");
        let source = ledger.create_wallet(alice).unwrap();
        let dest = ledger.create_wallet(bob).unwrap();

        let amount = 10_000u64;
        let expected_commission = (amount as f64 * COMMISSION_RATE).round() as u64;
        let stats_before = ledger.statistics(admin).unwrap();

        let commission = ledger
            .execute_transfer(Transfer {
                api_key: alice,
                wallet_from: source.address,
                wallet_to: dest.address,
                amount,
            })
            .expect("transfer");
        assert_eq!(commission, expected_commission);

        let source_after = ledger.wallet(source.address).unwrap();
        let dest_after = ledger.wallet(dest.address).unwrap();
        assert_eq!(source_after.balance, STARTING_BALANCE - amount);
        assert_eq!(
            dest_after.balance,
            STARTING_BALANCE + amount - expected_commission
        );

        let stats_after = ledger.statistics(admin).unwrap();
        assert_eq!(
            stats_after.transaction_count,
            stats_before.transaction_count + 1
        );
        assert_eq!(
            stats_after.commission_total,
            stats_before.commission_total + expected_commission
        );
    }

    pub fn same_owner_transfer_is_free(ledger: &dyn Ledger, admin: Uuid) {
        let alice = make_user(ledger, "free-alice");
        let source = ledger.create_wallet(alice).unwrap();
        let dest = ledger.create_wallet(alice).unwrap();
        let stats_before = ledger.statistics(admin).unwrap();

        let amount = 5_000u64;
        let commission = ledger
            .execute_transfer(Transfer {
                api_key: alice,
                wallet_from: source.address,
                wallet_to: dest.address,
                amount,
            })
            .unwrap();
        assert_eq!(commission, 0);

        assert_eq!(
            ledger.wallet(source.address).unwrap().balance,
            STARTING_BALANCE - amount
        );
        assert_eq!(
            ledger.wallet(dest.address).unwrap().balance,
            STARTING_BALANCE + amount
        );

        // Still counted, just commission-free.
        let stats_after = ledger.statistics(admin).unwrap();
        assert_eq!(
            stats_after.transaction_count,
            stats_before.transaction_count + 1
        );
        assert_eq!(stats_after.commission_total, stats_before.commission_total);
    }

    pub fn same_wallet_transfer_mutates_nothing(ledger: &dyn Ledger, admin: Uuid) {
        let alice = make_user(ledger, "selftx-alice");
        let wallet = ledger.create_wallet(alice).unwrap();
        let stats_before = ledger.statistics(admin).unwrap();

        let err = ledger
            .execute_transfer(Transfer {
                api_key: alice,
                wallet_from: wallet.address,
                wallet_to: wallet.address,
                amount: 100,
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::SameWallet));

        assert_eq!(ledger.wallet(wallet.address).unwrap().balance, STARTING_BALANCE);
        assert!(ledger.transactions_of_wallet(wallet.address).unwrap().is_empty());
        assert_eq!(ledger.statistics(admin).unwrap(), stats_before);
    }

    pub fn overdraft_mutates_nothing(ledger: &dyn Ledger, admin: Uuid) {
        let alice = make_user(ledger, "poor-alice");
        let bob = make_user(ledger, "poor-bob");
        let source = ledger.create_wallet(alice).unwrap();
        let dest = ledger.create_wallet(bob).unwrap();
        let stats_before = ledger.statistics(admin).unwrap();

        let err = ledger
            .execute_transfer(Transfer {
                api_key: alice,
                wallet_from: source.address,
                wallet_to: dest.address,
                amount: STARTING_BALANCE + 1,
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance));

        assert_eq!(ledger.wallet(source.address).unwrap().balance, STARTING_BALANCE);
        assert_eq!(ledger.wallet(dest.address).unwrap().balance, STARTING_BALANCE);
        assert_eq!(ledger.statistics(admin).unwrap(), stats_before);
    }

    pub fn foreign_source_wallet_is_not_found(ledger: &dyn Ledger) {
        let alice = make_user(ledger, "foreign-alice");
        let bob = make_user(ledger, "foreign-bob");
        let alices_wallet = ledger.create_wallet(alice).unwrap();
        let bobs_wallet = ledger.create_wallet(bob).unwrap();

        // Bob tries to spend from Alice's wallet.
        let err = ledger
            .execute_transfer(Transfer {
                api_key: bob,
                wallet_from: alices_wallet.address,
                wallet_to: bobs_wallet.address,
                amount: 100,
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
        assert_eq!(
            ledger.wallet(alices_wallet.address).unwrap().balance,
            STARTING_BALANCE
        );
    }

    pub fn missing_wallet_is_not_found(ledger: &dyn Ledger) {
        let alice = make_user(ledger, "missing-alice");
        let wallet = ledger.create_wallet(alice).unwrap();
        let err = ledger
            .execute_transfer(Transfer {
                api_key: alice,
                wallet_from: wallet.address,
                wallet_to: Uuid::new_v4(),
                amount: 100,
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    pub fn statistics_read_is_privileged(ledger: &dyn Ledger, admin: Uuid) {
        assert!(ledger.statistics(admin).is_ok());
        let intruder = make_user(ledger, "stats-intruder");
        let err = ledger.statistics(intruder).unwrap_err();
        assert!(matches!(err, LedgerError::AccessDenied));
    }

    /// The §4.4 asymmetry: user history deduplicates per unordered wallet
    /// pair, wallet history does not.
    pub fn history_asymmetry(ledger: &dyn Ledger) {
        let alice = make_user(ledger, "history-alice");
        let w1 = ledger.create_wallet(alice).unwrap();
        let w2 = ledger.create_wallet(alice).unwrap();

        ledger
            .execute_transfer(Transfer {
                api_key: alice,
                wallet_from: w1.address,
                wallet_to: w2.address,
                amount: 100,
            })
            .unwrap();
        ledger
            .execute_transfer(Transfer {
                api_key: alice,
                wallet_from: w2.address,
                wallet_to: w1.address,
                amount: 200,
            })
            .unwrap();

        let user_history = ledger.transactions_of_user(alice).unwrap();
        assert_eq!(user_history.len(), 1);
        assert_eq!(user_history[0].amount, 100);

        let wallet_history = ledger.transactions_of_wallet(w1.address).unwrap();
        assert_eq!(wallet_history.len(), 2);
        assert_eq!(wallet_history[0].amount, 100);
        assert_eq!(wallet_history[1].amount, 200);
    }

    /// Both counterparties see an inter-user transfer in their history.
    pub fn transfer_reaches_both_user_histories(ledger: &dyn Ledger) {
        let alice = make_user(ledger, "both-alice");
        let bob = make_user(ledger, "both-bob");
        let source = ledger.create_wallet(alice).unwrap();
        let dest = ledger.create_wallet(bob).unwrap();

        ledger
            .execute_transfer(Transfer {
                api_key: alice,
                wallet_from: source.address,
                wallet_to: dest.address,
                amount: 42,
            })
            .unwrap();

        assert_eq!(ledger.transactions_of_user(alice).unwrap().len(), 1);
        assert_eq!(ledger.transactions_of_user(bob).unwrap().len(), 1);
        assert_eq!(ledger.transactions_of_wallet(dest.address).unwrap().len(), 1);
    }

    pub fn record_commission_is_unconditional(ledger: &dyn Ledger, admin: Uuid) {
        let before = ledger.statistics(admin).unwrap();
        ledger.record_commission(7).unwrap();
        let after = ledger.statistics(admin).unwrap();
        assert_eq!(after.transaction_count, before.transaction_count + 1);
        assert_eq!(after.commission_total, before.commission_total + 7);
    }

    /// N concurrent transfers of `amount` from one wallet holding exactly
    /// N×amount: all must succeed and the balance must land on zero.
    pub fn concurrent_transfers_never_overdraw<L>(ledger: Arc<L>)
    where
        L: Ledger + 'static,
    {
        let threads = 8u64;
        let amount = STARTING_BALANCE / threads;

        let alice = make_user(ledger.as_ref(), "racing-alice");
        let bob = make_user(ledger.as_ref(), "racing-bob");
        let source = ledger.create_wallet(alice).unwrap();
        let dest = ledger.create_wallet(bob).unwrap();

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let transfer = Transfer {
                    api_key: alice,
                    wallet_from: source.address,
                    wallet_to: dest.address,
                    amount,
                };
                std::thread::spawn(move || ledger.execute_transfer(transfer).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|success| *success)
            .count() as u64;

        assert_eq!(successes, threads);
        assert_eq!(ledger.wallet(source.address).unwrap().balance, 0);
    }
}
