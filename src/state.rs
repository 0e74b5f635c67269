// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::ledger::Ledger;
use crate::rates::RateClient;

/// Shared application state: the ledger store behind the capability
/// contract, plus the display-only price oracle client.
///
/// The backend is injected here once at startup; handlers never know which
/// one they are talking to.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub rates: RateClient,
}

impl AppState {
    pub fn new(ledger: Arc<dyn Ledger>, rates: RateClient) -> Self {
        Self { ledger, rates }
    }
}
