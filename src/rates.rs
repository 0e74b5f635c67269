// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Price oracle client.
//!
//! Fetches the USD spot price from a blockchain ticker endpoint, used only
//! when rendering wallet balances in a secondary display currency. The
//! ledger core never depends on this module and no mutation ever blocks on
//! it: every failure is logged and rendered as an absent field.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::config::{DEFAULT_TICKER_URL, TICKER_URL_ENV};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Ticker response shape: `{"USD": {"last": 12345.6}, ...}`.
#[derive(Debug, Deserialize)]
struct TickerEntry {
    last: f64,
}

#[derive(Clone)]
pub struct RateClient {
    client: Client,
    ticker_url: String,
}

impl RateClient {
    /// Build a client against the configured ticker endpoint.
    pub fn from_env() -> Self {
        let ticker_url =
            std::env::var(TICKER_URL_ENV).unwrap_or_else(|_| DEFAULT_TICKER_URL.to_string());
        Self::new(ticker_url)
    }

    pub fn new(ticker_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            ticker_url: ticker_url.into(),
        }
    }

    /// Current USD price of one coin, or `None` when the oracle is
    /// unreachable or returns something unexpected.
    pub async fn usd_rate(&self) -> Option<f64> {
        let response = match self.client.get(&self.ticker_url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "price oracle unreachable");
                return None;
            }
        };

        let tickers: std::collections::HashMap<String, TickerEntry> =
            match response.json().await {
                Ok(tickers) => tickers,
                Err(err) => {
                    warn!(error = %err, "price oracle returned malformed ticker");
                    return None;
                }
            };

        tickers.get("USD").map(|entry| entry.last)
    }
}
