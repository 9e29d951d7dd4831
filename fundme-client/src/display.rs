// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::primitives::Address;
use tracing::{info, warn};

use crate::session::{BalanceReading, QuoteSnapshot};

/// The presentation boundary. Every method has a no-op default, so a sink
/// only implements the fields it actually renders; a missing field is
/// silently skipped rather than an error.
#[allow(unused_variables)]
pub trait DisplaySink: Send + Sync {
    /// A short status line describing the last action's result.
    fn status(&self, message: &str) {}

    /// An interrupting alert for blocking failures.
    fn alert(&self, message: &str) {}

    /// The connected account, or `None` after a disconnect.
    fn connected_account(&self, address: Option<Address>) {}

    /// The connected account's balance, already converted for display.
    fn wallet_balance(&self, ether: &str) {}

    /// The contract's balance and its classification bucket.
    fn contract_balance(&self, reading: &BalanceReading) {}

    /// The current deposit requirements.
    fn quote(&self, snapshot: &QuoteSnapshot) {}

    /// The connected account's cumulative funded amount.
    fn funded_amount(&self, ether: &str) {}

    /// Asks the user to confirm a withdrawal. Defaults to proceeding, for
    /// sinks with no way to ask.
    fn confirm(&self, prompt: &str) -> bool {
        true
    }
}

/// A sink that renders nothing.
pub struct NullDisplay;

impl DisplaySink for NullDisplay {}

/// A sink that routes every field through `tracing`, for headless runs.
pub struct TracingDisplay;

impl DisplaySink for TracingDisplay {
    fn status(&self, message: &str) {
        info!(target: "fundme::display", "{message}");
    }

    fn alert(&self, message: &str) {
        warn!(target: "fundme::display", "{message}");
    }

    fn connected_account(&self, address: Option<Address>) {
        match address {
            Some(address) => info!(target: "fundme::display", %address, "account"),
            None => info!(target: "fundme::display", "no account connected"),
        }
    }

    fn wallet_balance(&self, ether: &str) {
        info!(target: "fundme::display", ether, "wallet balance");
    }

    fn contract_balance(&self, reading: &BalanceReading) {
        info!(
            target: "fundme::display",
            ether = %reading.ether,
            level = ?reading.level,
            "contract balance"
        );
    }

    fn quote(&self, snapshot: &QuoteSnapshot) {
        info!(
            target: "fundme::display",
            minimum_usd = %snapshot.minimum_usd,
            fallback = snapshot.fallback,
            "quote"
        );
    }

    fn funded_amount(&self, ether: &str) {
        info!(target: "fundme::display", ether, "funded so far");
    }

    fn confirm(&self, prompt: &str) -> bool {
        info!(target: "fundme::display", "{prompt} (proceeding)");
        true
    }
}
