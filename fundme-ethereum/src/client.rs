// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::common::{ChainClientError, TransactionOutcome};

/// Read-only access to the FundMe contract and account balances. All amounts
/// are raw base-unit integers; dividing by `10^18` is a display concern.
#[async_trait]
pub trait FundMeQueries {
    /// Returns the base-currency balance of an account or contract.
    async fn get_balance(&self, address: Address) -> Result<U256, ChainClientError>;

    /// Returns the minimum deposit, denominated in the quote currency.
    async fn minimum_usd(&self) -> Result<U256, ChainClientError>;

    /// Returns the oracle-backed live price of the base currency in the
    /// quote currency.
    async fn eth_price_usd(&self) -> Result<U256, ChainClientError>;

    /// Returns the contract owner.
    async fn owner(&self) -> Result<Address, ChainClientError>;

    /// Returns the cumulative amount funded by one address.
    async fn amount_funded(&self, funder: Address) -> Result<U256, ChainClientError>;

    /// Returns the funder recorded at the given index.
    async fn funder_at(&self, index: u64) -> Result<Address, ChainClientError>;
}

/// Write access to the FundMe contract: dry-run simulation, submission and
/// confirmation. Simulation must fail exactly when the real call would
/// revert.
#[async_trait]
pub trait FundMeWriter {
    /// Dry-runs `fund()` with the given value, without committing anything.
    async fn simulate_fund(&self, from: Address, value: U256) -> Result<(), ChainClientError>;

    /// Submits a `fund()` transaction and returns its hash.
    async fn fund(&self, from: Address, value: U256) -> Result<TxHash, ChainClientError>;

    /// Dry-runs the owner-gated `withdraw()`.
    async fn simulate_withdraw(&self, from: Address) -> Result<(), ChainClientError>;

    /// Submits a `withdraw()` transaction and returns its hash.
    async fn withdraw(&self, from: Address) -> Result<TxHash, ChainClientError>;

    /// Waits until the network returns a receipt for the given transaction.
    /// There is no timeout: a submitted transaction is always awaited.
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionOutcome, ChainClientError>;
}
