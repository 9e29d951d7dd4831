// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{path::Path, time::Duration};

use alloy::primitives::{Address, U256};
use fundme_ethereum::common::wei_per_ether;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client configuration: which chain and contract to talk to, and the
/// constants the workflow falls back on when the contract cannot be read.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// The HTTP endpoint of the RPC node.
    pub rpc_url: Url,
    /// The only chain the workflow operates on. A wallet on any other chain
    /// is asked to switch before anything else happens.
    pub expected_chain_id: u64,
    /// Human-readable name of the target chain, for status messages.
    pub chain_name: String,
    /// The deployed FundMe contract.
    pub contract_address: Address,
    /// Minimum deposit shown when the contract's view functions cannot be
    /// read, raw 18-decimal quote-currency units.
    pub fallback_minimum_usd: U256,
    /// How often the background listener refreshes the contract balance.
    #[serde(default = "default_poll_interval")]
    pub balance_poll_interval: Duration,
    /// Balances below this (in wei) are classified as "low" for display.
    #[serde(default = "default_low_balance_threshold")]
    pub low_balance_threshold: U256,
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_low_balance_threshold() -> U256 {
    // 0.01 of the base currency.
    wei_per_ether() / U256::from(100u64)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: Url::parse("https://ethereum-sepolia-rpc.publicnode.com")
                .expect("valid default URL"),
            expected_chain_id: 11155111,
            chain_name: "Sepolia".to_string(),
            contract_address: Address::ZERO,
            fallback_minimum_usd: U256::from(5u64) * wei_per_ether(),
            balance_poll_interval: default_poll_interval(),
            low_balance_threshold: default_low_balance_threshold(),
        }
    }
}

impl ClientConfig {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
