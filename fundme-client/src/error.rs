// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::primitives::{TxHash, U256};
use fundme_ethereum::common::ChainClientError;

/// Everything a user-initiated action can fail with. Each variant maps to a
/// short status string; the session catches these at the action boundary and
/// writes them to the display sink instead of propagating them.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("no wallet provider is available")]
    NoProvider,
    #[error("request rejected by the user")]
    UserRejected,
    #[error("connected to chain {actual}, expected {chain_name} ({expected})")]
    NetworkMismatch {
        expected: u64,
        actual: u64,
        chain_name: String,
    },
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
    #[error("offered {offered_usd} is below the minimum deposit {minimum_usd}")]
    InsufficientAmount {
        minimum_usd: U256,
        offered_usd: U256,
    },
    #[error("simulation predicts failure: {0}")]
    Simulation(#[source] ChainClientError),
    #[error("submission failed: {0}")]
    Submission(#[source] ChainClientError),
    #[error("transaction {hash} reverted on chain")]
    TransactionFailed { hash: TxHash },
    #[error("read failed: {0}")]
    Read(#[source] ChainClientError),
    #[error("no session is connected")]
    NotConnected,
    #[error("only the contract owner may withdraw")]
    NotOwner,
    #[error("the contract holds no funds")]
    NothingToWithdraw,
    #[error("cancelled by the user")]
    Cancelled,
    #[error("another operation is in flight")]
    Busy,
}

impl Error {
    /// Classifies a failed view-function or balance read. A rejection code
    /// hidden inside the chain error still surfaces as [`Error::UserRejected`].
    pub fn read(err: ChainClientError) -> Self {
        if err.is_user_rejection() {
            Error::UserRejected
        } else {
            Error::Read(err)
        }
    }

    /// Classifies a failed dry-run.
    pub fn simulation(err: ChainClientError) -> Self {
        if err.is_user_rejection() {
            Error::UserRejected
        } else {
            Error::Simulation(err)
        }
    }

    /// Classifies a failed broadcast or confirmation.
    pub fn submission(err: ChainClientError) -> Self {
        if err.is_user_rejection() {
            Error::UserRejected
        } else {
            Error::Submission(err)
        }
    }

    /// The short human-readable string written to the status surface.
    pub fn user_message(&self) -> String {
        match self {
            Error::NoProvider => "No Wallet Detected".to_string(),
            Error::UserRejected => "Request rejected in the wallet".to_string(),
            Error::NetworkMismatch { chain_name, .. } => {
                format!("Wrong network: please switch to {chain_name}")
            }
            Error::InvalidAmount(_) => "Enter a valid positive amount".to_string(),
            Error::InsufficientAmount { .. } => {
                "Amount is below the minimum funding amount".to_string()
            }
            Error::Simulation(_) => "Transaction would fail; nothing was submitted".to_string(),
            Error::Submission(_) => "Transaction could not be completed".to_string(),
            Error::TransactionFailed { hash } => format!("Transaction {hash} reverted"),
            Error::Read(_) => "Unable to read on-chain state".to_string(),
            Error::NotConnected => "Connect a wallet first".to_string(),
            Error::NotOwner => "Only the contract owner can withdraw".to_string(),
            Error::NothingToWithdraw => "The contract has no funds to withdraw".to_string(),
            Error::Cancelled => "Withdrawal cancelled".to_string(),
            Error::Busy => "Another operation is still in progress".to_string(),
        }
    }

    /// Whether the failure warrants an interrupting alert on top of the
    /// status line.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            Error::NetworkMismatch { .. }
                | Error::InvalidAmount(_)
                | Error::InsufficientAmount { .. }
                | Error::Simulation(_)
                | Error::Submission(_)
                | Error::TransactionFailed { .. }
                | Error::NotOwner
                | Error::NothingToWithdraw
        )
    }
}
