// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::{
    primitives::{utils, TxHash, U256},
    rpc::types::eth::TransactionReceipt,
    transports::{RpcError, TransportErrorKind},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fractional digits in the base-unit representation. All raw
/// on-chain amounts are integers scaled by `10^18`.
pub const ETHER_DECIMALS: u32 = 18;

/// `10^18`, as a `U256`.
pub fn wei_per_ether() -> U256 {
    U256::from(10u64).pow(U256::from(ETHER_DECIMALS))
}

/// JSON-RPC error code returned when the user declines a wallet prompt.
const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Error)]
pub enum ChainClientError {
    /// RPC error
    #[error(transparent)]
    RpcError(#[from] RpcError<TransportErrorKind>),

    /// Contract call or deployment error
    #[error(transparent)]
    ContractError(#[from] alloy::contract::Error),

    /// Failure while watching a submitted transaction
    #[error(transparent)]
    PendingTransactionError(#[from] alloy::providers::PendingTransactionError),

    /// URL parsing error
    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    /// Hex parsing error
    #[error(transparent)]
    FromHexError(#[from] alloy::primitives::hex::FromHexError),

    /// The user declined a wallet prompt
    #[error("request rejected by the user")]
    UserRejected,

    /// The wallet does not know the requested chain
    #[error("chain {0} is not available in the wallet")]
    UnsupportedChain(u64),

    /// A user-typed amount that does not parse as a positive decimal
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    /// The endpoint cannot serve the request
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl ChainClientError {
    /// Whether this error means the user declined a wallet prompt, either
    /// directly or as a JSON-RPC 4001 error payload.
    pub fn is_user_rejection(&self) -> bool {
        match self {
            ChainClientError::UserRejected => true,
            ChainClientError::RpcError(RpcError::ErrorResp(payload)) => {
                payload.code == USER_REJECTED_CODE
            }
            _ => false,
        }
    }
}

/// The transient result of one transaction submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub hash: TxHash,
    pub succeeded: bool,
}

impl TransactionOutcome {
    pub fn from_receipt(receipt: &TransactionReceipt) -> Self {
        Self {
            hash: receipt.transaction_hash,
            succeeded: receipt.status(),
        }
    }
}

/// Converts a user-typed decimal string such as `"0.003"` into a raw wei
/// amount. Stricter than [`utils::parse_ether`], which it delegates to:
/// rejects empty, negative, signed and non-numeric input, as well as more
/// than 18 fractional digits. `"0"` parses to zero; whether zero is an
/// acceptable amount is the caller's decision.
pub fn parse_ether(input: &str) -> Result<U256, ChainClientError> {
    let invalid = || ChainClientError::InvalidAmount(input.to_string());
    let trimmed = input.trim();
    let (integer, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    if integer.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !digits(integer) || !digits(fraction) || fraction.len() > ETHER_DECIMALS as usize {
        return Err(invalid());
    }
    // The parser wants digits on both sides of the dot.
    let integer = if integer.is_empty() { "0" } else { integer };
    let fraction = if fraction.is_empty() { "0" } else { fraction };
    utils::parse_ether(&format!("{integer}.{fraction}")).map_err(|_| invalid())
}

/// Renders a raw wei amount as a decimal ether string, trimming the trailing
/// zeros that [`utils::format_ether`] pads the fractional part with.
pub fn format_ether(wei: U256) -> String {
    let formatted = utils::format_ether(wei);
    match formatted.split_once('.') {
        Some((integer, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                integer.to_string()
            } else {
                format!("{integer}.{fraction}")
            }
        }
        None => formatted,
    }
}
