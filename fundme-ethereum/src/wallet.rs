// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Mutex;

use alloy::primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::common::ChainClientError;

/// Notifications pushed by a wallet provider, interleaved arbitrarily with
/// user-initiated actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The selected accounts changed; an empty list means the wallet
    /// disconnected from the application.
    AccountsChanged(Vec<Address>),
    /// The wallet switched to another chain.
    ChainChanged(u64),
}

/// The wallet boundary: account management, chain selection and signing all
/// live behind this capability. A browser extension, a hardware wallet or a
/// local key can each stand behind it.
#[async_trait]
pub trait WalletProvider {
    /// Returns the chain the wallet is currently on.
    async fn chain_id(&self) -> Result<u64, ChainClientError>;

    /// Asks the wallet to switch to the given chain. Fails with
    /// [`ChainClientError::UserRejected`] if the user declines, or
    /// [`ChainClientError::UnsupportedChain`] if the wallet does not know
    /// the chain.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), ChainClientError>;

    /// Returns the accounts already exposed to the application, without
    /// prompting. Used for silent reconnection.
    async fn accounts(&self) -> Result<Vec<Address>, ChainClientError>;

    /// Requests account access, possibly prompting the user. Fails with
    /// [`ChainClientError::UserRejected`] if declined.
    async fn request_accounts(&self) -> Result<Vec<Address>, ChainClientError>;

    /// Subscribes to account-change and chain-change notifications.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent>;
}

/// A provider over one local key and one fixed chain, for headless use.
/// There is no user to prompt, so account requests always succeed and a
/// switch to any other chain is refused.
pub struct LocalSigningProvider {
    signer: PrivateKeySigner,
    chain_id: u64,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ProviderEvent>>>,
}

impl LocalSigningProvider {
    pub fn new(signer: PrivateKeySigner, chain_id: u64) -> Self {
        Self {
            signer,
            chain_id,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The underlying signer, for building a write-capable client.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

#[async_trait]
impl WalletProvider for LocalSigningProvider {
    async fn chain_id(&self) -> Result<u64, ChainClientError> {
        Ok(self.chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ChainClientError> {
        if chain_id == self.chain_id {
            Ok(())
        } else {
            Err(ChainClientError::UnsupportedChain(chain_id))
        }
    }

    async fn accounts(&self) -> Result<Vec<Address>, ChainClientError> {
        Ok(vec![self.signer.address()])
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ChainClientError> {
        Ok(vec![self.signer.address()])
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        // A local key never changes accounts or chains; the sender is kept
        // so the channel stays open instead of closing immediately.
        self.subscribers
            .lock()
            .expect("subscriber list poisoned")
            .push(sender);
        receiver
    }
}
