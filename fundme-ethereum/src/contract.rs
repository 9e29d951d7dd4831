// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    sol,
};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use url::Url;

use crate::{
    client::{FundMeQueries, FundMeWriter},
    common::{ChainClientError, TransactionOutcome},
};

sol! {
    /// The fixed on-chain interface consumed by the funding workflow. The
    /// funding logic, price oracle and access control are all enforced by
    /// the contract itself.
    #[sol(rpc)]
    contract IFundMe {
        function fund() external payable;
        function withdraw() external;
        function owner() external view returns (address);
        function getPrice() external view returns (uint256);
        function minimumUsd() external view returns (uint256);
        function addressToAmountFunded(address funder) external view returns (uint256);
        function funders(uint256 index) external view returns (address);
    }
}

/// How often to ask the node for a receipt of a submitted transaction.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// An RPC-backed client for one deployed FundMe contract.
pub struct FundingClient {
    provider: DynProvider,
    contract: IFundMe::IFundMeInstance<DynProvider>,
}

impl FundingClient {
    /// Connects a read-only client to an existing Ethereum node.
    pub fn connect_http(url: &str, contract_address: Address) -> Result<Self, ChainClientError> {
        let rpc_url = Url::parse(url)?;
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        Ok(Self::with_provider(provider, contract_address))
    }

    /// Connects a write-capable client that signs locally with the given key.
    pub fn connect_http_with_signer(
        url: &str,
        contract_address: Address,
        signer: PrivateKeySigner,
    ) -> Result<Self, ChainClientError> {
        let rpc_url = Url::parse(url)?;
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(rpc_url)
            .erased();
        Ok(Self::with_provider(provider, contract_address))
    }

    /// Wraps an already-built provider. This is how a browser-style provider
    /// that signs elsewhere gets plugged in.
    pub fn with_provider(provider: DynProvider, contract_address: Address) -> Self {
        let contract = IFundMe::new(contract_address, provider.clone());
        Self { provider, contract }
    }

    pub fn contract_address(&self) -> Address {
        *self.contract.address()
    }
}

#[async_trait]
impl FundMeQueries for FundingClient {
    async fn get_balance(&self, address: Address) -> Result<U256, ChainClientError> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn minimum_usd(&self) -> Result<U256, ChainClientError> {
        Ok(self.contract.minimumUsd().call().await?)
    }

    async fn eth_price_usd(&self) -> Result<U256, ChainClientError> {
        Ok(self.contract.getPrice().call().await?)
    }

    async fn owner(&self) -> Result<Address, ChainClientError> {
        Ok(self.contract.owner().call().await?)
    }

    async fn amount_funded(&self, funder: Address) -> Result<U256, ChainClientError> {
        Ok(self.contract.addressToAmountFunded(funder).call().await?)
    }

    async fn funder_at(&self, index: u64) -> Result<Address, ChainClientError> {
        Ok(self.contract.funders(U256::from(index)).call().await?)
    }
}

#[async_trait]
impl FundMeWriter for FundingClient {
    async fn simulate_fund(&self, from: Address, value: U256) -> Result<(), ChainClientError> {
        self.contract.fund().value(value).from(from).call().await?;
        Ok(())
    }

    async fn fund(&self, from: Address, value: U256) -> Result<TxHash, ChainClientError> {
        let pending = self.contract.fund().value(value).from(from).send().await?;
        Ok(*pending.tx_hash())
    }

    async fn simulate_withdraw(&self, from: Address) -> Result<(), ChainClientError> {
        self.contract.withdraw().from(from).call().await?;
        Ok(())
    }

    async fn withdraw(&self, from: Address) -> Result<TxHash, ChainClientError> {
        let pending = self.contract.withdraw().from(from).send().await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionOutcome, ChainClientError> {
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(hash).await? {
                return Ok(TransactionOutcome::from_receipt(&receipt));
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}
