// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Recording mocks for the provider, chain-client and display boundaries.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use alloy::primitives::{address, b256, Address, TxHash, U256};
use async_trait::async_trait;
use fundme_ethereum::{
    client::{FundMeQueries, FundMeWriter},
    common::{wei_per_ether, ChainClientError, TransactionOutcome},
    wallet::{ProviderEvent, WalletProvider},
};
use tokio::sync::mpsc;

use crate::{
    config::ClientConfig,
    display::DisplaySink,
    persistent::Memory,
    session::{BalanceReading, ConnectionRecord, QuoteSnapshot, WalletSession},
};

pub const TARGET_CHAIN: u64 = 11155111;

pub fn contract_address() -> Address {
    address!("00000000000000000000000000000000000000c0")
}

pub fn user_address() -> Address {
    address!("0000000000000000000000000000000000000001")
}

pub fn other_address() -> Address {
    address!("0000000000000000000000000000000000000002")
}

pub fn mock_tx_hash() -> TxHash {
    b256!("1111111111111111111111111111111111111111111111111111111111111111")
}

/// `units` whole tokens in raw 18-decimal representation.
pub fn usd(units: u64) -> U256 {
    U256::from(units) * wei_per_ether()
}

fn unavailable(what: &str) -> ChainClientError {
    ChainClientError::Unavailable(what.to_string())
}

#[derive(Default)]
pub struct ProviderState {
    pub chain_id: u64,
    pub accounts: Vec<Address>,
    pub decline_switch: bool,
    pub decline_accounts: bool,
    pub calls: Vec<&'static str>,
    senders: Vec<mpsc::UnboundedSender<ProviderEvent>>,
}

/// A wallet provider with a scriptable chain, account list and decline
/// behavior; records every call it receives.
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl MockProvider {
    pub fn new(chain_id: u64, accounts: Vec<Address>) -> Self {
        let provider = Self::default();
        {
            let mut state = provider.lock();
            state.chain_id = chain_id;
            state.accounts = accounts;
        }
        provider
    }

    pub fn lock(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().expect("provider state poisoned")
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn set_chain(&self, chain_id: u64) {
        self.lock().chain_id = chain_id;
    }

    pub fn decline_switch(&self) {
        self.lock().decline_switch = true;
    }

    pub fn decline_accounts(&self) {
        self.lock().decline_accounts = true;
    }

    /// Pushes an event to every subscriber, as the wallet would.
    pub fn emit(&self, event: ProviderEvent) {
        for sender in &self.lock().senders {
            let _ = sender.send(event.clone());
        }
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn chain_id(&self) -> Result<u64, ChainClientError> {
        let mut state = self.lock();
        state.calls.push("chain_id");
        Ok(state.chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ChainClientError> {
        let mut state = self.lock();
        state.calls.push("switch_chain");
        if state.decline_switch {
            Err(ChainClientError::UserRejected)
        } else {
            state.chain_id = chain_id;
            Ok(())
        }
    }

    async fn accounts(&self) -> Result<Vec<Address>, ChainClientError> {
        let mut state = self.lock();
        state.calls.push("accounts");
        Ok(state.accounts.clone())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ChainClientError> {
        let mut state = self.lock();
        state.calls.push("request_accounts");
        if state.decline_accounts {
            Err(ChainClientError::UserRejected)
        } else {
            Ok(state.accounts.clone())
        }
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.lock().senders.push(sender);
        receiver
    }
}

pub struct ChainState {
    pub minimum_usd: U256,
    pub eth_price_usd: U256,
    pub owner: Address,
    pub balances: HashMap<Address, U256>,
    pub funded: HashMap<Address, U256>,
    /// One entry per successful `fund()`, in submission order.
    pub funders: Vec<Address>,
    pub fail_reads: bool,
    pub fail_simulation: bool,
    pub fail_submission: bool,
    pub receipt_succeeds: bool,
    pub calls: Vec<&'static str>,
}

impl Default for ChainState {
    fn default() -> Self {
        Self {
            minimum_usd: usd(5),
            eth_price_usd: usd(2500),
            owner: Address::ZERO,
            balances: HashMap::new(),
            funded: HashMap::new(),
            funders: Vec::new(),
            fail_reads: false,
            fail_simulation: false,
            fail_submission: false,
            receipt_succeeds: true,
            calls: Vec::new(),
        }
    }
}

/// A FundMe contract and node with scriptable values and failure injection;
/// records every call it receives.
#[derive(Clone, Default)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    pub fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().expect("chain state poisoned")
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn call_position(&self, name: &str) -> Option<usize> {
        self.lock().calls.iter().position(|call| *call == name)
    }

    pub fn set_price(&self, price: U256) {
        self.lock().eth_price_usd = price;
    }

    pub fn set_owner(&self, owner: Address) {
        self.lock().owner = owner;
    }

    pub fn set_balance(&self, address: Address, wei: U256) {
        self.lock().balances.insert(address, wei);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn fail_simulation(&self) {
        self.lock().fail_simulation = true;
    }

    pub fn fail_submission(&self) {
        self.lock().fail_submission = true;
    }

    pub fn set_receipt_success(&self, succeeds: bool) {
        self.lock().receipt_succeeds = succeeds;
    }
}

#[async_trait]
impl FundMeQueries for MockChain {
    async fn get_balance(&self, address: Address) -> Result<U256, ChainClientError> {
        let mut state = self.lock();
        state.calls.push("get_balance");
        if state.fail_reads {
            return Err(unavailable("get_balance"));
        }
        Ok(state.balances.get(&address).copied().unwrap_or_default())
    }

    async fn minimum_usd(&self) -> Result<U256, ChainClientError> {
        let mut state = self.lock();
        state.calls.push("minimum_usd");
        if state.fail_reads {
            return Err(unavailable("minimum_usd"));
        }
        Ok(state.minimum_usd)
    }

    async fn eth_price_usd(&self) -> Result<U256, ChainClientError> {
        let mut state = self.lock();
        state.calls.push("eth_price_usd");
        if state.fail_reads {
            return Err(unavailable("eth_price_usd"));
        }
        Ok(state.eth_price_usd)
    }

    async fn owner(&self) -> Result<Address, ChainClientError> {
        let mut state = self.lock();
        state.calls.push("owner");
        if state.fail_reads {
            return Err(unavailable("owner"));
        }
        Ok(state.owner)
    }

    async fn amount_funded(&self, funder: Address) -> Result<U256, ChainClientError> {
        let mut state = self.lock();
        state.calls.push("amount_funded");
        if state.fail_reads {
            return Err(unavailable("amount_funded"));
        }
        Ok(state.funded.get(&funder).copied().unwrap_or_default())
    }

    async fn funder_at(&self, index: u64) -> Result<Address, ChainClientError> {
        let mut state = self.lock();
        state.calls.push("funder_at");
        state
            .funders
            .get(index as usize)
            .copied()
            .ok_or_else(|| unavailable("funder_at"))
    }
}

#[async_trait]
impl FundMeWriter for MockChain {
    async fn simulate_fund(&self, _from: Address, _value: U256) -> Result<(), ChainClientError> {
        let mut state = self.lock();
        state.calls.push("simulate_fund");
        if state.fail_simulation {
            return Err(unavailable("simulate_fund"));
        }
        Ok(())
    }

    async fn fund(&self, from: Address, value: U256) -> Result<TxHash, ChainClientError> {
        let mut state = self.lock();
        state.calls.push("fund");
        if state.fail_submission {
            return Err(unavailable("fund"));
        }
        *state.funded.entry(from).or_default() += value;
        state.funders.push(from);
        Ok(mock_tx_hash())
    }

    async fn simulate_withdraw(&self, _from: Address) -> Result<(), ChainClientError> {
        let mut state = self.lock();
        state.calls.push("simulate_withdraw");
        if state.fail_simulation {
            return Err(unavailable("simulate_withdraw"));
        }
        Ok(())
    }

    async fn withdraw(&self, _from: Address) -> Result<TxHash, ChainClientError> {
        let mut state = self.lock();
        state.calls.push("withdraw");
        if state.fail_submission {
            return Err(unavailable("withdraw"));
        }
        Ok(mock_tx_hash())
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionOutcome, ChainClientError> {
        let mut state = self.lock();
        state.calls.push("wait_for_receipt");
        Ok(TransactionOutcome {
            hash,
            succeeded: state.receipt_succeeds,
        })
    }
}

pub struct DisplayState {
    pub statuses: Vec<String>,
    pub alerts: Vec<String>,
    pub confirms: Vec<String>,
    pub confirm_answer: bool,
    pub accounts: Vec<Option<Address>>,
    pub wallet_balances: Vec<String>,
    pub contract_readings: Vec<BalanceReading>,
    pub quotes: Vec<QuoteSnapshot>,
    pub funded: Vec<String>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            statuses: Vec::new(),
            alerts: Vec::new(),
            confirms: Vec::new(),
            confirm_answer: true,
            accounts: Vec::new(),
            wallet_balances: Vec::new(),
            contract_readings: Vec::new(),
            quotes: Vec::new(),
            funded: Vec::new(),
        }
    }
}

/// A display sink that records everything it is shown.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    state: Arc<Mutex<DisplayState>>,
}

impl RecordingDisplay {
    pub fn lock(&self) -> MutexGuard<'_, DisplayState> {
        self.state.lock().expect("display state poisoned")
    }

    pub fn statuses(&self) -> Vec<String> {
        self.lock().statuses.clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.lock().alerts.clone()
    }

    pub fn last_quote(&self) -> Option<QuoteSnapshot> {
        self.lock().quotes.last().cloned()
    }

    pub fn contract_readings(&self) -> Vec<BalanceReading> {
        self.lock().contract_readings.clone()
    }

    pub fn set_confirm(&self, answer: bool) {
        self.lock().confirm_answer = answer;
    }
}

impl DisplaySink for RecordingDisplay {
    fn status(&self, message: &str) {
        self.lock().statuses.push(message.to_string());
    }

    fn alert(&self, message: &str) {
        self.lock().alerts.push(message.to_string());
    }

    fn connected_account(&self, address: Option<Address>) {
        self.lock().accounts.push(address);
    }

    fn wallet_balance(&self, ether: &str) {
        self.lock().wallet_balances.push(ether.to_string());
    }

    fn contract_balance(&self, reading: &BalanceReading) {
        self.lock().contract_readings.push(reading.clone());
    }

    fn quote(&self, snapshot: &QuoteSnapshot) {
        self.lock().quotes.push(snapshot.clone());
    }

    fn funded_amount(&self, ether: &str) {
        self.lock().funded.push(ether.to_string());
    }

    fn confirm(&self, prompt: &str) -> bool {
        let mut state = self.lock();
        state.confirms.push(prompt.to_string());
        state.confirm_answer
    }
}

pub struct TestEnv {
    pub provider: MockProvider,
    pub chain: MockChain,
    pub display: RecordingDisplay,
}

pub type TestSession = WalletSession<MockProvider, MockChain, RecordingDisplay, Memory<ConnectionRecord>>;

pub fn test_config() -> ClientConfig {
    ClientConfig {
        contract_address: contract_address(),
        ..ClientConfig::default()
    }
}

pub fn make_session() -> (TestSession, TestEnv) {
    make_session_with(
        MockProvider::new(TARGET_CHAIN, vec![user_address()]),
        ConnectionRecord::default(),
    )
}

pub fn make_session_with(
    provider: MockProvider,
    record: ConnectionRecord,
) -> (TestSession, TestEnv) {
    let chain = MockChain::default();
    let display = RecordingDisplay::default();
    let session = WalletSession::new(
        test_config(),
        Some(provider.clone()),
        chain.clone(),
        display.clone(),
        Memory::new(record),
    );
    (
        session,
        TestEnv {
            provider,
            chain,
            display,
        },
    )
}

pub fn make_session_without_provider() -> (TestSession, TestEnv) {
    let chain = MockChain::default();
    let display = RecordingDisplay::default();
    let session = WalletSession::new(
        test_config(),
        None,
        chain.clone(),
        display.clone(),
        Memory::new(ConnectionRecord::default()),
    );
    (
        session,
        TestEnv {
            provider: MockProvider::default(),
            chain,
            display,
        },
    )
}
