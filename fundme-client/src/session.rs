// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The wallet session: one mutable object orchestrating connect, contract
//! reads, funding submissions and provider callbacks. All provider and chain
//! access goes through the trait seams, so the workflow is testable without
//! a node.

use alloy::primitives::{Address, U256};
use fundme_ethereum::{
    client::{FundMeQueries, FundMeWriter},
    common::{format_ether, parse_ether, wei_per_ether, TransactionOutcome},
    wallet::{ProviderEvent, WalletProvider},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::ClientConfig,
    display::DisplaySink,
    persistent::Persist,
    Error,
};

/// The connection record persisted between page loads, used only to attempt
/// silent reconnection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub connected: bool,
    pub address: Option<Address>,
}

/// The per-session state machine. `Connecting` and `Submitting` double as an
/// in-flight guard: a second user action arriving in either state is refused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Submitting,
}

/// A snapshot of the contract's deposit requirements, recomputed on every
/// connect and before every submission. Never cached across reconnects: the
/// price is live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteSnapshot {
    /// Minimum deposit in the quote currency, raw 18-decimal units.
    pub minimum_usd: U256,
    /// Live price of the base currency, raw 18-decimal units, or `None`
    /// when the oracle read failed and the snapshot is a fallback.
    pub eth_price_usd: Option<U256>,
    /// `minimum_usd / eth_price_usd`, in wei.
    pub minimum_eth: Option<U256>,
    pub fallback: bool,
}

impl QuoteSnapshot {
    /// Derives a snapshot from freshly read contract values.
    pub fn derive(minimum_usd: U256, eth_price_usd: U256) -> Self {
        let minimum_eth = if eth_price_usd.is_zero() {
            None
        } else {
            minimum_usd
                .checked_mul(wei_per_ether())
                .map(|scaled| scaled / eth_price_usd)
        };
        Self {
            minimum_usd,
            eth_price_usd: Some(eth_price_usd),
            minimum_eth,
            fallback: false,
        }
    }

    /// The snapshot used when the contract reads fail during connect: the
    /// configured default minimum, no live price.
    pub fn fallback(minimum_usd: U256) -> Self {
        Self {
            minimum_usd,
            eth_price_usd: None,
            minimum_eth: None,
            fallback: true,
        }
    }

    /// The USD-equivalent of a wei amount under this snapshot's price, or
    /// `None` without a live price.
    pub fn offered_usd(&self, amount_wei: U256) -> Option<U256> {
        let price = self.eth_price_usd?;
        amount_wei
            .checked_mul(price)
            .map(|scaled| scaled / wei_per_ether())
    }

    /// Whether a wei amount meets the minimum deposit.
    pub fn meets_minimum(&self, amount_wei: U256) -> Option<bool> {
        Some(self.offered_usd(amount_wei)? >= self.minimum_usd)
    }
}

/// Display classification of the contract's balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceLevel {
    Empty,
    Low,
    Funded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceReading {
    pub wei: U256,
    pub ether: String,
    pub level: BalanceLevel,
}

impl BalanceReading {
    pub fn classify(wei: U256, low_threshold: U256) -> Self {
        let level = if wei.is_zero() {
            BalanceLevel::Empty
        } else if wei < low_threshold {
            BalanceLevel::Low
        } else {
            BalanceLevel::Funded
        };
        Self {
            wei,
            ether: format_ether(wei),
            level,
        }
    }
}

/// The single mutable session object. Updates from user actions and from
/// provider callbacks all go through methods on this type; callers that
/// share it across tasks wrap it in a mutex so each callback is applied
/// atomically.
pub struct WalletSession<P, C, D, S> {
    config: ClientConfig,
    provider: Option<P>,
    chain: C,
    display: D,
    store: S,
    state: SessionState,
    address: Option<Address>,
    quote: Option<QuoteSnapshot>,
}

impl<P, C, D, S> WalletSession<P, C, D, S>
where
    P: WalletProvider + Send + Sync,
    C: FundMeQueries + FundMeWriter + Send + Sync,
    D: DisplaySink,
    S: Persist<Target = ConnectionRecord>,
{
    /// Creates a disconnected session. `provider` is `None` when no wallet
    /// is installed; every connect attempt will then report "No Wallet
    /// Detected" without any network call.
    pub fn new(config: ClientConfig, provider: Option<P>, chain: C, display: D, store: S) -> Self {
        Self {
            config,
            provider,
            chain,
            display,
            store,
            state: SessionState::default(),
            address: None,
            quote: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected && self.address.is_some()
    }

    pub fn connected_address(&self) -> Option<Address> {
        self.address
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn quote(&self) -> Option<&QuoteSnapshot> {
        self.quote.as_ref()
    }

    /// The persisted connection record.
    pub fn record(&self) -> &ConnectionRecord {
        &self.store
    }

    /// Connects the wallet, reporting the result to the display sink.
    /// Returns whether the session ended up connected.
    pub async fn connect(&mut self) -> bool {
        match self.try_connect().await {
            Ok(address) => {
                info!(%address, "wallet connected");
                self.display.status(&format!("Connected: {address}"));
                true
            }
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    /// The fallible connect workflow: verify network, request accounts,
    /// adopt the first address, then read balances and the quote. The read
    /// phase degrades gracefully: its failure leaves the session connected
    /// with a fallback quote.
    pub async fn try_connect(&mut self) -> Result<Address, Error> {
        match self.state {
            SessionState::Connecting | SessionState::Submitting => return Err(Error::Busy),
            SessionState::Disconnected | SessionState::Connected => {}
        }
        self.state = SessionState::Connecting;
        let result = self.connect_steps().await;
        match &result {
            Ok(_) => self.state = SessionState::Connected,
            Err(_) => {
                self.state = SessionState::Disconnected;
                self.address = None;
                self.quote = None;
                self.display.connected_account(None);
            }
        }
        result
    }

    async fn connect_steps(&mut self) -> Result<Address, Error> {
        if self.provider.is_none() {
            return Err(Error::NoProvider);
        }
        self.verify_network().await?;
        let provider = self.provider.as_ref().ok_or(Error::NoProvider)?;
        let accounts = provider.request_accounts().await.map_err(|err| {
            if err.is_user_rejection() {
                Error::UserRejected
            } else {
                Error::read(err)
            }
        })?;
        let address = *accounts.first().ok_or(Error::UserRejected)?;
        self.address = Some(address);
        self.display.connected_account(Some(address));
        self.save_record(ConnectionRecord {
            connected: true,
            address: Some(address),
        });
        // The read phase. None of these failures roll back the connection.
        self.refresh_wallet_balance().await;
        self.refresh_quote_soft().await;
        self.refresh_funded_amount().await;
        Ok(address)
    }

    /// Attempts a silent reconnection from the persisted record: no prompt,
    /// no network-switch request. Returns whether the session reconnected.
    pub async fn try_reconnect(&mut self) -> Result<bool, Error> {
        if !self.record().connected {
            return Ok(false);
        }
        let Some(provider) = self.provider.as_ref() else {
            return Ok(false);
        };
        let actual = provider.chain_id().await.map_err(Error::read)?;
        if actual != self.config.expected_chain_id {
            debug!(actual, "not reconnecting: wallet is on another chain");
            return Ok(false);
        }
        let accounts = provider.accounts().await.map_err(Error::read)?;
        let remembered = self.record().address;
        let Some(address) = remembered
            .filter(|address| accounts.contains(address))
            .or_else(|| accounts.first().copied())
        else {
            return Ok(false);
        };
        self.address = Some(address);
        self.state = SessionState::Connected;
        self.display.connected_account(Some(address));
        self.refresh_wallet_balance().await;
        self.refresh_quote_soft().await;
        self.refresh_funded_amount().await;
        info!(%address, "wallet silently reconnected");
        Ok(true)
    }

    /// Clears the session and the persisted record.
    pub fn disconnect(&mut self) {
        self.state = SessionState::Disconnected;
        self.address = None;
        self.quote = None;
        self.display.connected_account(None);
        self.save_record(ConnectionRecord::default());
        self.display.status("Disconnected");
    }

    /// Submits a funding transaction for a user-typed amount, reporting the
    /// outcome to the display sink.
    pub async fn buy_coffee(&mut self, amount: &str) -> Option<TransactionOutcome> {
        match self.try_buy_coffee(amount).await {
            Ok(outcome) => {
                info!(hash = %outcome.hash, "funding confirmed");
                self.display
                    .status(&format!("Funded! Transaction {}", outcome.hash));
                Some(outcome)
            }
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    /// The fallible funding workflow: parse, re-verify the network, re-read
    /// the quote (fatal on failure here, unlike during connect), check the
    /// minimum, then simulate, submit and await the receipt.
    pub async fn try_buy_coffee(&mut self, amount: &str) -> Result<TransactionOutcome, Error> {
        match self.state {
            SessionState::Connecting | SessionState::Submitting => return Err(Error::Busy),
            SessionState::Disconnected => return Err(Error::NotConnected),
            SessionState::Connected => {}
        }
        self.state = SessionState::Submitting;
        let result = self.buy_coffee_steps(amount).await;
        // A handled failure leaves the session connected; only the user
        // disconnects it.
        self.state = SessionState::Connected;
        result
    }

    async fn buy_coffee_steps(&mut self, amount: &str) -> Result<TransactionOutcome, Error> {
        let address = self.address.ok_or(Error::NotConnected)?;
        let wei =
            parse_ether(amount).map_err(|_| Error::InvalidAmount(amount.to_string()))?;
        if wei.is_zero() {
            return Err(Error::InvalidAmount(amount.to_string()));
        }
        self.verify_network().await?;
        // Values may have changed since connect; always decide on fresh data.
        let quote = self.read_quote().await?;
        self.quote = Some(quote.clone());
        self.display.quote(&quote);
        let offered_usd = quote
            .offered_usd(wei)
            .ok_or_else(|| Error::InvalidAmount(amount.to_string()))?;
        if offered_usd < quote.minimum_usd {
            return Err(Error::InsufficientAmount {
                minimum_usd: quote.minimum_usd,
                offered_usd,
            });
        }
        self.chain
            .simulate_fund(address, wei)
            .await
            .map_err(Error::simulation)?;
        let hash = self.chain.fund(address, wei).await.map_err(Error::submission)?;
        self.display
            .status(&format!("Transaction {hash} submitted, awaiting confirmation"));
        let outcome = self
            .chain
            .wait_for_receipt(hash)
            .await
            .map_err(Error::submission)?;
        if !outcome.succeeded {
            return Err(Error::TransactionFailed { hash: outcome.hash });
        }
        self.refresh_wallet_balance().await;
        self.refresh_funded_amount().await;
        self.get_contract_balance().await;
        Ok(outcome)
    }

    /// Reads and classifies the contract's balance. Fails soft: on a read
    /// error it reports to the display and returns `None`.
    pub async fn get_contract_balance(&self) -> Option<BalanceReading> {
        match self.chain.get_balance(self.config.contract_address).await {
            Ok(wei) => {
                let reading = BalanceReading::classify(wei, self.config.low_balance_threshold);
                self.display.contract_balance(&reading);
                Some(reading)
            }
            Err(err) => {
                warn!(%err, "failed to read the contract balance");
                self.display.status("Unable to read the contract balance");
                None
            }
        }
    }

    /// Whether the connected address is the contract owner. Returns `false`
    /// on any read failure rather than failing the caller. The comparison is
    /// on parsed addresses, so letter case never matters.
    pub async fn check_if_owner(&self) -> bool {
        let Some(address) = self.address else {
            return false;
        };
        match self.chain.owner().await {
            Ok(owner) => owner == address,
            Err(err) => {
                debug!(%err, "owner check failed");
                false
            }
        }
    }

    /// Withdraws the contract balance to the owner, reporting the outcome to
    /// the display sink.
    pub async fn withdraw(&mut self) -> Option<TransactionOutcome> {
        match self.try_withdraw().await {
            Ok(outcome) => {
                info!(hash = %outcome.hash, "withdrawal confirmed");
                self.display
                    .status(&format!("Withdrawn. Transaction {}", outcome.hash));
                Some(outcome)
            }
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    /// The fallible withdrawal workflow: owner-gated, requires a non-empty
    /// contract and an explicit confirmation, then the same
    /// simulate-submit-await pattern as funding.
    pub async fn try_withdraw(&mut self) -> Result<TransactionOutcome, Error> {
        match self.state {
            SessionState::Connecting | SessionState::Submitting => return Err(Error::Busy),
            SessionState::Disconnected => return Err(Error::NotConnected),
            SessionState::Connected => {}
        }
        self.state = SessionState::Submitting;
        let result = self.withdraw_steps().await;
        self.state = SessionState::Connected;
        result
    }

    async fn withdraw_steps(&mut self) -> Result<TransactionOutcome, Error> {
        let address = self.address.ok_or(Error::NotConnected)?;
        if !self.check_if_owner().await {
            return Err(Error::NotOwner);
        }
        let balance = self
            .chain
            .get_balance(self.config.contract_address)
            .await
            .map_err(Error::read)?;
        if balance.is_zero() {
            return Err(Error::NothingToWithdraw);
        }
        let prompt = format!("Withdraw {} ETH from the contract?", format_ether(balance));
        if !self.display.confirm(&prompt) {
            return Err(Error::Cancelled);
        }
        self.chain
            .simulate_withdraw(address)
            .await
            .map_err(Error::simulation)?;
        let hash = self.chain.withdraw(address).await.map_err(Error::submission)?;
        self.display
            .status(&format!("Transaction {hash} submitted, awaiting confirmation"));
        let outcome = self
            .chain
            .wait_for_receipt(hash)
            .await
            .map_err(Error::submission)?;
        if !outcome.succeeded {
            return Err(Error::TransactionFailed { hash: outcome.hash });
        }
        self.get_contract_balance().await;
        self.refresh_wallet_balance().await;
        Ok(outcome)
    }

    /// The single entry point for provider callbacks. Call this under the
    /// same lock as user actions so each callback is applied atomically.
    pub async fn apply_event(&mut self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.first() {
                None => {
                    info!("wallet reported no accounts; disconnecting");
                    self.disconnect();
                }
                Some(&address) => {
                    info!(%address, "wallet switched accounts");
                    self.address = Some(address);
                    self.display.connected_account(Some(address));
                    self.save_record(ConnectionRecord {
                        connected: true,
                        address: Some(address),
                    });
                    self.refresh_wallet_balance().await;
                    self.refresh_funded_amount().await;
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                if chain_id == self.config.expected_chain_id {
                    debug!("wallet switched to the target chain");
                } else {
                    warn!(chain_id, "wallet switched to another chain; resetting");
                    // Keep the record: a later reconnect attempt can recover
                    // once the wallet is back on the target chain.
                    self.state = SessionState::Disconnected;
                    self.address = None;
                    self.quote = None;
                    self.display.connected_account(None);
                    self.display
                        .status(&format!("Wrong network: please switch to {}", self.config.chain_name));
                }
            }
        }
    }

    /// Queries the current chain and requests exactly one switch when it is
    /// not the target. Any switch failure is a network mismatch.
    async fn verify_network(&self) -> Result<(), Error> {
        let provider = self.provider.as_ref().ok_or(Error::NoProvider)?;
        let expected = self.config.expected_chain_id;
        let actual = provider.chain_id().await.map_err(Error::read)?;
        if actual != expected {
            provider
                .switch_chain(expected)
                .await
                .map_err(|_| Error::NetworkMismatch {
                    expected,
                    actual,
                    chain_name: self.config.chain_name.clone(),
                })?;
        }
        Ok(())
    }

    async fn read_quote(&self) -> Result<QuoteSnapshot, Error> {
        let minimum_usd = self.chain.minimum_usd().await.map_err(Error::read)?;
        let price = self.chain.eth_price_usd().await.map_err(Error::read)?;
        Ok(QuoteSnapshot::derive(minimum_usd, price))
    }

    /// Reads the quote, falling back to the configured default minimum when
    /// the reads fail. The session stays usable either way.
    async fn refresh_quote_soft(&mut self) {
        let quote = match self.read_quote().await {
            Ok(quote) => quote,
            Err(err) => {
                warn!(%err, "quote reads failed; using the fallback minimum");
                self.display
                    .status("Live price unavailable, showing the default minimum");
                QuoteSnapshot::fallback(self.config.fallback_minimum_usd)
            }
        };
        self.display.quote(&quote);
        self.quote = Some(quote);
    }

    async fn refresh_wallet_balance(&self) {
        let Some(address) = self.address else {
            return;
        };
        match self.chain.get_balance(address).await {
            Ok(wei) => self.display.wallet_balance(&format_ether(wei)),
            Err(err) => {
                warn!(%err, "failed to read the wallet balance");
                self.display.status("Unable to read the wallet balance");
            }
        }
    }

    async fn refresh_funded_amount(&self) {
        let Some(address) = self.address else {
            return;
        };
        match self.chain.amount_funded(address).await {
            Ok(wei) => self.display.funded_amount(&format_ether(wei)),
            Err(err) => debug!(%err, "failed to read the funded amount"),
        }
    }

    fn save_record(&mut self, record: ConnectionRecord) {
        let mut guard = Persist::mutate(&mut self.store);
        *guard = record;
    }

    fn report(&self, err: &Error) {
        warn!(%err, "operation failed");
        let message = err.user_message();
        self.display.status(&message);
        if err.is_blocking() {
            self.display.alert(&message);
        }
    }
}
