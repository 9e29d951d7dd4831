// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The background side of the session: a fixed-interval contract-balance
//! poll and the provider's account/chain notifications, both funneled into
//! the shared session under its lock.

use std::{sync::Arc, time::Duration};

use async_lock::Mutex;
use fundme_ethereum::{
    client::{FundMeQueries, FundMeWriter},
    wallet::{ProviderEvent, WalletProvider},
};
use tokio::{sync::mpsc, time::MissedTickBehavior};
use tracing::{debug, instrument};

use crate::{
    display::DisplaySink,
    persistent::Persist,
    session::{ConnectionRecord, WalletSession},
};

/// Drives one session from the background: refreshes the contract balance on
/// a fixed interval while connected, and applies provider events as they
/// arrive. Exits when the provider closes its event channel.
pub struct SessionListener<P, C, D, S> {
    session: Arc<Mutex<WalletSession<P, C, D, S>>>,
    events: mpsc::UnboundedReceiver<ProviderEvent>,
    poll_interval: Duration,
}

impl<P, C, D, S> SessionListener<P, C, D, S>
where
    P: WalletProvider + Send + Sync,
    C: FundMeQueries + FundMeWriter + Send + Sync,
    D: DisplaySink,
    S: Persist<Target = ConnectionRecord> + Send,
{
    pub fn new(
        session: Arc<Mutex<WalletSession<P, C, D, S>>>,
        events: mpsc::UnboundedReceiver<ProviderEvent>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            session,
            events,
            poll_interval,
        }
    }

    #[instrument(skip_all, fields(poll_interval = ?self.poll_interval))]
    pub async fn run(self) {
        let Self {
            session,
            mut events,
            poll_interval,
        } = self;
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let guard = session.lock().await;
                    if guard.is_connected() {
                        guard.get_contract_balance().await;
                    }
                }
                event = events.recv() => match event {
                    Some(event) => {
                        debug!(?event, "provider event");
                        session.lock().await.apply_event(event).await;
                    }
                    None => {
                        debug!("provider event channel closed; stopping listener");
                        break;
                    }
                },
            }
        }
    }
}
