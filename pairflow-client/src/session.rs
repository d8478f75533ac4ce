//! Explicit context handed to every workflow: who acts, and through which contract bindings.

use std::{collections::HashMap, sync::Arc};

use pairflow_common::{
    traits::{
        ChainReader, Erc20Client, FactoryClient, LedgerClient, PairClient, RouterClient,
        WrappedNativeClient,
    },
    Address,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// The contract bindings a workflow may call.
#[derive(Clone)]
pub struct Contracts {
    pub chain: Arc<dyn ChainReader>,
    pub erc20: Arc<dyn Erc20Client>,
    pub wrapped_native: Arc<dyn WrappedNativeClient>,
    pub factory: Arc<dyn FactoryClient>,
    pub router: Arc<dyn RouterClient>,
    pub pair: Arc<dyn PairClient>,
    pub ledger: Arc<dyn LedgerClient>,
}

impl Contracts {
    /// Uses one client for every contract, e.g. a signer-bound `EthereumClient`.
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: ChainReader
            + Erc20Client
            + WrappedNativeClient
            + FactoryClient
            + RouterClient
            + PairClient
            + LedgerClient
            + 'static,
    {
        Self {
            chain: client.clone(),
            erc20: client.clone(),
            wrapped_native: client.clone(),
            factory: client.clone(),
            router: client.clone(),
            pair: client.clone(),
            ledger: client,
        }
    }
}

/// The acting account and its contract bindings. The bindings sign as `account`.
#[derive(Clone)]
pub struct Session {
    pub account: Address,
    pub contracts: Contracts,
}

impl Session {
    pub fn new(account: Address, contracts: Contracts) -> Self {
        Self { account, contracts }
    }
}

/// One lock per account, so that at most one workflow per account is in flight.
#[derive(Clone, Default)]
pub struct AccountLocks {
    locks: Arc<Mutex<HashMap<Address, Arc<Mutex<()>>>>>,
}

impl AccountLocks {
    /// Waits until no other workflow holds `account`'s lock and takes it.
    ///
    /// Entries nobody holds or waits on are dropped on the way, so the map stays bounded by the
    /// number of accounts with a workflow in flight.
    pub async fn acquire(&self, account: Address) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(account).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
