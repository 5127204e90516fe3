use crate::server::database::connection::Connection;
use crate::server::database::store::StoreError;
use async_trait::async_trait;
use log::{error, info, warn};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tokio::time;

/// Opens clients for a [`Pool`]
#[async_trait]
pub(crate) trait Connect: Send + Sync + 'static {
    type Client: Send + 'static;

    async fn connect(&self) -> Result<Self::Client, StoreError>;

    /// a closed client is re-established on its next checkout
    fn is_closed(client: &Self::Client) -> bool;
}

pub(crate) struct CommonPool<M>
where M: Connect
{
    /// pool name
    name: String,
    connector: M,
    /// idle clients, accessed in a FIFO manner
    idle: Mutex<VecDeque<M::Client>>,
    released: Notify,
}

pub(crate) struct Pool<M>(Arc<CommonPool<M>>) where M: Connect;

impl<M> Clone for Pool<M>
where M: Connect
{
    fn clone(&self) -> Pool<M> {
        Pool(self.0.clone())
    }
}

impl<M> Pool<M>
where M: Connect
{
    pub const DEFAULT_SIZE: usize = 10;

    /// create an empty pool, see [`Pool::init`]
    pub fn new(name: impl Into<String>, connector: M) -> Self {
        Self(Arc::new(CommonPool {
            name: name.into(),
            connector,
            idle: Mutex::new(VecDeque::with_capacity(Self::DEFAULT_SIZE)),
            released: Notify::new(),
        }))
    }

    /// open `size` connections concurrently, failing if any of them cannot be opened
    pub async fn init(&self, size: usize) -> Result<(), StoreError> {
        let mut clients = VecDeque::with_capacity(size);
        let mut set = JoinSet::new();
        for _ in 0..size {
            let pool = self.clone();
            set.spawn(async move { pool.0.connector.connect().await });
        }
        while let Some(res) = set.join_next().await {
            match res {
                Ok(Ok(client)) => {
                    info!("{}: connection created", self.0.name);
                    clients.push_back(client);
                }
                Ok(Err(e)) => {
                    error!("{}: failed to open connection, {}", self.0.name, e);
                    return Err(e);
                }
                Err(e) => {
                    error!("{}: connect task failed, {}", self.0.name, e);
                    return Err(e.into());
                }
            };
        }
        self.idle().append(&mut clients);
        self.0.released.notify_waiters();
        info!("{}: {} connections ready", self.0.name, self.idle_count());
        Ok(())
    }

    /// acquire a connection, bail out with [`StoreError::Busy`] once `timeout` elapses.
    pub async fn acquire(&self, timeout: Duration) -> Result<Connection<M>, StoreError> {
        let waiting = async {
            loop {
                let released = self.0.released.notified();
                let popped = self.idle().pop_front();
                if let Some(client) = popped {
                    return client;
                }
                released.await;
            }
        };
        let client = match time::timeout(timeout, waiting).await {
            Ok(client) => client,
            Err(_) => {
                warn!("{}: timed out to acquire a connection after {:?}", self.0.name, timeout);
                return Err(StoreError::Busy);
            }
        };
        if !M::is_closed(&client) {
            return Ok(Connection::new(client, self.clone()));
        }

        warn!("{}: connection was closed, reconnecting", self.0.name);
        match self.0.connector.connect().await {
            Ok(fresh) => Ok(Connection::new(fresh, self.clone())),
            Err(e) => {
                // keep the slot so a later checkout retries the reconnect
                self.release(client);
                Err(e)
            }
        }
    }

    pub fn release(&self, client: M::Client) {
        self.idle().push_back(client);
        self.0.released.notify_one();
    }

    pub fn idle_count(&self) -> usize {
        self.idle().len()
    }

    fn idle(&self) -> MutexGuard<'_, VecDeque<M::Client>> {
        self.0.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
