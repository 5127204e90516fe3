use std::ops::{Deref, DerefMut};
use async_trait::async_trait;
use log::error;
use tokio_postgres::{Client, NoTls};
use crate::server::database::pool::{Connect, Pool};
use crate::server::database::store::StoreError;

/// A client checked out of a [`Pool`], handed back when dropped
pub(crate) struct Connection<M>
where M: Connect
{
    client: Option<M::Client>,
    pool: Pool<M>,
}

impl<M> Connection<M>
where M: Connect
{
    pub fn new(client: M::Client, pool: Pool<M>) -> Self {
        Self { client: Some(client), pool }
    }
}

impl<M> Deref for Connection<M>
where M: Connect
{
    type Target = M::Client;

    fn deref(&self) -> &Self::Target {
        self.client.as_ref().expect("client is present until the connection drops")
    }
}

impl<M> DerefMut for Connection<M>
where M: Connect
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.client.as_mut().expect("client is present until the connection drops")
    }
}

impl<M> Drop for Connection<M>
where M: Connect
{
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.pool.release(client);
        }
    }
}

/// Opens plain (non-TLS) postgres clients from a connection string
pub(crate) struct PgConnector {
    conn_str: String,
}

impl PgConnector {
    pub fn new(conn_str: impl Into<String>) -> Self {
        Self { conn_str: conn_str.into() }
    }
}

#[async_trait]
impl Connect for PgConnector {
    type Client = Client;

    async fn connect(&self) -> Result<Client, StoreError> {
        let (client, conn) = tokio_postgres::connect(&self.conn_str, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                error!("connection returned error and aborted, {}", e);
            }
        });
        Ok(client)
    }

    fn is_closed(client: &Client) -> bool {
        client.is_closed()
    }
}
