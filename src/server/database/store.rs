use std::error::Error as _;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use crate::server::model::item::{ItemUpdate, NewItem};
use crate::server::model::order::Order;

#[derive(Debug, Display, Error)]
pub(crate) enum StoreError {
    #[display("record not found")]
    NotFound,
    #[display("{message}")]
    Invalid { message: String },
    #[display("no connection available")]
    Busy,
    #[display("timeout occurred")]
    Timeout,
    #[display("database error: {_0}")]
    Db(tokio_postgres::Error),
    #[display("migration failed: {_0}")]
    Migration(refinery::Error),
    #[display("connection task failed: {_0}")]
    Join(tokio::task::JoinError),
}

impl StoreError {
    /// Message for logs. Database errors carry the server's report, which their display leaves out.
    pub fn detail(&self) -> String {
        match self {
            StoreError::Db(e) => match (e.as_db_error(), e.source()) {
                (Some(db), _) => format!("database error: {db}"),
                (None, Some(cause)) => format!("database error: {e}: {cause}"),
                (None, None) => self.to_string(),
            },
            e => e.to_string(),
        }
    }
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        StoreError::Db(e)
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        StoreError::Join(e)
    }
}

impl From<refinery::Error> for StoreError {
    fn from(e: refinery::Error) -> Self {
        StoreError::Migration(e)
    }
}

/// Order with its items, before ids are assigned
#[derive(Debug, Clone)]
pub(crate) struct NewOrder {
    pub customer_name: String,
    pub items: Vec<NewItem>,
    pub ordered_at: DateTime<Utc>,
}

/// Changes applied to a stored order in one step
#[derive(Debug, Clone)]
pub(crate) struct OrderChanges {
    pub customer_name: Option<String>,
    pub items: Vec<ItemUpdate>,
    pub ordered_at: DateTime<Utc>,
}

/// Persistence for orders and their items.
///
/// Every method is atomic: a failed call leaves no partial writes behind.
#[async_trait]
pub(crate) trait OrderStore: Send + Sync {
    /// All orders, ascending by id, items eagerly loaded.
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    async fn get_order(&self, id: i64) -> Result<Order, StoreError>;

    /// Insert the order and all of its items.
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Fails with [`StoreError::Invalid`] when an item id does not belong to the order.
    async fn update_order(&self, id: i64, changes: OrderChanges) -> Result<Order, StoreError>;

    /// Delete the order together with its items.
    async fn delete_order(&self, id: i64) -> Result<(), StoreError>;
}

pub(crate) fn foreign_item(item_id: i64, order_id: i64) -> StoreError {
    StoreError::Invalid {
        message: format!("item {item_id} does not belong to order {order_id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_falls_back_to_display() {
        assert_eq!(StoreError::Busy.detail(), "no connection available");
        assert_eq!(foreign_item(3, 1).detail(), "item 3 does not belong to order 1");
    }
}
