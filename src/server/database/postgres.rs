use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use async_trait::async_trait;
use log::{info, warn};
use tokio::time;
use tokio_postgres::{GenericClient, Row};
use crate::server::database::connection::PgConnector;
use crate::server::database::pool::Pool;
use crate::server::database::store::{foreign_item, NewOrder, OrderChanges, OrderStore, StoreError};
use crate::server::model::item::Item;
use crate::server::model::order::Order;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("src/server/database/migrations");
}

const ITEM_COLUMNS: &str = "id, item_code, description, quantity, order_id";

/// Orders kept in postgres, reads and writes served by separate pools
pub(crate) struct PgOrderStore {
    read_pool: Pool<PgConnector>,
    write_pool: Pool<PgConnector>,
    timeout: Duration,
}

impl PgOrderStore {
    pub fn new(read_pool: Pool<PgConnector>, write_pool: Pool<PgConnector>, timeout: Duration) -> Self {
        Self {
            read_pool,
            write_pool,
            timeout,
        }
    }

    /// apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let mut conn = self.write_pool.acquire(self.timeout).await?;
        let report = embedded::migrations::runner().run_async(&mut *conn).await?;
        for migration in report.applied_migrations() {
            info!("applied migration {}", migration);
        }
        Ok(())
    }

    /// bound the statements of one operation, checkout is bounded separately by the pool
    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match time::timeout(self.timeout, fut).await {
            Ok(res) => res,
            Err(_) => {
                warn!("timeout during {}", op);
                Err(StoreError::Timeout)
            }
        }
    }
}

fn item_from_row(row: &Row) -> Result<Item, tokio_postgres::Error> {
    Ok(Item {
        id: row.try_get("id")?,
        item_code: row.try_get("item_code")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        order_id: row.try_get("order_id")?,
    })
}

fn order_from_row(row: &Row) -> Result<Order, tokio_postgres::Error> {
    Ok(Order {
        id: row.try_get("id")?,
        customer_name: row.try_get("customer_name")?,
        items: vec![],
        ordered_at: row.try_get("ordered_at")?,
    })
}

async fn load_order<C: GenericClient + Sync>(client: &C, id: i64, lock: bool) -> Result<Order, StoreError> {
    let stmt = if lock {
        "SELECT id, customer_name, ordered_at FROM orders WHERE id = $1 FOR UPDATE"
    } else {
        "SELECT id, customer_name, ordered_at FROM orders WHERE id = $1"
    };
    let row = client.query_opt(stmt, &[&id]).await?.ok_or(StoreError::NotFound)?;
    let mut order = order_from_row(&row)?;
    order.items = client
        .query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE order_id = $1 ORDER BY id"), &[&id])
        .await?
        .iter()
        .map(item_from_row)
        .collect::<Result<_, _>>()?;
    Ok(order)
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let conn = self.read_pool.acquire(self.timeout).await?;
        self.bounded("list_orders", async move {
            let mut orders = conn
                .query("SELECT id, customer_name, ordered_at FROM orders ORDER BY id", &[])
                .await?
                .iter()
                .map(order_from_row)
                .collect::<Result<Vec<_>, _>>()?;
            let ids = orders.iter().map(|o| o.id).collect::<Vec<i64>>();

            let mut items_by_order: HashMap<i64, Vec<Item>> = HashMap::with_capacity(ids.len());
            for row in conn
                .query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE order_id = ANY($1) ORDER BY id"), &[&ids])
                .await?
            {
                let item = item_from_row(&row)?;
                items_by_order.entry(item.order_id).or_default().push(item);
            }
            for order in orders.iter_mut() {
                order.items = items_by_order.remove(&order.id).unwrap_or_default();
            }
            Ok(orders)
        })
        .await
    }

    async fn get_order(&self, id: i64) -> Result<Order, StoreError> {
        let conn = self.read_pool.acquire(self.timeout).await?;
        self.bounded("get_order", async move {
            load_order(&*conn, id, false).await
        })
        .await
    }

    async fn create_order(&self, NewOrder { customer_name, items, ordered_at }: NewOrder) -> Result<Order, StoreError> {
        let mut conn = self.write_pool.acquire(self.timeout).await?;
        self.bounded("create_order", async move {
            let txn = conn.transaction().await?;
            let id: i64 = txn
                .query_one(
                    "INSERT INTO orders(customer_name, ordered_at) VALUES ($1, $2) RETURNING id",
                    &[&customer_name, &ordered_at],
                )
                .await?
                .try_get("id")?;

            let mut inserted = Vec::with_capacity(items.len());
            for item in items {
                let item_id: i64 = txn
                    .query_one(
                        r#"
                        INSERT INTO items(item_code, description, quantity, order_id)
                        VALUES ($1, $2, $3, $4)
                        RETURNING id
                    "#,
                        &[&item.item_code, &item.description, &item.quantity, &id],
                    )
                    .await?
                    .try_get("id")?;
                inserted.push(Item {
                    id: item_id,
                    item_code: item.item_code,
                    description: item.description,
                    quantity: item.quantity,
                    order_id: id,
                });
            }
            txn.commit().await?;

            Ok(Order {
                id,
                customer_name,
                items: inserted,
                ordered_at,
            })
        })
        .await
    }

    async fn update_order(&self, id: i64, changes: OrderChanges) -> Result<Order, StoreError> {
        let mut conn = self.write_pool.acquire(self.timeout).await?;
        self.bounded("update_order", async move {
            let txn = conn.transaction().await?;
            let current = load_order(&txn, id, true).await?;

            let customer_name = changes.customer_name.unwrap_or(current.customer_name);
            txn.execute(
                "UPDATE orders SET customer_name = $2, ordered_at = $3 WHERE id = $1",
                &[&id, &customer_name, &changes.ordered_at],
            )
            .await?;

            for item in changes.items {
                match item.id {
                    Some(item_id) => {
                        let updated = txn
                            .execute(
                                r#"
                                UPDATE items SET item_code = $3, description = $4, quantity = $5
                                WHERE id = $1 AND order_id = $2
                            "#,
                                &[&item_id, &id, &item.item_code, &item.description, &item.quantity],
                            )
                            .await?;
                        if updated == 0 {
                            // dropping txn rolls back the writes above
                            return Err(foreign_item(item_id, id));
                        }
                    }
                    None => {
                        txn.execute(
                            "INSERT INTO items(item_code, description, quantity, order_id) VALUES ($1, $2, $3, $4)",
                            &[&item.item_code, &item.description, &item.quantity, &id],
                        )
                        .await?;
                    }
                }
            }

            let order = load_order(&txn, id, false).await?;
            txn.commit().await?;
            Ok(order)
        })
        .await
    }

    async fn delete_order(&self, id: i64) -> Result<(), StoreError> {
        let mut conn = self.write_pool.acquire(self.timeout).await?;
        self.bounded("delete_order", async move {
            let txn = conn.transaction().await?;
            txn.execute("DELETE FROM items WHERE order_id = $1", &[&id]).await?;
            if txn.execute("DELETE FROM orders WHERE id = $1", &[&id]).await? == 0 {
                return Err(StoreError::NotFound);
            }
            txn.commit().await?;
            Ok(())
        })
        .await
    }
}
