use std::collections::BTreeMap;
use async_trait::async_trait;
use tokio::sync::Mutex;
use crate::server::database::store::{foreign_item, NewOrder, OrderChanges, OrderStore, StoreError};
use crate::server::model::item::{Item, NewItem};
use crate::server::model::order::Order;

#[derive(Default)]
struct State {
    last_order_id: i64,
    last_item_id: i64,
    orders: BTreeMap<i64, Order>,
}

impl State {
    fn next_item(&mut self, order_id: i64, NewItem { item_code, description, quantity }: NewItem) -> Item {
        self.last_item_id += 1;
        Item {
            id: self.last_item_id,
            item_code,
            description,
            quantity,
            order_id,
        }
    }
}

/// Process-local store, nothing survives a restart
#[derive(Default)]
pub(crate) struct MemoryOrderStore {
    state: Mutex<State>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.state.lock().await.orders.values().cloned().collect())
    }

    async fn get_order(&self, id: i64) -> Result<Order, StoreError> {
        self.state.lock().await.orders.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn create_order(&self, NewOrder { customer_name, items, ordered_at }: NewOrder) -> Result<Order, StoreError> {
        let mut state = self.state.lock().await;
        state.last_order_id += 1;
        let id = state.last_order_id;
        let items = items.into_iter().map(|item| state.next_item(id, item)).collect();
        let order = Order {
            id,
            customer_name,
            items,
            ordered_at,
        };
        state.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn update_order(&self, id: i64, changes: OrderChanges) -> Result<Order, StoreError> {
        let mut state = self.state.lock().await;
        let mut order = state.orders.get(&id).cloned().ok_or(StoreError::NotFound)?;

        // the stored order is only replaced once every item change has been checked
        let mut last_item_id = state.last_item_id;
        if let Some(customer_name) = changes.customer_name {
            order.customer_name = customer_name;
        }
        order.ordered_at = changes.ordered_at;
        for update in changes.items {
            match update.id {
                Some(item_id) => {
                    let item = order
                        .items
                        .iter_mut()
                        .find(|item| item.id == item_id)
                        .ok_or_else(|| foreign_item(item_id, id))?;
                    item.item_code = update.item_code;
                    item.description = update.description;
                    item.quantity = update.quantity;
                }
                None => {
                    last_item_id += 1;
                    let NewItem { item_code, description, quantity } = update.into();
                    order.items.push(Item {
                        id: last_item_id,
                        item_code,
                        description,
                        quantity,
                        order_id: id,
                    });
                }
            }
        }

        state.last_item_id = last_item_id;
        state.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn delete_order(&self, id: i64) -> Result<(), StoreError> {
        self.state
            .lock()
            .await
            .orders
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use crate::server::model::item::ItemUpdate;

    fn new_order(customer_name: &str, codes: &[&str]) -> NewOrder {
        NewOrder {
            customer_name: customer_name.to_string(),
            items: codes
                .iter()
                .map(|code| NewItem {
                    item_code: code.to_string(),
                    description: String::new(),
                    quantity: 1,
                })
                .collect(),
            ordered_at: DateTime::from_timestamp(10, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_per_table() {
        let store = MemoryOrderStore::new();
        let first = store.create_order(new_order("a", &["X", "Y"])).await.unwrap();
        let second = store.create_order(new_order("b", &["Z"])).await.unwrap();

        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(first.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(second.items[0].id, 3);
        assert!(second.items.iter().all(|i| i.order_id == 2));
    }

    #[tokio::test]
    async fn rejected_update_changes_nothing() {
        let store = MemoryOrderStore::new();
        let first = store.create_order(new_order("a", &["X"])).await.unwrap();
        let second = store.create_order(new_order("b", &["Y"])).await.unwrap();

        let changes = OrderChanges {
            customer_name: Some("renamed".to_string()),
            items: vec![
                ItemUpdate {
                    id: None,
                    item_code: "NEW".to_string(),
                    description: String::new(),
                    quantity: 4,
                },
                ItemUpdate {
                    id: Some(second.items[0].id),
                    item_code: "STOLEN".to_string(),
                    description: String::new(),
                    quantity: 1,
                },
            ],
            ordered_at: DateTime::from_timestamp(20, 0).unwrap(),
        };
        let err = store.update_order(first.id, changes).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid { .. }));

        assert_eq!(store.get_order(first.id).await.unwrap(), first);
        assert_eq!(store.get_order(second.id).await.unwrap(), second);
    }

    #[tokio::test]
    async fn delete_unknown_order_is_not_found() {
        let store = MemoryOrderStore::new();
        assert!(matches!(store.delete_order(1).await, Err(StoreError::NotFound)));
    }
}
