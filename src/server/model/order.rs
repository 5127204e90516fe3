use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;
use crate::server::model::is_unassigned;
use crate::server::model::item::{Item, ItemUpdate, NewItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub(crate) struct Order {
    #[serde(rename = "order_id", default, skip_serializing_if = "is_unassigned")]
    pub id: i64,
    #[schema(example = "Budi")]
    pub customer_name: String,
    pub items: Vec<Item>,
    #[schema(example = "2022-10-07T14:39:28.165117Z")]
    pub ordered_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateOrderRequest {
    #[validate(length(min = 1, max = 50))]
    #[schema(example = "Budi")]
    pub customer_name: String,
    #[validate(nested)]
    pub items: Vec<NewItem>,
}

/// Partial update, absent fields keep their stored value
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateOrderRequest {
    #[validate(length(min = 1, max = 50))]
    pub customer_name: Option<String>,
    #[validate(nested)]
    pub items: Option<Vec<ItemUpdate>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct GetOrdersResponse {
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CreateOrderResponse {
    #[schema(example = "Order created")]
    pub message: String,
    pub order: Order,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UpdateOrderResponse {
    #[schema(example = "Update order data successfully")]
    pub message: String,
    pub new_order_data: Order,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DeleteOrderResponse {
    #[schema(example = "Order with id 1 successfully deleted")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_requires_customer_and_items() {
        assert!(serde_json::from_value::<CreateOrderRequest>(json!({"items": []})).is_err());
        assert!(serde_json::from_value::<CreateOrderRequest>(json!({"customer_name": "Budi"})).is_err());
        let req: CreateOrderRequest = serde_json::from_value(json!({"customer_name": "Budi", "items": []})).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn nested_items_are_validated() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "customer_name": "Budi",
            "items": [{"item_code": "", "quantity": 1}],
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn empty_update_is_valid() {
        let req: UpdateOrderRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.customer_name.is_none() && req.items.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn ordered_at_is_rfc3339() {
        let order = Order {
            id: 3,
            customer_name: "Budi".to_string(),
            items: vec![],
            ordered_at: DateTime::from_timestamp(0, 0).unwrap(),
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["order_id"], 3);
        assert_eq!(value["ordered_at"], "1970-01-01T00:00:00Z");
    }
}
