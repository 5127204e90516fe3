use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;
use crate::server::model::is_unassigned;

/// A line entry, always owned by exactly one order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub(crate) struct Item {
    #[serde(rename = "line_item_id", default, skip_serializing_if = "is_unassigned")]
    pub id: i64,
    #[schema(example = "A12B3C")]
    pub item_code: String,
    #[schema(example = "This is the description of the item")]
    pub description: String,
    #[schema(example = 10)]
    pub quantity: i64,
    #[serde(skip)]
    pub order_id: i64,
}

/// Item as submitted when creating an order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub(crate) struct NewItem {
    #[validate(length(min = 1, max = 20))]
    #[schema(example = "A12B3C")]
    pub item_code: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    #[schema(example = "This is the description of the item")]
    pub description: String,
    #[schema(example = 10)]
    pub quantity: i64,
}

/// Item as submitted when updating an order.
///
/// With a `line_item_id` it overwrites that item, without one it is appended to the order.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub(crate) struct ItemUpdate {
    #[serde(rename = "line_item_id", default)]
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 20))]
    #[schema(example = "A12B3C")]
    pub item_code: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub description: String,
    #[schema(example = 10)]
    pub quantity: i64,
}

impl From<ItemUpdate> for NewItem {
    fn from(ItemUpdate { item_code, description, quantity, .. }: ItemUpdate) -> Self {
        Self {
            item_code,
            description,
            quantity,
        }
    }
}
