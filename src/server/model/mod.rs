use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub(crate) mod config;
pub(crate) mod item;
pub(crate) mod order;

/// Body returned with every non-2xx response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ErrorResponse {
    #[schema(example = "404")]
    pub error_code: String,
    #[schema(example = "Order id not found")]
    pub message: String,
}

/// ids are assigned by the store, so zero means "not persisted yet"
pub(crate) fn is_unassigned(id: &i64) -> bool {
    *id == 0
}
