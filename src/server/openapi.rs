//! OpenAPI document served next to the Swagger UI
//!
//! - Swagger UI: `http://localhost:8080/swagger/`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;
use crate::server::controller::orders;
use crate::server::model::item::{Item, ItemUpdate, NewItem};
use crate::server::model::order::{
    CreateOrderRequest, CreateOrderResponse, DeleteOrderResponse, GetOrdersResponse, Order, UpdateOrderRequest,
    UpdateOrderResponse,
};
use crate::server::model::ErrorResponse;

pub(crate) const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Orders API",
        version = "1.0",
        description = "This is a service for managing orders",
        contact(name = "API Support"),
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        orders::get_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::delete_order,
    ),
    components(
        schemas(
            Order,
            Item,
            NewItem,
            ItemUpdate,
            CreateOrderRequest,
            UpdateOrderRequest,
            GetOrdersResponse,
            CreateOrderResponse,
            UpdateOrderResponse,
            DeleteOrderResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "orders", description = "Orders and their line items")
    )
)]
pub(crate) struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Orders API");
        assert_eq!(spec.info.version, "1.0");
    }

    #[test]
    fn test_order_endpoints_registered() {
        let spec = ApiDoc::openapi();
        let paths = spec.paths.paths;
        assert!(paths.contains_key("/orders"));
        assert!(paths.contains_key("/orders/{id}"));
    }

    #[test]
    fn test_schemas_use_wire_names() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("line_item_id"));
        assert!(json.contains("new_order_data"));
        assert!(json.contains("error_code"));
    }
}
