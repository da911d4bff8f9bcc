use actix_web::HttpResponse;
use utoipa::OpenApi;

use crate::handlers::{customers, products, purchase_orders, sales_orders, suppliers};

#[derive(OpenApi)]
#[openapi(
    paths(
        products::create_product,
        products::get_product,
        products::list_products,
        products::update_product,
        products::delete_product,
        suppliers::create_supplier,
        suppliers::get_supplier,
        suppliers::list_suppliers,
        suppliers::update_supplier,
        suppliers::delete_supplier,
        customers::create_customer,
        customers::get_customer,
        customers::list_customers,
        customers::update_customer,
        customers::delete_customer,
        purchase_orders::create_purchase_order,
        purchase_orders::get_purchase_order,
        purchase_orders::list_purchase_orders,
        purchase_orders::update_purchase_order,
        purchase_orders::replace_purchase_order_items,
        purchase_orders::transition_purchase_order,
        purchase_orders::delete_purchase_order,
        sales_orders::create_sales_order,
        sales_orders::get_sales_order,
        sales_orders::list_sales_orders,
        sales_orders::update_sales_order,
        sales_orders::replace_sales_order_items,
        sales_orders::transition_sales_order,
        sales_orders::delete_sales_order,
    ),
    tags(
        (name = "products", description = "Inventory records"),
        (name = "suppliers", description = "Supplier directory"),
        (name = "customers", description = "Customer directory"),
        (name = "purchase-orders", description = "Orders placed with suppliers"),
        (name = "sales-orders", description = "Orders from customers; fulfillment takes stock"),
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_covers_every_order_route() {
        let json = serde_json::to_string_pretty(&ApiDoc::openapi()).unwrap();
        for path in [
            "/purchase-orders",
            "/purchase-orders/{id}/items",
            "/purchase-orders/{id}/status",
            "/sales-orders",
            "/sales-orders/{id}",
            "/sales-orders/{id}/status",
        ] {
            assert!(json.contains(&format!("\"{}\"", path)), "missing {}", path);
        }
        assert!(json.contains("PurchaseOrderStatus"));
        assert!(json.contains("TransitionRequest"));
    }
}
