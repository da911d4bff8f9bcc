use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::NewOrder;
use crate::domain::errors::DomainError;
use crate::domain::order::{CustomerRef, OrderPatch, Sales};
use crate::domain::status::SalesOrderStatus;
use crate::errors::AppError;
use crate::handlers::orders::{
    self, into_inputs, OrderItemRequest, OrderResponse, Orders, ReplaceItemsRequest,
    TransitionRequest, TransitionResponse,
};
use crate::handlers::{ListParams, ListResponse};

type Service = Orders<Sales>;

// ── Request DTOs ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSalesOrderRequest {
    /// With `customer_id` set, name and contact details come from the directory;
    /// an address given here wins over the directory one.
    #[serde(alias = "counterparty")]
    pub customer: CustomerRef,
    pub items: Vec<OrderItemRequest>,
    pub notes: Option<String>,
    pub expected_date: Option<NaiveDate>,
}

impl CreateSalesOrderRequest {
    fn into_new_order(self) -> Result<NewOrder<Sales>, DomainError> {
        Ok(NewOrder {
            counterparty: self.customer,
            items: into_inputs(self.items)?,
            notes: self.notes,
            expected_date: self.expected_date,
        })
    }
}

/// Totals and statuses are not accepted here; unknown fields are rejected.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateSalesOrderRequest {
    #[serde(alias = "counterparty")]
    pub customer: Option<CustomerRef>,
    #[serde(default, deserialize_with = "crate::handlers::double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::handlers::double_option")]
    #[schema(value_type = Option<String>)]
    pub expected_date: Option<Option<NaiveDate>>,
}

impl From<UpdateSalesOrderRequest> for OrderPatch<Sales> {
    fn from(r: UpdateSalesOrderRequest) -> Self {
        Self {
            counterparty: r.customer,
            notes: r.notes,
            expected_date: r.expected_date,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /sales-orders
///
/// Creates the order in `pending` status; the total is computed from the items.
#[utoipa::path(
    post,
    path = "/sales-orders",
    request_body = CreateSalesOrderRequest,
    responses(
        (status = 201, description = "Sales order created", body = OrderResponse<SalesOrderStatus, CustomerRef>),
        (status = 400, description = "No items, bad quantity or bad price"),
        (status = 404, description = "Customer or product not found"),
    ),
    tag = "sales-orders"
)]
pub async fn create_sales_order(
    service: Service,
    body: web::Json<CreateSalesOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let new_order = body.into_inner().into_new_order()?;
    orders::create(service, new_order).await
}

/// GET /sales-orders/{id}
#[utoipa::path(
    get,
    path = "/sales-orders/{id}",
    params(("id" = Uuid, Path, description = "Sales order UUID")),
    responses(
        (status = 200, description = "Sales order found", body = OrderResponse<SalesOrderStatus, CustomerRef>),
        (status = 404, description = "Sales order not found"),
    ),
    tag = "sales-orders"
)]
pub async fn get_sales_order(
    service: Service,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    orders::get(service, path.into_inner()).await
}

/// GET /sales-orders
///
/// Filter example: `?filter=status:eq:confirmed&order_by=total_amount:desc`.
#[utoipa::path(
    get,
    path = "/sales-orders",
    params(ListParams),
    responses(
        (status = 200, description = "Paginated list of sales orders", body = ListResponse<OrderResponse<SalesOrderStatus, CustomerRef>>),
        (status = 400, description = "Malformed filter or order_by"),
    ),
    tag = "sales-orders"
)]
pub async fn list_sales_orders(
    service: Service,
    query: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    orders::list(service, query.into_inner()).await
}

/// PATCH /sales-orders/{id}
#[utoipa::path(
    patch,
    path = "/sales-orders/{id}",
    params(("id" = Uuid, Path, description = "Sales order UUID")),
    request_body = UpdateSalesOrderRequest,
    responses(
        (status = 200, description = "Sales order updated", body = OrderResponse<SalesOrderStatus, CustomerRef>),
        (status = 400, description = "Unknown or read-only field"),
        (status = 404, description = "Sales order or customer not found"),
    ),
    tag = "sales-orders"
)]
pub async fn update_sales_order(
    service: Service,
    path: web::Path<Uuid>,
    body: web::Json<UpdateSalesOrderRequest>,
) -> Result<HttpResponse, AppError> {
    orders::update(service, path.into_inner(), body.into_inner().into()).await
}

/// PUT /sales-orders/{id}/items
#[utoipa::path(
    put,
    path = "/sales-orders/{id}/items",
    params(("id" = Uuid, Path, description = "Sales order UUID")),
    request_body = ReplaceItemsRequest,
    responses(
        (status = 200, description = "Items replaced, total recomputed", body = OrderResponse<SalesOrderStatus, CustomerRef>),
        (status = 400, description = "No items, bad quantity or bad price"),
        (status = 404, description = "Sales order not found"),
        (status = 409, description = "Order already fulfilled or cancelled"),
    ),
    tag = "sales-orders"
)]
pub async fn replace_sales_order_items(
    service: Service,
    path: web::Path<Uuid>,
    body: web::Json<ReplaceItemsRequest>,
) -> Result<HttpResponse, AppError> {
    orders::replace_items(service, path.into_inner(), body.into_inner()).await
}

/// POST /sales-orders/{id}/status
///
/// Moving to `fulfilled` takes every item out of stock in the same update and
/// reports the adjustment.
#[utoipa::path(
    post,
    path = "/sales-orders/{id}/status",
    params(("id" = Uuid, Path, description = "Sales order UUID")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Status changed", body = TransitionResponse<SalesOrderStatus, CustomerRef>),
        (status = 400, description = "Not a sales order status"),
        (status = 404, description = "Sales order not found"),
        (status = 409, description = "Order already fulfilled or cancelled"),
    ),
    tag = "sales-orders"
)]
pub async fn transition_sales_order(
    service: Service,
    path: web::Path<Uuid>,
    body: web::Json<TransitionRequest>,
) -> Result<HttpResponse, AppError> {
    orders::transition(service, path.into_inner(), body.into_inner()).await
}

/// DELETE /sales-orders/{id}
#[utoipa::path(
    delete,
    path = "/sales-orders/{id}",
    params(("id" = Uuid, Path, description = "Sales order UUID")),
    responses(
        (status = 204, description = "Sales order deleted"),
        (status = 404, description = "Sales order not found"),
    ),
    tag = "sales-orders"
)]
pub async fn delete_sales_order(
    service: Service,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    orders::delete(service, path.into_inner()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_supplier_key() {
        let body = serde_json::json!({
            "supplier": {"name": "Acme"},
            "items": [{"product_id": Uuid::new_v4(), "quantity": 1, "unit_price": "1.00"}]
        });
        assert!(serde_json::from_value::<CreateSalesOrderRequest>(body).is_err());
    }

    #[test]
    fn create_reads_customer_snapshot() {
        let body = serde_json::json!({
            "customer": {"name": "Ada", "address": "1 Analytical Way"},
            "items": [{"product_id": Uuid::new_v4(), "quantity": 2, "unit_price": "10.00"}]
        });
        let new_order = serde_json::from_value::<CreateSalesOrderRequest>(body)
            .unwrap()
            .into_new_order()
            .unwrap();
        assert_eq!(new_order.counterparty.address.as_deref(), Some("1 Analytical Way"));
        assert_eq!(new_order.items[0].quantity, 2);
    }
}
