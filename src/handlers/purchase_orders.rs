use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::NewOrder;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderPatch, Purchase, SupplierRef};
use crate::domain::status::PurchaseOrderStatus;
use crate::errors::AppError;
use crate::handlers::orders::{
    self, into_inputs, OrderItemRequest, OrderResponse, Orders, ReplaceItemsRequest,
    TransitionRequest, TransitionResponse,
};
use crate::handlers::{ListParams, ListResponse};

type Service = Orders<Purchase>;

// ── Request DTOs ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePurchaseOrderRequest {
    /// With `supplier_id` set, name and contact details come from the directory.
    #[serde(alias = "counterparty")]
    pub supplier: SupplierRef,
    pub items: Vec<OrderItemRequest>,
    pub notes: Option<String>,
    pub expected_date: Option<NaiveDate>,
}

impl CreatePurchaseOrderRequest {
    fn into_new_order(self) -> Result<NewOrder<Purchase>, DomainError> {
        Ok(NewOrder {
            counterparty: self.supplier,
            items: into_inputs(self.items)?,
            notes: self.notes,
            expected_date: self.expected_date,
        })
    }
}

/// Totals and statuses are not accepted here; unknown fields are rejected.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdatePurchaseOrderRequest {
    #[serde(alias = "counterparty")]
    pub supplier: Option<SupplierRef>,
    #[serde(default, deserialize_with = "crate::handlers::double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::handlers::double_option")]
    #[schema(value_type = Option<String>)]
    pub expected_date: Option<Option<NaiveDate>>,
}

impl From<UpdatePurchaseOrderRequest> for OrderPatch<Purchase> {
    fn from(r: UpdatePurchaseOrderRequest) -> Self {
        Self {
            counterparty: r.supplier,
            notes: r.notes,
            expected_date: r.expected_date,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /purchase-orders
///
/// Creates the order in `pending` status; the total is computed from the items.
#[utoipa::path(
    post,
    path = "/purchase-orders",
    request_body = CreatePurchaseOrderRequest,
    responses(
        (status = 201, description = "Purchase order created", body = OrderResponse<PurchaseOrderStatus, SupplierRef>),
        (status = 400, description = "No items, bad quantity or bad price"),
        (status = 404, description = "Supplier or product not found"),
    ),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    service: Service,
    body: web::Json<CreatePurchaseOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let new_order = body.into_inner().into_new_order()?;
    orders::create(service, new_order).await
}

/// GET /purchase-orders/{id}
#[utoipa::path(
    get,
    path = "/purchase-orders/{id}",
    params(("id" = Uuid, Path, description = "Purchase order UUID")),
    responses(
        (status = 200, description = "Purchase order found", body = OrderResponse<PurchaseOrderStatus, SupplierRef>),
        (status = 404, description = "Purchase order not found"),
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    service: Service,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    orders::get(service, path.into_inner()).await
}

/// GET /purchase-orders
///
/// Filter example: `?filter=status:eq:ordered&order_by=total_amount:desc`.
#[utoipa::path(
    get,
    path = "/purchase-orders",
    params(ListParams),
    responses(
        (status = 200, description = "Paginated list of purchase orders", body = ListResponse<OrderResponse<PurchaseOrderStatus, SupplierRef>>),
        (status = 400, description = "Malformed filter or order_by"),
    ),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    service: Service,
    query: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    orders::list(service, query.into_inner()).await
}

/// PATCH /purchase-orders/{id}
#[utoipa::path(
    patch,
    path = "/purchase-orders/{id}",
    params(("id" = Uuid, Path, description = "Purchase order UUID")),
    request_body = UpdatePurchaseOrderRequest,
    responses(
        (status = 200, description = "Purchase order updated", body = OrderResponse<PurchaseOrderStatus, SupplierRef>),
        (status = 400, description = "Unknown or read-only field"),
        (status = 404, description = "Purchase order or supplier not found"),
    ),
    tag = "purchase-orders"
)]
pub async fn update_purchase_order(
    service: Service,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePurchaseOrderRequest>,
) -> Result<HttpResponse, AppError> {
    orders::update(service, path.into_inner(), body.into_inner().into()).await
}

/// PUT /purchase-orders/{id}/items
#[utoipa::path(
    put,
    path = "/purchase-orders/{id}/items",
    params(("id" = Uuid, Path, description = "Purchase order UUID")),
    request_body = ReplaceItemsRequest,
    responses(
        (status = 200, description = "Items replaced, total recomputed", body = OrderResponse<PurchaseOrderStatus, SupplierRef>),
        (status = 400, description = "No items, bad quantity or bad price"),
        (status = 404, description = "Purchase order not found"),
        (status = 409, description = "Order already delivered or cancelled"),
    ),
    tag = "purchase-orders"
)]
pub async fn replace_purchase_order_items(
    service: Service,
    path: web::Path<Uuid>,
    body: web::Json<ReplaceItemsRequest>,
) -> Result<HttpResponse, AppError> {
    orders::replace_items(service, path.into_inner(), body.into_inner()).await
}

/// POST /purchase-orders/{id}/status
///
/// Delivery does not change stock.
#[utoipa::path(
    post,
    path = "/purchase-orders/{id}/status",
    params(("id" = Uuid, Path, description = "Purchase order UUID")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Status changed", body = TransitionResponse<PurchaseOrderStatus, SupplierRef>),
        (status = 400, description = "Not a purchase order status"),
        (status = 404, description = "Purchase order not found"),
        (status = 409, description = "Order already delivered or cancelled"),
    ),
    tag = "purchase-orders"
)]
pub async fn transition_purchase_order(
    service: Service,
    path: web::Path<Uuid>,
    body: web::Json<TransitionRequest>,
) -> Result<HttpResponse, AppError> {
    orders::transition(service, path.into_inner(), body.into_inner()).await
}

/// DELETE /purchase-orders/{id}
#[utoipa::path(
    delete,
    path = "/purchase-orders/{id}",
    params(("id" = Uuid, Path, description = "Purchase order UUID")),
    responses(
        (status = 204, description = "Purchase order deleted"),
        (status = 404, description = "Purchase order not found"),
    ),
    tag = "purchase-orders"
)]
pub async fn delete_purchase_order(
    service: Service,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    orders::delete(service, path.into_inner()).await
}
