//! Pieces shared by the purchase and sales order endpoints.
//!
//! The per-kind modules own the routes and their request bodies; everything
//! after decoding the request runs through the generic functions here.

use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::inventory::{FulfillmentReport, StockAdjustment};
use crate::application::order_service::{NewOrder, OrderItemInput, OrderService};
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem, OrderKind, OrderPatch, StatusHistoryEntry};
use crate::errors::AppError;
use crate::handlers::{ListParams, ListResponse};
use crate::infrastructure::memory::InMemoryStore;

pub(crate) type Orders<K> = web::Data<OrderService<InMemoryStore, K>>;

type OrderView<K> = OrderResponse<<K as OrderKind>::Status, <K as OrderKind>::Counterparty>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    /// Looked up in the catalog when omitted.
    pub product_name: Option<String>,
    pub quantity: u32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    #[schema(example = "9.99")]
    pub unit_price: String,
}

impl OrderItemRequest {
    fn into_input(self) -> Result<OrderItemInput, DomainError> {
        let unit_price = BigDecimal::from_str(self.unit_price.trim()).map_err(|e| {
            DomainError::InvalidInput(format!("Invalid unit_price '{}': {}", self.unit_price, e))
        })?;
        Ok(OrderItemInput {
            product_id: self.product_id,
            product_name: self.product_name,
            quantity: self.quantity,
            unit_price,
        })
    }
}

pub(crate) fn into_inputs(items: Vec<OrderItemRequest>) -> Result<Vec<OrderItemInput>, DomainError> {
    items.into_iter().map(OrderItemRequest::into_input).collect()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceItemsRequest {
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    #[schema(example = "shipped")]
    pub status: String,
    /// Defaults to "Status changed from X to Y".
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: money(&item.unit_price),
            line_total: money(&item.line_total),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusHistoryResponse<S> {
    pub status: S,
    pub timestamp: String,
    pub note: String,
}

impl<S: Copy> From<&StatusHistoryEntry<S>> for StatusHistoryResponse<S> {
    fn from(entry: &StatusHistoryEntry<S>) -> Self {
        Self {
            status: entry.status,
            timestamp: entry.timestamp.to_rfc3339(),
            note: entry.note.clone(),
        }
    }
}

/// An order with its items and history; `S` and `C` are the kind's status
/// and counterparty types.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse<S, C> {
    pub id: Uuid,
    pub order_number: String,
    pub status: S,
    pub counterparty: C,
    pub items: Vec<OrderItemResponse>,
    pub total_amount: String,
    pub status_history: Vec<StatusHistoryResponse<S>>,
    pub notes: Option<String>,
    pub expected_date: Option<NaiveDate>,
    pub created_at: String,
    pub updated_at: String,
}

impl<K: OrderKind> From<&Order<K>> for OrderResponse<K::Status, K::Counterparty> {
    fn from(order: &Order<K>) -> Self {
        Self {
            id: order.id(),
            order_number: order.order_number().to_string(),
            status: order.status(),
            counterparty: order.counterparty().clone(),
            items: order.items().iter().map(OrderItemResponse::from).collect(),
            total_amount: money(order.total_amount()),
            status_history: order
                .status_history()
                .iter()
                .map(StatusHistoryResponse::from)
                .collect(),
            notes: order.notes().map(str::to_string),
            expected_date: order.expected_date(),
            created_at: order.created_at().to_rfc3339(),
            updated_at: order.updated_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockAdjustmentResponse {
    pub product_id: Uuid,
    pub before: u32,
    pub after: u32,
}

impl From<StockAdjustment> for StockAdjustmentResponse {
    fn from(a: StockAdjustment) -> Self {
        Self {
            product_id: a.product_id,
            before: a.before,
            after: a.after,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FulfillmentResponse {
    pub adjusted: Vec<StockAdjustmentResponse>,
    /// Products that no longer exist; their items were not taken from stock.
    pub skipped: Vec<Uuid>,
}

impl From<FulfillmentReport> for FulfillmentResponse {
    fn from(report: FulfillmentReport) -> Self {
        Self {
            adjusted: report.adjusted.into_iter().map(Into::into).collect(),
            skipped: report.skipped,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransitionResponse<S, C> {
    pub order: OrderResponse<S, C>,
    pub previous_status: S,
    /// Present when the transition took items out of stock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfillment: Option<FulfillmentResponse>,
}

/// Currency amounts are rounded only for display.
fn money(amount: &BigDecimal) -> String {
    amount.round(2).with_scale(2).to_string()
}

// ── Shared handler bodies ────────────────────────────────────────────────────

pub(crate) async fn create<K: OrderKind>(
    service: Orders<K>,
    new_order: NewOrder<K>,
) -> Result<HttpResponse, AppError> {
    let order = web::block(move || service.create_order(new_order)).await??;
    Ok(HttpResponse::Created().json(OrderView::<K>::from(&order)))
}

pub(crate) async fn get<K: OrderKind>(service: Orders<K>, id: Uuid) -> Result<HttpResponse, AppError> {
    match web::block(move || service.get_order(id)).await?? {
        Some(order) => Ok(HttpResponse::Ok().json(OrderView::<K>::from(&order))),
        None => Err(DomainError::not_found(K::ENTITY, id).into()),
    }
}

pub(crate) async fn list<K: OrderKind>(
    service: Orders<K>,
    params: ListParams,
) -> Result<HttpResponse, AppError> {
    let query = params.to_query()?;
    let page = web::block(move || service.list_orders(&query)).await??;
    Ok(HttpResponse::Ok().json(ListResponse::from_page(page, |o| OrderView::<K>::from(o))))
}

pub(crate) async fn update<K: OrderKind>(
    service: Orders<K>,
    id: Uuid,
    patch: OrderPatch<K>,
) -> Result<HttpResponse, AppError> {
    let order = web::block(move || service.update_fields(id, patch)).await??;
    Ok(HttpResponse::Ok().json(OrderView::<K>::from(&order)))
}

pub(crate) async fn replace_items<K: OrderKind>(
    service: Orders<K>,
    id: Uuid,
    body: ReplaceItemsRequest,
) -> Result<HttpResponse, AppError> {
    let items = into_inputs(body.items)?;
    let order = web::block(move || service.replace_items(id, items)).await??;
    Ok(HttpResponse::Ok().json(OrderView::<K>::from(&order)))
}

pub(crate) async fn transition<K: OrderKind>(
    service: Orders<K>,
    id: Uuid,
    body: TransitionRequest,
) -> Result<HttpResponse, AppError> {
    let TransitionRequest { status, note } = body;
    let outcome = web::block(move || service.transition_status(id, &status, note)).await??;
    Ok(HttpResponse::Ok().json(TransitionResponse {
        order: OrderView::<K>::from(&outcome.order),
        previous_status: outcome.previous,
        fulfillment: outcome.fulfillment.map(FulfillmentResponse::from),
    }))
}

pub(crate) async fn delete<K: OrderKind>(service: Orders<K>, id: Uuid) -> Result<HttpResponse, AppError> {
    web::block(move || service.delete_order(id)).await??;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_rounds_for_display_only() {
        assert_eq!(money(&BigDecimal::from_str("20").unwrap()), "20.00");
        assert_eq!(money(&BigDecimal::from_str("3.14159").unwrap()), "3.14");
        assert_eq!(money(&BigDecimal::from_str("0.1").unwrap()), "0.10");
    }

    #[test]
    fn item_request_rejects_unparsable_price() {
        let request = OrderItemRequest {
            product_id: Uuid::new_v4(),
            product_name: None,
            quantity: 1,
            unit_price: "ten".to_string(),
        };
        assert!(matches!(
            request.into_input(),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
