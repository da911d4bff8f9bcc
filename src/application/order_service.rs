use std::marker::PhantomData;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::application::inventory::{apply_fulfillment, FulfillmentReport};
use crate::domain::collection::Collections;
use crate::domain::errors::DomainError;
use crate::domain::order::{Counterparty, Order, OrderItem, OrderKind, OrderPatch};
use crate::domain::ports::RecordStore;
use crate::domain::query::{ListQuery, Page};
use crate::domain::status::OrderStatus;

#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    /// Taken from the catalog when not given.
    pub product_name: Option<String>,
    pub quantity: u32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct NewOrder<K: OrderKind> {
    pub counterparty: K::Counterparty,
    pub items: Vec<OrderItemInput>,
    pub notes: Option<String>,
    pub expected_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct TransitionOutcome<K: OrderKind> {
    pub order: Order<K>,
    pub previous: K::Status,
    /// Present when the transition took items out of stock.
    pub fulfillment: Option<FulfillmentReport>,
}

/// Lifecycle operations for one kind of order.
pub struct OrderService<S, K> {
    store: Arc<S>,
    kind: PhantomData<fn() -> K>,
}

impl<S, K> Clone for OrderService<S, K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            kind: PhantomData,
        }
    }
}

impl<S: RecordStore, K: OrderKind> OrderService<S, K> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            kind: PhantomData,
        }
    }

    pub fn create_order(&self, new_order: NewOrder<K>) -> Result<Order<K>, DomainError> {
        let order = self.store.write(|c| {
            let counterparty = new_order.counterparty.resolve(c)?;
            let items = build_items(c, new_order.items)?;
            let order = Order::<K>::create(
                counterparty,
                items,
                new_order.notes,
                new_order.expected_date,
                Utc::now(),
            )?;
            K::orders_mut(c).insert(order.clone());
            Ok(order)
        })?;

        log::info!(
            "Created {} {} with {} item(s), total {}",
            K::ENTITY,
            order.order_number(),
            order.items().len(),
            order.total_amount()
        );
        Ok(order)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Option<Order<K>>, DomainError> {
        self.store.read(|c| Ok(K::orders(c).get(id).cloned()))
    }

    pub fn list_orders(&self, query: &ListQuery) -> Result<Page<Order<K>>, DomainError> {
        self.store.read(|c| K::orders(c).list(query))
    }

    /// Change counterparty, notes or expected date. Status and total are
    /// never set here.
    pub fn update_fields(&self, id: Uuid, patch: OrderPatch<K>) -> Result<Order<K>, DomainError> {
        self.store.write(|c| {
            let patch = OrderPatch {
                counterparty: patch.counterparty.map(|cp| cp.resolve(c)).transpose()?,
                ..patch
            };
            let order = K::orders_mut(c)
                .get_mut(id)
                .ok_or_else(|| DomainError::not_found(K::ENTITY, id))?;
            order.apply(patch, Utc::now());
            Ok(order.clone())
        })
    }

    pub fn replace_items(
        &self,
        id: Uuid,
        items: Vec<OrderItemInput>,
    ) -> Result<Order<K>, DomainError> {
        let order = self.store.write(|c| {
            let items = build_items(c, items)?;
            let order = K::orders_mut(c)
                .get_mut(id)
                .ok_or_else(|| DomainError::not_found(K::ENTITY, id))?;
            order.replace_items(items, Utc::now())?;
            Ok(order.clone())
        })?;

        log::info!(
            "Replaced items of {} {}, total now {}",
            K::ENTITY,
            order.order_number(),
            order.total_amount()
        );
        Ok(order)
    }

    pub fn delete_order(&self, id: Uuid) -> Result<(), DomainError> {
        let removed = self.store.write(|c| {
            K::orders_mut(c)
                .remove(id)
                .ok_or_else(|| DomainError::not_found(K::ENTITY, id))
        })?;
        log::info!("Deleted {} {}", K::ENTITY, removed.order_number());
        Ok(())
    }

    /// Move an order to `status`, appending to its history.
    ///
    /// Entering a stock-decrementing status adjusts inventory in the same
    /// write, so the transition and the adjustment apply together or not at
    /// all. Terminal orders reject every transition, which keeps a repeated
    /// fulfillment from taking stock twice.
    pub fn transition_status(
        &self,
        id: Uuid,
        status: &str,
        note: Option<String>,
    ) -> Result<TransitionOutcome<K>, DomainError> {
        let status = K::Status::parse(status)?;

        let outcome = self.store.write(|c| {
            let order = K::orders_mut(c)
                .get_mut(id)
                .ok_or_else(|| DomainError::not_found(K::ENTITY, id))?;
            let previous = order.transition(status, note, Utc::now())?;
            let order = order.clone();

            let fulfillment = status
                .decrements_stock()
                .then(|| apply_fulfillment(&mut c.products, order.items()));

            Ok(TransitionOutcome {
                order,
                previous,
                fulfillment,
            })
        })?;

        log::info!(
            "{} {} moved from {} to {}",
            K::ENTITY,
            outcome.order.order_number(),
            outcome.previous,
            status
        );
        if let Some(report) = &outcome.fulfillment {
            log::info!(
                "Fulfillment of {} adjusted {} product(s), skipped {}",
                outcome.order.order_number(),
                report.adjusted.len(),
                report.skipped.len()
            );
        }
        Ok(outcome)
    }
}

fn build_items(
    collections: &Collections,
    inputs: Vec<OrderItemInput>,
) -> Result<Vec<OrderItem>, DomainError> {
    inputs
        .into_iter()
        .map(|input| {
            let name = match input.product_name {
                Some(name) => name,
                None => collections
                    .products
                    .get(input.product_id)
                    .map(|p| p.name.clone())
                    .ok_or_else(|| DomainError::not_found("product", input.product_id))?,
            };
            OrderItem::new(input.product_id, name, input.quantity, input.unit_price)
        })
        .collect()
}
