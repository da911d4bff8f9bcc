use std::fmt::Debug;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::collection::{Collection, Collections};
use super::errors::DomainError;
use super::status::{OrderStatus, PurchaseOrderStatus, SalesOrderStatus};

/// Distinguishes purchase orders from sales orders.
///
/// Both kinds share [`Order`]; the kind fixes the status vocabulary, the
/// counterparty snapshot and where the store keeps the orders.
pub trait OrderKind: Clone + Debug + Send + Sync + 'static {
    type Status: OrderStatus;
    type Counterparty: Counterparty;

    /// Prefix of generated order numbers.
    const NUMBER_PREFIX: &'static str;
    /// Human readable name used in errors and logs.
    const ENTITY: &'static str;

    fn orders(collections: &Collections) -> &Collection<Order<Self>>;
    fn orders_mut(collections: &mut Collections) -> &mut Collection<Order<Self>>;
}

/// Embedded snapshot of the other party to an order.
pub trait Counterparty: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Refresh the snapshot from the directory when it references an entry.
    fn resolve(self, collections: &Collections) -> Result<Self, DomainError>;
}

#[derive(Debug, Clone, Copy)]
pub struct Purchase;

#[derive(Debug, Clone, Copy)]
pub struct Sales;

impl OrderKind for Purchase {
    type Status = PurchaseOrderStatus;
    type Counterparty = SupplierRef;

    const NUMBER_PREFIX: &'static str = "PO";
    const ENTITY: &'static str = "purchase order";

    fn orders(collections: &Collections) -> &Collection<Order<Self>> {
        &collections.purchase_orders
    }

    fn orders_mut(collections: &mut Collections) -> &mut Collection<Order<Self>> {
        &mut collections.purchase_orders
    }
}

impl OrderKind for Sales {
    type Status = SalesOrderStatus;
    type Counterparty = CustomerRef;

    const NUMBER_PREFIX: &'static str = "SO";
    const ENTITY: &'static str = "sales order";

    fn orders(collections: &Collections) -> &Collection<Order<Self>> {
        &collections.sales_orders
    }

    fn orders_mut(collections: &mut Collections) -> &mut Collection<Order<Self>> {
        &mut collections.sales_orders
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupplierRef {
    pub supplier_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Counterparty for SupplierRef {
    fn resolve(self, collections: &Collections) -> Result<Self, DomainError> {
        let Some(id) = self.supplier_id else {
            return Ok(self);
        };
        let supplier = collections
            .suppliers
            .get(id)
            .ok_or_else(|| DomainError::not_found("supplier", id))?;
        Ok(Self {
            supplier_id: Some(id),
            name: supplier.name.clone(),
            email: supplier.email.clone(),
            phone: supplier.phone.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomerRef {
    pub customer_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Counterparty for CustomerRef {
    fn resolve(self, collections: &Collections) -> Result<Self, DomainError> {
        let Some(id) = self.customer_id else {
            return Ok(self);
        };
        let customer = collections
            .customers
            .get(id)
            .ok_or_else(|| DomainError::not_found("customer", id))?;
        Ok(Self {
            customer_id: Some(id),
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            // A shipping address given on the order wins over the directory one.
            address: self.address.or_else(|| customer.address.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
}

impl OrderItem {
    pub fn new(
        product_id: Uuid,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: BigDecimal,
    ) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidInput(format!(
                "quantity for product {} must be positive",
                product_id
            )));
        }
        if unit_price < BigDecimal::zero() {
            return Err(DomainError::InvalidInput(format!(
                "unit price for product {} must not be negative",
                product_id
            )));
        }
        let line_total = BigDecimal::from(quantity) * &unit_price;
        Ok(Self {
            product_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
            line_total,
        })
    }
}

/// Exact sum of `quantity * unit_price` over `items`.
pub fn recompute_total(items: &[OrderItem]) -> BigDecimal {
    items
        .iter()
        .fold(BigDecimal::zero(), |total, item| {
            total + BigDecimal::from(item.quantity) * &item.unit_price
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry<S> {
    pub status: S,
    pub timestamp: DateTime<Utc>,
    pub note: String,
}

/// Editable order fields other than items and status.
///
/// `None` keeps a field; `Some(None)` clears notes or the expected date.
#[derive(Debug, Clone)]
pub struct OrderPatch<K: OrderKind> {
    pub counterparty: Option<K::Counterparty>,
    pub notes: Option<Option<String>>,
    pub expected_date: Option<Option<NaiveDate>>,
}

impl<K: OrderKind> Default for OrderPatch<K> {
    fn default() -> Self {
        Self {
            counterparty: None,
            notes: None,
            expected_date: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K::Status: Serialize, K::Counterparty: Serialize",
    deserialize = "K::Status: DeserializeOwned, K::Counterparty: DeserializeOwned"
))]
pub struct Order<K: OrderKind> {
    id: Uuid,
    order_number: String,
    status: K::Status,
    counterparty: K::Counterparty,
    items: Vec<OrderItem>,
    total_amount: BigDecimal,
    status_history: Vec<StatusHistoryEntry<K::Status>>,
    notes: Option<String>,
    expected_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<K: OrderKind> Order<K> {
    /// A new order in the initial status with a single history entry.
    pub fn create(
        counterparty: K::Counterparty,
        items: Vec<OrderItem>,
        notes: Option<String>,
        expected_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        require_items(&items)?;
        let status = K::Status::INITIAL;
        Ok(Self {
            id: Uuid::new_v4(),
            order_number: generate_order_number(K::NUMBER_PREFIX, now),
            status,
            counterparty,
            total_amount: recompute_total(&items),
            items,
            status_history: vec![StatusHistoryEntry {
                status,
                timestamp: now,
                note: "Order created".to_string(),
            }],
            notes,
            expected_date,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn status(&self) -> K::Status {
        self.status
    }

    pub fn counterparty(&self) -> &K::Counterparty {
        &self.counterparty
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_amount(&self) -> &BigDecimal {
        &self.total_amount
    }

    pub fn status_history(&self) -> &[StatusHistoryEntry<K::Status>] {
        &self.status_history
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn expected_date(&self) -> Option<NaiveDate> {
        self.expected_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move to `status`, recording the change in the history.
    ///
    /// Any non-terminal status may move to any status. Returns the status the
    /// order had before.
    pub fn transition(
        &mut self,
        status: K::Status,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<K::Status, DomainError> {
        self.ensure_open()?;
        let previous = self.status;
        let note = note
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Status changed from {} to {}", previous, status));
        self.status_history.push(StatusHistoryEntry {
            status,
            timestamp: now,
            note,
        });
        self.status = status;
        self.updated_at = now;
        Ok(previous)
    }

    /// Replace the whole item list; the total follows the new items.
    pub fn replace_items(
        &mut self,
        items: Vec<OrderItem>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        require_items(&items)?;
        self.total_amount = recompute_total(&items);
        self.items = items;
        self.updated_at = now;
        Ok(())
    }

    pub fn apply(&mut self, patch: OrderPatch<K>, now: DateTime<Utc>) {
        if let Some(counterparty) = patch.counterparty {
            self.counterparty = counterparty;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(expected_date) = patch.expected_date {
            self.expected_date = expected_date;
        }
        self.updated_at = now;
    }

    /// Check the invariants `create` and the mutators maintain, for orders
    /// that were loaded rather than built.
    pub fn validate(&self) -> Result<(), DomainError> {
        let broken = |what: String| {
            DomainError::InvalidInput(format!("order {}: {}", self.order_number, what))
        };

        require_items(&self.items).map_err(|e| broken(e.to_string()))?;
        for item in &self.items {
            let rebuilt = OrderItem::new(
                item.product_id,
                item.product_name.clone(),
                item.quantity,
                item.unit_price.clone(),
            )
            .map_err(|e| broken(e.to_string()))?;
            if rebuilt.line_total != item.line_total {
                return Err(broken(format!(
                    "line total {} for product {} is not quantity times unit price",
                    item.line_total, item.product_id
                )));
            }
        }
        let total = recompute_total(&self.items);
        if total != self.total_amount {
            return Err(broken(format!(
                "total {} does not match its items ({})",
                self.total_amount, total
            )));
        }
        match self.status_history.last() {
            Some(entry) if entry.status == self.status => Ok(()),
            Some(entry) => Err(broken(format!(
                "status {} but last history entry is {}",
                self.status, entry.status
            ))),
            None => Err(broken("empty status history".to_string())),
        }
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::TerminalStatus {
                order_number: self.order_number.clone(),
                status: self.status.to_string(),
            });
        }
        Ok(())
    }
}

fn require_items(items: &[OrderItem]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::InvalidInput(
            "an order needs at least one item".to_string(),
        ));
    }
    Ok(())
}

/// `PREFIX-YYYYMMDDHHMMSS-NNNN`, the suffix drawn from a random UUID.
pub fn generate_order_number(prefix: &str, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().as_u128() % 10_000;
    format!("{}-{}-{:04}", prefix, now.format("%Y%m%d%H%M%S"), suffix)
}
