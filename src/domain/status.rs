use std::fmt::{self, Debug, Display};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::errors::DomainError;

/// A closed set of lifecycle states for one kind of order.
pub trait OrderStatus:
    Copy + Eq + Debug + Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Status every order is created with.
    const INITIAL: Self;
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    /// Terminal statuses accept no further transitions.
    fn is_terminal(&self) -> bool;

    /// Entering this status decrements stock for every ordered item.
    fn decrements_stock(&self) -> bool {
        false
    }

    fn parse(s: &str) -> Result<Self, DomainError> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                DomainError::InvalidStatus(format!(
                    "'{}' (expected one of: {})",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    Pending,
    Approved,
    Ordered,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus for PurchaseOrderStatus {
    const INITIAL: Self = PurchaseOrderStatus::Pending;
    const ALL: &'static [Self] = &[
        PurchaseOrderStatus::Pending,
        PurchaseOrderStatus::Approved,
        PurchaseOrderStatus::Ordered,
        PurchaseOrderStatus::Shipped,
        PurchaseOrderStatus::Delivered,
        PurchaseOrderStatus::Cancelled,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "pending",
            PurchaseOrderStatus::Approved => "approved",
            PurchaseOrderStatus::Ordered => "ordered",
            PurchaseOrderStatus::Shipped => "shipped",
            PurchaseOrderStatus::Delivered => "delivered",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Delivered | PurchaseOrderStatus::Cancelled
        )
    }
}

impl Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SalesOrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Fulfilled,
    Cancelled,
}

impl OrderStatus for SalesOrderStatus {
    const INITIAL: Self = SalesOrderStatus::Pending;
    const ALL: &'static [Self] = &[
        SalesOrderStatus::Pending,
        SalesOrderStatus::Confirmed,
        SalesOrderStatus::Processing,
        SalesOrderStatus::Shipped,
        SalesOrderStatus::Fulfilled,
        SalesOrderStatus::Cancelled,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            SalesOrderStatus::Pending => "pending",
            SalesOrderStatus::Confirmed => "confirmed",
            SalesOrderStatus::Processing => "processing",
            SalesOrderStatus::Shipped => "shipped",
            SalesOrderStatus::Fulfilled => "fulfilled",
            SalesOrderStatus::Cancelled => "cancelled",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, SalesOrderStatus::Fulfilled | SalesOrderStatus::Cancelled)
    }

    fn decrements_stock(&self) -> bool {
        matches!(self, SalesOrderStatus::Fulfilled)
    }
}

impl Display for SalesOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
