pub mod customers;
pub mod orders;
pub mod products;
pub mod purchase_orders;
pub mod sales_orders;
pub mod suppliers;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::errors::DomainError;
use crate::domain::query::{ListQuery, Page};

/// Tells an absent field (`None`) apart from an explicit `null` (`Some(None)`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ── Listing ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// `;`-separated `field:op:value` expressions, `op` one of eq, contains,
    /// lt, gt, between (value `lo..hi`).
    pub filter: Option<String>,
    /// `field`, `field:asc` or `field:desc`. Defaults to newest first.
    pub order_by: Option<String>,
    /// Page number (1-based). Defaults to 1.
    pub page: Option<i64>,
    /// Number of items per page. Defaults to 20, maximum 100.
    pub limit: Option<i64>,
}

impl ListParams {
    pub fn to_query(&self) -> Result<ListQuery, DomainError> {
        ListQuery::parse(
            self.filter.as_deref(),
            self.order_by.as_deref(),
            self.page,
            self.limit,
        )
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> ListResponse<T> {
    pub fn from_page<R>(page: Page<R>, f: impl Fn(&R) -> T) -> Self {
        Self {
            items: page.items.iter().map(f).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}
