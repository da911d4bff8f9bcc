use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::{Customer, Product, Supplier};
use super::errors::DomainError;
use super::order::{Order, OrderKind, Purchase, Sales};
use super::query::{ListQuery, Page};

/// Anything a [`Collection`] can hold.
pub trait Record: Clone + Serialize {
    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Records of one type keyed by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Record", deserialize = "T: Record + serde::de::DeserializeOwned"))]
#[serde(from = "Vec<T>", into = "Vec<T>")]
pub struct Collection<T: Record> {
    records: HashMap<Uuid, T>,
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
        }
    }
}

impl<T: Record> From<Vec<T>> for Collection<T> {
    fn from(records: Vec<T>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id(), r)).collect(),
        }
    }
}

impl<T: Record> From<Collection<T>> for Vec<T> {
    fn from(collection: Collection<T>) -> Self {
        let mut records: Vec<T> = collection.records.into_values().collect();
        records.sort_by_key(|r| r.created_at());
        records
    }
}

impl<T: Record> Collection<T> {
    pub fn insert(&mut self, record: T) {
        self.records.insert(record.id(), record);
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut T> {
        self.records.get_mut(&id)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<T> {
        self.records.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn list(&self, query: &ListQuery) -> Result<Page<T>, DomainError> {
        let rows = self
            .records
            .values()
            .map(|record| {
                serde_json::to_value(record)
                    .map(|json| (json, record))
                    .map_err(|e| DomainError::Internal(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(query.apply(rows))
    }
}

/// Everything the application keeps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Collections {
    pub products: Collection<Product>,
    pub suppliers: Collection<Supplier>,
    pub customers: Collection<Customer>,
    pub purchase_orders: Collection<Order<Purchase>>,
    pub sales_orders: Collection<Order<Sales>>,
}

impl Collections {
    /// Re-check every stored order, e.g. after loading a snapshot.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.purchase_orders.iter().try_for_each(Order::validate)?;
        self.sales_orders.iter().try_for_each(Order::validate)
    }
}

macro_rules! record {
    ($($ty:ty),*) => {
        $(
            impl Record for $ty {
                fn id(&self) -> Uuid {
                    self.id
                }

                fn created_at(&self) -> DateTime<Utc> {
                    self.created_at
                }
            }
        )*
    };
}

record!(Product, Supplier, Customer);

impl<K: OrderKind> Record for Order<K> {
    fn id(&self) -> Uuid {
        Order::id(self)
    }

    fn created_at(&self) -> DateTime<Utc> {
        Order::created_at(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::ProductInput;
    use crate::domain::query::{FilterOp, SortDirection};

    fn product(name: &str, stock: u32) -> Product {
        Product::new(
            ProductInput {
                name: name.into(),
                sku: format!("SKU-{}", name),
                category: "parts".into(),
                stock,
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn insert_get_remove() {
        let mut products = Collection::default();
        let widget = product("Widget", 5);
        let id = widget.id;
        products.insert(widget);

        assert_eq!(products.get(id).map(|p| p.stock), Some(5));
        products.get_mut(id).unwrap().stock = 1;
        assert_eq!(products.get(id).map(|p| p.stock), Some(1));
        assert!(products.remove(id).is_some());
        assert!(products.get(id).is_none());
        assert!(products.is_empty());
    }

    #[test]
    fn list_filters_and_sorts_records() {
        let mut products = Collection::default();
        products.insert(product("Widget", 5));
        products.insert(product("Gadget", 50));
        products.insert(product("Gizmo", 0));

        let low_stock = ListQuery::default()
            .with_filter("stock", FilterOp::LessThan("10".into()))
            .ordered_by("name", SortDirection::Asc);
        let page = products.list(&low_stock).unwrap();

        assert_eq!(page.total, 2);
        let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Gizmo", "Widget"]);
    }

    #[test]
    fn serializes_as_a_list_and_back() {
        let mut products = Collection::default();
        products.insert(product("Widget", 5));
        products.insert(product("Gadget", 7));

        let json = serde_json::to_value(&products).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(2));

        let back: Collection<Product> = serde_json::from_value(json).unwrap();
        assert_eq!(back.len(), 2);
    }
}
