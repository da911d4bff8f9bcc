use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::catalog::{
    ContactInput, ContactPatch, Customer, Product, ProductInput, ProductPatch, Supplier,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::RecordStore;
use crate::domain::query::{ListQuery, Page};

/// Products, suppliers and customers.
pub struct CatalogService<S> {
    store: Arc<S>,
}

impl<S> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RecordStore> CatalogService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // ── Products ─────────────────────────────────────────────────────────────

    pub fn create_product(&self, input: ProductInput) -> Result<Product, DomainError> {
        let product = Product::new(input, Utc::now())?;
        self.store.write(|c| {
            if let Some(existing) = c.products.iter().find(|p| p.sku == product.sku) {
                return Err(DomainError::InvalidInput(format!(
                    "sku {} already used by product {}",
                    product.sku, existing.id
                )));
            }
            c.products.insert(product.clone());
            Ok(())
        })?;
        log::info!("Created product {} ({}), stock {}", product.name, product.sku, product.stock);
        Ok(product)
    }

    pub fn get_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.store.read(|c| Ok(c.products.get(id).cloned()))
    }

    pub fn list_products(&self, query: &ListQuery) -> Result<Page<Product>, DomainError> {
        self.store.read(|c| c.products.list(query))
    }

    /// Direct edit, the only path besides fulfillment that may set stock.
    pub fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product, DomainError> {
        let product = self.store.write(|c| {
            if let Some(sku) = &patch.sku {
                let clash = c.products.iter().any(|p| p.sku == *sku && p.id != id);
                if clash {
                    return Err(DomainError::InvalidInput(format!(
                        "sku {} already used by another product",
                        sku
                    )));
                }
            }
            let product = c
                .products
                .get_mut(id)
                .ok_or_else(|| DomainError::not_found("product", id))?;
            product.apply(patch, Utc::now())?;
            Ok(product.clone())
        })?;
        log::info!("Updated product {} ({}), stock {}", product.name, product.id, product.stock);
        Ok(product)
    }

    pub fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        let removed = self.store.write(|c| {
            c.products
                .remove(id)
                .ok_or_else(|| DomainError::not_found("product", id))
        })?;
        log::info!("Deleted product {} ({})", removed.name, removed.id);
        Ok(())
    }

    // ── Suppliers ────────────────────────────────────────────────────────────

    pub fn create_supplier(&self, input: ContactInput) -> Result<Supplier, DomainError> {
        let supplier = Supplier::new(input, Utc::now())?;
        self.store.write(|c| {
            c.suppliers.insert(supplier.clone());
            Ok(())
        })?;
        log::info!("Created supplier {} ({})", supplier.name, supplier.id);
        Ok(supplier)
    }

    pub fn get_supplier(&self, id: Uuid) -> Result<Option<Supplier>, DomainError> {
        self.store.read(|c| Ok(c.suppliers.get(id).cloned()))
    }

    pub fn list_suppliers(&self, query: &ListQuery) -> Result<Page<Supplier>, DomainError> {
        self.store.read(|c| c.suppliers.list(query))
    }

    pub fn update_supplier(&self, id: Uuid, patch: ContactPatch) -> Result<Supplier, DomainError> {
        self.store.write(|c| {
            let supplier = c
                .suppliers
                .get_mut(id)
                .ok_or_else(|| DomainError::not_found("supplier", id))?;
            supplier.apply(patch, Utc::now())?;
            Ok(supplier.clone())
        })
    }

    pub fn delete_supplier(&self, id: Uuid) -> Result<(), DomainError> {
        self.store.write(|c| {
            c.suppliers
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| DomainError::not_found("supplier", id))
        })
    }

    // ── Customers ────────────────────────────────────────────────────────────

    pub fn create_customer(&self, input: ContactInput) -> Result<Customer, DomainError> {
        let customer = Customer::new(input, Utc::now())?;
        self.store.write(|c| {
            c.customers.insert(customer.clone());
            Ok(())
        })?;
        log::info!("Created customer {} ({})", customer.name, customer.id);
        Ok(customer)
    }

    pub fn get_customer(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        self.store.read(|c| Ok(c.customers.get(id).cloned()))
    }

    pub fn list_customers(&self, query: &ListQuery) -> Result<Page<Customer>, DomainError> {
        self.store.read(|c| c.customers.list(query))
    }

    pub fn update_customer(&self, id: Uuid, patch: ContactPatch) -> Result<Customer, DomainError> {
        self.store.write(|c| {
            let customer = c
                .customers
                .get_mut(id)
                .ok_or_else(|| DomainError::not_found("customer", id))?;
            customer.apply(patch, Utc::now())?;
            Ok(customer.clone())
        })
    }

    pub fn delete_customer(&self, id: Uuid) -> Result<(), DomainError> {
        self.store.write(|c| {
            c.customers
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| DomainError::not_found("customer", id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryStore;

    fn service() -> CatalogService<InMemoryStore> {
        CatalogService::new(Arc::new(InMemoryStore::new()))
    }

    fn input(name: &str, sku: &str, stock: u32) -> ProductInput {
        ProductInput {
            name: name.into(),
            sku: sku.into(),
            category: "parts".into(),
            stock,
            ..Default::default()
        }
    }

    #[test]
    fn product_crud() {
        let catalog = service();
        let product = catalog.create_product(input("Widget", "W-1", 5)).unwrap();

        let fetched = catalog.get_product(product.id).unwrap().unwrap();
        assert_eq!(fetched, product);

        let updated = catalog
            .update_product(
                product.id,
                ProductPatch {
                    stock: Some(9),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.stock, 9);

        catalog.delete_product(product.id).unwrap();
        assert!(catalog.get_product(product.id).unwrap().is_none());
        assert!(catalog.delete_product(product.id).is_err());
    }

    #[test]
    fn duplicate_sku_is_rejected() {
        let catalog = service();
        catalog.create_product(input("Widget", "W-1", 5)).unwrap();
        let other = catalog.create_product(input("Gadget", "G-1", 5)).unwrap();

        assert!(catalog.create_product(input("Widget 2", "W-1", 1)).is_err());
        assert!(catalog
            .update_product(
                other.id,
                ProductPatch {
                    sku: Some("W-1".into()),
                    ..Default::default()
                }
            )
            .is_err());
        // Keeping its own sku is fine.
        assert!(catalog
            .update_product(
                other.id,
                ProductPatch {
                    sku: Some("G-1".into()),
                    ..Default::default()
                }
            )
            .is_ok());
    }

    #[test]
    fn list_products_with_low_stock() {
        let catalog = service();
        catalog.create_product(input("Widget", "W-1", 2)).unwrap();
        catalog.create_product(input("Gadget", "G-1", 50)).unwrap();

        let query = ListQuery::parse(Some("stock:lt:10"), None, None, None).unwrap();
        let page = catalog.list_products(&query).unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Widget");
    }

    #[test]
    fn supplier_and_customer_directories() {
        let catalog = service();
        let supplier = catalog
            .create_supplier(ContactInput {
                name: "Acme".into(),
                contact_name: Some("Wile".into()),
                ..Default::default()
            })
            .unwrap();
        let customer = catalog
            .create_customer(ContactInput {
                name: "Ada".into(),
                ..Default::default()
            })
            .unwrap();

        let supplier = catalog
            .update_supplier(
                supplier.id,
                ContactPatch {
                    phone: Some(Some("555-0100".into())),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(supplier.phone.as_deref(), Some("555-0100"));
        assert_eq!(supplier.contact_name.as_deref(), Some("Wile"));

        assert_eq!(catalog.list_customers(&ListQuery::default()).unwrap().total, 1);
        catalog.delete_customer(customer.id).unwrap();
        assert!(catalog.get_customer(customer.id).unwrap().is_none());
        assert!(catalog.delete_supplier(Uuid::new_v4()).is_err());
    }
}
