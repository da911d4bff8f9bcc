use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

/// An inventory record. `stock` only changes through a product edit or the
/// fulfillment hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub stock: u32,
    pub location: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub name: String,
    pub sku: String,
    pub category: String,
    pub stock: u32,
    pub location: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

/// Optional fields use `Some(None)` to clear and `None` to keep.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub stock: Option<u32>,
    pub location: Option<Option<String>>,
    pub batch_number: Option<Option<String>>,
    pub expiry_date: Option<Option<NaiveDate>>,
}

impl Product {
    pub fn new(input: ProductInput, now: DateTime<Utc>) -> Result<Self, DomainError> {
        require_text("name", &input.name)?;
        require_text("sku", &input.sku)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name,
            sku: input.sku,
            category: input.category,
            stock: input.stock,
            location: input.location,
            batch_number: input.batch_number,
            expiry_date: input.expiry_date,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, patch: ProductPatch, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(name) = patch.name {
            require_text("name", &name)?;
            self.name = name;
        }
        if let Some(sku) = patch.sku {
            require_text("sku", &sku)?;
            self.sku = sku;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(batch_number) = patch.batch_number {
            self.batch_number = batch_number;
        }
        if let Some(expiry_date) = patch.expiry_date {
            self.expiry_date = expiry_date;
        }
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contact details shared by suppliers and customers.
#[derive(Debug, Clone, Default)]
pub struct ContactInput {
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub contact_name: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

impl Supplier {
    pub fn new(input: ContactInput, now: DateTime<Utc>) -> Result<Self, DomainError> {
        require_text("name", &input.name)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name,
            contact_name: input.contact_name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, patch: ContactPatch, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(name) = patch.name {
            require_text("name", &name)?;
            self.name = name;
        }
        if let Some(contact_name) = patch.contact_name {
            self.contact_name = contact_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Customer {
    pub fn new(input: ContactInput, now: DateTime<Utc>) -> Result<Self, DomainError> {
        require_text("name", &input.name)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, patch: ContactPatch, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(name) = patch.name {
            require_text("name", &name)?;
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        self.updated_at = now;
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}
