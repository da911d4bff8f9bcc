pub mod catalog_service;
pub mod inventory;
pub mod order_service;
