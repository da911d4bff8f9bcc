pub mod catalog;
pub mod collection;
pub mod errors;
pub mod order;
pub mod ports;
pub mod query;
pub mod status;
