// Adapters layer: concrete implementations of the domain ports.

pub mod memory_catalog;
pub mod memory_store;
