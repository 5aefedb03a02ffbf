//! Infrastructure layer - configuration, catalog loading and persistence adapters.

pub mod catalog_loader;
pub mod config;
pub mod memory_store;
pub mod ports;
