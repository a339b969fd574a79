//! Concrete adapter implementations for ports.

pub mod cache_store;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod yahoo_adapter;
