//! Core domain types and logic.

pub mod series;
pub mod params;
pub mod ingest;
pub mod simulator;
pub mod metrics;
pub mod recommend;
pub mod evaluate;
pub mod error;
