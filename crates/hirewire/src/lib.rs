//! Matching, pricing and real-time notification routing for the recruitment marketplace.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
