//! Quick offer estimates for single-family homes: comparable sales and rentals
//! around a subject property, rent and flip underwriting, saved estimates and
//! the investor buyer list.

pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod telemetry;
pub mod workflows;
