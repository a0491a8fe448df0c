//! Quick offer estimate pipeline over the property data provider.

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{EstimateRequest, OfferEstimate};
pub use router::estimate_router;
pub use service::{EstimateError, EstimateService};
