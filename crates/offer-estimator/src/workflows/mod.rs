pub mod buyers;
pub mod comparables;
pub mod estimate;
pub mod saved_estimates;
pub mod underwrite;
