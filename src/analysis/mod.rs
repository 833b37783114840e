//! Analysis modules.
//!
//! Feature derivation builds the enriched dataset once; aggregation,
//! views and distributions are computed from it per request.

pub mod aggregator;
pub mod distribution;
pub mod features;
pub mod view;

pub use aggregator::*;
pub use distribution::*;
pub use features::{build_dataset, derive_features};
pub use view::*;
