//! Track sources: remote catalog adapters and the aggregator merging them.
//!
//! Each adapter normalizes one catalog's responses into the common
//! [`Track`] shape; the [`Aggregator`] merges adapters in priority order
//! and implements search with a local-filter fallback.

mod aggregator;
mod audius;
mod jamendo;
mod model;
mod provider;

pub use aggregator::Aggregator;
pub use audius::Audius;
pub use jamendo::Jamendo;
pub use model::Track;
pub use provider::CatalogProvider;
