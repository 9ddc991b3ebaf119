//! Configuration schema and loading.
//!
//! Settings come from an optional TOML file layered under environment
//! overrides; everything has a working default.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
