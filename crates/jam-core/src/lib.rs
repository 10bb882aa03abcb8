//! jam-session/crates/jam-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Jam Session.

pub mod error;
pub mod models;
pub mod query;
pub mod rating;
pub mod store;
pub mod tags;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;
