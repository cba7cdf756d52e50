//! vs-core: shared types, IDs, errors and configuration.
//!
//! Every other vs-* crate depends on this one. It provides the unified
//! [`Error`] type (with its HTTP status mapping), typed UUID identifiers and
//! the JSON [`config::Config`] tree for the server, auth and player sections.

pub mod config;
pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::*;
