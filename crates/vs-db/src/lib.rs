//! vs-db: account persistence.
//!
//! SQLite storage with r2d2 connection pooling, embedded migrations, typed
//! models, and classification of SQLite failures into [`vs_core::Error`].

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
