//! Query modules, one per table.

pub mod auth;
pub mod users;
