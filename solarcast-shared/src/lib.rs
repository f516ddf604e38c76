//! # SolarCast Shared Library
//!
//! Domain types and integrations used by the SolarCast API server.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing and session tokens
//! - `models`: the user entity and its PostgreSQL queries
//! - `store`: the `UserStore` abstraction with PostgreSQL and in-memory backends
//! - `db`: connection pool and embedded migrations
//! - `weather`: upstream weather client and response reshaping

pub mod auth;
pub mod db;
pub mod models;
pub mod store;
pub mod weather;

/// Current version of the SolarCast shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
