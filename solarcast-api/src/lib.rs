//! # SolarCast API Server Library
//!
//! Router, handlers and configuration for the SolarCast API server. The
//! binary in `main.rs` only wires these together.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
