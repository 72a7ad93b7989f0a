//! Ristretto API library.
//!
//! Coffee-shop discovery backend: authenticated nearby search and place
//! details backed by an external places provider, plus per-user favorites
//! and visit history. Exposed as a library so the router can be driven
//! directly in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod places;
pub mod routes;
pub mod services;
pub mod state;
