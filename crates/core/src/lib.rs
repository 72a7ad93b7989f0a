//! Ristretto Core - Shared types library.
//!
//! This crate provides the domain types used by the Ristretto components:
//! - `api` - The coffee-shop discovery HTTP service
//! - `integration-tests` - End-to-end tests against the API router
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, place IDs, and coordinates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
