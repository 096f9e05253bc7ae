//! Clementine Core - Shared types library.
//!
//! This crate provides common domain types used across all Clementine Market
//! components:
//! - `reports` - Sales reporting service
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, brand references,
//!   report granularities, and money rounding

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
