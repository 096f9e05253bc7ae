//! Core types for Clementine Market.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod brand;
pub mod granularity;
pub mod id;
pub mod money;

pub use brand::BrandRef;
pub use granularity::Granularity;
pub use id::*;
pub use money::round_to_cents;
