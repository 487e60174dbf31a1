//! `bookly-core`: shared building blocks (identifiers, infrastructure errors).
//!
//! This crate has no knowledge of HTTP, tokens or storage engines.

pub mod error;
pub mod id;

pub use error::{StoreError, StoreResult};
pub use id::{TokenId, UserId};
