//! Revocation store implementations.
//!
//! The `RevocationStore` boundary lives in `bookly-auth`; these are the
//! concrete backends (in-process map, Redis).

pub mod in_memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use in_memory::InMemoryRevocationStore;
#[cfg(feature = "redis")]
pub use redis::RedisRevocationStore;
