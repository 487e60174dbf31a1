//! Infrastructure layer: revocation stores, identity stores, environment config.

pub mod config;
pub mod identity;
pub mod revocation;

pub use config::{ServerSettings, Settings};
pub use identity::{InMemoryIdentityStore, PostgresIdentityStore};
pub use revocation::InMemoryRevocationStore;
#[cfg(feature = "redis")]
pub use revocation::RedisRevocationStore;
