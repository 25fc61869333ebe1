//! In-memory provider backend for Keyward.
//!
//! This crate provides an implementation of the
//! [`Provider`](keyward_auth::storage::Provider) trait from `keyward-auth`
//! that keeps everything in `dashmap` maps. Client secrets and resource
//! owner passwords are stored as Argon2id hashes.
//!
//! # Example
//!
//! ```ignore
//! use keyward_memory::InMemoryProvider;
//!
//! let provider = InMemoryProvider::new();
//! provider.register_client(client, "s3cret", scopes)?;
//! provider.register_resource_owner("test_user", "test_password")?;
//! ```

pub mod provider;
pub mod secret;

pub use provider::InMemoryProvider;
