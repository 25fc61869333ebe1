//! Storage traits for auth-related data.
//!
//! Implementations live in separate crates:
//! - `keyward-memory` - in-memory provider

pub mod provider;

pub use provider::Provider;
