//! Domain types for clients, scopes, grant codes and tokens.

pub mod client;
pub mod grant_code;
pub mod lifecycle;
pub mod scope;
pub mod token;

pub use client::{Client, GrantType};
pub use grant_code::GrantCode;
pub use lifecycle::Lifecycle;
pub use scope::{Scope, Scopes};
pub use token::{BEARER, Token, TokenSpec, generate_value};
