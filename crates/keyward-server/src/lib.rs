pub mod bootstrap;
pub mod config;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use observability::init_tracing;
pub use server::{KeywardServer, ServerBuilder, build_app};
