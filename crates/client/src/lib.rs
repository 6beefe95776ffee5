pub mod client;
pub mod config;
pub mod error;
pub mod session;

pub use client::CatalogClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ErrorKind, ServiceError};
pub use session::{CatalogSession, WriteOutcome};
