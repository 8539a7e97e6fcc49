pub mod config;
pub mod endpoints;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use endpoints::Endpoints;
pub use error::PortalError;
pub use types::*;
