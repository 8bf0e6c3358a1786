mod auth;
mod forms;
mod logging;
mod server;
mod storage;
mod store;


pub use auth::*;
pub use forms::*;
pub use logging::*;
pub use server::*;
pub use storage::*;
pub use store::*;

use serde::Deserialize;

/// Top-level configuration for the guide server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct GuidesConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Guide record store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Image object store configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session cookie configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Guide form limits.
    #[serde(default)]
    pub forms: FormsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}
