//! Core of the hearthis catalog adapter: entities, the synthetic URI scheme,
//! the remote catalog interface, the catalog cache and the navigation layer
//! built on top of them.

pub mod cache;
pub mod catalog_contract;
pub mod config;
pub mod factory;
pub mod library;
pub mod logging;
pub mod models;
pub mod paths;
pub mod provider;
pub mod redact;
pub mod remote;
pub mod secrets;
pub mod uri;

pub use cache::{CacheStats, CatalogCache};
pub use config::{Config, ConfigError, HearthisConfig, LogLevel, LoggingConfig, ValidationError};
pub use library::{Credentials, HearthisLibrary, LibraryError, LibraryResult};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use paths::{AppDirs, DirsError};
pub use provider::{HearthisLibraryProvider, LibraryProvider};
pub use remote::{FetchError, FetchResult, RemoteCatalog, PAGE_SIZE};

pub const APP_NAME: &str = "hearthis";
pub const APP_AUTHOR: &str = "Hearthis";
pub const APP_QUALIFIER: &str = "at";
