pub mod config;
pub mod listing;
pub mod listing_contract;
pub mod logging;
pub mod models;
pub mod paths;
pub mod redact;
pub mod secrets;

pub use config::{
    Config, ConfigError, LogLevel, LoggingConfig, PlaybackConfig, SinkBackend, SinkConfig,
    ValidationError, YoutubeConfig,
};
pub use listing::{ListingError, ListingResult, PlaylistListing};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use models::{ListingItem, ListingPage, PageToken, PlaylistId, SongUrl};
pub use paths::{AppDirs, DirsError};
pub use secrets::{CredentialStore, SecretKind, SecretsError, SecretsResult};

pub const APP_NAME: &str = "pace";
pub const APP_AUTHOR: &str = "Pace";
pub const APP_QUALIFIER: &str = "io";
