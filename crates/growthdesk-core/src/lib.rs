pub mod config;
pub mod error;
pub mod format;
pub mod input;
pub mod plans;
pub mod projection;
pub mod scoring;

pub use config::{
    ConfigManager, CrmConfig, EmailConfig, LoggingConfig, PaymentsConfig, SecretsConfig,
    ServerConfig, Settings,
};
pub use error::*;
pub use format::*;
pub use input::*;
pub use plans::*;
pub use projection::*;
pub use scoring::*;
