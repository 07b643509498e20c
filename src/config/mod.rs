pub mod settings;

pub use settings::{current_environment, AppConfig, ConfigError};
