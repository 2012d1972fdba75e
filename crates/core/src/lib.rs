pub mod config;
pub mod submission;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use submission::{Submission, NAME_MAX_LEN};
