pub mod env;
mod loader;

pub use env::{
    AppConfig, ConfigError, DirectoryConfig, LoggingConfig, OpenAiConfig, ServerConfig,
    TwilioConfig,
};
pub use loader::{load_config, DEFAULT_OPENAI_MODEL, DEFAULT_OPENAI_URL, DEFAULT_TWILIO_BASE};
