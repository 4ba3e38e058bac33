use std::{env, net::SocketAddr, time::Duration};

use super::env::{
    AppConfig, ConfigError, DirectoryConfig, LoggingConfig, OpenAiConfig, ServerConfig,
    TwilioConfig,
};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_TWILIO_BASE: &str = "https://api.twilio.com";

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = match env::var("BIND_ADDR") {
            Ok(value) => value
                .parse::<SocketAddr>()
                .map_err(|_| ConfigError::Invalid {
                    key: "BIND_ADDR",
                    value,
                })?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let openai = OpenAiConfig {
            api_key: env::var("OPENAI_API_KEY").ok().filter(|v| !v.is_empty()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            api_url: env::var("OPENAI_API_URL").unwrap_or_else(|_| DEFAULT_OPENAI_URL.to_string()),
            timeout: Duration::from_millis(parse_millis("OPENAI_TIMEOUT_MS", 15_000)?),
        };

        let twilio = TwilioConfig {
            account_sid: required("TWILIO_ACCOUNT_SID")?,
            auth_token: required("TWILIO_AUTH_TOKEN")?,
            from_number: required("TWILIO_FROM_NUMBER")?,
            api_base: env::var("TWILIO_API_BASE")
                .unwrap_or_else(|_| DEFAULT_TWILIO_BASE.to_string()),
            timeout: Duration::from_millis(parse_millis("TWILIO_TIMEOUT_MS", 10_000)?),
        };

        let directories = DirectoryConfig {
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            store_filename: env::var("STORE_FILENAME")
                .unwrap_or_else(|_| "data.json".to_string()),
            whitelist_filename: env::var("WHITELIST_FILENAME")
                .unwrap_or_else(|_| "whitelist.json".to_string()),
            blacklist_filename: env::var("BLACKLIST_FILENAME")
                .unwrap_or_else(|_| "blacklist.json".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        Ok(Self {
            server: ServerConfig { bind_addr },
            openai,
            twilio,
            directories,
            logging,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parse_millis(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}
