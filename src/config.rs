use std::net::SocketAddr;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid BIND_ADDR {0:?}: expected host:port")]
    BindAddr(String),

    #[error("invalid MAX_UPLOAD_MB {0:?}: expected a positive integer")]
    MaxUpload(String),
}

/// Runtime settings, read from the process environment (and `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    /// `None` when `GEMINI_API_KEY` is unset or blank.
    pub api_key: Option<String>,
    pub api_base: String,
    pub text_model: String,
    pub vision_model: String,
    pub bind_addr: SocketAddr,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_raw = non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError::BindAddr(bind_raw.clone()))?;

        let max_upload_mb = match non_empty("MAX_UPLOAD_MB") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(mb) if mb > 0 => mb,
                _ => return Err(ConfigError::MaxUpload(raw)),
            },
            None => DEFAULT_MAX_UPLOAD_MB,
        };

        Ok(Self {
            api_key: non_empty("GEMINI_API_KEY"),
            api_base: non_empty("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            text_model: non_empty("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            vision_model: non_empty("GEMINI_VISION_MODEL")
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            bind_addr,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }
}
