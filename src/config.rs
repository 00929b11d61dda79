//! Board configuration parsed from environment variables.

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SYNC_RETRIES: usize = 0;
pub const DEFAULT_SYNC_RETRY_BASE_MS: u64 = 200;

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The persistence base URL is not an http(s) URL.
    #[error("invalid {var}: {value} (expected http:// or https://)")]
    InvalidUrl { var: &'static str, value: String },

    /// A numeric setting could not be parsed.
    #[error("invalid {var}: {value} is not a non-negative integer")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Retry policy for persistence calls. Zero retries sends each call once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: usize,
    /// Linear back-off step: attempt `n` waits `n * base_ms` before retrying.
    pub base_ms: u64,
}

impl RetryPolicy {
    #[must_use]
    pub fn none() -> Self {
        Self { retries: 0, base_ms: DEFAULT_SYNC_RETRY_BASE_MS }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Persistence service base URL, without trailing slash.
    pub api_url: String,
    pub auth_token: Option<String>,
    pub timeouts: HttpTimeouts,
    pub retry: RetryPolicy,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            timeouts: HttpTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            retry: RetryPolicy::none(),
        }
    }
}

impl BoardConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `DAILYBOARD_API_URL`: default `http://localhost:8080`
    /// - `DAILYBOARD_AUTH_TOKEN`: bearer token for the persistence service
    /// - `DAILYBOARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `DAILYBOARD_CONNECT_TIMEOUT_SECS`: default 10
    /// - `DAILYBOARD_SYNC_RETRIES`: default 0
    /// - `DAILYBOARD_SYNC_RETRY_BASE_MS`: default 200
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not http(s) or a number does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`BoardConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = parse_url("DAILYBOARD_API_URL", lookup("DAILYBOARD_API_URL"))?;
        let auth_token = lookup("DAILYBOARD_AUTH_TOKEN").filter(|t| !t.trim().is_empty());
        let timeouts = HttpTimeouts {
            request_secs: parse_number(
                "DAILYBOARD_REQUEST_TIMEOUT_SECS",
                lookup("DAILYBOARD_REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            connect_secs: parse_number(
                "DAILYBOARD_CONNECT_TIMEOUT_SECS",
                lookup("DAILYBOARD_CONNECT_TIMEOUT_SECS"),
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
        };
        let retry = RetryPolicy {
            retries: parse_number("DAILYBOARD_SYNC_RETRIES", lookup("DAILYBOARD_SYNC_RETRIES"), DEFAULT_SYNC_RETRIES)?,
            base_ms: parse_number(
                "DAILYBOARD_SYNC_RETRY_BASE_MS",
                lookup("DAILYBOARD_SYNC_RETRY_BASE_MS"),
                DEFAULT_SYNC_RETRY_BASE_MS,
            )?,
        };

        Ok(Self { api_url, auth_token, timeouts, retry })
    }
}

fn parse_url(var: &'static str, raw: Option<String>) -> Result<String, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_API_URL.to_string());
    };
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl { var, value: raw });
    }
    Ok(trimmed.to_string())
}

fn parse_number<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber { var, value: raw })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
