//! Client configuration loaded from the environment.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use url::Url;

use crate::application::RatingRange;

pub const DEFAULT_API_URL: &str = "https://api.faforever.com";
pub const DEFAULT_SERVER_URL: &str = "wss://ws.faforever.com";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_MAX_CONCURRENT_TASKS: usize = 8;

/// Which set of adapters the process runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    /// Talk to the lobby API and lobby server.
    #[default]
    Online,
    /// No network; queries are empty and league entries are synthetic.
    Offline,
}

impl FromStr for Profile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            other => Err(anyhow!(
                "Unknown profile '{}', expected 'online' or 'offline'",
                other
            )),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Bounds and initial selection of the rating slider in the host-game form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingConfig {
    pub min: i32,
    pub max: i32,
    pub selected_min: i32,
    pub selected_max: i32,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            min: 0,
            max: 3000,
            selected_min: 0,
            selected_max: 3000,
        }
    }
}

impl RatingConfig {
    pub fn to_range(self) -> RatingRange {
        RatingRange::new(self.min, self.max, self.selected_min, self.selected_max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub profile: Profile,
    pub api_url: Url,
    pub server_url: Url,
    pub request_timeout_ms: u64,
    pub max_concurrent_tasks: usize,
    pub rating: RatingConfig,
}

impl ClientConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = RatingConfig::default();

        let profile = match value("LOBBY_PROFILE") {
            Some(profile) => profile.parse::<Profile>().context("Invalid LOBBY_PROFILE")?,
            None => Profile::default(),
        };
        let api_url = parse_url(value("LOBBY_API_URL"), DEFAULT_API_URL, "LOBBY_API_URL")?;
        let server_url = parse_url(
            value("LOBBY_SERVER_URL"),
            DEFAULT_SERVER_URL,
            "LOBBY_SERVER_URL",
        )?;

        let config = Self {
            profile,
            api_url,
            server_url,
            request_timeout_ms: parse_or(
                value("LOBBY_REQUEST_TIMEOUT_MS"),
                DEFAULT_REQUEST_TIMEOUT_MS,
                "LOBBY_REQUEST_TIMEOUT_MS",
            )?,
            max_concurrent_tasks: parse_or(
                value("LOBBY_MAX_CONCURRENT_TASKS"),
                DEFAULT_MAX_CONCURRENT_TASKS,
                "LOBBY_MAX_CONCURRENT_TASKS",
            )?,
            rating: RatingConfig {
                min: parse_or(value("LOBBY_RATING_MIN"), defaults.min, "LOBBY_RATING_MIN")?,
                max: parse_or(value("LOBBY_RATING_MAX"), defaults.max, "LOBBY_RATING_MAX")?,
                selected_min: parse_or(
                    value("LOBBY_RATING_SELECTED_MIN"),
                    defaults.selected_min,
                    "LOBBY_RATING_SELECTED_MIN",
                )?,
                selected_max: parse_or(
                    value("LOBBY_RATING_SELECTED_MAX"),
                    defaults.selected_max,
                    "LOBBY_RATING_SELECTED_MAX",
                )?,
            },
        };

        if config.rating.min > config.rating.max {
            anyhow::bail!(
                "LOBBY_RATING_MIN ({}) is greater than LOBBY_RATING_MAX ({})",
                config.rating.min,
                config.rating.max
            );
        }

        Ok(config)
    }
}

fn parse_or<T>(raw: Option<String>, default: T, key: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid {}: '{}'", key, raw)),
        None => Ok(default),
    }
}

fn parse_url(raw: Option<String>, default: &str, key: &str) -> anyhow::Result<Url> {
    let raw = raw.unwrap_or_else(|| default.to_string());
    Url::parse(&raw).with_context(|| format!("Invalid {}: '{}'", key, raw))
}

/// Load `.env.local` then `.env` from `dir`, if present.
///
/// Variables already set in the environment win.
pub fn load_dotenv(dir: &Path) {
    for filename in [".env.local", ".env"] {
        let path = dir.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
