use std::env;
use std::time::Duration;

use crate::relay::RelayConfig;

pub const DEFAULT_CURRENT_URL: &str = "https://api.coralmc.it/api/leaderboard/bedwars/winstreak";
pub const DEFAULT_HIGHEST_URL: &str =
    "https://api.coralmc.it/api/leaderboard/bedwars/highest-winstreak";
pub const DEFAULT_PROFILE_URL: &str = "https://api.mojang.com/users/profiles/minecraft";
pub const DEFAULT_SKIN_URL: &str = "https://nmsr.nickac.dev/fullbody/{id}?scale=8";
pub const DEFAULT_RELAY_URL: &str = "https://api.allorigins.win/get";
pub const DEFAULT_RELAY_PARAM: &str = "url";
pub const DEFAULT_RELAY_FIELD: &str = "contents";

const DEFAULT_REFRESH_SECS: u64 = 300;
const MIN_REFRESH_SECS: u64 = 30;
const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_RESOLVE_BATCH: usize = 3;
const DEFAULT_RESOLVE_DELAY_MS: u64 = 500;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub current_url: String,
    pub highest_url: String,
    pub profile_url: String,
    pub skin_url: String,
    pub relay: Option<RelayConfig>,
    pub refresh_every: Duration,
    pub page_size: usize,
    pub resolve_batch: usize,
    pub resolve_delay: Duration,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            current_url: DEFAULT_CURRENT_URL.to_string(),
            highest_url: DEFAULT_HIGHEST_URL.to_string(),
            profile_url: DEFAULT_PROFILE_URL.to_string(),
            skin_url: DEFAULT_SKIN_URL.to_string(),
            relay: Some(RelayConfig {
                url: DEFAULT_RELAY_URL.to_string(),
                param: DEFAULT_RELAY_PARAM.to_string(),
                field: DEFAULT_RELAY_FIELD.to_string(),
            }),
            refresh_every: Duration::from_secs(DEFAULT_REFRESH_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            resolve_batch: DEFAULT_RESOLVE_BATCH,
            resolve_delay: Duration::from_millis(DEFAULT_RESOLVE_DELAY_MS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Reads `WS_*` variables; call after the dotenv files are loaded.
    pub fn from_env() -> Self {
        let base = Self::default();

        // An explicitly empty relay URL switches to direct calls.
        let relay = match env::var("WS_RELAY_URL") {
            Ok(raw) if raw.trim().is_empty() => None,
            Ok(raw) => Some(RelayConfig {
                url: raw.trim().to_string(),
                param: string_env_or("WS_RELAY_PARAM", DEFAULT_RELAY_PARAM),
                field: string_env_or("WS_RELAY_FIELD", DEFAULT_RELAY_FIELD),
            }),
            Err(_) => base.relay.map(|relay| RelayConfig {
                param: string_env_or("WS_RELAY_PARAM", &relay.param),
                field: string_env_or("WS_RELAY_FIELD", &relay.field),
                ..relay
            }),
        };

        Self {
            current_url: string_env_or("WS_CURRENT_URL", &base.current_url),
            highest_url: string_env_or("WS_HIGHEST_URL", &base.highest_url),
            profile_url: string_env_or("WS_PROFILE_URL", &base.profile_url),
            skin_url: string_env_or("WS_SKIN_URL", &base.skin_url),
            relay,
            refresh_every: Duration::from_secs(
                parse_env("WS_REFRESH_SECS")
                    .unwrap_or(DEFAULT_REFRESH_SECS)
                    .max(MIN_REFRESH_SECS),
            ),
            page_size: parse_env("WS_PAGE_SIZE")
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .max(1),
            resolve_batch: parse_env("WS_RESOLVE_BATCH")
                .unwrap_or(DEFAULT_RESOLVE_BATCH)
                .max(1),
            resolve_delay: Duration::from_millis(
                parse_env("WS_RESOLVE_DELAY_MS").unwrap_or(DEFAULT_RESOLVE_DELAY_MS),
            ),
            http_timeout: Duration::from_secs(
                parse_env("WS_HTTP_TIMEOUT_SECS")
                    .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
                    .max(1),
            ),
        }
    }

    pub fn skin_url(&self, identifier: &str) -> String {
        self.skin_url.replace("{id}", identifier)
    }
}

fn string_env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_upstream_constants() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.resolve_batch, 3);
        assert_eq!(cfg.resolve_delay, Duration::from_millis(500));
        assert_eq!(cfg.refresh_every, Duration::from_secs(300));
        assert!(cfg.relay.is_some());
    }

    #[test]
    fn skin_url_substitutes_identifier() {
        let cfg = AppConfig::default();
        assert_eq!(
            cfg.skin_url("abc"),
            "https://nmsr.nickac.dev/fullbody/abc?scale=8"
        );
    }
}
