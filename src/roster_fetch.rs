use crate::config::AppConfig;
use crate::error::FetchError;
use crate::player::{Player, Variant, parse_roster_json, rank_players};
use crate::relay::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEndpoints {
    pub current: String,
    pub highest: String,
}

impl RosterEndpoints {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            current: cfg.current_url.clone(),
            highest: cfg.highest_url.clone(),
        }
    }

    pub fn url_for(&self, variant: Variant) -> &str {
        match variant {
            Variant::Current => &self.current,
            Variant::Highest => &self.highest,
        }
    }
}

#[derive(Clone)]
pub struct RosterFetcher {
    transport: Transport,
    endpoints: RosterEndpoints,
}

impl RosterFetcher {
    pub fn new(transport: Transport, endpoints: RosterEndpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// Fetches and ranks one variant. The result always fully replaces the
    /// previous roster.
    pub fn fetch(&self, variant: Variant) -> Result<Vec<Player>, FetchError> {
        let body = self.transport.fetch_body(self.endpoints.url_for(variant))?;
        let players = parse_roster_json(&body)?;
        Ok(rank_players(players, variant))
    }
}
