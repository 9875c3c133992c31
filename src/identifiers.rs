use std::collections::{HashMap, HashSet};
use std::thread;
use std::time::Duration;

use rayon::prelude::*;
use reqwest::Url;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::FetchError;
use crate::relay::Transport;

/// Shown whenever a player's identifier is unknown or failed to resolve.
pub const FALLBACK_IDENTIFIER: &str = "c06f89064c8a49119c29ea1dbd1aab82";

/// Result of one concurrent batch inside `resolve_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub resolved: Vec<(String, String)>,
    pub failed: Vec<String>,
}

/// Name to avatar identifier lookup with a session-long, append-only cache.
///
/// Failures are never cached so a later request retries them.
pub struct IdentifierResolver {
    transport: Transport,
    profile_url: String,
    cache: HashMap<String, String>,
    batch_size: usize,
    batch_delay: Duration,
}

impl IdentifierResolver {
    pub fn new(
        transport: Transport,
        profile_url: impl Into<String>,
        batch_size: usize,
        batch_delay: Duration,
    ) -> Self {
        Self {
            transport,
            profile_url: profile_url.into(),
            cache: HashMap::with_capacity(128),
            batch_size: batch_size.max(1),
            batch_delay,
        }
    }

    pub fn from_config(transport: Transport, cfg: &AppConfig) -> Self {
        Self::new(
            transport,
            cfg.profile_url.clone(),
            cfg.resolve_batch,
            cfg.resolve_delay,
        )
    }

    pub fn cached(&self, name: &str) -> Option<&str> {
        self.cache.get(name).map(String::as_str)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Cache hit returns without touching the network.
    pub fn resolve(&mut self, name: &str) -> Option<String> {
        if let Some(hit) = self.cache.get(name) {
            return Some(hit.clone());
        }
        let id = self.lookup(name).ok()?;
        self.cache.insert(name.to_string(), id.clone());
        Some(id)
    }

    /// Resolves every uncached name in fixed-size batches. Calls within a
    /// batch run concurrently; batches run one after another with
    /// `batch_delay` between them (not after the last one).
    pub fn resolve_all<F>(&mut self, names: &[String], mut on_batch: F)
    where
        F: FnMut(BatchOutcome),
    {
        let mut seen = HashSet::new();
        let mut pending: Vec<&String> = Vec::new();
        for name in names {
            if name.is_empty() || self.cache.contains_key(name) {
                continue;
            }
            if seen.insert(name.as_str()) {
                pending.push(name);
            }
        }
        if pending.is_empty() {
            return;
        }

        let batches: Vec<&[&String]> = pending.chunks(self.batch_size).collect();
        let total = batches.len();
        for (idx, batch) in batches.into_iter().enumerate() {
            let this = &*self;
            let results: Vec<(String, Result<String, FetchError>)> = batch
                .par_iter()
                .map(|name| ((*name).clone(), this.lookup(name)))
                .collect();

            let mut outcome = BatchOutcome::default();
            for (name, result) in results {
                match result {
                    Ok(id) => {
                        self.cache.insert(name.clone(), id.clone());
                        outcome.resolved.push((name, id));
                    }
                    Err(_) => outcome.failed.push(name),
                }
            }
            on_batch(outcome);

            if idx + 1 < total && !self.batch_delay.is_zero() {
                thread::sleep(self.batch_delay);
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<String, FetchError> {
        let url = profile_lookup_url(&self.profile_url, name)?;
        let body = self.transport.fetch_body(&url)?;
        parse_profile_json(&body)
    }
}

/// Appends the player name as a single, percent-encoded path segment.
pub fn profile_lookup_url(base: &str, name: &str) -> Result<String, FetchError> {
    let mut url = Url::parse(base)
        .map_err(|err| FetchError::Transport(format!("invalid profile url: {err}")))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::Transport(format!("profile url cannot take a path: {base}")))?
        .pop_if_empty()
        .push(name);
    Ok(url.into())
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(default)]
    id: Option<String>,
}

pub fn parse_profile_json(raw: &str) -> Result<String, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(FetchError::NotFound);
    }
    let profile: ProfileResponse = serde_json::from_str(trimmed)?;
    profile
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(FetchError::NotFound)
}
