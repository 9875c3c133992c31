use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::pager::PageRequest;
use crate::state::{AppState, Delta, LOOKAHEAD_PAGES, ProviderCommand, apply_delta};

/// Turns user actions and timer ticks into state changes and provider
/// commands. The binary only translates terminal events into these calls.
pub struct Controller {
    pub state: AppState,
    config: AppConfig,
    roster_tx: Option<Sender<ProviderCommand>>,
    identifier_tx: Option<Sender<ProviderCommand>>,
    last_refresh: Instant,
}

impl Controller {
    pub fn new(
        config: AppConfig,
        roster_tx: Option<Sender<ProviderCommand>>,
        identifier_tx: Option<Sender<ProviderCommand>>,
    ) -> Self {
        Self {
            state: AppState::new(config.page_size),
            config,
            roster_tx,
            identifier_tx,
            last_refresh: Instant::now(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn last_refresh(&self) -> Instant {
        self.last_refresh
    }

    /// Initial load on startup.
    pub fn start(&mut self) {
        self.request_roster(true);
    }

    /// Applies a worker delta; a freshly loaded roster gets its visible page
    /// and the next one resolved.
    pub fn apply(&mut self, delta: Delta) {
        let roster_loaded = matches!(
            delta,
            Delta::RosterFetched { variant, seq, .. }
                if variant == self.state.variant && seq == self.state.fetch_seq
        );
        apply_delta(&mut self.state, delta);
        if roster_loaded {
            self.request_identifiers(LOOKAHEAD_PAGES);
        }
    }

    pub fn manual_refresh(&mut self) {
        if self.state.loading {
            self.state.push_log("[INFO] Refresh already in progress");
            return;
        }
        self.request_roster(true);
    }

    pub fn toggle_variant(&mut self) {
        let variant = self.state.toggle_variant();
        self.state
            .push_log(format!("[INFO] Switched to {}", variant.label()));
        self.request_roster(false);
    }

    pub fn change_page(&mut self, request: PageRequest) {
        if self.state.change_page(request) {
            self.request_identifiers(0);
        }
    }

    pub fn push_search_char(&mut self, ch: char) {
        if self.state.push_search_char(ch) {
            self.request_identifiers(0);
        }
    }

    pub fn pop_search_char(&mut self) {
        if self.state.pop_search_char() {
            self.request_identifiers(0);
        }
    }

    pub fn clear_search(&mut self) {
        if self.state.set_search(String::new()) {
            self.request_identifiers(0);
        }
    }

    pub fn select(&mut self, index: usize) {
        let name = self.state.select_visible(index);
        self.request_selection(name);
    }

    pub fn select_at_cursor(&mut self) {
        let name = self.state.select_at_cursor();
        self.request_selection(name);
    }

    /// Periodic refresh, measured from the last roster request of any kind.
    pub fn maybe_refresh_roster(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_refresh) >= self.refresh_every() {
            self.request_roster(false);
        }
    }

    fn refresh_every(&self) -> Duration {
        self.config.refresh_every
    }

    fn request_roster(&mut self, announce: bool) {
        self.last_refresh = Instant::now();
        let Some(tx) = &self.roster_tx else {
            if announce {
                self.state.push_log("[INFO] Leaderboard fetch unavailable");
            }
            return;
        };
        let variant = self.state.variant;
        let seq = self.state.fetch_seq + 1;
        if tx.send(ProviderCommand::FetchRoster { variant, seq }).is_err() {
            self.state.push_log("[WARN] Leaderboard request failed");
            return;
        }
        self.state.begin_fetch();
        if announce {
            self.state
                .push_log(format!("[INFO] Fetching {}", variant.label()));
        }
    }

    fn request_identifiers(&mut self, lookahead_pages: usize) {
        let names = self.state.identifiers_to_request(lookahead_pages);
        if names.is_empty() {
            return;
        }
        let sent = self.identifier_tx.as_ref().is_some_and(|tx| {
            tx.send(ProviderCommand::ResolveIdentifiers {
                names: names.clone(),
            })
            .is_ok()
        });
        if !sent {
            for name in &names {
                self.state.pending_identifiers.remove(name);
            }
            self.state.push_log("[WARN] Identifier request failed");
        }
    }

    fn request_selection(&mut self, name: Option<String>) {
        let Some(name) = name else {
            return;
        };
        let sent = self
            .identifier_tx
            .as_ref()
            .is_some_and(|tx| tx.send(ProviderCommand::ResolveSelection { name }).is_ok());
        if !sent {
            self.state
                .push_log("[WARN] Identifier lookup unavailable, showing fallback");
        }
    }
}
