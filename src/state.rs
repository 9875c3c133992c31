use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use crate::identifiers::BatchOutcome;
use crate::pager::{PageRequest, Pager};
use crate::player::{Player, Variant};
use crate::search::apply_filter;
use crate::selection::SelectionController;

pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Pages beyond the visible one whose identifiers are resolved ahead of time
/// after a roster load.
pub const LOOKAHEAD_PAGES: usize = 1;

const MAX_LOGS: usize = 200;
const NOTICE_KEEP: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Loading,
    Online,
    Offline,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Loading => "Loading...",
            Status::Online => "Online",
            Status::Offline => "Offline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: usize,
    pub max_page: usize,
    pub start: usize,
    pub has_more: bool,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub variant: Variant,
    pub roster: Vec<Player>,
    pub search: String,
    pub input_mode: InputMode,
    pub pager: Pager,
    pub loading: bool,
    /// Sequence number of the most recent roster request; only its answer
    /// clears `loading`.
    pub fetch_seq: u64,
    pub status: Status,
    pub last_updated: String,
    /// UI mirror of the resolver cache.
    pub identifiers: HashMap<String, String>,
    pub pending_identifiers: HashSet<String>,
    pub selection: SelectionController,
    pub cursor: usize,
    /// Entries the screen could actually draw; the cursor stays within them.
    pub entry_limit: Option<usize>,
    pub logs: VecDeque<String>,
    pub notice: Option<Notice>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl AppState {
    pub fn new(page_size: usize) -> Self {
        Self {
            variant: Variant::Current,
            roster: Vec::with_capacity(100),
            search: String::new(),
            input_mode: InputMode::Normal,
            pager: Pager::new(page_size),
            loading: true,
            fetch_seq: 0,
            status: Status::Loading,
            last_updated: String::new(),
            identifiers: HashMap::with_capacity(128),
            pending_identifiers: HashSet::new(),
            selection: SelectionController::new(),
            cursor: 0,
            entry_limit: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            notice: None,
            help_overlay: false,
        }
    }

    pub fn display_list(&self) -> Vec<&Player> {
        apply_filter(&self.roster, &self.search)
    }

    pub fn page_info(&self) -> PageInfo {
        let list = self.display_list();
        let view = self.pager.view(&list);
        PageInfo {
            page: view.page,
            max_page: view.max_page,
            start: view.start,
            has_more: view.has_more,
            total: list.len(),
        }
    }

    pub fn visible_players(&self) -> Vec<&Player> {
        let list = self.display_list();
        self.pager.view(&list).items.to_vec()
    }

    /// Returns whether the term changed; a change sends the pager back to 1.
    pub fn set_search(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if term == self.search {
            return false;
        }
        self.search = term;
        self.pager.reset();
        self.cursor = 0;
        true
    }

    pub fn push_search_char(&mut self, ch: char) -> bool {
        let mut term = self.search.clone();
        term.push(ch);
        self.set_search(term)
    }

    pub fn pop_search_char(&mut self) -> bool {
        let mut term = self.search.clone();
        if term.pop().is_none() {
            return false;
        }
        self.set_search(term)
    }

    pub fn change_page(&mut self, request: PageRequest) -> bool {
        let len = self.display_list().len();
        let moved = self.pager.change(request, len);
        if moved {
            self.cursor = 0;
        }
        moved
    }

    /// Switches the ranking metric; the old roster no longer applies.
    pub fn toggle_variant(&mut self) -> Variant {
        self.variant = self.variant.toggled();
        self.roster = Vec::new();
        self.pager.reset();
        self.cursor = 0;
        self.loading = true;
        self.variant
    }

    /// Marks a new roster request in flight and returns its sequence number.
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch_seq += 1;
        self.loading = true;
        self.fetch_seq
    }

    /// Names on the visible page (plus `lookahead_pages` after it) that are
    /// neither known nor already requested. They are marked pending.
    pub fn identifiers_to_request(&mut self, lookahead_pages: usize) -> Vec<String> {
        let names: Vec<String> = {
            let list = self.display_list();
            let view = self.pager.view(&list);
            let end = (view.start + self.pager.page_size() * (1 + lookahead_pages)).min(list.len());
            list[view.start..end]
                .iter()
                .map(|p| p.name.clone())
                .filter(|name| !name.is_empty())
                .collect()
        };

        let mut out = Vec::new();
        for name in names {
            if self.identifiers.contains_key(&name) || self.pending_identifiers.contains(&name) {
                continue;
            }
            self.pending_identifiers.insert(name.clone());
            out.push(name);
        }
        out
    }

    pub fn identifier_for(&self, name: &str) -> Option<&str> {
        self.identifiers.get(name).map(String::as_str)
    }

    /// Opens the detail view; returns the name to resolve if not cached.
    pub fn select_player(&mut self, player: Player) -> Option<String> {
        let name = player.name.clone();
        let cached = self.identifiers.get(&name).cloned();
        let needs_lookup = self.selection.select(player, cached.as_deref());
        (needs_lookup && !name.is_empty()).then_some(name)
    }

    pub fn select_visible(&mut self, index: usize) -> Option<String> {
        let player = self.visible_players().get(index).map(|p| (*p).clone())?;
        self.cursor = index;
        self.select_player(player)
    }

    pub fn select_at_cursor(&mut self) -> Option<String> {
        if self.cursor >= self.navigable() {
            return None;
        }
        self.select_visible(self.cursor)
    }

    /// Caps cursor movement to the entries that fit on screen.
    pub fn set_entry_limit(&mut self, limit: Option<usize>) {
        self.entry_limit = limit;
        self.clamp_cursor();
    }

    fn navigable(&self) -> usize {
        let visible = self.visible_players().len();
        match self.entry_limit {
            Some(limit) => visible.min(limit),
            None => visible,
        }
    }

    pub fn cursor_next(&mut self) {
        let total = self.navigable();
        if total == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor + 1) % total;
    }

    pub fn cursor_prev(&mut self) {
        let total = self.navigable();
        if total == 0 {
            self.cursor = 0;
            return;
        }
        if self.cursor == 0 {
            self.cursor = total - 1;
        } else {
            self.cursor -= 1;
        }
    }

    fn clamp_cursor(&mut self) {
        let total = self.navigable();
        if total == 0 {
            self.cursor = 0;
        } else if self.cursor >= total {
            self.cursor = total - 1;
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn notify(&mut self, kind: NoticeKind, text: impl Into<String>) {
        let text = text.into();
        let prefix = match kind {
            NoticeKind::Success => "[INFO]",
            NoticeKind::Failure => "[WARN]",
        };
        self.push_log(format!("{prefix} {text}"));
        self.notice = Some(Notice {
            kind,
            text,
            at: Instant::now(),
        });
    }

    pub fn maybe_clear_notice(&mut self, now: Instant) {
        if let Some(notice) = &self.notice
            && now.saturating_duration_since(notice.at) >= NOTICE_KEEP
        {
            self.notice = None;
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    RosterFetched {
        variant: Variant,
        seq: u64,
        players: Vec<Player>,
        fetched_at: String,
    },
    RosterFailed {
        variant: Variant,
        seq: u64,
        reason: String,
    },
    IdentifiersSettled(BatchOutcome),
    SelectionResolved {
        name: String,
        identifier: Option<String>,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchRoster { variant: Variant, seq: u64 },
    ResolveIdentifiers { names: Vec<String> },
    ResolveSelection { name: String },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::RosterFetched {
            variant,
            seq,
            players,
            fetched_at,
        } => {
            // Only the latest request may land; older ones belong to a variant
            // the user left or were superseded by a newer refresh.
            if variant != state.variant || seq != state.fetch_seq {
                state.push_log(format!(
                    "[INFO] Discarded stale {} response",
                    variant.label()
                ));
                return;
            }
            let count = players.len();
            state.roster = players;
            if !state.search.is_empty() {
                state.search.clear();
                state.pager.reset();
            }
            state.pager.clamp(count);
            state.clamp_cursor();
            state.loading = false;
            state.status = Status::Online;
            state.last_updated = fetched_at;
            state.push_log(format!("[INFO] Loaded {count} players ({})", variant.label()));
            state.notify(NoticeKind::Success, "Leaderboard updated!");
        }
        Delta::RosterFailed {
            variant,
            seq,
            reason,
        } => {
            if variant != state.variant || seq != state.fetch_seq {
                state.push_log(format!(
                    "[INFO] Discarded stale {} failure: {reason}",
                    variant.label()
                ));
                return;
            }
            state.loading = false;
            state.status = Status::Offline;
            state.last_updated = format!("Error: {reason}");
            state.push_log(format!("[WARN] Leaderboard fetch error: {reason}"));
            state.notify(NoticeKind::Failure, "Failed to update leaderboard");
        }
        Delta::IdentifiersSettled(outcome) => {
            for (name, id) in outcome.resolved {
                state.pending_identifiers.remove(&name);
                state.selection.apply_resolution(&name, Some(id.clone()));
                state.identifiers.insert(name, id);
            }
            for name in outcome.failed {
                state.pending_identifiers.remove(&name);
            }
        }
        Delta::SelectionResolved { name, identifier } => {
            if let Some(id) = &identifier {
                state.pending_identifiers.remove(&name);
                state.identifiers.insert(name.clone(), id.clone());
            } else {
                state.push_log(format!("[WARN] No identifier for {name}, using fallback"));
            }
            state.selection.apply_resolution(&name, identifier);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
