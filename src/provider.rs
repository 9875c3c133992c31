use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use chrono::Local;

use crate::identifiers::{BatchOutcome, IdentifierResolver};
use crate::roster_fetch::RosterFetcher;
use crate::state::{Delta, ProviderCommand};

/// Runs roster fetches off the UI thread, one at a time, until the command
/// channel closes.
pub fn spawn_roster_worker(
    fetcher: RosterFetcher,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for cmd in cmd_rx {
            let mut emit = |delta| {
                let _ = tx.send(delta);
            };
            handle_roster_command(&fetcher, cmd, &mut emit);
        }
    })
}

/// Owns the resolver, and with it the authoritative identifier cache.
pub fn spawn_identifier_worker(
    mut resolver: IdentifierResolver,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for cmd in cmd_rx {
            let mut emit = |delta| {
                let _ = tx.send(delta);
            };
            handle_identifier_command(&mut resolver, cmd, &mut emit);
        }
    })
}

pub fn handle_roster_command<F>(fetcher: &RosterFetcher, cmd: ProviderCommand, emit: &mut F)
where
    F: FnMut(Delta),
{
    match cmd {
        ProviderCommand::FetchRoster { variant, seq } => match fetcher.fetch(variant) {
            Ok(players) => emit(Delta::RosterFetched {
                variant,
                seq,
                players,
                fetched_at: Local::now().format("%H:%M:%S").to_string(),
            }),
            Err(err) => emit(Delta::RosterFailed {
                variant,
                seq,
                reason: err.to_string(),
            }),
        },
        other => emit(Delta::Log(format!(
            "[WARN] Roster worker ignored {other:?}"
        ))),
    }
}

pub fn handle_identifier_command<F>(
    resolver: &mut IdentifierResolver,
    cmd: ProviderCommand,
    emit: &mut F,
) where
    F: FnMut(Delta),
{
    match cmd {
        ProviderCommand::ResolveIdentifiers { names } => {
            // Hits are echoed back so the UI can clear its pending marks.
            let hits: Vec<(String, String)> = names
                .iter()
                .filter_map(|name| {
                    resolver
                        .cached(name)
                        .map(|id| (name.clone(), id.to_string()))
                })
                .collect();
            if !hits.is_empty() {
                emit(Delta::IdentifiersSettled(BatchOutcome {
                    resolved: hits,
                    failed: Vec::new(),
                }));
            }
            resolver.resolve_all(&names, |outcome| {
                emit(Delta::IdentifiersSettled(outcome));
            });
        }
        ProviderCommand::ResolveSelection { name } => {
            let identifier = resolver.resolve(&name);
            emit(Delta::SelectionResolved { name, identifier });
        }
        other => emit(Delta::Log(format!(
            "[WARN] Identifier worker ignored {other:?}"
        ))),
    }
}
