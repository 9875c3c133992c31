#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use winstreak_board::error::FetchError;
use winstreak_board::http_client::HttpGet;
use winstreak_board::player::Player;

type Responder = Box<dyn Fn(&str) -> Result<(u16, String), FetchError> + Send + Sync>;

/// Scripted transport recording every URL it is asked for.
pub struct FakeHttp {
    responder: Responder,
    pub urls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeHttp {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&str) -> Result<(u16, String), FetchError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            urls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().expect("urls lock").len()
    }

    pub fn calls_matching(&self, needle: &str) -> usize {
        self.urls
            .lock()
            .expect("urls lock")
            .iter()
            .filter(|url| url.contains(needle))
            .count()
    }
}

impl HttpGet for FakeHttp {
    fn get_text(&self, url: &str) -> Result<(u16, String), FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.urls.lock().expect("urls lock").push(url.to_string());
        let out = (self.responder)(url);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        out
    }
}

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// Profile lookups answer with `id-<name>`; names starting with `ghost` are
/// unknown upstream.
pub fn profile_responder(url: &str) -> Result<(u16, String), FetchError> {
    let name = url.rsplit('/').next().unwrap_or_default();
    if name.starts_with("ghost") {
        return Ok((204, String::new()));
    }
    Ok((200, format!(r#"{{"id":"id-{name}","name":"{name}"}}"#)))
}

pub fn ranked(names_and_streaks: &[(&str, u64)]) -> Vec<Player> {
    names_and_streaks
        .iter()
        .enumerate()
        .map(|(idx, (name, ws))| {
            let mut p = Player::new(*name, *ws, *ws);
            p.global_rank = idx + 1;
            p
        })
        .collect()
}
