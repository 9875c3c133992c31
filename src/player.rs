use serde_json::Value;

use crate::error::FetchError;

/// Upstream lists are capped to this many records before ranking.
pub const ROSTER_CAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Current,
    Highest,
}

impl Variant {
    pub fn toggled(self) -> Self {
        match self {
            Variant::Current => Variant::Highest,
            Variant::Highest => Variant::Current,
        }
    }

    pub fn metric(self, player: &Player) -> u64 {
        match self {
            Variant::Current => player.winstreak,
            Variant::Highest => player.highest_winstreak,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Variant::Current => "Current Winstreaks",
            Variant::Highest => "Highest Winstreaks",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub winstreak: u64,
    pub highest_winstreak: u64,
    /// 1-based, assigned by `rank_players`; 0 until ranked.
    pub global_rank: usize,
    pub level: Option<u64>,
    pub kills: Option<u64>,
    pub deaths: Option<u64>,
    pub beds: Option<u64>,
    pub wins: Option<u64>,
    pub clan: Option<String>,
    pub kdr: Option<String>,
}

impl Player {
    pub fn new(name: impl Into<String>, winstreak: u64, highest_winstreak: u64) -> Self {
        Self {
            name: name.into(),
            winstreak,
            highest_winstreak,
            global_rank: 0,
            level: None,
            kills: None,
            deaths: None,
            beds: None,
            wins: None,
            clan: None,
            kdr: None,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Anonymous"
        } else {
            &self.name
        }
    }

    /// Upstream ratio when present, otherwise kills/deaths.
    pub fn kdr_display(&self) -> Option<String> {
        if let Some(kdr) = &self.kdr {
            return Some(kdr.clone());
        }
        match (self.kills, self.deaths) {
            (Some(kills), Some(0)) => Some(format!("{:.2}", kills as f64)),
            (Some(kills), Some(deaths)) => Some(format!("{:.2}", kills as f64 / deaths as f64)),
            _ => None,
        }
    }
}

pub fn opt_display(value: Option<u64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Parses the leaderboard payload: a JSON array of player records.
///
/// Non-object elements are dropped; missing or non-numeric metrics count as 0.
pub fn parse_roster_json(raw: &str) -> Result<Vec<Player>, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }

    let root: Value = serde_json::from_str(trimmed)?;
    let Value::Array(items) = root else {
        return Err(FetchError::Payload(
            "leaderboard payload is not a list".to_string(),
        ));
    };

    Ok(items
        .iter()
        .filter(|item| item.is_object())
        .map(parse_player)
        .collect())
}

fn parse_player(value: &Value) -> Player {
    Player {
        name: pick_string(value, &["name", "username"]).unwrap_or_default(),
        winstreak: pick_u64(value, &["winstreak"]).unwrap_or(0),
        highest_winstreak: pick_u64(value, &["highest_winstreak", "highestWinstreak"])
            .unwrap_or(0),
        global_rank: 0,
        level: pick_u64(value, &["livello", "level"]),
        kills: pick_u64(value, &["kills"]),
        deaths: pick_u64(value, &["deaths"]),
        beds: pick_u64(value, &["beds"]),
        wins: pick_u64(value, &["wins"]),
        clan: pick_string(value, &["clan"]).filter(|clan| !clan.is_empty()),
        kdr: pick_string(value, &["kdr"]).filter(|kdr| !kdr.is_empty()),
    }
}

/// Caps, sorts descending by the variant's metric and assigns ranks 1..=N.
///
/// The sort is stable, so equal metrics keep upstream order.
pub fn rank_players(mut players: Vec<Player>, variant: Variant) -> Vec<Player> {
    players.truncate(ROSTER_CAP);
    players.sort_by(|a, b| variant.metric(b).cmp(&variant.metric(a)));
    for (idx, player) in players.iter_mut().enumerate() {
        player.global_rank = idx + 1;
    }
    players
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match value.get(*key) {
            Some(Value::String(s)) => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn pick_u64(value: &Value, keys: &[&str]) -> Option<u64> {
    for key in keys {
        let Some(v) = value.get(*key) else {
            continue;
        };
        if let Some(num) = v.as_u64() {
            return Some(num);
        }
        if let Some(num) = v.as_f64() {
            return Some(if num.is_sign_negative() { 0 } else { num as u64 });
        }
        if let Some(s) = v.as_str() {
            if let Ok(num) = s.trim().parse::<u64>() {
                return Some(num);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_u64_accepts_numeric_strings_and_floats() {
        let v: Value = serde_json::json!({"a": "12", "b": 7.9, "c": -3, "d": "x"});
        assert_eq!(pick_u64(&v, &["a"]), Some(12));
        assert_eq!(pick_u64(&v, &["b"]), Some(7));
        assert_eq!(pick_u64(&v, &["c"]), Some(0));
        assert_eq!(pick_u64(&v, &["d"]), None);
        assert_eq!(pick_u64(&v, &["missing", "a"]), Some(12));
    }

    #[test]
    fn kdr_falls_back_to_kills_over_deaths() {
        let mut p = Player::new("a", 0, 0);
        assert_eq!(p.kdr_display(), None);
        p.kills = Some(30);
        p.deaths = Some(12);
        assert_eq!(p.kdr_display().as_deref(), Some("2.50"));
        p.deaths = Some(0);
        assert_eq!(p.kdr_display().as_deref(), Some("30.00"));
        p.kdr = Some("1.9".to_string());
        assert_eq!(p.kdr_display().as_deref(), Some("1.9"));
    }

    #[test]
    fn anonymous_when_name_missing() {
        let p = Player::new("", 1, 1);
        assert_eq!(p.display_name(), "Anonymous");
    }
}
