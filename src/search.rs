use crate::player::Player;

/// Case-insensitive substring filter over the ranked roster.
///
/// A blank term yields the roster untouched; matches keep their rank and
/// order.
pub fn apply_filter<'a>(roster: &'a [Player], term: &str) -> Vec<&'a Player> {
    if is_blank(term) {
        return roster.iter().collect();
    }
    let needle = term.to_lowercase();
    roster
        .iter()
        .filter(|player| player.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn is_blank(term: &str) -> bool {
    term.trim().is_empty()
}
