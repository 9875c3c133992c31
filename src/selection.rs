use crate::identifiers::FALLBACK_IDENTIFIER;
use crate::player::Player;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub player: Player,
    pub identifier: String,
    pub resolved: bool,
}

/// Tracks the single player under inspection in the detail view.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    current: Option<Selection>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Opens the detail view right away. With a cached identifier it is used
    /// directly; otherwise the fallback shows until a resolution arrives.
    /// Returns true when the caller should request a resolution.
    pub fn select(&mut self, player: Player, cached: Option<&str>) -> bool {
        let (identifier, resolved) = match cached {
            Some(id) => (id.to_string(), true),
            None => (FALLBACK_IDENTIFIER.to_string(), false),
        };
        self.current = Some(Selection {
            player,
            identifier,
            resolved,
        });
        !resolved
    }

    /// Late results for a player no longer selected are ignored; a failed
    /// resolution keeps the fallback and the view stays open.
    pub fn apply_resolution(&mut self, name: &str, identifier: Option<String>) {
        let Some(selection) = self.current.as_mut() else {
            return;
        };
        if selection.player.name != name {
            return;
        }
        if let Some(id) = identifier {
            selection.identifier = id;
            selection.resolved = true;
        }
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn on_escape(&mut self) {
        self.close();
    }

    pub fn on_outside_click(&mut self) {
        self.close();
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Selection> {
        self.current.as_ref()
    }
}
