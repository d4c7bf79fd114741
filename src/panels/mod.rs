mod content;
mod kinds;
mod namespace;

pub use content::{ContentMode, ContentPanel};
pub use kinds::{KindPanel, KindState};
pub use namespace::NamespacePanel;

use ratatui::Frame;
use ratatui::layout::Rect;

use crate::input::Action;
use crate::model::{NamespaceScope, ResourceInfo};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PanelId {
    Namespace,
    Kinds,
    Content,
}

impl PanelId {
    pub const ORDER: [Self; 3] = [Self::Namespace, Self::Kinds, Self::Content];

    pub fn index(self) -> usize {
        match self {
            Self::Namespace => 0,
            Self::Kinds => 1,
            Self::Content => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// What a panel asks the controller to do after handling a key.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PanelRequest {
    None,
    EnterNamespaceSelection,
    CommitNamespace(NamespaceScope),
    CancelNamespaceSelection,
    KindSelected(String),
    ShowLogs(Option<ResourceInfo>),
    Describe(Option<ResourceInfo>),
    ToggleWatch,
}

pub trait Panel {
    fn handle(&mut self, action: Action) -> PanelRequest;

    fn render(&self, frame: &mut Frame, area: Rect);

    fn set_focused(&mut self, focused: bool);

    #[cfg(test)]
    fn is_focused(&self) -> bool;

    fn set_dimensions(&mut self, width: u16, height: u16);

    /// True while an inner cursor owns j/k and the arrow keys.
    fn captures_navigation(&self) -> bool;

    /// True while printable keys are typed into the panel instead of acting as shortcuts.
    fn captures_text(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::PanelId;

    #[test]
    fn cycling_visits_every_panel_once() {
        let mut seen = Vec::new();
        let mut current = PanelId::Namespace;
        for _ in 0..PanelId::ORDER.len() {
            seen.push(current);
            current = current.next();
        }
        assert_eq!(current, PanelId::Namespace);
        assert_eq!(seen, PanelId::ORDER.to_vec());
    }

    #[test]
    fn prev_wraps_to_last_panel() {
        assert_eq!(PanelId::Namespace.prev(), PanelId::Content);
        assert_eq!(PanelId::Content.prev(), PanelId::Kinds);
    }
}
