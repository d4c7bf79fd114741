use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{Panel, PanelRequest};
use crate::input::Action;
use crate::model::NamespaceScope;
use crate::ui::{MUTED, PANEL, border_style};

#[derive(Debug, Clone)]
pub struct NamespacePanel {
    scope: NamespaceScope,
    focused: bool,
}

impl NamespacePanel {
    pub fn new(scope: NamespaceScope) -> Self {
        Self {
            scope,
            focused: false,
        }
    }

    pub fn scope(&self) -> &NamespaceScope {
        &self.scope
    }

    pub fn set_scope(&mut self, scope: NamespaceScope) {
        self.scope = scope;
    }
}

impl Panel for NamespacePanel {
    fn handle(&mut self, action: Action) -> PanelRequest {
        match action {
            Action::Enter => PanelRequest::EnterNamespaceSelection,
            _ => PanelRequest::None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled("ns ", Style::default().fg(MUTED)),
            Span::styled(
                self.scope.label(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        let block = Block::default()
            .title("Namespace")
            .borders(Borders::ALL)
            .border_style(border_style(self.focused))
            .style(Style::default().bg(PANEL));
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    #[cfg(test)]
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_dimensions(&mut self, _width: u16, _height: u16) {}

    fn captures_navigation(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::NamespacePanel;
    use crate::input::Action;
    use crate::model::NamespaceScope;
    use crate::panels::{Panel, PanelRequest};

    #[test]
    fn enter_requests_namespace_selection() {
        let mut panel = NamespacePanel::new(NamespaceScope::Named("default".to_string()));
        assert_eq!(
            panel.handle(Action::Enter),
            PanelRequest::EnterNamespaceSelection
        );
        assert_eq!(panel.handle(Action::Down), PanelRequest::None);
        assert!(!panel.captures_navigation());
    }
}
