use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{Panel, PanelRequest};
use crate::input::{Action, motion};
use crate::list::SelectList;
use crate::ui::{ACCENT, MUTED, PANEL, border_style};
use crate::viewport::visible_rows;

// Borders plus the search line.
const KIND_CHROME: u16 = 3;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KindState {
    Browsing,
    ListActive,
    Searching,
}

#[derive(Debug, Clone)]
pub struct KindPanel {
    kinds: Vec<String>,
    query: String,
    list: SelectList,
    state: KindState,
    focused: bool,
}

impl Default for KindPanel {
    fn default() -> Self {
        Self {
            kinds: Vec::new(),
            query: String::new(),
            list: SelectList::default(),
            state: KindState::Browsing,
            focused: false,
        }
    }
}

impl KindPanel {
    pub fn set_kinds(&mut self, kinds: Vec<String>) {
        self.kinds = kinds;
        self.refilter();
    }

    pub fn state(&self) -> KindState {
        self.state
    }

    #[cfg(test)]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[cfg(test)]
    pub fn visible_kinds(&self) -> &[String] {
        self.list.items()
    }

    #[cfg(test)]
    pub fn selected_kind(&self) -> Option<&str> {
        self.list.selected_item()
    }

    fn refilter(&mut self) {
        let query = self.query.to_lowercase();
        let filtered = self
            .kinds
            .iter()
            .filter(|kind| query.is_empty() || kind.to_lowercase().contains(&query))
            .cloned()
            .collect();
        self.list.set_items(filtered);
    }

    fn select_current(&self) -> PanelRequest {
        match self.list.selected_item() {
            Some(kind) => PanelRequest::KindSelected(kind.to_string()),
            None => PanelRequest::None,
        }
    }

    fn handle_list(&mut self, action: Action) -> PanelRequest {
        match action {
            Action::Escape => {
                self.state = KindState::Browsing;
                PanelRequest::None
            }
            Action::Char('/') => {
                self.state = KindState::Searching;
                self.query.clear();
                PanelRequest::None
            }
            Action::Enter => self.select_current(),
            other => {
                if let Some(motion) = motion(other) {
                    self.list.apply(motion);
                }
                PanelRequest::None
            }
        }
    }

    // Cursor keys are ignored while the query is being typed.
    fn handle_search(&mut self, action: Action) -> PanelRequest {
        match action {
            Action::Escape => {
                self.state = KindState::ListActive;
                self.query.clear();
                self.refilter();
                PanelRequest::None
            }
            Action::Backspace => {
                self.query.pop();
                self.refilter();
                PanelRequest::None
            }
            Action::Enter => self.select_current(),
            Action::Char(c) => {
                self.query.push(c);
                self.refilter();
                PanelRequest::None
            }
            _ => PanelRequest::None,
        }
    }
}

impl Panel for KindPanel {
    fn handle(&mut self, action: Action) -> PanelRequest {
        match self.state {
            KindState::Browsing => {
                if action == Action::Enter {
                    self.state = KindState::ListActive;
                }
                PanelRequest::None
            }
            KindState::ListActive => self.handle_list(action),
            KindState::Searching => self.handle_search(action),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!("Resources ({})", self.kinds.len()))
            .borders(Borders::ALL)
            .border_style(border_style(self.focused))
            .style(Style::default().bg(PANEL));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        if self.kinds.is_empty() {
            frame.render_widget(
                Paragraph::new("No resource kinds loaded").style(Style::default().fg(MUTED)),
                chunks[0],
            );
        } else {
            let highlight = self.state != KindState::Browsing;
            frame.render_widget(Paragraph::new(self.list.render_lines(highlight)), chunks[0]);
        }

        let search = match self.state {
            KindState::Searching => {
                Paragraph::new(Line::from(format!("/{}_", self.query)))
                    .style(Style::default().fg(ACCENT))
            }
            _ => Paragraph::new(format!("{} shown", self.list.items().len()))
                .style(Style::default().fg(MUTED)),
        };
        frame.render_widget(search, chunks[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    #[cfg(test)]
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_dimensions(&mut self, _width: u16, height: u16) {
        self.list.set_visible_rows(visible_rows(height, KIND_CHROME));
    }

    fn captures_navigation(&self) -> bool {
        self.state != KindState::Browsing
    }

    fn captures_text(&self) -> bool {
        self.state == KindState::Searching
    }
}
