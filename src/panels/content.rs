use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::{Panel, PanelRequest};
use crate::input::{Action, motion};
use crate::list::SelectList;
use crate::model::{NamespaceScope, ResourceInfo};
use crate::table::ResourceTable;
use crate::ui::{ACCENT, MUTED, PANEL, border_style};
use crate::viewport::visible_rows;

const SELECTION_CHROME: u16 = 3;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ContentMode {
    Welcome,
    NamespaceSelection,
    Resources,
}

#[derive(Debug, Clone)]
pub struct ContentPanel {
    mode: ContentMode,
    namespaces: SelectList,
    choices: Vec<NamespaceScope>,
    table: ResourceTable,
    has_dataset: bool,
    focused: bool,
}

impl Default for ContentPanel {
    fn default() -> Self {
        Self {
            mode: ContentMode::Welcome,
            namespaces: SelectList::default(),
            choices: Vec::new(),
            table: ResourceTable::default(),
            has_dataset: false,
            focused: false,
        }
    }
}

impl ContentPanel {
    pub fn mode(&self) -> ContentMode {
        self.mode
    }

    pub fn table(&self) -> &ResourceTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut ResourceTable {
        &mut self.table
    }

    #[cfg(test)]
    pub fn namespace_choices(&self) -> &[String] {
        self.namespaces.items()
    }

    pub fn enter_namespace_selection(&mut self, namespaces: Vec<String>, current: &NamespaceScope) {
        self.choices = std::iter::once(NamespaceScope::All)
            .chain(namespaces.into_iter().map(NamespaceScope::Named))
            .collect();
        self.namespaces
            .set_items(self.choices.iter().map(NamespaceScope::label).collect());
        if let Some(index) = self.choices.iter().position(|choice| choice == current) {
            self.namespaces.select(index);
        }
        self.mode = ContentMode::NamespaceSelection;
    }

    pub fn leave_namespace_selection(&mut self) {
        if self.mode != ContentMode::NamespaceSelection {
            return;
        }
        self.mode = if self.has_dataset {
            ContentMode::Resources
        } else {
            ContentMode::Welcome
        };
    }

    pub fn set_resources(&mut self, title: String, items: Vec<ResourceInfo>) {
        self.table.set_resources(title, items);
        self.has_dataset = true;
        self.mode = ContentMode::Resources;
    }

    pub fn update_resources_only(&mut self, title: String, items: Vec<ResourceInfo>) {
        self.table.update_resources_only(title, items);
    }

    fn active_selection(&self) -> Option<ResourceInfo> {
        if !self.table.is_active() {
            return None;
        }
        self.table.selected_resource().cloned()
    }

    fn handle_selection(&mut self, action: Action) -> PanelRequest {
        match action {
            Action::Enter => self
                .choices
                .get(self.namespaces.selected_index())
                .cloned()
                .map(PanelRequest::CommitNamespace)
                .unwrap_or(PanelRequest::None),
            Action::Escape => PanelRequest::CancelNamespaceSelection,
            other => {
                if let Some(motion) = motion(other) {
                    self.namespaces.apply(motion);
                }
                PanelRequest::None
            }
        }
    }

    fn handle_table(&mut self, action: Action) -> PanelRequest {
        match action {
            Action::ShowLogs => return PanelRequest::ShowLogs(self.active_selection()),
            Action::Describe => return PanelRequest::Describe(self.active_selection()),
            Action::ToggleWatch => return PanelRequest::ToggleWatch,
            _ => {}
        }

        if !self.table.is_active() {
            if action == Action::Enter {
                self.table.set_active(true);
            }
            return PanelRequest::None;
        }

        match action {
            Action::Enter | Action::Escape => self.table.set_active(false),
            other => {
                if let Some(motion) = motion(other) {
                    self.table.apply(motion);
                }
            }
        }
        PanelRequest::None
    }

    fn render_welcome(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(""),
            Line::styled(
                "k u b e p a n e",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Line::from(""),
            Line::styled(
                "Press Enter on the Namespace panel to pick a namespace.",
                Style::default().fg(Color::White),
            ),
            Line::styled(
                "Press Enter on Resources, then Enter on a kind to list it.",
                Style::default().fg(Color::White),
            ),
            Line::from(""),
            Line::styled(
                "j/k switch panels  ctrl+q quit",
                Style::default().fg(MUTED),
            ),
        ];
        let block = Block::default()
            .title("Welcome")
            .borders(Borders::ALL)
            .border_style(border_style(self.focused))
            .style(Style::default().bg(PANEL));
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
    }

    fn render_selection(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!("Select Namespace ({})", self.namespaces.items().len()))
            .borders(Borders::ALL)
            .border_style(border_style(self.focused))
            .style(Style::default().bg(PANEL));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);
        frame.render_widget(Paragraph::new(self.namespaces.render_lines(true)), chunks[0]);
        frame.render_widget(
            Paragraph::new("Enter select  Esc cancel").style(Style::default().fg(MUTED)),
            chunks[1],
        );
    }
}

impl Panel for ContentPanel {
    fn handle(&mut self, action: Action) -> PanelRequest {
        match self.mode {
            ContentMode::Welcome => PanelRequest::None,
            ContentMode::NamespaceSelection => self.handle_selection(action),
            ContentMode::Resources => self.handle_table(action),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        match self.mode {
            ContentMode::Welcome => self.render_welcome(frame, area),
            ContentMode::NamespaceSelection => self.render_selection(frame, area),
            ContentMode::Resources => self.table.render(frame, area, self.focused),
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    #[cfg(test)]
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_dimensions(&mut self, width: u16, height: u16) {
        self.table.set_dimensions(width, height);
        self.namespaces
            .set_visible_rows(visible_rows(height, SELECTION_CHROME));
    }

    fn captures_navigation(&self) -> bool {
        match self.mode {
            ContentMode::Welcome => false,
            ContentMode::NamespaceSelection => true,
            ContentMode::Resources => self.table.is_active(),
        }
    }
}
