use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::AppCommand;
use crate::input::Motion;
use crate::model::ResourceRef;
use crate::ui::{ACCENT, ERROR, MUTED, PANEL, SELECTED_BG, WARN, centered_fixed};
use crate::viewport::{ScrollOffset, visible_rows};

const DIALOG_WIDTH: u16 = 60;
const DIALOG_HEIGHT: u16 = 10;
// Borders plus the position/help line.
const VIEWER_CHROME: u16 = 3;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DialogKind {
    Error,
    Warning,
    Info,
}

impl DialogKind {
    fn color(self) -> Color {
        match self {
            Self::Error => ERROR,
            Self::Warning => WARN,
            Self::Info => Color::Rgb(96, 165, 250),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DialogButton {
    pub label: String,
    pub command: AppCommand,
}

/// Blocking message box. Each button carries the command it triggers.
#[derive(Debug, Clone)]
pub struct Dialog {
    kind: DialogKind,
    title: String,
    message: String,
    buttons: Vec<DialogButton>,
    selected: usize,
}

impl Dialog {
    pub fn new(kind: DialogKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            buttons: vec![DialogButton {
                label: "OK".to_string(),
                command: AppCommand::None,
            }],
            selected: 0,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Error, title, message)
    }

    pub fn confirm(
        title: impl Into<String>,
        message: impl Into<String>,
        confirm_label: impl Into<String>,
        command: AppCommand,
    ) -> Self {
        Self {
            kind: DialogKind::Warning,
            title: title.into(),
            message: message.into(),
            buttons: vec![
                DialogButton {
                    label: confirm_label.into(),
                    command,
                },
                DialogButton {
                    label: "Cancel".to_string(),
                    command: AppCommand::None,
                },
            ],
            selected: 0,
        }
    }

    #[cfg(test)]
    pub fn kind(&self) -> DialogKind {
        self.kind
    }

    #[cfg(test)]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[cfg(test)]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[cfg(test)]
    pub fn buttons(&self) -> &[DialogButton] {
        &self.buttons
    }

    #[cfg(test)]
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn next_button(&mut self) {
        if !self.buttons.is_empty() {
            self.selected = (self.selected + 1) % self.buttons.len();
        }
    }

    pub fn prev_button(&mut self) {
        if !self.buttons.is_empty() {
            self.selected = (self.selected + self.buttons.len() - 1) % self.buttons.len();
        }
    }

    pub fn activate(&self) -> AppCommand {
        self.buttons
            .get(self.selected)
            .map(|button| button.command.clone())
            .unwrap_or(AppCommand::None)
    }

    pub fn render(&self, frame: &mut Frame, screen: Rect) {
        let area = centered_fixed(DIALOG_WIDTH, DIALOG_HEIGHT, screen);
        frame.render_widget(Clear, area);

        let color = self.kind.color();
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(PANEL));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);
        frame.render_widget(
            Paragraph::new(self.message.as_str())
                .wrap(Wrap { trim: false })
                .style(Style::default().fg(Color::White)),
            chunks[0],
        );

        let mut spans = Vec::new();
        for (index, button) in self.buttons.iter().enumerate() {
            if index > 0 {
                spans.push(Span::raw("  "));
            }
            let style = if index == self.selected {
                Style::default()
                    .fg(color)
                    .bg(SELECTED_BG)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            };
            spans.push(Span::styled(format!("[ {} ]", button.label), style));
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
            chunks[1],
        );
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ViewerKind {
    Logs,
    Describe(ResourceRef),
}

/// Scrollable read-only text shown above the panels.
#[derive(Debug, Clone)]
pub struct TextViewer {
    kind: ViewerKind,
    title: String,
    lines: Vec<String>,
    scroll: ScrollOffset,
    rows: usize,
}

impl TextViewer {
    pub fn logs(title: String, body: &str, screen: Rect) -> Self {
        let mut viewer = Self::new(ViewerKind::Logs, title, body, screen);
        viewer.apply(Motion::Bottom);
        viewer
    }

    pub fn describe(target: ResourceRef, title: String, body: &str, screen: Rect) -> Self {
        Self::new(ViewerKind::Describe(target), title, body, screen)
    }

    fn new(kind: ViewerKind, title: String, body: &str, screen: Rect) -> Self {
        let mut viewer = Self {
            kind,
            title,
            lines: body.lines().map(str::to_string).collect(),
            scroll: ScrollOffset::default(),
            rows: 1,
        };
        viewer.set_dimensions(screen.width, screen.height);
        viewer
    }

    #[cfg(test)]
    pub fn kind(&self) -> &ViewerKind {
        &self.kind
    }

    #[cfg(test)]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[cfg(test)]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[cfg(test)]
    pub fn offset(&self) -> usize {
        self.scroll.offset()
    }

    #[cfg(test)]
    pub fn visible_rows(&self) -> usize {
        self.rows
    }

    pub fn describe_target(&self) -> Option<&ResourceRef> {
        match &self.kind {
            ViewerKind::Describe(target) => Some(target),
            ViewerKind::Logs => None,
        }
    }

    pub fn set_dimensions(&mut self, width: u16, height: u16) {
        let area = viewer_area(Rect::new(0, 0, width, height));
        self.rows = visible_rows(area.height, VIEWER_CHROME);
        self.scroll.clamp(self.lines.len(), self.rows);
    }

    pub fn apply(&mut self, motion: Motion) {
        self.scroll.apply(motion, self.lines.len(), self.rows);
    }

    pub fn render(&self, frame: &mut Frame, screen: Rect) {
        let area = viewer_area(screen);
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .style(Style::default().bg(PANEL));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let range = self.scroll.bounds(self.lines.len(), self.rows);
        let visible = self.lines[range.clone()].iter().map(|line| match self.kind {
            ViewerKind::Logs => Line::from(line.clone()),
            ViewerKind::Describe(_) => highlight_yaml_line(line),
        });
        frame.render_widget(
            Paragraph::new(visible.collect::<Vec<_>>()).style(Style::default().fg(Color::White)),
            chunks[0],
        );

        let position = if self.lines.is_empty() {
            "No lines".to_string()
        } else {
            format!("Lines {}-{} of {}", range.start + 1, range.end, self.lines.len())
        };
        let mut help = "↑/↓ scroll  PgUp/PgDn page  Home/End top/bottom  q/Esc close".to_string();
        if self.describe_target().is_some() {
            help.push_str("  ctrl+e edit");
        }
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(position, Style::default().fg(ACCENT)),
                Span::raw("  "),
                Span::styled(help, Style::default().fg(MUTED)),
            ])),
            chunks[1],
        );
    }
}

pub fn viewer_area(screen: Rect) -> Rect {
    let width = (screen.width.saturating_mul(9) / 10).max(20).min(screen.width);
    let height = (screen.height.saturating_mul(17) / 20).max(6).min(screen.height);
    centered_fixed(width, height, screen)
}

fn highlight_yaml_line(line: &str) -> Line<'static> {
    let indent_len = line.len() - line.trim_start_matches([' ', '-']).len();
    let (indent, content) = line.split_at(indent_len);
    let mut spans = vec![Span::styled(indent.to_string(), Style::default().fg(ACCENT))];

    match content.split_once(':') {
        Some((key, value)) if !key.is_empty() && !key.contains(' ') => {
            spans.push(Span::styled(
                key.to_string(),
                Style::default().fg(Color::Rgb(103, 232, 249)),
            ));
            spans.push(Span::styled(":", Style::default().fg(MUTED)));
            if !value.trim().is_empty() {
                spans.push(Span::styled(
                    value.to_string(),
                    Style::default().fg(yaml_value_color(value.trim())),
                ));
            }
        }
        _ => spans.push(Span::raw(content.to_string())),
    }
    Line::from(spans)
}

fn yaml_value_color(value: &str) -> Color {
    if matches!(value, "true" | "false" | "null" | "~") {
        WARN
    } else if value.parse::<f64>().is_ok() {
        Color::Rgb(251, 146, 60)
    } else {
        Color::Rgb(147, 197, 253)
    }
}
