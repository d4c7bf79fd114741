use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;
use crate::panels::PanelId;

pub const BG: Color = Color::Rgb(9, 15, 25);
pub const PANEL: Color = Color::Rgb(16, 27, 44);
pub const ACCENT: Color = Color::Rgb(52, 211, 153);
pub const MUTED: Color = Color::Rgb(140, 156, 178);
pub const WARN: Color = Color::Rgb(251, 191, 36);
pub const ERROR: Color = Color::Rgb(248, 113, 113);
pub const SELECTED_BG: Color = Color::Rgb(24, 36, 58);
const PL_A: Color = Color::Rgb(17, 94, 89);
const PL_B: Color = Color::Rgb(30, 64, 175);
const PL_C: Color = Color::Rgb(55, 48, 163);

const SIDEBAR_WIDTH: u16 = 30;
const NAMESPACE_HEIGHT: u16 = 3;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct BodyLayout {
    pub header: Rect,
    pub namespace: Rect,
    pub kinds: Rect,
    pub content: Rect,
    pub footer: Rect,
}

pub fn body_layout(area: Rect) -> BodyLayout {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(root[1]);
    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(NAMESPACE_HEIGHT), Constraint::Min(3)])
        .split(columns[0]);

    BodyLayout {
        header: root[0],
        namespace: sidebar[0],
        kinds: sidebar[1],
        content: columns[1],
        footer: root[2],
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(MUTED)
    }
}

/// Centers a fixed-size box, shrinking it to fit small terminals.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

pub fn render(frame: &mut Frame, app: &App) {
    let screen = frame.area();
    let layout = body_layout(screen);

    render_header(frame, layout.header, app);
    for (id, area) in [
        (PanelId::Namespace, layout.namespace),
        (PanelId::Kinds, layout.kinds),
        (PanelId::Content, layout.content),
    ] {
        app.panel(id).render(frame, area);
    }
    render_footer(frame, layout.footer, app);

    if let Some(viewer) = app.viewer() {
        viewer.render(frame, screen);
    }
    if let Some(dialog) = app.dialog() {
        dialog.render(frame, screen);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    push_powerline_segment(&mut spans, " ⎈ kubepane ", Color::White, PL_A, PL_C);
    push_powerline_segment(
        &mut spans,
        format!(" ns {} ", app.namespace_scope().label()),
        Color::White,
        PL_C,
        BG,
    );
    if let Some(session) = app.watch_session() {
        spans.push(Span::styled(
            format!(" ● watching {} ", session.kind),
            Style::default().fg(WARN).bg(BG).add_modifier(Modifier::BOLD),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        area,
    );
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let status = app.status();
    let mut spans = Vec::new();
    push_powerline_segment(
        &mut spans,
        format!(" {} {status} ", footer_status_icon(status)),
        Color::White,
        PL_B,
        BG,
    );
    spans.push(Span::styled(
        format!(" {}", app.key_hints()),
        Style::default().fg(MUTED).bg(BG),
    ));
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        area,
    );
}

fn footer_status_icon(status_text: &str) -> &'static str {
    let status = status_text.to_ascii_lowercase();
    let has_failure = ["failed", "error", "timed out", "stopped", "refused", "forbidden"]
        .iter()
        .any(|needle| status.contains(needle));
    if has_failure { "✗" } else { "✓" }
}

fn push_powerline_segment(
    spans: &mut Vec<Span<'static>>,
    content: impl Into<String>,
    fg: Color,
    bg: Color,
    next_bg: Color,
) {
    spans.push(Span::styled(
        content.into(),
        Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("", Style::default().fg(bg).bg(next_bg)));
}
