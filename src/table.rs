use chrono::{DateTime, Local};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::input::Motion;
use crate::model::ResourceInfo;
use crate::ui::{ACCENT, MUTED, PANEL, SELECTED_BG, border_style};
use crate::viewport::{Viewport, visible_rows};

// Borders, header row and footer line.
const TABLE_CHROME: u16 = 4;
const COLUMN_SPACING: usize = 2;
const MIN_CONTENT_WIDTH: usize = 20;
const PLACEHOLDERS: [&str; 5] = ["", "<none>", "unknown", "n/a", "-"];

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Column {
    Name,
    Namespace,
    Ready,
    Status,
    Restarts,
    Age,
    Ip,
    Node,
}

impl Column {
    const OPTIONAL: [Self; 6] = [
        Self::Ready,
        Self::Status,
        Self::Restarts,
        Self::Age,
        Self::Ip,
        Self::Node,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Namespace => "NAMESPACE",
            Self::Ready => "READY",
            Self::Status => "STATUS",
            Self::Restarts => "RESTARTS",
            Self::Age => "AGE",
            Self::Ip => "IP",
            Self::Node => "NODE",
        }
    }

    pub fn bounds(self) -> (usize, usize) {
        let (min, max) = match self {
            Self::Name => (12, 48),
            Self::Namespace => (12, 24),
            Self::Ready => (5, 12),
            Self::Status => (8, 24),
            Self::Restarts => (7, 16),
            Self::Age => (6, 16),
            Self::Ip => (8, 24),
            Self::Node => (8, 24),
        };
        let min = min.max(self.title().width());
        (min, max.max(min))
    }

    pub fn value(self, item: &ResourceInfo) -> &str {
        match self {
            Self::Name => &item.name,
            Self::Namespace => &item.namespace,
            Self::Ready => &item.ready,
            Self::Status => &item.status,
            Self::Restarts => &item.restarts,
            Self::Age => &item.age,
            Self::Ip => &item.ip,
            Self::Node => &item.node,
        }
    }

    fn extra_placeholder(self) -> Option<&'static str> {
        match self {
            Self::Ready => Some("0/0"),
            Self::Restarts => Some("0"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ColumnLayout {
    pub column: Column,
    pub width: usize,
}

pub fn plan_columns(items: &[ResourceInfo], title: &str, width: usize) -> Vec<ColumnLayout> {
    let mut columns = vec![Column::Name];
    if shows_namespace(items, title) {
        columns.push(Column::Namespace);
    }
    columns.extend(
        Column::OPTIONAL
            .into_iter()
            .filter(|column| has_meaningful_value(items, *column)),
    );

    let mut layouts = columns
        .into_iter()
        .map(|column| ColumnLayout {
            column,
            width: natural_width(items, column),
        })
        .collect::<Vec<_>>();

    let (name_min, name_max) = Column::Name.bounds();
    let mut available = width as isize - others_width(&layouts) as isize;
    if available < name_min as isize {
        shrink_columns(&mut layouts, (name_min as isize - available) as usize);
        available = width as isize - others_width(&layouts) as isize;
    }
    layouts[0].width = (available.max(1) as usize).min(name_max).max(name_min);
    layouts
}

/// Truncates to `width` terminal columns, ending in an ellipsis when cut.
pub fn fit_cell(value: &str, width: usize) -> String {
    if value.width() <= width {
        return value.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let budget = width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in value.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        used += ch_width;
        out.push(ch);
    }
    out.push('…');
    out
}

fn shows_namespace(items: &[ResourceInfo], title: &str) -> bool {
    if items.is_empty() {
        return false;
    }

    let mut first: Option<String> = None;
    for item in items {
        let namespace = item.namespace.trim();
        if namespace.is_empty() {
            continue;
        }
        let namespace = namespace.to_lowercase();
        match &first {
            None => first = Some(namespace),
            Some(seen) if *seen != namespace => return true,
            Some(_) => {}
        }
    }

    title.to_lowercase().contains("all namespace")
}

fn has_meaningful_value(items: &[ResourceInfo], column: Column) -> bool {
    items.iter().any(|item| {
        let value = column.value(item).trim().to_lowercase();
        !PLACEHOLDERS.contains(&value.as_str()) && column.extra_placeholder() != Some(value.as_str())
    })
}

fn natural_width(items: &[ResourceInfo], column: Column) -> usize {
    let longest = items
        .iter()
        .map(|item| column.value(item).trim().width())
        .chain(std::iter::once(column.title().width()))
        .max()
        .unwrap_or(0);
    let (min, max) = column.bounds();
    longest.clamp(min, max)
}

fn others_width(layouts: &[ColumnLayout]) -> usize {
    let separators = COLUMN_SPACING * layouts.len().saturating_sub(1);
    separators + layouts.iter().skip(1).map(|layout| layout.width).sum::<usize>()
}

// Takes one cell per pass from each non-NAME column, rightmost first, until the
// deficit is covered or every column sits at its minimum.
fn shrink_columns(layouts: &mut [ColumnLayout], mut deficit: usize) {
    while deficit > 0 {
        let mut progressed = false;
        for layout in layouts.iter_mut().skip(1).rev() {
            if deficit == 0 {
                break;
            }
            if layout.width > layout.column.bounds().0 {
                layout.width -= 1;
                deficit -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    title: String,
    items: Vec<ResourceInfo>,
    viewport: Viewport,
    active: bool,
    watching: bool,
    width: u16,
    height: u16,
    refreshed_at: Option<DateTime<Local>>,
}

impl ResourceTable {
    pub fn set_resources(&mut self, title: String, items: Vec<ResourceInfo>) {
        self.title = title;
        self.items = items;
        self.viewport.reset();
        self.active = false;
        self.refreshed_at = Some(Local::now());
    }

    pub fn update_resources_only(&mut self, title: String, items: Vec<ResourceInfo>) {
        self.title = title;
        self.items = items;
        self.viewport.clamp(self.items.len(), self.visible_rows());
        if self.items.is_empty() {
            self.active = false;
        }
        self.refreshed_at = Some(Local::now());
    }

    #[cfg(test)]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[cfg(test)]
    pub fn items(&self) -> &[ResourceInfo] {
        &self.items
    }

    #[cfg(test)]
    pub fn selected_index(&self) -> usize {
        self.viewport.selected()
    }

    #[cfg(test)]
    pub fn offset(&self) -> usize {
        self.viewport.offset()
    }

    pub fn selected_resource(&self) -> Option<&ResourceInfo> {
        self.items.get(self.viewport.selected())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active && !self.items.is_empty();
    }

    #[cfg(test)]
    pub fn is_watching(&self) -> bool {
        self.watching
    }

    pub fn set_watching(&mut self, watching: bool) {
        self.watching = watching;
    }

    pub fn set_dimensions(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.viewport.clamp(self.items.len(), self.visible_rows());
    }

    pub fn visible_rows(&self) -> usize {
        visible_rows(self.height, TABLE_CHROME)
    }

    pub fn apply(&mut self, motion: Motion) {
        let rows = self.visible_rows();
        self.viewport.apply(motion, self.items.len(), rows);
    }

    fn content_width(&self) -> usize {
        (self.width as usize)
            .saturating_sub(4)
            .max(MIN_CONTENT_WIDTH)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let prefix = if self.watching {
            "Watch Resources"
        } else {
            "Resources"
        };
        let block = Block::default()
            .title(format!("{prefix}: {} ({})", self.title, self.items.len()))
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .style(Style::default().bg(PANEL));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.items.is_empty() {
            frame.render_widget(
                Paragraph::new(format!("No {} found", self.title))
                    .style(Style::default().fg(MUTED)),
                inner,
            );
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let columns = plan_columns(&self.items, &self.title, self.content_width());
        let header = Row::new(
            columns
                .iter()
                .map(|layout| Cell::from(fit_cell(layout.column.title(), layout.width))),
        )
        .style(Style::default().fg(MUTED).add_modifier(Modifier::BOLD));

        let range = self.viewport.bounds(self.items.len(), self.visible_rows());
        let selected = self.viewport.selected();
        let rows = self.items[range.clone()]
            .iter()
            .zip(range.clone())
            .map(|(item, index)| {
                let row = Row::new(columns.iter().map(|layout| {
                    Cell::from(fit_cell(layout.column.value(item).trim(), layout.width))
                }));
                if self.active && index == selected {
                    row.style(
                        Style::default()
                            .fg(ACCENT)
                            .bg(SELECTED_BG)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    row.style(Style::default().fg(Color::White))
                }
            })
            .collect::<Vec<_>>();
        let widths = columns
            .iter()
            .map(|layout| Constraint::Length(layout.width as u16))
            .collect::<Vec<_>>();

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(COLUMN_SPACING as u16);
        frame.render_widget(table, chunks[0]);

        let mut footer = format!("{}-{} of {}", range.start + 1, range.end, self.items.len());
        if self.active {
            footer.push_str("  (Esc exit, j/k scroll)");
        }
        if let Some(refreshed_at) = self.refreshed_at {
            footer.push_str(&format!("  refreshed {}", refreshed_at.format("%H:%M:%S")));
        }
        frame.render_widget(
            Paragraph::new(Line::from(footer)).style(Style::default().fg(MUTED)),
            chunks[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{Column, ColumnLayout, ResourceTable, fit_cell, plan_columns};
    use crate::input::Motion;
    use crate::model::ResourceInfo;
    use crate::ui::SELECTED_BG;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::style::Color;

    fn pod(name: &str, namespace: &str) -> ResourceInfo {
        ResourceInfo {
            name: name.to_string(),
            namespace: namespace.to_string(),
            kind: "Pod".to_string(),
            ready: "1/1".to_string(),
            status: "Running".to_string(),
            restarts: "0".to_string(),
            age: "5d".to_string(),
            ip: "<none>".to_string(),
            node: "<none>".to_string(),
        }
    }

    fn titles(layouts: &[ColumnLayout]) -> Vec<&'static str> {
        layouts.iter().map(|layout| layout.column.title()).collect()
    }

    #[test]
    fn placeholder_only_columns_are_dropped() {
        let items = vec![pod("api-0", "default"), pod("api-1", "default")];
        let layouts = plan_columns(&items, "pods in default", 120);
        assert_eq!(titles(&layouts), vec!["NAME", "READY", "STATUS", "AGE"]);
    }

    #[test]
    fn ready_zero_of_zero_counts_as_placeholder() {
        let mut item = pod("api-0", "default");
        item.ready = "0/0".to_string();
        let layouts = plan_columns(&[item], "pods in default", 120);
        assert!(!titles(&layouts).contains(&"READY"));
    }

    #[test]
    fn restarts_column_shows_when_any_row_restarted() {
        let mut restarted = pod("api-1", "default");
        restarted.restarts = "3".to_string();
        let layouts = plan_columns(&[pod("api-0", "default"), restarted], "pods", 120);
        assert!(titles(&layouts).contains(&"RESTARTS"));
    }

    #[test]
    fn namespace_column_follows_namespace_spread_or_title() {
        let single = vec![pod("a", "default"), pod("b", "Default")];
        assert!(!titles(&plan_columns(&single, "pods in default", 120)).contains(&"NAMESPACE"));

        let spread = vec![pod("a", "default"), pod("b", "kube-system")];
        assert_eq!(titles(&plan_columns(&spread, "pods", 120))[1], "NAMESPACE");

        let titled = plan_columns(&single, "pods in all namespaces", 120);
        assert_eq!(titles(&titled)[1], "NAMESPACE");
    }

    #[test]
    fn name_takes_leftover_width_up_to_its_max() {
        let layouts = plan_columns(&[pod("api", "default")], "pods", 200);
        assert_eq!(layouts[0].width, 48);
    }

    #[test]
    fn narrow_width_shrinks_rightmost_columns_before_name() {
        let mut item = pod("api", "default");
        item.ip = "fd00:1234:5678::1".to_string();
        item.node = "worker-node-long-name-01".to_string();
        item.restarts = "0".to_string();

        let layouts = plan_columns(&[item], "pods", 60);
        let widths = layouts
            .iter()
            .map(|layout| (layout.column, layout.width))
            .collect::<Vec<_>>();
        assert_eq!(
            widths,
            vec![
                (Column::Name, 12),
                (Column::Ready, 5),
                (Column::Status, 8),
                (Column::Age, 6),
                (Column::Ip, 8),
                (Column::Node, 11),
            ]
        );
        let total = widths.iter().map(|(_, width)| width).sum::<usize>() + 2 * 5;
        assert_eq!(total, 60);
    }

    #[test]
    fn columns_never_shrink_below_minimum() {
        let layouts = plan_columns(&[pod("api", "default")], "pods", 10);
        for layout in layouts {
            assert!(layout.width >= layout.column.bounds().0);
        }
    }

    #[test]
    fn planning_is_idempotent() {
        let items = vec![pod("a", "default"), pod("b", "kube-system")];
        assert_eq!(
            plan_columns(&items, "pods", 80),
            plan_columns(&items, "pods", 80)
        );
    }

    #[test]
    fn long_cells_are_cut_with_an_ellipsis() {
        assert_eq!(fit_cell("abcdef", 6), "abcdef");
        assert_eq!(fit_cell("abcdefg", 6), "abcde…");
        assert_eq!(fit_cell("abc", 1), "…");
        assert_eq!(fit_cell("abc", 0), "");
        assert_eq!(fit_cell("日本語テキスト", 4), "日…");
        assert_eq!(fit_cell("日本語", 6), "日本語");
        assert_eq!(fit_cell("日本語", 5), "日本…");
    }

    #[test]
    fn wide_characters_count_as_two_columns() {
        let items = vec![pod("a", "日本語日本語日本語"), pod("b", "default")];
        let namespace = plan_columns(&items, "pods", 120)
            .into_iter()
            .find(|layout| layout.column == Column::Namespace)
            .expect("namespace column");
        assert_eq!(namespace.width, 18);
    }

    #[test]
    fn set_resources_resets_cursor_and_active_flag() {
        let mut table = ResourceTable::default();
        table.set_dimensions(80, 10);
        table.set_resources("pods".to_string(), vec![pod("a", "ns"), pod("b", "ns")]);
        table.set_active(true);
        table.apply(Motion::Down);

        table.set_resources("pods".to_string(), vec![pod("c", "ns")]);
        assert_eq!(table.selected_index(), 0);
        assert_eq!(table.offset(), 0);
        assert!(!table.is_active());
    }

    #[test]
    fn update_only_keeps_cursor_and_clamps() {
        let mut table = ResourceTable::default();
        table.set_dimensions(80, 8);
        let many = (0..10)
            .map(|index| pod(&format!("pod-{index}"), "ns"))
            .collect::<Vec<_>>();
        table.set_resources("pods".to_string(), many.clone());
        table.set_active(true);
        table.apply(Motion::Down);
        table.apply(Motion::Down);

        table.update_resources_only("pods".to_string(), many[..6].to_vec());
        assert_eq!(table.selected_index(), 2);
        assert!(table.is_active());

        table.apply(Motion::Bottom);
        table.update_resources_only("pods".to_string(), many[..3].to_vec());
        assert_eq!(table.selected_index(), 2);
        assert_eq!(table.offset(), 0);
    }

    #[test]
    fn empty_table_cannot_be_activated() {
        let mut table = ResourceTable::default();
        table.set_resources("pods".to_string(), Vec::new());
        table.set_active(true);
        assert!(!table.is_active());
    }

    fn render(table: &ResourceTable) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        terminal
            .draw(|frame| table.render(frame, frame.area(), true))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn background_of(buffer: &Buffer, needle: &str) -> Option<Color> {
        let area = buffer.area;
        for y in 0..area.height {
            for x in 0..area.width {
                let found = needle.chars().enumerate().all(|(i, c)| {
                    let cx = x + i as u16;
                    cx < area.width && buffer[(cx, y)].symbol() == c.to_string()
                });
                if found {
                    return Some(buffer[(x, y)].bg);
                }
            }
        }
        None
    }

    #[test]
    fn selected_row_is_highlighted_only_while_active() {
        let mut table = ResourceTable::default();
        table.set_dimensions(80, 10);
        table.set_resources(
            "pods in default".to_string(),
            vec![pod("pod-a", "default"), pod("pod-b", "default")],
        );
        table.set_active(true);
        table.apply(Motion::Down);

        let active = render(&table);
        assert_eq!(background_of(&active, "pod-b"), Some(SELECTED_BG));
        assert_ne!(background_of(&active, "pod-a"), Some(SELECTED_BG));

        table.set_active(false);
        let inactive = render(&table);
        assert_ne!(background_of(&inactive, "pod-b"), Some(SELECTED_BG));
    }

    #[test]
    fn title_marks_watched_tables() {
        let mut table = ResourceTable::default();
        table.set_dimensions(80, 10);
        table.set_resources("pods in default".to_string(), vec![pod("pod-a", "default")]);
        table.set_watching(true);
        let buffer = render(&table);
        assert!(background_of(&buffer, "Watch Resources: pods in default (1)").is_some());
    }
}
