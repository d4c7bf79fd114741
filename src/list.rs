use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::input::Motion;
use crate::ui::{ACCENT, SELECTED_BG};
use crate::viewport::Viewport;

#[derive(Debug, Clone)]
pub struct SelectList {
    items: Vec<String>,
    viewport: Viewport,
    rows: usize,
}

impl Default for SelectList {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            viewport: Viewport::default(),
            rows: 1,
        }
    }
}

impl SelectList {
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.viewport.reset();
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.viewport.selected()
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.items
            .get(self.viewport.selected())
            .map(String::as_str)
    }

    pub fn select(&mut self, index: usize) {
        self.viewport.select(index, self.items.len(), self.rows);
    }

    pub fn apply(&mut self, motion: Motion) {
        self.viewport.apply(motion, self.items.len(), self.rows);
    }

    pub fn set_visible_rows(&mut self, rows: usize) {
        self.rows = rows.max(1);
        self.viewport.clamp(self.items.len(), self.rows);
    }

    #[cfg(test)]
    pub fn offset(&self) -> usize {
        self.viewport.offset()
    }

    pub fn render_lines(&self, highlight: bool) -> Vec<Line<'static>> {
        let range = self.viewport.bounds(self.items.len(), self.rows);
        let selected = self.viewport.selected();
        self.items[range.clone()]
            .iter()
            .zip(range)
            .map(|(item, index)| {
                if highlight && index == selected {
                    Line::from(Span::styled(
                        format!("> {item}"),
                        Style::default()
                            .fg(ACCENT)
                            .bg(SELECTED_BG)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(
                        format!("  {item}"),
                        Style::default().fg(Color::White),
                    ))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::SelectList;
    use crate::input::Motion;

    fn list(items: &[&str], rows: usize) -> SelectList {
        let mut list = SelectList::default();
        list.set_items(items.iter().map(|item| item.to_string()).collect());
        list.set_visible_rows(rows);
        list
    }

    #[test]
    fn cursor_walks_and_clamps_at_edges() {
        let mut list = list(&["a", "b", "c"], 2);
        list.apply(Motion::Up);
        assert_eq!(list.selected_item(), Some("a"));
        list.apply(Motion::Down);
        list.apply(Motion::Down);
        list.apply(Motion::Down);
        assert_eq!(list.selected_item(), Some("c"));
        assert_eq!(list.offset(), 1);
    }

    #[test]
    fn render_only_emits_the_visible_window() {
        let mut list = list(&["a", "b", "c", "d"], 2);
        list.apply(Motion::Bottom);
        let lines = list.render_lines(true);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].to_string(), "> d");
        assert_eq!(lines[0].to_string(), "  c");
    }

    #[test]
    fn no_marker_without_highlight() {
        let list = list(&["a", "b"], 5);
        let lines = list.render_lines(false);
        assert_eq!(lines[0].to_string(), "  a");
    }

    #[test]
    fn replacing_items_resets_cursor() {
        let mut list = list(&["a", "b", "c"], 3);
        list.select(2);
        list.set_items(vec!["x".to_string()]);
        assert_eq!(list.selected_index(), 0);
        assert_eq!(list.selected_item(), Some("x"));
    }

    #[test]
    fn empty_list_has_no_selection() {
        let mut list = list(&[], 3);
        list.apply(Motion::Down);
        assert!(list.is_empty());
        assert_eq!(list.selected_item(), None);
        assert!(list.render_lines(true).is_empty());
    }
}
