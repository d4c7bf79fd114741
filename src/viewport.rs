use std::ops::Range;

use crate::input::Motion;

pub fn visible_rows(height: u16, chrome: u16) -> usize {
    height.saturating_sub(chrome).max(1) as usize
}

/// Cursor plus scroll offset over a list of `total` items shown `rows` at a time.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Viewport {
    selected: usize,
    offset: usize,
}

impl Viewport {
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[cfg(test)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn reset(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    pub fn select(&mut self, index: usize, total: usize, rows: usize) {
        self.selected = index;
        self.rehome(total, rows);
    }

    pub fn clamp(&mut self, total: usize, rows: usize) {
        self.rehome(total, rows);
    }

    pub fn move_by(&mut self, delta: isize, total: usize, rows: usize) {
        self.selected = self.selected.saturating_add_signed(delta);
        self.rehome(total, rows);
    }

    pub fn to_top(&mut self) {
        self.reset();
    }

    pub fn to_bottom(&mut self, total: usize, rows: usize) {
        self.selected = total.saturating_sub(1);
        self.offset = total.saturating_sub(rows.max(1));
    }

    pub fn apply(&mut self, motion: Motion, total: usize, rows: usize) {
        let page = rows.max(1) as isize;
        match motion {
            Motion::Up => self.move_by(-1, total, rows),
            Motion::Down => self.move_by(1, total, rows),
            Motion::PageUp => self.move_by(-page, total, rows),
            Motion::PageDown => self.move_by(page, total, rows),
            Motion::Top => self.to_top(),
            Motion::Bottom => self.to_bottom(total, rows),
        }
    }

    pub fn bounds(&self, total: usize, rows: usize) -> Range<usize> {
        let start = self.offset.min(total);
        let end = (start + rows.max(1)).min(total);
        start..end
    }

    fn rehome(&mut self, total: usize, rows: usize) {
        let rows = rows.max(1);
        if total == 0 {
            self.reset();
            return;
        }

        self.selected = self.selected.min(total - 1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + rows {
            self.offset = self.selected + 1 - rows;
        }
        self.offset = self.offset.min(total.saturating_sub(rows));
    }
}

/// Selection-less scroll position used by the text viewer.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ScrollOffset {
    offset: usize,
}

impl ScrollOffset {
    #[cfg(test)]
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn apply(&mut self, motion: Motion, total: usize, rows: usize) {
        let rows = rows.max(1);
        let max = total.saturating_sub(rows);
        self.offset = match motion {
            Motion::Up => self.offset.saturating_sub(1),
            Motion::Down => (self.offset + 1).min(max),
            Motion::PageUp => self.offset.saturating_sub(rows),
            Motion::PageDown => (self.offset + rows).min(max),
            Motion::Top => 0,
            Motion::Bottom => max,
        };
    }

    pub fn clamp(&mut self, total: usize, rows: usize) {
        self.offset = self.offset.min(total.saturating_sub(rows.max(1)));
    }

    pub fn bounds(&self, total: usize, rows: usize) -> Range<usize> {
        let start = self.offset.min(total);
        let end = (start + rows.max(1)).min(total);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::{ScrollOffset, Viewport, visible_rows};
    use crate::input::Motion;

    const MOTIONS: [Motion; 6] = [
        Motion::Up,
        Motion::Down,
        Motion::PageUp,
        Motion::PageDown,
        Motion::Top,
        Motion::Bottom,
    ];

    fn assert_invariants(viewport: &Viewport, total: usize, rows: usize) {
        let max_offset = total.saturating_sub(rows);
        assert!(viewport.offset() <= max_offset, "offset {viewport:?}");
        if total == 0 {
            assert_eq!(viewport.selected(), 0);
            assert_eq!(viewport.offset(), 0);
            return;
        }
        assert!(viewport.selected() < total, "selected {viewport:?}");
        assert!(viewport.offset() <= viewport.selected(), "above {viewport:?}");
        assert!(
            viewport.selected() < viewport.offset() + rows,
            "below {viewport:?} rows={rows}"
        );
    }

    #[test]
    fn any_motion_sequence_keeps_cursor_visible() {
        let mut seed = 0x2545_f491_u32;
        for total in [0usize, 1, 2, 5, 9, 40] {
            for rows in [1usize, 3, 8, 50] {
                let mut viewport = Viewport::default();
                for _ in 0..200 {
                    seed ^= seed << 13;
                    seed ^= seed >> 17;
                    seed ^= seed << 5;
                    let motion = MOTIONS[(seed % MOTIONS.len() as u32) as usize];
                    viewport.apply(motion, total, rows);
                    assert_invariants(&viewport, total, rows);
                }
            }
        }
    }

    #[test]
    fn scrolling_down_past_the_window_moves_offset() {
        let mut viewport = Viewport::default();
        for _ in 0..4 {
            viewport.apply(Motion::Down, 10, 3);
        }
        assert_eq!(viewport.selected(), 4);
        assert_eq!(viewport.offset(), 2);
        assert_eq!(viewport.bounds(10, 3), 2..5);
    }

    #[test]
    fn bottom_and_top_jump_to_the_edges() {
        let mut viewport = Viewport::default();
        viewport.apply(Motion::Bottom, 10, 4);
        assert_eq!((viewport.selected(), viewport.offset()), (9, 6));
        viewport.apply(Motion::Top, 10, 4);
        assert_eq!((viewport.selected(), viewport.offset()), (0, 0));
    }

    #[test]
    fn page_motions_are_clamped() {
        let mut viewport = Viewport::default();
        viewport.apply(Motion::PageDown, 5, 4);
        assert_eq!(viewport.selected(), 4);
        assert_eq!(viewport.offset(), 1);
        viewport.apply(Motion::PageUp, 5, 4);
        assert_eq!(viewport.selected(), 0);
        assert_eq!(viewport.offset(), 0);
    }

    #[test]
    fn clamp_after_shrink_keeps_selection_in_range() {
        let mut viewport = Viewport::default();
        viewport.apply(Motion::Bottom, 20, 5);
        viewport.clamp(7, 5);
        assert_eq!(viewport.selected(), 6);
        assert_eq!(viewport.offset(), 2);
        viewport.clamp(0, 5);
        assert_eq!((viewport.selected(), viewport.offset()), (0, 0));
        assert!(viewport.bounds(0, 5).is_empty());
    }

    #[test]
    fn visible_rows_never_drops_below_one() {
        assert_eq!(visible_rows(2, 4), 1);
        assert_eq!(visible_rows(24, 4), 20);
    }

    #[test]
    fn text_scroll_stays_within_bounds() {
        let mut scroll = ScrollOffset::default();
        scroll.apply(Motion::Bottom, 100, 10);
        assert_eq!(scroll.offset(), 90);
        scroll.apply(Motion::Down, 100, 10);
        assert_eq!(scroll.offset(), 90);
        scroll.apply(Motion::PageUp, 100, 10);
        assert_eq!(scroll.offset(), 80);
        scroll.apply(Motion::Top, 100, 10);
        scroll.apply(Motion::Up, 100, 10);
        assert_eq!(scroll.offset(), 0);
        scroll.apply(Motion::Bottom, 3, 10);
        assert_eq!(scroll.offset(), 0);
        assert_eq!(scroll.bounds(3, 10), 0..3);
    }
}
