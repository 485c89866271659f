//! Input handling: coordinate conversion, click targets, and event types.
//!
//! The DOM handlers in `main.rs` normalize keyboard and mouse input into
//! [`InputEvent`]s; the game decides what they mean.

use ratzilla::ratatui::layout::Rect;

/// Keyboard and pointer input, already decoded by the DOM handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A printable key press.
    Key(char),
    /// A click/tap on a registered target, identified by a semantic action ID
    /// from `escape::actions`.
    Click(u16),
    Enter,
    Escape,
    Backspace,
}

/// Cells that trigger `action_id` when clicked.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

/// Targets registered by the last frame, plus its size in cells.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Register a full-row click target at the given row within an area.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Hit-test a terminal cell against all registered targets.
    /// Later-registered targets win when they overlap (overlays sit on top).
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            if col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height {
                Some(t.action_id)
            } else {
                None
            }
        })
    }
}

/// Below 60 columns the panels stack vertically.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

/// Index of the cell containing `offset` along one axis of `cells` equal
/// cells spread over `extent` pixels.
fn cell_index(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let index = (offset * cells as f64 / extent) as u16;
    (index < cells).then_some(index)
}

/// Map a pixel position relative to the grid container's top-left corner to
/// a terminal `(col, row)`. `None` outside the grid or before the first draw.
pub fn pixel_to_cell(x: f64, y: f64, grid: (f64, f64), terminal: (u16, u16)) -> Option<(u16, u16)> {
    let col = cell_index(x, grid.0, terminal.0)?;
    let row = cell_index(y, grid.1, terminal.1)?;
    Some((col, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHOICE: u16 = 100;

    // ── hit_test ───────────────────────────────────────────────────

    #[test]
    fn row_targets_split_by_row() {
        let mut cs = ClickState::new();
        let panel = Rect::new(2, 10, 40, 2);
        cs.add_row_target(panel, 10, CHOICE);
        cs.add_row_target(panel, 11, CHOICE + 1);

        assert_eq!(cs.hit_test(5, 10), Some(CHOICE));
        assert_eq!(cs.hit_test(5, 11), Some(CHOICE + 1));
        assert_eq!(cs.hit_test(1, 10), None);
        assert_eq!(cs.hit_test(5, 12), None);
    }

    #[test]
    fn hit_test_column_precision() {
        let mut cs = ClickState::new();
        // Keypad cells sit side by side on one row.
        for d in 0..3u16 {
            cs.add_click_target(Rect::new(1 + d * 4, 5, 4, 1), 301 + d);
        }

        assert_eq!(cs.hit_test(4, 5), Some(301));
        assert_eq!(cs.hit_test(5, 5), Some(302));
        assert_eq!(cs.hit_test(12, 5), Some(303));
        assert_eq!(cs.hit_test(13, 5), None);
    }

    #[test]
    fn hit_test_overlap_last_wins() {
        let mut cs = ClickState::new();
        // Help bar first, then a panel row drawn over the same cells.
        cs.add_click_target(Rect::new(0, 27, 80, 3), 10);
        cs.add_click_target(Rect::new(0, 28, 40, 1), 30);

        assert_eq!(cs.hit_test(10, 28), Some(30));
        assert_eq!(cs.hit_test(50, 28), Some(10));
    }

    #[test]
    fn add_row_target_outside_area_ignored() {
        let mut cs = ClickState::new();
        let area = Rect::new(0, 10, 40, 3);
        cs.add_row_target(area, 9, 1);
        cs.add_row_target(area, 13, 2);
        cs.add_row_target(area, 12, 3);
        assert_eq!(cs.targets.len(), 1);
        assert_eq!(cs.hit_test(0, 12), Some(3));
    }

    #[test]
    fn clear_targets_empties() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 1, 1), 1);
        cs.clear_targets();
        assert_eq!(cs.hit_test(0, 0), None);
    }

    #[test]
    fn narrow_layout_threshold() {
        assert!(is_narrow_layout(59));
        assert!(!is_narrow_layout(60));
    }

    // ── pixel conversion ───────────────────────────────────────────

    const GRID: (f64, f64) = (640.0, 450.0);
    const TERM: (u16, u16) = (80, 30);

    #[test]
    fn cells_are_8_by_15_pixels() {
        assert_eq!(pixel_to_cell(0.0, 0.0, GRID, TERM), Some((0, 0)));
        assert_eq!(pixel_to_cell(7.9, 14.9, GRID, TERM), Some((0, 0)));
        assert_eq!(pixel_to_cell(8.0, 15.0, GRID, TERM), Some((1, 1)));
        assert_eq!(pixel_to_cell(639.0, 449.0, GRID, TERM), Some((79, 29)));
    }

    #[test]
    fn outside_grid_is_none() {
        assert_eq!(pixel_to_cell(640.0, 10.0, GRID, TERM), None);
        assert_eq!(pixel_to_cell(10.0, 450.0, GRID, TERM), None);
        assert_eq!(pixel_to_cell(-1.0, 10.0, GRID, TERM), None);
        assert_eq!(pixel_to_cell(10.0, -0.5, GRID, TERM), None);
    }

    #[test]
    fn before_first_draw_is_none() {
        assert_eq!(pixel_to_cell(10.0, 10.0, GRID, (0, 0)), None);
        assert_eq!(pixel_to_cell(10.0, 10.0, (0.0, 0.0), TERM), None);
    }

    #[test]
    fn click_on_choice_row_hits_its_action() {
        let mut cs = ClickState::new();
        // Choices panel, rows 12..15 of the left column.
        let panel = Rect::new(0, 11, 44, 6);
        for (i, row) in (12..15).enumerate() {
            cs.add_row_target(panel, row, 100 + i as u16);
        }

        let (col, row) = pixel_to_cell(20.0, 13.0 * 15.0 + 7.0, GRID, TERM).unwrap();
        assert_eq!(cs.hit_test(col, row), Some(101));

        // Journal column has no targets.
        let (col, row) = pixel_to_cell(500.0, 13.0 * 15.0, GRID, TERM).unwrap();
        assert_eq!(cs.hit_test(col, row), None);
    }
}
