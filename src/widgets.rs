//! Clickable list builder shared by every panel of the escape renderer.
//!
//! Rendering and click registration stay co-located: a line is annotated as
//! clickable when it is pushed, and its target follows it wherever it lands.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::text::Line;
use ratzilla::ratatui::widgets::{Block, Paragraph, Wrap};

use crate::input::ClickState;

/// A builder that pairs rendered [`Line`]s with click actions.
///
/// # Example
/// ```ignore
/// let mut cl = ClickableList::new();
/// cl.push(Line::from("Scene (not clickable)"));
/// cl.push_clickable(Line::from(" [1] Check the chart"), CHOICE_BASE);
/// cl.register_targets_with_block(area, &block, &mut cs, 0);
/// f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
/// ```
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)` pairs — line_index is the index into `lines`.
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Add a non-clickable line.
    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    /// Add a clickable line with a semantic action ID.
    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        let idx = self.lines.len() as u16;
        self.actions.push((idx, action_id));
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Rows the lines occupy once wrapped to `width`.
    pub fn visual_height(&self, width: u16) -> u16 {
        if width == 0 {
            return self.lines.len() as u16;
        }
        Paragraph::new(self.lines.clone())
            .wrap(Wrap { trim: false })
            .line_count(width) as u16
    }

    /// Register click targets for all clickable lines.
    ///
    /// * `top_offset` / `bottom_offset` — rows before and after content
    ///   (1 each for `Borders::ALL`).
    /// * `scroll` — vertical scroll offset in visual rows.
    /// * `inner_width` — wrap width. `0` means the widget does not wrap and
    ///   each logical line is one visual row.
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top_offset: u16,
        bottom_offset: u16,
        scroll: u16,
        inner_width: u16,
    ) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);

        let w = inner_width as usize;
        let mut visual_starts: Vec<u16> = Vec::with_capacity(self.lines.len());
        let mut visual_heights: Vec<u16> = Vec::with_capacity(self.lines.len());
        let mut cumulative: u16 = 0;
        for line in &self.lines {
            visual_starts.push(cumulative);
            let lw = line.width();
            let h = if w == 0 || lw <= w {
                1
            } else {
                lw.div_ceil(w) as u16
            };
            visual_heights.push(h);
            cumulative += h;
        }

        for &(line_idx, action_id) in &self.actions {
            let li = line_idx as usize;
            if li >= self.lines.len() {
                continue;
            }
            // Every visual row of a wrapped line is clickable.
            for r in 0..visual_heights[li] {
                let vr = visual_starts[li] + r;
                if vr < scroll {
                    continue;
                }
                let screen_row = content_y + (vr - scroll);
                if screen_row >= content_end {
                    break;
                }
                cs.add_row_target(area, screen_row, action_id);
            }
        }
    }

    /// [`register_targets`](Self::register_targets) with offsets and wrap
    /// width taken from the block that will surround the lines.
    pub fn register_targets_with_block(
        &self,
        area: Rect,
        block: &Block,
        cs: &mut ClickState,
        scroll: u16,
    ) {
        let inner = block.inner(area);
        let top = inner.y.saturating_sub(area.y);
        let bottom = (area.y + area.height).saturating_sub(inner.y + inner.height);
        self.register_targets(area, cs, top, bottom, scroll, inner.width);
    }
}
