//! Escape rooms rendering.
//!
//! Layout: title + (scene, choices | journal) + help bar. Narrow screens stack
//! the panels. The bag and the code keypad replace the choices panel.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::ClickableList;

use super::actions::*;
use super::items::{ItemCategory, ItemKind};
use super::journal::EntryKind;
use super::{ActiveRoom, EscapeGame, Mode, CODE_LEN};

/// Width of one keypad cell, e.g. `" [7]"`.
const KEY_CELL: u16 = 4;

pub fn render(
    game: &EscapeGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(area);

    render_title(game, f, main_chunks[0]);
    if is_narrow_layout(area.width) {
        render_narrow(game, f, main_chunks[1], click_state);
    } else {
        render_wide(game, f, main_chunks[1], click_state);
    }
    render_help(game, f, main_chunks[2], click_state);
}

/// Wide layout: left panel (scene + choices) | right panel (journal)
fn render_wide(
    game: &EscapeGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let panel = panel_list(game);
    let panel_h = panel.visual_height(columns[0].width.saturating_sub(2)) + 2;
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(panel_h.max(3))])
        .split(columns[0]);

    render_scene(game, f, left[0]);
    render_panel(game, panel, f, left[1], click_state);
    render_journal(game, f, columns[1]);
}

/// Narrow layout: scene, choices and journal stacked vertically
fn render_narrow(
    game: &EscapeGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let panel = panel_list(game);
    let panel_h = panel.visual_height(area.width.saturating_sub(2)) + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(panel_h.max(3)),
            Constraint::Length(6),
        ])
        .split(area);

    render_scene(game, f, chunks[0]);
    render_panel(game, panel, f, chunks[1], click_state);
    render_journal(game, f, chunks[2]);
}

fn render_title(game: &EscapeGame, f: &mut Frame, area: Rect) {
    let room = game.room_id();
    let (title, style) = if game.mode() == Mode::Epilogue {
        (
            format!("★ {} ★", room.title()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            format!("Escape Rooms - {} ({}/4)", room.title(), room.number()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )
    };
    let widget = Paragraph::new(Line::from(Span::styled(title, style)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn render_scene(game: &EscapeGame, f: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = game
        .scene()
        .lines()
        .map(|l| Line::from(Span::styled(format!(" {l}"), Style::default().fg(Color::White))))
        .collect();
    if !game.message().is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" > {}", game.message()),
            Style::default().fg(Color::Yellow),
        )));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(format!(" {} ", game.room_id().title()));
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

// ── Bottom-left panel: choices, keypad or bag ───────────────

fn panel_list(game: &EscapeGame) -> ClickableList<'static> {
    match game.mode() {
        Mode::Bag => bag_list(game),
        Mode::CodeEntry => code_list(game),
        Mode::Explore => choice_list(game),
        Mode::Epilogue => epilogue_list(),
    }
}

fn render_panel(
    game: &EscapeGame,
    cl: ClickableList<'static>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let (title, color) = match game.mode() {
        Mode::Bag => (" Bag ", Color::Magenta),
        Mode::CodeEntry => (" Door lock ", Color::Cyan),
        _ => (" Actions ", Color::Yellow),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title);

    let mut cs = click_state.borrow_mut();
    cl.register_targets_with_block(area, &block, &mut cs, 0);
    if game.mode() == Mode::CodeEntry {
        register_keypad(block.inner(area), &mut cs);
    }
    drop(cs);

    f.render_widget(
        Paragraph::new(cl.into_lines()).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn choice_list(game: &EscapeGame) -> ClickableList<'static> {
    let mut cl = ClickableList::new();
    if game.pending_transition().is_some() {
        cl.push(Line::from(Span::styled(
            " ...",
            Style::default().fg(Color::DarkGray),
        )));
        return cl;
    }
    for (i, choice) in game.choices().iter().enumerate() {
        push_choice(&mut cl, i, choice.label);
    }
    if let ActiveRoom::Code(room) = game.room() {
        let found = room.collected().len();
        let total = room.layout().fragments.len() + 1;
        cl.push(Line::from(Span::styled(
            format!(" Clues found: {found}/{total}"),
            Style::default().fg(Color::DarkGray),
        )));
    }
    cl
}

fn push_choice(cl: &mut ClickableList<'static>, index: usize, label: &'static str) {
    cl.push_clickable(
        Line::from(vec![
            Span::styled(
                format!(" [{}] ", index + 1),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(label, Style::default().fg(Color::White)),
        ]),
        CHOICE_BASE + index as u16,
    );
}

fn code_list(game: &EscapeGame) -> ClickableList<'static> {
    let mut cl = ClickableList::new();
    let typed = game.code_input();
    let shown: String = typed
        .chars()
        .chain(std::iter::repeat('_'))
        .take(CODE_LEN)
        .collect();
    cl.push(Line::from(vec![
        Span::styled(" Code: ", Style::default().fg(Color::White)),
        Span::styled(
            shown,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ]));
    // Keypad row; targets registered per cell by `register_keypad`.
    let keys: Vec<Span> = (0..10u16)
        .map(|i| {
            Span::styled(
                format!(" [{}]", keypad_digit(i)),
                Style::default().fg(Color::Yellow),
            )
        })
        .collect();
    cl.push(Line::from(keys));
    cl.push_clickable(
        Line::from(Span::styled(" [Enter] Unlock", Style::default().fg(Color::Green))),
        SUBMIT_CODE,
    );
    cl.push_clickable(
        Line::from(Span::styled(" [Bksp] Erase", Style::default().fg(Color::White))),
        ERASE_CODE,
    );
    cl.push_clickable(
        Line::from(Span::styled(" [Esc] Step back", Style::default().fg(Color::DarkGray))),
        CANCEL_CODE,
    );
    cl
}

/// Keypad cells show 1..9 then 0.
fn keypad_digit(cell: u16) -> u16 {
    (cell + 1) % 10
}

fn register_keypad(inner: Rect, cs: &mut ClickState) {
    let row = inner.y + 1;
    for cell in 0..10u16 {
        let x = inner.x + cell * KEY_CELL;
        if x + KEY_CELL > inner.x + inner.width {
            break;
        }
        cs.add_click_target(
            Rect::new(x, row, KEY_CELL, 1),
            KEYPAD_BASE + keypad_digit(cell),
        );
    }
}

fn bag_list(game: &EscapeGame) -> ClickableList<'static> {
    let mut cl = ClickableList::new();
    let entries = game.inventory().entries();
    if entries.is_empty() {
        cl.push(Line::from(Span::styled(
            " (nothing in the bag)",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (i, entry) in entries.iter().enumerate() {
        let color = match entry.category {
            ItemCategory::Important => Color::Yellow,
            ItemCategory::Fragment => Color::White,
            ItemCategory::Hint => Color::Cyan,
        };
        let marker = if game.selected() == Some(i) { "▶" } else { " " };
        cl.push_clickable(
            Line::from(vec![
                Span::styled(
                    format!("{marker}[{}] ", i + 1),
                    Style::default().fg(Color::Magenta),
                ),
                Span::styled(format!("{} x{}", entry.name, entry.count), Style::default().fg(color)),
            ]),
            BAG_ITEM_BASE + i as u16,
        );
    }

    let usable = game
        .selected()
        .and_then(|i| entries.get(i))
        .and_then(|e| ItemKind::from_name(&e.name))
        .filter(|k| k.is_usable());
    if let Some(kind) = usable {
        cl.push(Line::from(""));
        cl.push_clickable(
            Line::from(Span::styled(
                format!(" [U] Use {}", kind.name()),
                Style::default().fg(Color::Green),
            )),
            USE_SELECTED,
        );
    }
    cl.push_clickable(
        Line::from(Span::styled(" [I] Close", Style::default().fg(Color::DarkGray))),
        TOGGLE_BAG,
    );
    cl
}

fn epilogue_list() -> ClickableList<'static> {
    let mut cl = ClickableList::new();
    cl.push_clickable(
        Line::from(Span::styled(
            " [R] Play again",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        RESTART,
    );
    cl
}

// ── Journal ─────────────────────────────────────────────────

fn kind_color(kind: EntryKind) -> Color {
    match kind {
        EntryKind::Observation => Color::Gray,
        EntryKind::Memory => Color::Magenta,
        EntryKind::Clue => Color::Yellow,
        EntryKind::Emotion => Color::Red,
    }
}

fn render_journal(game: &EscapeGame, f: &mut Frame, area: Rect) {
    let entries = game.session().journal.entries();
    let visible = area.height.saturating_sub(2) as usize;
    let start = entries.len().saturating_sub(visible);
    let lines: Vec<Line> = entries[start..]
        .iter()
        .map(|e| {
            Line::from(vec![
                Span::styled(
                    format!(" {}: ", e.kind.label()),
                    Style::default().fg(kind_color(e.kind)).add_modifier(Modifier::BOLD),
                ),
                Span::styled(e.text.as_str(), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    // Keep the newest entry visible when long entries wrap.
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let total = paragraph.line_count(area.width.saturating_sub(2)) as u16;
    let scroll = total.saturating_sub(area.height.saturating_sub(2));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" Journal ");
    f.render_widget(paragraph.block(block).scroll((scroll, 0)), area);
}

fn render_help(
    game: &EscapeGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let (text, action) = match game.mode() {
        Mode::Explore => ("[1-9] Choose   [I] Bag", TOGGLE_BAG),
        Mode::CodeEntry => ("[0-9] Digits   Enter Unlock   Esc Step back", CANCEL_CODE),
        Mode::Bag => ("[1-9] Examine   [U] Use   [I] Close", TOGGLE_BAG),
        Mode::Epilogue => ("[R] Play again", RESTART),
    };
    let help = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(help, area);

    // The whole help bar is a click target.
    let mut cs = click_state.borrow_mut();
    cs.add_click_target(area, action);
}
