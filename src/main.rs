mod escape;
mod input;
mod logging;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use escape::rng::SimpleRng;
use escape::session::Session;
use escape::storage::KeyValueStorage;
use escape::EscapeGame;
use input::{pixel_to_cell, ClickState, InputEvent};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use tracing::debug;

/// Query the grid container's bounding rect and convert pixel coordinates to a cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_x = mouse_x as f64 - rect.left();
    let click_y = mouse_y as f64 - rect.top();

    let (col, row) = pixel_to_cell(
        click_x,
        click_y,
        (rect.width(), rect.height()),
        (cs.terminal_cols, cs.terminal_rows),
    )?;
    debug!(col, row, targets = cs.targets.len(), "click");
    Some((col, row))
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

#[cfg(target_arch = "wasm32")]
fn storage() -> Box<dyn KeyValueStorage> {
    Box::new(escape::storage::LocalStorage)
}

/// Native builds have no `localStorage`; important items last for the process.
#[cfg(not(target_arch = "wasm32"))]
fn storage() -> Box<dyn KeyValueStorage> {
    Box::new(escape::storage::MemoryStorage::new())
}

fn key_to_input(code: KeyCode) -> Option<InputEvent> {
    match code {
        KeyCode::Char(c) => Some(InputEvent::Key(c.to_ascii_lowercase())),
        KeyCode::Enter => Some(InputEvent::Enter),
        KeyCode::Esc => Some(InputEvent::Escape),
        KeyCode::Backspace => Some(InputEvent::Backspace),
        _ => None,
    }
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init();

    let session = Session::new(storage(), Box::new(SimpleRng::from_clock()));
    let game = Rc::new(RefCell::new(EscapeGame::new(session)));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let Some((col, row)) = dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs) else {
                return;
            };
            let action = cs.hit_test(col, row);
            drop(cs);

            if let Some(id) = action {
                game.borrow_mut().handle_input(&InputEvent::Click(id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let Some(event) = key_to_input(key_event.code) {
                game.borrow_mut().handle_input(&event);
            }
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            game.borrow_mut().update(now_ms());

            let gs = game.borrow();
            let size = f.area();
            {
                let mut cs = click_state.borrow_mut();
                cs.terminal_cols = size.width;
                cs.terminal_rows = size.height;
                cs.clear_targets();
            }
            gs.render(f, size, &click_state);
        }
    });

    Ok(())
}
