//! Escape rooms: a short narrative escape game.
//!
//! The puzzle core lives in the room controllers and the session stores.
//! [`EscapeGame`] maps input events onto controller operations, keeps the
//! text the renderer shows, and performs room entry once a pending
//! transition's delay has elapsed.

pub mod actions;
pub mod bag;
pub mod code_room;
pub mod items;
pub mod journal;
pub mod render;
pub mod rng;
pub mod room;
pub mod session;
pub mod storage;
pub mod store;
pub mod surgery;

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;
use tracing::info;

use crate::input::{ClickState, InputEvent};
use crate::time::TransitionTimer;

use actions::*;
use bag::ItemMap;
use code_room::{CodeRoom, DoorState, DOOR_TARGET, LOBBY, RANDOM_TARGET, WARD};
use items::{ItemCategory, ItemKind};
use journal::Emotion;
use room::{Outcome, RoomId, Transition};
use session::Session;
use surgery::{Decision, SurgeryRoom, SwitchColor, CHIP_TARGET, MISSING_SWITCH_TARGET};

/// Digits the door locks take.
pub const CODE_LEN: usize = 4;

pub enum ActiveRoom {
    Code(CodeRoom),
    Surgery(SurgeryRoom),
    /// Observation room. The story ends here.
    Epilogue { accepted: bool },
}

/// What the input keys currently mean.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Explore,
    CodeEntry,
    Bag,
    Epilogue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Interact(&'static str),
    RequestHint,
    Choose(Decision),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Choice {
    pub label: &'static str,
    pub command: Command,
}

impl Choice {
    fn interact(label: &'static str, target: &'static str) -> Self {
        Self {
            label,
            command: Command::Interact(target),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BagEntry {
    pub name: String,
    pub count: u32,
    pub category: ItemCategory,
}

/// Inventory snapshot kept current by store subscriptions.
#[derive(Debug, Default)]
pub struct InventoryView {
    pub important: ItemMap,
    pub items: ItemMap,
    pub hints: ItemMap,
}

impl InventoryView {
    /// Important items first, then session items, then hints.
    pub fn entries(&self) -> Vec<BagEntry> {
        let tagged = [
            (&self.important, ItemCategory::Important),
            (&self.items, ItemCategory::Fragment),
            (&self.hints, ItemCategory::Hint),
        ];
        tagged
            .into_iter()
            .flat_map(|(map, category)| {
                map.iter().map(move |(name, count)| BagEntry {
                    name: name.clone(),
                    count: *count,
                    category,
                })
            })
            .collect()
    }
}

pub struct EscapeGame {
    session: Session,
    room_id: RoomId,
    room: ActiveRoom,
    scene: String,
    message: String,
    code_input: String,
    bag_open: bool,
    selected: Option<usize>,
    pending: Option<Transition>,
    timer: TransitionTimer,
    inventory: Rc<RefCell<InventoryView>>,
}

impl EscapeGame {
    pub fn new(session: Session) -> Self {
        Self::with_timer(session, TransitionTimer::default())
    }

    pub fn with_timer(mut session: Session, timer: TransitionTimer) -> Self {
        let inventory = Rc::new(RefCell::new(InventoryView {
            important: session.important.items().clone(),
            items: session.items.items().clone(),
            hints: session.hints.items().clone(),
        }));
        {
            let view = Rc::clone(&inventory);
            session
                .important
                .subscribe(move |m| view.borrow_mut().important = m.clone());
        }
        {
            let view = Rc::clone(&inventory);
            session
                .items
                .subscribe(move |m| view.borrow_mut().items = m.clone());
        }
        {
            let view = Rc::clone(&inventory);
            session
                .hints
                .subscribe(move |m| view.borrow_mut().hints = m.clone());
        }

        let mut game = Self {
            session,
            room_id: RoomId::Ward,
            room: ActiveRoom::Code(CodeRoom::new(&WARD)),
            scene: String::new(),
            message: String::new(),
            code_input: String::new(),
            bag_open: false,
            selected: None,
            pending: None,
            timer,
            inventory,
        };
        game.enter(Transition::to(RoomId::Ward));
        game
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn room(&self) -> &ActiveRoom {
        &self.room
    }

    pub fn scene(&self) -> &str {
        &self.scene
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code_input(&self) -> &str {
        &self.code_input
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn pending_transition(&self) -> Option<&Transition> {
        self.pending.as_ref()
    }

    pub fn inventory(&self) -> Ref<'_, InventoryView> {
        self.inventory.borrow()
    }

    pub fn mode(&self) -> Mode {
        if self.bag_open {
            return Mode::Bag;
        }
        match &self.room {
            ActiveRoom::Epilogue { .. } => Mode::Epilogue,
            ActiveRoom::Code(room) if room.door() == DoorState::CodeEntryOpen => Mode::CodeEntry,
            _ => Mode::Explore,
        }
    }

    /// Choices offered in explore mode, in display order.
    pub fn choices(&self) -> Vec<Choice> {
        if self.pending.is_some() {
            return Vec::new();
        }
        match &self.room {
            ActiveRoom::Code(room) => {
                let mut choices: Vec<Choice> = room
                    .layout()
                    .fragments
                    .iter()
                    .map(|f| Choice::interact(f.label, f.target))
                    .collect();
                choices.push(Choice::interact("Look around more carefully", RANDOM_TARGET));
                choices.push(Choice {
                    label: "Think about the code",
                    command: Command::RequestHint,
                });
                choices.push(Choice::interact("Try the door", DOOR_TARGET));
                choices
            }
            ActiveRoom::Surgery(room) if room.choice_offered() => vec![
                Choice {
                    label: "Accept the memory",
                    command: Command::Choose(Decision::Accept),
                },
                Choice {
                    label: "Reject the memory",
                    command: Command::Choose(Decision::Reject),
                },
            ],
            ActiveRoom::Surgery(room) => {
                let mut choices = Vec::new();
                if !room.missing_switch_found() {
                    choices.push(Choice::interact(
                        "Search the floor for the missing switch",
                        MISSING_SWITCH_TARGET,
                    ));
                }
                for (color, label) in SwitchColor::ALL.into_iter().zip([
                    "Press the red switch",
                    "Press the blue switch",
                    "Press the green switch",
                ]) {
                    choices.push(Choice::interact(label, color.target()));
                }
                choices.push(Choice::interact("Insert the chip into the terminal", CHIP_TARGET));
                choices
            }
            ActiveRoom::Epilogue { .. } => Vec::new(),
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if self.pending.is_some() {
            return false;
        }
        match self.mode() {
            Mode::Bag => self.handle_bag_input(event),
            Mode::CodeEntry => self.handle_code_input(event),
            Mode::Epilogue => self.handle_epilogue_input(event),
            Mode::Explore => self.handle_explore_input(event),
        }
    }

    /// Per-frame hook. Enters the next room once the delay has elapsed.
    pub fn update(&mut self, now_ms: f64) {
        if self.timer.update(now_ms) {
            if let Some(transition) = self.pending.take() {
                self.enter(transition);
            }
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }

    // ── Input ───────────────────────────────────────────────────

    fn handle_explore_input(&mut self, event: &InputEvent) -> bool {
        let index = match event {
            InputEvent::Key('i') | InputEvent::Click(TOGGLE_BAG) => {
                self.open_bag();
                return true;
            }
            InputEvent::Key(c) => match c.to_digit(10) {
                Some(d) if d >= 1 => d as usize - 1,
                _ => return false,
            },
            InputEvent::Click(id) if *id >= CHOICE_BASE && *id < BAG_ITEM_BASE => {
                (*id - CHOICE_BASE) as usize
            }
            _ => return false,
        };
        let Some(choice) = self.choices().into_iter().nth(index) else {
            return false;
        };
        self.run(choice.command);
        true
    }

    fn handle_code_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key(c) if c.is_ascii_digit() => self.push_digit(*c),
            InputEvent::Click(id) if (KEYPAD_BASE..KEYPAD_BASE + 10).contains(id) => {
                let digit = char::from_digit((*id - KEYPAD_BASE) as u32, 10);
                if let Some(c) = digit {
                    self.push_digit(c);
                }
            }
            InputEvent::Enter | InputEvent::Click(SUBMIT_CODE) => self.submit_code(),
            InputEvent::Escape | InputEvent::Click(CANCEL_CODE) => self.cancel_code(),
            InputEvent::Backspace | InputEvent::Click(ERASE_CODE) => {
                self.code_input.pop();
            }
            InputEvent::Key('i') | InputEvent::Click(TOGGLE_BAG) => self.open_bag(),
            _ => return false,
        }
        true
    }

    fn handle_bag_input(&mut self, event: &InputEvent) -> bool {
        let index = match event {
            InputEvent::Key('i') | InputEvent::Escape | InputEvent::Click(TOGGLE_BAG) => {
                self.bag_open = false;
                self.selected = None;
                return true;
            }
            InputEvent::Key('u') | InputEvent::Click(USE_SELECTED) => {
                self.use_selected();
                return true;
            }
            InputEvent::Key(c) => match c.to_digit(10) {
                Some(d) if d >= 1 => d as usize - 1,
                _ => return false,
            },
            InputEvent::Click(id) if *id >= BAG_ITEM_BASE && *id < KEYPAD_BASE => {
                (*id - BAG_ITEM_BASE) as usize
            }
            _ => return false,
        };
        let Some(entry) = self.inventory().entries().into_iter().nth(index) else {
            return false;
        };
        self.selected = Some(index);
        if let Some(description) = self.session.examine_item(&entry.name) {
            self.message = description;
        }
        true
    }

    fn handle_epilogue_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key('r') | InputEvent::Click(RESTART) => {
                self.restart();
                true
            }
            InputEvent::Key('i') | InputEvent::Click(TOGGLE_BAG) => {
                self.open_bag();
                true
            }
            _ => false,
        }
    }

    // ── Commands ────────────────────────────────────────────────

    fn run(&mut self, command: Command) {
        self.message.clear();
        let outcome = match (command, &mut self.room) {
            (Command::Interact(target), ActiveRoom::Code(room)) => {
                room.interact(&mut self.session, target)
            }
            (Command::Interact(target), ActiveRoom::Surgery(room)) => {
                room.interact(&mut self.session, target)
            }
            (Command::RequestHint, ActiveRoom::Code(room)) => room.request_hint(&mut self.session),
            (Command::Choose(decision), ActiveRoom::Surgery(room)) => {
                room.choose(&mut self.session, decision)
            }
            _ => Outcome::none(),
        };
        self.apply(outcome);
    }

    fn push_digit(&mut self, c: char) {
        if self.code_input.len() < CODE_LEN {
            self.code_input.push(c);
        }
    }

    fn submit_code(&mut self) {
        let candidate = std::mem::take(&mut self.code_input);
        let outcome = match &mut self.room {
            ActiveRoom::Code(room) => room.submit_code(&mut self.session, &candidate),
            _ => Outcome::none(),
        };
        self.apply(outcome);
    }

    fn cancel_code(&mut self) {
        self.code_input.clear();
        let outcome = match &mut self.room {
            ActiveRoom::Code(room) => room.cancel_code_entry(),
            _ => Outcome::none(),
        };
        self.apply(outcome);
    }

    fn open_bag(&mut self) {
        self.bag_open = true;
        self.selected = None;
    }

    fn use_selected(&mut self) {
        let Some(index) = self.selected else {
            self.message = "Pick an item first.".into();
            return;
        };
        let entry = self.inventory().entries().into_iter().nth(index);
        let Some(kind) = entry.and_then(|e| ItemKind::from_name(&e.name)) else {
            return;
        };
        let outcome = self.use_important_item(kind);
        if outcome.offers_choice {
            self.bag_open = false;
        }
        self.selected = None;
        self.apply(outcome);
    }

    /// Use an important item. Only the lever and the data chip do anything.
    pub fn use_important_item(&mut self, kind: ItemKind) -> Outcome {
        if !kind.is_usable() {
            return Outcome::message(format!("The {} can't be used.", kind.name()));
        }
        if !self.session.holds(kind) {
            return Outcome::message("You don't have that.");
        }
        match (kind, &mut self.room) {
            (ItemKind::MissingLever, _) => self.session.use_missing_lever(),
            (ItemKind::DataChip, ActiveRoom::Surgery(room)) => {
                room.play_data_chip(&mut self.session)
            }
            (ItemKind::DataChip, _) => {
                Outcome::message("You turn the data chip over. There is no terminal here to play it.")
            }
            _ => Outcome::none(),
        }
    }

    fn apply(&mut self, outcome: Outcome) {
        if let Some(scene) = outcome.scene {
            self.scene = scene;
        }
        if let Some(message) = outcome.message {
            self.message = message;
        }
        if let Some(transition) = outcome.transition {
            info!(href = %transition.href(), "transition scheduled");
            self.pending = Some(transition);
            self.timer.schedule();
        }
    }

    // ── Rooms ───────────────────────────────────────────────────

    fn enter(&mut self, transition: Transition) {
        let room_id = transition.to;
        self.session.enter_room(room_id);
        self.room = match room_id {
            RoomId::Ward => ActiveRoom::Code(CodeRoom::new(&WARD)),
            RoomId::Lobby => ActiveRoom::Code(CodeRoom::new(&LOBBY)),
            RoomId::Surgery => ActiveRoom::Surgery(SurgeryRoom::new()),
            RoomId::Observation => ActiveRoom::Epilogue {
                accepted: transition.param("accept") == Some("1"),
            },
        };
        self.scene = match &self.room {
            ActiveRoom::Code(room) => room.layout().intro.to_string(),
            ActiveRoom::Surgery(_) => SurgeryRoom::intro().to_string(),
            ActiveRoom::Epilogue { accepted } => epilogue_scene(*accepted).to_string(),
        };
        if let ActiveRoom::Epilogue { accepted } = self.room {
            let emotion = if accepted { Emotion::Despair } else { Emotion::Neutral };
            self.session.journal.add_emotion_entry(emotion);
        }
        self.room_id = room_id;
        self.message.clear();
        self.code_input.clear();
        self.bag_open = false;
        self.selected = None;
    }

    /// Start over from the first room with an empty inventory.
    fn restart(&mut self) {
        self.session.teardown();
        self.session.clear_all_inventory();
        self.timer.cancel();
        self.pending = None;
        self.enter(Transition::to(RoomId::Ward));
    }
}

fn epilogue_scene(accepted: bool) -> &'static str {
    if accepted {
        "You step into the observation room carrying a memory you now believe. Behind the one-way glass, empty chairs face the surgery you just left."
    } else {
        "You step into the observation room still doubting what the chip showed. Behind the one-way glass, empty chairs face the surgery you just left."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::journal::EntryKind;
    use crate::escape::session::fixture::session;

    fn game(rolls: &[f64]) -> EscapeGame {
        EscapeGame::with_timer(session(rolls), TransitionTimer::new(0.0))
    }

    fn key(game: &mut EscapeGame, c: char) {
        game.handle_input(&InputEvent::Key(c));
    }

    fn type_code(game: &mut EscapeGame, code: &str) {
        for c in code.chars() {
            key(game, c);
        }
        game.handle_input(&InputEvent::Enter);
    }

    fn choice_index(game: &EscapeGame, command: Command) -> char {
        let i = game
            .choices()
            .iter()
            .position(|c| c.command == command)
            .unwrap();
        char::from_digit(i as u32 + 1, 10).unwrap()
    }

    fn advance(game: &mut EscapeGame) {
        game.update(0.0);
    }

    #[test]
    fn starts_in_the_ward_with_opening_entries() {
        let g = game(&[]);
        assert_eq!(g.room_id(), RoomId::Ward);
        assert_eq!(g.scene(), WARD.intro);
        assert_eq!(g.session().journal.len(), 2);
        assert_eq!(g.mode(), Mode::Explore);
    }

    #[test]
    fn choice_keys_inspect_targets() {
        let mut g = game(&[]);
        key(&mut g, '1');
        assert!(g.session().items.has("Chart Piece", 1));
        assert!(g.scene().contains('5'));
        assert!(!g.message().is_empty());
    }

    #[test]
    fn click_choices_match_keys() {
        let mut g = game(&[]);
        g.handle_input(&InputEvent::Click(CHOICE_BASE + 1));
        assert!(g.session().items.has("Wall Graffiti Piece", 1));
    }

    #[test]
    fn ward_to_lobby_through_the_keypad() {
        let mut g = game(&[]);
        let door = choice_index(&g, Command::Interact(DOOR_TARGET));
        key(&mut g, door);
        assert_eq!(g.mode(), Mode::CodeEntry);

        type_code(&mut g, "5679");
        assert_eq!(g.message(), "The code is wrong.");
        assert_eq!(g.mode(), Mode::CodeEntry);
        assert!(g.pending_transition().is_none());

        type_code(&mut g, "5678");
        assert_eq!(
            g.pending_transition().map(|t| t.to),
            Some(RoomId::Lobby)
        );
        assert!(!g.handle_input(&InputEvent::Key('1')));

        advance(&mut g);
        assert_eq!(g.room_id(), RoomId::Lobby);
        assert!(g.session().journal.is_empty());
    }

    #[test]
    fn keypad_clicks_and_erase() {
        let mut g = game(&[]);
        let door = choice_index(&g, Command::Interact(DOOR_TARGET));
        key(&mut g, door);
        for d in [5, 6, 7, 9, 9] {
            g.handle_input(&InputEvent::Click(KEYPAD_BASE + d));
        }
        assert_eq!(g.code_input(), "5679");
        g.handle_input(&InputEvent::Click(ERASE_CODE));
        g.handle_input(&InputEvent::Click(KEYPAD_BASE + 8));
        assert_eq!(g.code_input(), "5678");
        g.handle_input(&InputEvent::Click(SUBMIT_CODE));
        assert!(g.pending_transition().is_some());
    }

    #[test]
    fn cancel_restores_scene_and_clears_input() {
        let mut g = game(&[]);
        let door = choice_index(&g, Command::Interact(DOOR_TARGET));
        key(&mut g, door);
        key(&mut g, '5');
        g.handle_input(&InputEvent::Escape);
        assert_eq!(g.mode(), Mode::Explore);
        assert_eq!(g.code_input(), "");
        assert_eq!(g.scene(), WARD.intro);
    }

    #[test]
    fn transition_waits_for_the_delay() {
        let mut g = EscapeGame::with_timer(session(&[]), TransitionTimer::new(2000.0));
        let door = choice_index(&g, Command::Interact(DOOR_TARGET));
        key(&mut g, door);
        type_code(&mut g, "5678");
        g.update(0.0);
        g.update(400.0);
        assert_eq!(g.room_id(), RoomId::Ward);
        for i in 2..=6 {
            g.update(i as f64 * 400.0);
        }
        assert_eq!(g.room_id(), RoomId::Lobby);
    }

    #[test]
    fn hint_choice_grants_hint_item() {
        let mut g = game(&[]);
        let hint = choice_index(&g, Command::RequestHint);
        key(&mut g, hint);
        assert!(g.message().starts_with("Hint:"));
        assert_eq!(g.inventory().hints.len(), 1);
    }

    #[test]
    fn inventory_view_follows_stores() {
        let mut g = game(&[0.1]);
        key(&mut g, '1');
        let random = choice_index(&g, Command::Interact(RANDOM_TARGET));
        key(&mut g, random);
        let entries = g.inventory().entries();
        assert_eq!(entries[0].name, "Switch Order Hint");
        assert_eq!(entries[0].category, ItemCategory::Important);
        assert_eq!(entries[1].name, "Chart Piece");
    }

    #[test]
    fn bag_examines_selected_item() {
        let mut g = game(&[]);
        key(&mut g, '1');
        let journal_before = g.session().journal.len();
        key(&mut g, 'i');
        assert_eq!(g.mode(), Mode::Bag);
        key(&mut g, '1');
        assert_eq!(g.selected(), Some(0));
        assert!(g.message().contains("blood-pressure"));
        assert_eq!(g.session().journal.len(), journal_before + 1);
        key(&mut g, 'i');
        assert_eq!(g.mode(), Mode::Explore);
    }

    fn reach_surgery(g: &mut EscapeGame) {
        for (code, next) in [("5678", RoomId::Lobby), ("1234", RoomId::Surgery)] {
            let door = choice_index(g, Command::Interact(DOOR_TARGET));
            key(g, door);
            type_code(g, code);
            advance(g);
            assert_eq!(g.room_id(), next);
        }
    }

    #[test]
    fn full_run_to_the_epilogue() {
        let mut g = game(&[0.9]);
        reach_surgery(&mut g);

        key(&mut g, '1'); // missing switch
        assert!(g.session().important.has("Missing Lever", 1));
        // Switch choices shift up once the lever is found.
        for c in ['1', '2', '3'] {
            key(&mut g, c);
        }
        let chip = choice_index(&g, Command::Interact(CHIP_TARGET));
        key(&mut g, chip);
        assert_eq!(
            g.choices()[0].command,
            Command::Choose(Decision::Accept)
        );

        key(&mut g, '2');
        assert_eq!(
            g.pending_transition().map(|t| t.href()),
            Some("../rooms4/observation.html?accept=0".to_string())
        );
        advance(&mut g);
        assert_eq!(g.mode(), Mode::Epilogue);
        assert!(matches!(g.room(), ActiveRoom::Epilogue { accepted: false }));
        assert_eq!(g.session().journal.last().unwrap().kind, EntryKind::Emotion);
        assert!(g.session().important.has("Data Chip", 1));
    }

    #[test]
    fn restart_wipes_everything() {
        let mut g = game(&[0.9]);
        reach_surgery(&mut g);
        key(&mut g, '1');
        for c in ['1', '2', '3'] {
            key(&mut g, c);
        }
        let chip = choice_index(&g, Command::Interact(CHIP_TARGET));
        key(&mut g, chip);
        key(&mut g, '1');
        advance(&mut g);
        assert!(matches!(g.room(), ActiveRoom::Epilogue { accepted: true }));

        key(&mut g, 'r');
        assert_eq!(g.room_id(), RoomId::Ward);
        assert!(g.session().important.items().is_empty());
        assert!(g.inventory().entries().is_empty());
    }

    #[test]
    fn data_chip_outside_surgery_is_not_consumed() {
        let mut g = game(&[]);
        g.session.important.add("Data Chip", 1);
        let out = g.use_important_item(ItemKind::DataChip);
        assert!(out.message.is_some());
        assert!(!out.offers_choice);
        assert!(g.session().important.has("Data Chip", 1));
    }

    #[test]
    fn data_chip_in_surgery_reveals_choice_from_bag() {
        let mut g = game(&[0.9]);
        reach_surgery(&mut g);
        g.session.important.add("Data Chip", 1);

        key(&mut g, 'i');
        key(&mut g, '1');
        key(&mut g, 'u');
        assert_eq!(g.mode(), Mode::Explore);
        assert_eq!(g.choices().len(), 2);
        assert!(!g.session().important.has("Data Chip", 1));
    }

    #[test]
    fn unusable_or_missing_items() {
        let mut g = game(&[]);
        let out = g.use_important_item(ItemKind::ExperimenterKey);
        assert!(out.message.unwrap().contains("can't be used"));
        let out = g.use_important_item(ItemKind::MissingLever);
        assert_eq!(out.message.as_deref(), Some("You don't have that."));
    }
}
