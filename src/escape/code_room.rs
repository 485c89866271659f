//! Rooms 1 and 2: collect digit fragments, then open a 4-digit door lock.
//!
//! Both rooms share one controller. Everything room-specific (targets,
//! texts, random bands, the code itself) is static [`RoomLayout`] data.

use std::collections::BTreeSet;

use tracing::info;

use super::items::{ItemCategory, ItemKind};
use super::journal::EntryKind;
use super::room::{Outcome, RoomId, Transition};
use super::session::Session;

pub const WARD_CODE: &str = "5678";
pub const LOBBY_CODE: &str = "1234";

/// Target name for the "look around" action.
pub const RANDOM_TARGET: &str = "random";
/// Target name that opens the code lock.
pub const DOOR_TARGET: &str = "door";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorState {
    Exploring,
    CodeEntryOpen,
    Unlocked,
}

/// Precondition on a fragment target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    Open,
    /// Inspecting this target turns the room's power on.
    PowersOn,
    /// Only yields once power is on.
    NeedsPower,
}

pub struct Fragment {
    pub target: &'static str,
    pub label: &'static str,
    pub item: ItemKind,
    /// Index of the code digit this fragment reveals.
    pub digit: usize,
    /// May contain `{digit}`.
    pub scene: &'static str,
    pub found: &'static str,
    pub journal: &'static str,
    pub gate: Gate,
}

/// One step of the look-around roll: fires when the draw is below
/// `below` and `item` is not already held.
pub struct RandomBand {
    pub below: f64,
    pub item: ItemKind,
    pub scene: &'static str,
    pub found: &'static str,
    pub journal: &'static str,
}

pub struct RoomLayout {
    pub room: RoomId,
    pub code: &'static str,
    pub next: RoomId,
    pub intro: &'static str,
    pub door_scene: &'static str,
    pub unlocked: &'static str,
    pub success_journal: &'static str,
    pub success_kind: EntryKind,
    pub fragments: &'static [Fragment],
    pub bands: &'static [RandomBand],
    pub already_powered: &'static str,
    pub no_power: &'static str,
    pub hint: fn(&str) -> String,
}

const NOTHING_SCENE: &str = "You look around more carefully but find nothing special. Better to examine something else more closely.";
const NOTHING_FOUND: &str = "Found nothing special.";
const NOTHING_JOURNAL: &str = "Looked around more carefully but found nothing special.";
const WRONG_CODE: &str = "The code is wrong.";
const ENTER_CODE: &str = "Enter the code.";

pub static WARD: RoomLayout = RoomLayout {
    room: RoomId::Ward,
    code: WARD_CODE,
    next: RoomId::Lobby,
    intro: "You are locked in an old hospital ward. Looking around you see a chart, graffiti on the wall, a memo and a sticker. Find a way out.",
    door_scene: "You stand in front of the ward door. It has a 4-digit combination lock. You will need the code to open it.",
    unlocked: "Click. The lock opens. The door swings open and you head for the lobby...",
    success_journal: "Opened the door of the old ward. Now I can get out to the lobby.",
    success_kind: EntryKind::Clue,
    fragments: &[
        Fragment {
            target: "chart",
            label: "Check the chart",
            item: ItemKind::ChartPiece,
            digit: 0,
            scene: "A faint mark in the corner of the chart: '{digit}'. What could it mean?",
            found: "Found the first digit clue on the chart.",
            journal: "Found a piece of the chart with a number on it. A closer look might tell me more.",
            gate: Gate::Open,
        },
        Fragment {
            target: "wall",
            label: "Look at the wall graffiti",
            item: ItemKind::WallGraffitiPiece,
            digit: 1,
            scene: "Among the graffiti one number is circled for emphasis: {digit}",
            found: "Found the second digit clue on the wall.",
            journal: "Found a piece of the graffiti with a circled number. The handwriting differs from the rest.",
            gate: Gate::Open,
        },
        Fragment {
            target: "memo",
            label: "Pick up the memo",
            item: ItemKind::MemoPiece,
            digit: 2,
            scene: "Every sentence of the memo ends with an underline. Next to the last one is a small '{digit}'.",
            found: "Found the third digit clue on the floor.",
            journal: "Found a piece of the memo on the floor, underlined and numbered. Someone wrote it in a hurry.",
            gate: Gate::Open,
        },
        Fragment {
            target: "sticker",
            label: "Examine the sticker",
            item: ItemKind::StickerPiece,
            digit: 3,
            scene: "The sticker is mostly worn away, but the number '{digit}' is still sharp.",
            found: "Found the fourth digit clue on the sticker.",
            journal: "Found a number clue on the sticker stuck to the bed. It has been there a long time.",
            gate: Gate::Open,
        },
    ],
    bands: &[
        RandomBand {
            below: 0.3,
            item: ItemKind::SwitchOrderHint,
            scene: "Looking around more carefully, you find a small note in the corner of the wall: 'Press the switches red, blue, green to restore the power.'",
            found: "Found the switch order hint!",
            journal: "Found an important hint about the switch order in the corner of the wall.",
        },
        RandomBand {
            below: 0.6,
            item: ItemKind::ExperimenterKey,
            scene: "Looking around more carefully, you find a key on the floor. It looks like a master key the experimenters use to open every door in the facility.",
            found: "Found the experimenter's key! This is a very important item.",
            journal: "Found the experimenters' master key on the floor. It should open every door in the facility.",
        },
    ],
    already_powered: "",
    no_power: "",
    hint: ward_hint,
};

pub static LOBBY: RoomLayout = RoomLayout {
    room: RoomId::Lobby,
    code: LOBBY_CODE,
    next: RoomId::Surgery,
    intro: "You reach the lobby. The power is off and it is dark; only a CCTV monitor flickers.",
    door_scene: "You stand in front of the door to the surgery. It has a 4-digit combination lock. You will need the code to open it.",
    unlocked: "The door opens. Following the dark corridor, you move on to the next area...",
    success_journal: "Opened the lobby door. The corridor leads to the surgery. I seem to be going deeper and deeper.",
    success_kind: EntryKind::Observation,
    fragments: &[
        Fragment {
            target: "breaker",
            label: "Check the power breaker",
            item: ItemKind::MaintenanceChecklist,
            digit: 0,
            scene: "A maintenance checklist is taped next to the breaker lever. Something has been traced over in ballpoint pen.",
            found: "Got the maintenance checklist from the breaker.",
            journal: "Found a maintenance checklist at the power breaker. Something is traced over in pen; it looks like an important clue.",
            gate: Gate::PowersOn,
        },
        Fragment {
            target: "cctv",
            label: "Watch the CCTV monitor",
            item: ItemKind::CctvFootage,
            digit: 1,
            scene: "The CCTV screen flickers as it plays. The timecode at the bottom keeps changing.",
            found: "Got the footage from the CCTV.",
            journal: "Found a recording on the CCTV monitor. The timecode keeps changing; someone left it on purpose.",
            gate: Gate::NeedsPower,
        },
        Fragment {
            target: "note",
            label: "Pick up the crumpled note",
            item: ItemKind::CrumpledNote,
            digit: 2,
            scene: "One number on the crumpled note is marked with a triangle: {digit}",
            found: "Picked up a crumpled note from the floor.",
            journal: "Found a crumpled note on the floor. A number is marked with a triangle; probably an important clue.",
            gate: Gate::Open,
        },
    ],
    bands: &[
        RandomBand {
            below: 0.25,
            item: ItemKind::SwitchOrderHint,
            scene: "Looking around more carefully, you find a manual next to the breaker. It clearly says 'Switch order: red, blue, green'.",
            found: "Found the switch order hint!",
            journal: "Found an important hint about the switch order in the power breaker manual.",
        },
        RandomBand {
            below: 0.5,
            item: ItemKind::LockPiece,
            scene: "Looking around more carefully, you find a small lock piece on the floor. Its surface is scratched.",
            found: "Found a lock piece!",
            journal: "Found a lock piece on the floor. The scratches on its surface might hold a clue.",
        },
        RandomBand {
            below: 0.75,
            item: ItemKind::ExperimenterKey,
            scene: "Looking around more carefully, you find a key behind the CCTV monitor. It looks like a master key the experimenters use to open every door in the facility.",
            found: "Found the experimenter's key! This is a very important item.",
            journal: "Found the experimenters' master key behind the CCTV monitor. It should open every door in the facility.",
        },
    ],
    already_powered: "The power is already on.",
    no_power: "The monitor is off. It needs power.",
    hint: lobby_hint,
};

fn digits(code: &str) -> Vec<u32> {
    code.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn ward_hint(code: &str) -> String {
    let d = digits(code);
    let (Some(first), Some(last)) = (d.first(), d.last()) else {
        return String::new();
    };
    let sum: u32 = d.iter().sum();
    let parity = if last % 2 == 0 { "even" } else { "odd" };
    format!("Hint: the first digit is {first}, the digits add up to {sum}, the last digit is {parity}.")
}

fn lobby_hint(code: &str) -> String {
    let d = digits(code);
    if d.len() < 4 {
        return String::new();
    }
    let middle = match d[1].cmp(&d[2]) {
        std::cmp::Ordering::Greater => "the second digit is larger than the third",
        std::cmp::Ordering::Less => "the third digit is larger than the second",
        std::cmp::Ordering::Equal => "the second and third digits are equal",
    };
    format!("Hint: first x last = {}, {middle}.", d[0] * d[3])
}

pub struct CodeRoom {
    layout: &'static RoomLayout,
    door: DoorState,
    collected: BTreeSet<ItemKind>,
    power_on: bool,
}

impl CodeRoom {
    pub fn new(layout: &'static RoomLayout) -> Self {
        Self {
            layout,
            door: DoorState::Exploring,
            collected: BTreeSet::new(),
            power_on: false,
        }
    }

    pub fn layout(&self) -> &'static RoomLayout {
        self.layout
    }

    pub fn door(&self) -> DoorState {
        self.door
    }

    pub fn power_on(&self) -> bool {
        self.power_on
    }

    /// Fragments picked up in this room so far.
    pub fn collected(&self) -> &BTreeSet<ItemKind> {
        &self.collected
    }

    /// Unknown targets do nothing.
    pub fn inspect(&mut self, session: &mut Session, target: &str) -> Outcome {
        if self.door == DoorState::Unlocked {
            return Outcome::none();
        }
        if target == RANDOM_TARGET {
            return self.look_around(session);
        }
        let Some(fragment) = self.layout.fragments.iter().find(|f| f.target == target) else {
            return Outcome::none();
        };

        match fragment.gate {
            Gate::PowersOn if self.power_on => {
                return Outcome::scene(self.layout.already_powered);
            }
            Gate::PowersOn => {
                self.power_on = true;
                info!(room = self.layout.room.title(), "power on");
            }
            Gate::NeedsPower if !self.power_on => {
                return Outcome::scene(self.layout.no_power);
            }
            _ => {}
        }

        let scene = self.fill_digit(fragment.scene, fragment.digit);
        if !session.grant(fragment.item) {
            return Outcome::scene(scene);
        }
        self.collected.insert(fragment.item);
        session
            .journal
            .add_entry(fragment.journal, EntryKind::Observation);
        Outcome::scene(scene).with_message(fragment.found)
    }

    /// The door opens the code lock; anything else is an inspection.
    pub fn interact(&mut self, session: &mut Session, target: &str) -> Outcome {
        if target == DOOR_TARGET {
            return self.open_code_entry();
        }
        self.inspect(session, target)
    }

    fn look_around(&mut self, session: &mut Session) -> Outcome {
        let r = session.roll();
        for band in self.layout.bands {
            if r < band.below && !session.holds(band.item) {
                session.grant(band.item);
                if band.item.category() == ItemCategory::Fragment {
                    self.collected.insert(band.item);
                }
                session.journal.add_clue_entry(band.journal);
                return Outcome::scene(band.scene).with_message(band.found);
            }
        }
        session
            .journal
            .add_entry(NOTHING_JOURNAL, EntryKind::Observation);
        Outcome::scene(NOTHING_SCENE).with_message(NOTHING_FOUND)
    }

    pub fn open_code_entry(&mut self) -> Outcome {
        if self.door != DoorState::Exploring {
            return Outcome::none();
        }
        self.door = DoorState::CodeEntryOpen;
        Outcome::scene(self.layout.door_scene).with_message(ENTER_CODE)
    }

    /// Exact match unlocks and requests the move to the next room.
    /// A mismatch leaves every store untouched.
    pub fn submit_code(&mut self, session: &mut Session, candidate: &str) -> Outcome {
        if self.door != DoorState::CodeEntryOpen {
            return Outcome::none();
        }
        if candidate != self.layout.code {
            return Outcome::message(WRONG_CODE);
        }
        self.door = DoorState::Unlocked;
        session
            .journal
            .add_entry(self.layout.success_journal, self.layout.success_kind);
        info!(
            from = self.layout.room.title(),
            to = self.layout.next.title(),
            "door unlocked"
        );
        Outcome::message(self.layout.unlocked).with_transition(Transition::to(self.layout.next))
    }

    pub fn cancel_code_entry(&mut self) -> Outcome {
        if self.door != DoorState::CodeEntryOpen {
            return Outcome::none();
        }
        self.door = DoorState::Exploring;
        Outcome::scene(self.layout.intro).with_message("")
    }

    /// Derived hint about the code; the first request also leaves a
    /// passcode hint item.
    pub fn request_hint(&self, session: &mut Session) -> Outcome {
        session.grant(ItemKind::PasscodeHint);
        Outcome::message((self.layout.hint)(self.layout.code))
    }

    fn fill_digit(&self, text: &str, index: usize) -> String {
        let digit = self
            .layout
            .code
            .chars()
            .nth(index)
            .map(String::from)
            .unwrap_or_default();
        text.replace("{digit}", &digit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::session::fixture::session;

    #[test]
    fn correct_ward_code_unlocks() {
        let mut s = session(&[]);
        let mut room = CodeRoom::new(&WARD);
        room.open_code_entry();
        let out = room.submit_code(&mut s, "5678");
        assert_eq!(room.door(), DoorState::Unlocked);
        assert_eq!(out.transition, Some(Transition::to(RoomId::Lobby)));
        assert_eq!(s.journal.last().unwrap().kind, EntryKind::Clue);
    }

    #[test]
    fn wrong_code_keeps_entry_open_and_stores_untouched() {
        let mut s = session(&[]);
        s.items.add("Chart Piece", 1);
        let mut room = CodeRoom::new(&WARD);
        room.open_code_entry();
        let items_before = s.items.items().clone();
        let important_before = s.important.items().clone();

        let out = room.submit_code(&mut s, "5679");
        assert_eq!(room.door(), DoorState::CodeEntryOpen);
        assert_eq!(out.message.as_deref(), Some(WRONG_CODE));
        assert_eq!(out.transition, None);
        assert_eq!(s.items.items(), &items_before);
        assert_eq!(s.important.items(), &important_before);
        assert!(s.journal.is_empty());

        // Unlimited retries.
        room.submit_code(&mut s, "5678");
        assert_eq!(room.door(), DoorState::Unlocked);
    }

    #[test]
    fn submit_without_open_entry_is_ignored() {
        let mut s = session(&[]);
        let mut room = CodeRoom::new(&WARD);
        assert!(room.submit_code(&mut s, "5678").is_none());
        assert_eq!(room.door(), DoorState::Exploring);
    }

    #[test]
    fn cancel_returns_to_exploring() {
        let mut room = CodeRoom::new(&LOBBY);
        room.open_code_entry();
        let out = room.cancel_code_entry();
        assert_eq!(room.door(), DoorState::Exploring);
        assert_eq!(out.scene.as_deref(), Some(LOBBY.intro));
    }

    #[test]
    fn interact_door_opens_code_entry() {
        let mut s = session(&[]);
        let mut room = CodeRoom::new(&WARD);
        room.interact(&mut s, DOOR_TARGET);
        assert_eq!(room.door(), DoorState::CodeEntryOpen);
    }

    #[test]
    fn repeated_fragment_inspection_grants_once() {
        let mut s = session(&[]);
        let mut room = CodeRoom::new(&WARD);

        let first = room.inspect(&mut s, "chart");
        assert!(first.scene.unwrap().contains("'5'"));
        assert!(first.message.is_some());

        let again = room.inspect(&mut s, "chart");
        assert!(again.scene.is_some());
        assert!(again.message.is_none());

        assert_eq!(s.items.count("Chart Piece"), 1);
        assert_eq!(s.journal.len(), 1);
        assert!(room.collected().contains(&ItemKind::ChartPiece));
    }

    #[test]
    fn unknown_target_is_ignored() {
        let mut s = session(&[]);
        let mut room = CodeRoom::new(&WARD);
        assert!(room.inspect(&mut s, "ceiling").is_none());
        assert!(s.items.is_empty());
    }

    #[test]
    fn cctv_needs_breaker_first() {
        let mut s = session(&[]);
        let mut room = CodeRoom::new(&LOBBY);

        let dark = room.inspect(&mut s, "cctv");
        assert_eq!(dark.scene.as_deref(), Some(LOBBY.no_power));
        assert!(!s.items.has("CCTV Footage", 1));

        room.inspect(&mut s, "breaker");
        assert!(room.power_on());
        assert!(s.items.has("Maintenance Checklist", 1));

        room.inspect(&mut s, "cctv");
        assert!(s.items.has("CCTV Footage", 1));
    }

    #[test]
    fn breaker_twice_reports_power_already_on() {
        let mut s = session(&[]);
        let mut room = CodeRoom::new(&LOBBY);
        room.inspect(&mut s, "breaker");
        let again = room.inspect(&mut s, "breaker");
        assert_eq!(again.scene.as_deref(), Some(LOBBY.already_powered));
        assert_eq!(s.journal.len(), 1);
    }

    #[test]
    fn ward_random_bands() {
        // 0.1: switch hint; 0.1 again: hint held, falls to the key band;
        // 0.1 a third time: both held, nothing.
        let mut s = session(&[0.1, 0.1, 0.1]);
        let mut room = CodeRoom::new(&WARD);

        room.inspect(&mut s, RANDOM_TARGET);
        assert!(s.important.has("Switch Order Hint", 1));

        room.inspect(&mut s, RANDOM_TARGET);
        assert!(s.important.has("Experimenter's Key", 1));

        let out = room.inspect(&mut s, RANDOM_TARGET);
        assert_eq!(out.message.as_deref(), Some(NOTHING_FOUND));
        assert_eq!(s.journal.last().unwrap().kind, EntryKind::Observation);
        assert_eq!(s.important.items().len(), 2);
    }

    #[test]
    fn ward_high_roll_finds_nothing() {
        let mut s = session(&[0.6]);
        let mut room = CodeRoom::new(&WARD);
        let out = room.inspect(&mut s, RANDOM_TARGET);
        assert_eq!(out.scene.as_deref(), Some(NOTHING_SCENE));
        assert!(s.important.items().is_empty());
    }

    #[test]
    fn lobby_lock_piece_band_is_a_fragment() {
        let mut s = session(&[0.3]);
        let mut room = CodeRoom::new(&LOBBY);
        room.inspect(&mut s, RANDOM_TARGET);
        assert!(s.items.has("Lock Piece", 1));
        assert!(s.important.items().is_empty());
        assert!(room.collected().contains(&ItemKind::LockPiece));
    }

    #[test]
    fn lobby_key_band() {
        let mut s = session(&[0.7]);
        let mut room = CodeRoom::new(&LOBBY);
        room.inspect(&mut s, RANDOM_TARGET);
        assert!(s.important.has("Experimenter's Key", 1));
    }

    #[test]
    fn hints_derive_from_codes() {
        assert_eq!(
            ward_hint(WARD_CODE),
            "Hint: the first digit is 5, the digits add up to 26, the last digit is even."
        );
        assert_eq!(
            lobby_hint(LOBBY_CODE),
            "Hint: first x last = 4, the third digit is larger than the second."
        );
    }

    #[test]
    fn request_hint_grants_hint_item_once() {
        let mut s = session(&[]);
        let room = CodeRoom::new(&WARD);
        room.request_hint(&mut s);
        room.request_hint(&mut s);
        assert_eq!(s.hints.count("Passcode Hint"), 1);
    }
}
