//! One play session: the three stores, the journal and the random source.
//!
//! Built once by the shell and handed to room controllers by `&mut`.

use tracing::{debug, info};

use super::items::{self, ItemCategory, ItemKind};
use super::journal::Journal;
use super::rng::RandomSource;
use super::room::{Outcome, RoomId};
use super::storage::KeyValueStorage;
use super::store::{HintItemStore, ImportantItemStore, ItemStore};

const OPENING_ENTRIES: [&str; 2] = [
    "I woke up in an unfamiliar hospital ward. My memory is hazy and I can't remember how I got here.",
    "There seem to be notes and fragments left all over the room. Someone may have left them on purpose.",
];

pub struct Session {
    pub items: ItemStore,
    pub important: ImportantItemStore,
    pub hints: HintItemStore,
    pub journal: Journal,
    rng: Box<dyn RandomSource>,
}

impl Session {
    pub fn new(storage: Box<dyn KeyValueStorage>, rng: Box<dyn RandomSource>) -> Self {
        Self {
            items: ItemStore::new(),
            important: ImportantItemStore::open(storage),
            hints: HintItemStore::new(),
            journal: Journal::new(),
            rng,
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Draw from the random source, in `[0, 1)`.
    pub fn roll(&mut self) -> f64 {
        self.rng.next_f64()
    }

    /// Whether the item is held in the store its category lives in.
    pub fn holds(&self, kind: ItemKind) -> bool {
        match kind.category() {
            ItemCategory::Important => self.important.has(kind.name(), 1),
            ItemCategory::Hint => self.hints.has(kind.name(), 1),
            ItemCategory::Fragment => self.items.has(kind.name(), 1),
        }
    }

    /// Add one of `kind` unless it is already held. Returns whether it was added.
    pub fn grant(&mut self, kind: ItemKind) -> bool {
        if self.holds(kind) {
            return false;
        }
        match kind.category() {
            ItemCategory::Important => self.important.add(kind.name(), 1),
            ItemCategory::Hint => self.hints.add(kind.name(), 1),
            ItemCategory::Fragment => self.items.add(kind.name(), 1),
        }
        debug!(item = kind.name(), "granted");
        true
    }

    /// Reset per-room state. Important items are untouched.
    pub fn enter_room(&mut self, room: RoomId) {
        self.items.clear();
        self.hints.clear();
        self.journal.clear();
        if room == RoomId::Ward {
            for text in OPENING_ENTRIES {
                self.journal.add_memory_entry(text);
            }
        }
        info!(room = room.title(), "entered room");
    }

    /// Wipe session items but keep important ones, re-read from storage.
    pub fn clear_normal_inventory(&mut self) {
        self.items.clear();
        self.important.reload();
    }

    pub fn clear_all_inventory(&mut self) {
        self.items.clear();
        self.important.clear();
    }

    /// Whole-game exit.
    pub fn teardown(&mut self) {
        self.items.clear();
        self.hints.clear();
        self.journal.clear();
        info!("session torn down");
    }

    /// Describe a held item and note it in the journal.
    /// Unknown or unheld items give `None`.
    pub fn examine_item(&mut self, name: &str) -> Option<String> {
        let kind = ItemKind::from_name(name)?;
        if !self.holds(kind) {
            return None;
        }
        let exam = items::examine(kind);
        self.journal.add_entry(exam.journal, exam.journal_kind);
        Some(exam.description)
    }

    /// Put the lever back in the breaker.
    pub fn use_missing_lever(&mut self) -> Outcome {
        let name = ItemKind::MissingLever.name();
        if !self.important.remove(name, 1) {
            return Outcome::message("You don't have that.");
        }
        self.journal
            .add_clue_entry("Used the missing lever on the power breaker. The breaker looks complete again.");
        Outcome::message("You fit the lever into the breaker. Something clicks into place.")
    }
}


#[cfg(test)]
mod tests {
    use super::fixture::{session, session_with};
    use super::*;
    use crate::escape::journal::EntryKind;
    use crate::escape::storage::MemoryStorage;

    #[test]
    fn clear_normal_keeps_important() {
        let mut s = session(&[]);
        s.important.add("A", 2);
        s.items.add("B", 1);
        s.clear_normal_inventory();
        assert!(s.important.has("A", 2));
        assert!(!s.items.has("B", 1));
    }

    #[test]
    fn clear_all_wipes_important_too() {
        let mut s = session(&[]);
        s.important.add("A", 1);
        s.items.add("B", 1);
        s.clear_all_inventory();
        assert!(s.important.items().is_empty());
        assert!(s.items.is_empty());
    }

    #[test]
    fn entering_a_room_resets_session_state() {
        let mut s = session(&[]);
        s.items.add("Chart Piece", 1);
        s.hints.add("Passcode Hint", 1);
        s.important.add("Data Chip", 1);
        s.journal.add_clue_entry("old");

        s.enter_room(RoomId::Lobby);
        assert!(s.items.is_empty());
        assert!(s.hints.is_empty());
        assert!(s.journal.is_empty());
        assert!(s.important.has("Data Chip", 1));
    }

    #[test]
    fn ward_entry_seeds_opening_entries() {
        let mut s = session(&[]);
        s.enter_room(RoomId::Ward);
        assert_eq!(s.journal.len(), 2);
        assert!(s.journal.entries()[0].text.contains("woke up"));
    }

    #[test]
    fn important_items_survive_a_new_session() {
        let storage = MemoryStorage::new();
        {
            let mut s = session_with(storage.clone(), &[]);
            s.grant(ItemKind::MissingLever);
        }
        let mut s = session_with(storage, &[]);
        s.enter_room(RoomId::Surgery);
        assert!(s.holds(ItemKind::MissingLever));
    }

    #[test]
    fn grant_routes_by_category_and_is_idempotent() {
        let mut s = session(&[]);
        assert!(s.grant(ItemKind::ChartPiece));
        assert!(!s.grant(ItemKind::ChartPiece));
        assert!(s.grant(ItemKind::DataChip));
        assert!(s.grant(ItemKind::PasscodeHint));
        assert_eq!(s.items.count("Chart Piece"), 1);
        assert!(s.important.has("Data Chip", 1));
        assert!(s.hints.has("Passcode Hint", 1));
    }

    #[test]
    fn examine_held_item_journals_it() {
        let mut s = session(&[]);
        s.grant(ItemKind::MemoPiece);
        let text = s.examine_item("Memo Piece").unwrap();
        assert!(text.contains('7'));
        assert_eq!(s.journal.last().unwrap().kind, EntryKind::Clue);
    }

    #[test]
    fn examine_unheld_or_unknown_is_none() {
        let mut s = session(&[]);
        assert_eq!(s.examine_item("Memo Piece"), None);
        assert_eq!(s.examine_item("Rubber Duck"), None);
        assert!(s.journal.is_empty());
    }

    #[test]
    fn using_the_lever_consumes_it() {
        let mut s = session(&[]);
        s.grant(ItemKind::MissingLever);
        let out = s.use_missing_lever();
        assert!(out.message.is_some());
        assert!(!s.holds(ItemKind::MissingLever));
        assert_eq!(s.journal.len(), 1);

        s.use_missing_lever();
        assert_eq!(s.journal.len(), 1);
    }

    #[test]
    fn teardown_clears_hints() {
        let mut s = session(&[]);
        s.grant(ItemKind::PasscodeHint);
        s.teardown();
        assert!(s.hints.is_empty());
    }
}
