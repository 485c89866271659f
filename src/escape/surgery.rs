//! Room 3: find the missing lever, restore power with the switch sequence,
//! play the data chip and choose whether to accept the memory.

use tracing::info;

use super::items::ItemKind;
use super::journal::EntryKind;
use super::room::{Outcome, RoomId, Transition};
use super::session::Session;

pub const MISSING_SWITCH_TARGET: &str = "missing_switch";
pub const CHIP_TARGET: &str = "chip";

const INTRO: &str = "A cold surgery. You see an operating table, an EEG terminal and a dead power panel. One of the switches seems to be missing.";
const MEMORY_SCENE: &str = "A recording plays on the terminal.\n\n[On screen, you overpower another test subject and walk up to a researcher.]\nResearcher: 'Stop! You'll get us all killed!'\n\nThe memory grows clearer and clearer...";
/// Chance that the experimenter's key lies next to the missing lever.
const KEY_NEAR_LEVER: f64 = 0.4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchColor {
    Red,
    Blue,
    Green,
}

impl SwitchColor {
    pub const ALL: [SwitchColor; 3] = [SwitchColor::Red, SwitchColor::Blue, SwitchColor::Green];

    pub fn name(self) -> &'static str {
        match self {
            SwitchColor::Red => "red",
            SwitchColor::Blue => "blue",
            SwitchColor::Green => "green",
        }
    }

    /// Interaction target, e.g. `switch_red`.
    pub fn target(self) -> &'static str {
        match self {
            SwitchColor::Red => "switch_red",
            SwitchColor::Blue => "switch_blue",
            SwitchColor::Green => "switch_green",
        }
    }

    fn from_target(target: &str) -> Option<SwitchColor> {
        Self::ALL.into_iter().find(|c| c.target() == target)
    }
}

pub const CORRECT_SEQUENCE: [SwitchColor; 3] =
    [SwitchColor::Red, SwitchColor::Blue, SwitchColor::Green];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

#[derive(Debug, Default)]
pub struct SurgeryRoom {
    sequence: Vec<SwitchColor>,
    missing_switch_found: bool,
    power_restored: bool,
    chip_inserted: bool,
    choice_offered: bool,
}

impl SurgeryRoom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intro() -> &'static str {
        INTRO
    }

    pub fn sequence(&self) -> &[SwitchColor] {
        &self.sequence
    }

    pub fn missing_switch_found(&self) -> bool {
        self.missing_switch_found
    }

    pub fn power_restored(&self) -> bool {
        self.power_restored
    }

    pub fn chip_inserted(&self) -> bool {
        self.chip_inserted
    }

    pub fn choice_offered(&self) -> bool {
        self.choice_offered
    }

    pub fn inspect(&mut self, session: &mut Session, target: &str) -> Outcome {
        if target != MISSING_SWITCH_TARGET {
            return Outcome::none();
        }
        if self.missing_switch_found {
            return Outcome::scene(
                "You already found the missing switch. Now it can go back into the breaker.",
            )
            .with_message("Already found the missing switch.");
        }

        self.missing_switch_found = true;
        // Unguarded: a lever kept from an earlier run stacks.
        session.important.add(ItemKind::MissingLever.name(), 1);
        session.journal.add_clue_entry(
            "Found the missing switch on the floor. It needs to go back into the breaker.",
        );

        if session.roll() < KEY_NEAR_LEVER && session.grant(ItemKind::ExperimenterKey) {
            session.journal.add_clue_entry(
                "Found the experimenters' master key next to the missing switch. It should open every door in the facility.",
            );
            return Outcome::scene(
                "You found the missing switch! And next to it, a key the experimenters use.",
            )
            .with_message("Found the missing switch and the experimenter's key!");
        }

        Outcome::scene(
            "You found the missing switch in a corner of the floor! It seems to be part of the power breaker.",
        )
        .with_message("Found the missing switch!")
    }

    /// Switch targets toggle, the chip target inserts the chip, and the
    /// missing switch is inspected.
    pub fn interact(&mut self, session: &mut Session, target: &str) -> Outcome {
        if let Some(color) = SwitchColor::from_target(target) {
            return self.toggle_switch(session, color);
        }
        if target == CHIP_TARGET {
            return self.insert_chip(session);
        }
        self.inspect(session, target)
    }

    pub fn toggle_switch(&mut self, session: &mut Session, color: SwitchColor) -> Outcome {
        if !self.missing_switch_found {
            return Outcome::message(
                "A switch is missing, so the switches can't be pressed. Find the missing switch first.",
            );
        }

        self.sequence.push(color);
        if self.sequence.len() < CORRECT_SEQUENCE.len() {
            return Outcome::message(format!(
                "Pressed the {} switch. ({}/{})",
                color.name(),
                self.sequence.len(),
                CORRECT_SEQUENCE.len()
            ));
        }

        let matched = self.sequence == CORRECT_SEQUENCE;
        self.sequence.clear();
        if matched {
            self.power_restored = true;
            session
                .journal
                .add_clue_entry("Pressed the switches in the right order and restored the power.");
            info!("surgery power restored");
            Outcome::message("Power restored! The terminal is working.")
        } else {
            session.journal.add_entry(
                "Pressed the switches in the wrong order. I should check the hint again.",
                EntryKind::Observation,
            );
            Outcome::message("Wrong switch order. Check the hint again.")
        }
    }

    pub fn insert_chip(&mut self, session: &mut Session) -> Outcome {
        if !self.power_restored {
            return Outcome::message(
                "The power is off, so the chip can't be inserted. Press the switches in the right order first.",
            );
        }
        if self.chip_inserted {
            return Outcome::message("The recording has already played.");
        }

        self.chip_inserted = true;
        self.choice_offered = true;
        if session.grant(ItemKind::DataChip) {
            session
                .journal
                .add_clue_entry("Got the data chip from the terminal. Now I can look at the memory.");
        }
        Outcome::scene(MEMORY_SCENE).with_message("").with_choice()
    }

    /// Use of the data chip from the inventory while in this room.
    pub fn play_data_chip(&mut self, session: &mut Session) -> Outcome {
        if !session.important.remove(ItemKind::DataChip.name(), 1) {
            return Outcome::message("You don't have that.");
        }
        self.choice_offered = true;
        session
            .journal
            .add_memory_entry("Played the data chip. The memory of the surgery came back.");
        Outcome::scene(MEMORY_SCENE)
            .with_message("The data chip plays its memory.")
            .with_choice()
    }

    /// Only available once the memory has played.
    pub fn choose(&mut self, session: &mut Session, decision: Decision) -> Outcome {
        if !self.choice_offered {
            return Outcome::none();
        }
        self.choice_offered = false;

        let (journal, message, accept) = match decision {
            Decision::Accept => (
                "Accepted the memory. Hidden feelings begin to come back.",
                "You accept that this memory is true. Hidden feelings come back to life. (Moving...)",
                "1",
            ),
            Decision::Reject => (
                "Rejected the memory. The truth must be somewhere else.",
                "You believe this memory was manipulated. The truth lies elsewhere. (Moving...)",
                "0",
            ),
        };
        session.journal.add_memory_entry(journal);
        info!(?decision, "memory choice made");
        Outcome::message(message)
            .with_transition(Transition::to(RoomId::Observation).with_param("accept", accept))
    }
}
