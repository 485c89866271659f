//! Item catalogue: names, categories and what the player learns on a closer look.

use super::code_room::{LOBBY_CODE, WARD_CODE};
use super::journal::EntryKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemKind {
    // Ward fragments
    ChartPiece,
    WallGraffitiPiece,
    MemoPiece,
    StickerPiece,
    // Lobby fragments
    MaintenanceChecklist,
    CctvFootage,
    CrumpledNote,
    LockPiece,
    // Important
    SwitchOrderHint,
    ExperimenterKey,
    MissingLever,
    DataChip,
    // Hint
    PasscodeHint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemCategory {
    /// One digit of a room code. Session item.
    Fragment,
    /// Survives room transitions.
    Important,
    /// Ephemeral hint item.
    Hint,
}

pub const ALL_ITEMS: &[ItemKind] = &[
    ItemKind::ChartPiece,
    ItemKind::WallGraffitiPiece,
    ItemKind::MemoPiece,
    ItemKind::StickerPiece,
    ItemKind::MaintenanceChecklist,
    ItemKind::CctvFootage,
    ItemKind::CrumpledNote,
    ItemKind::LockPiece,
    ItemKind::SwitchOrderHint,
    ItemKind::ExperimenterKey,
    ItemKind::MissingLever,
    ItemKind::DataChip,
    ItemKind::PasscodeHint,
];

impl ItemKind {
    /// Name used as the store key.
    pub fn name(self) -> &'static str {
        match self {
            ItemKind::ChartPiece => "Chart Piece",
            ItemKind::WallGraffitiPiece => "Wall Graffiti Piece",
            ItemKind::MemoPiece => "Memo Piece",
            ItemKind::StickerPiece => "Sticker Piece",
            ItemKind::MaintenanceChecklist => "Maintenance Checklist",
            ItemKind::CctvFootage => "CCTV Footage",
            ItemKind::CrumpledNote => "Crumpled Note",
            ItemKind::LockPiece => "Lock Piece",
            ItemKind::SwitchOrderHint => "Switch Order Hint",
            ItemKind::ExperimenterKey => "Experimenter's Key",
            ItemKind::MissingLever => "Missing Lever",
            ItemKind::DataChip => "Data Chip",
            ItemKind::PasscodeHint => "Passcode Hint",
        }
    }

    pub fn from_name(name: &str) -> Option<ItemKind> {
        ALL_ITEMS.iter().copied().find(|k| k.name() == name)
    }

    pub fn category(self) -> ItemCategory {
        match self {
            ItemKind::SwitchOrderHint
            | ItemKind::ExperimenterKey
            | ItemKind::MissingLever
            | ItemKind::DataChip => ItemCategory::Important,
            ItemKind::PasscodeHint => ItemCategory::Hint,
            _ => ItemCategory::Fragment,
        }
    }

    /// Only the lever and the chip do anything when used.
    pub fn is_usable(self) -> bool {
        matches!(self, ItemKind::MissingLever | ItemKind::DataChip)
    }
}

/// What examining a held item reveals, plus the journal line it leaves.
pub struct Examination {
    pub description: String,
    pub journal: String,
    pub journal_kind: EntryKind,
}

fn digit(code: &str, index: usize) -> char {
    code.chars().nth(index).unwrap_or('?')
}

pub fn examine(kind: ItemKind) -> Examination {
    let clue = |description: String, journal: String| Examination {
        description,
        journal,
        journal_kind: EntryKind::Clue,
    };
    match kind {
        ItemKind::ChartPiece => {
            let d = digit(WARD_CODE, 0);
            clue(
                format!("Looking closely at the chart, the patient's blood-pressure record shows an odd pattern. The number '{d}' keeps repeating. It must be the first digit of the code."),
                format!("Analyzed the chart piece. Found a repeating '{d}' in the blood-pressure record. This is probably the first clue."),
            )
        }
        ItemKind::WallGraffitiPiece => {
            let d = digit(WARD_CODE, 1);
            clue(
                format!("Among the graffiti there is a circled number '{d}', written in a different hand from the rest. Someone left it on purpose."),
                format!("Analyzed the wall graffiti piece. Found the circled number '{d}'. The second clue."),
            )
        }
        ItemKind::MemoPiece => {
            let d = digit(WARD_CODE, 2);
            clue(
                format!("Every sentence of the memo is underlined. Next to the last underline is a small '{d}'. It was written in a hurry."),
                format!("Analyzed the memo piece. Found '{d}' next to the last underline. The third clue."),
            )
        }
        ItemKind::StickerPiece => {
            let d = digit(WARD_CODE, 3);
            clue(
                format!("The sticker is badly worn, but the number '{d}' is still sharp. It has been stuck here a long time."),
                format!("Analyzed the sticker piece. Found '{d}' on the worn sticker. The last clue."),
            )
        }
        ItemKind::MaintenanceChecklist => {
            let d = digit(LOBBY_CODE, 0);
            clue(
                format!("The number '{d}' has been traced over twice in ballpoint pen. The technician left it on purpose. It looks like the first digit of the code."),
                format!("Analyzed the maintenance checklist. Found '{d}' traced over in pen. The first clue."),
            )
        }
        ItemKind::CctvFootage => {
            let d = digit(LOBBY_CODE, 1);
            clue(
                format!("The timecode at the bottom of the footage blinks ... 00:0{d}:** ... as if left there deliberately. It looks like the second digit of the code."),
                format!("Analyzed the CCTV footage. Found '{d}' in the timecode. The second clue."),
            )
        }
        ItemKind::CrumpledNote => {
            let d = digit(LOBBY_CODE, 2);
            clue(
                format!("Smoothing out the note reveals a number marked with a triangle: {d}. It looks like the third digit of the code."),
                format!("Analyzed the crumpled note. Found '{d}' marked with a triangle. The third clue."),
            )
        }
        ItemKind::LockPiece => {
            let d = digit(LOBBY_CODE, 3);
            clue(
                format!("Small scratches cover the surface. Something like an engraving catches the eye: '{d}'. It looks like the last digit of the code."),
                format!("Analyzed the lock piece. Found '{d}' between the scratches. The last clue."),
            )
        }
        ItemKind::SwitchOrderHint => clue(
            "The operating order of the power system is written here: press the switches red, blue, green to restore power. The order has to be exact.".into(),
            "Checked the switch order hint. The switches must be pressed red, blue, green.".into(),
        ),
        ItemKind::ExperimenterKey => clue(
            "A master key used by the experimenters. It seems to open every door in the facility.".into(),
            "Checked the experimenter's key. It should open every door in the facility.".into(),
        ),
        ItemKind::MissingLever => clue(
            "A part of the power breaker. The handle is labelled \"power recovery\". Putting it back should restore the power.".into(),
            "Checked the missing lever. Reinstalling it in the breaker should restore the power.".into(),
        ),
        ItemKind::DataChip => Examination {
            description: "The chip holds memory data from the surgery. Part of it is damaged, but it can be recovered. Inserting it into the terminal should bring the memories back.".into(),
            journal: "Checked the data chip. It holds memory data from the surgery; inserting it into the terminal should restore it.".into(),
            journal_kind: EntryKind::Memory,
        },
        ItemKind::PasscodeHint => clue(
            "A note summarising what is known about the door code.".into(),
            "Reviewed the passcode hint.".into(),
        ),
    }
}
