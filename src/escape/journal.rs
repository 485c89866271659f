//! Player journal: an ordered log of typed narrative entries.
//!
//! Never persisted. The journal is cleared whenever a room is entered.

use super::room::RoomId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntryKind {
    #[default]
    Observation,
    Memory,
    Clue,
    Emotion,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Observation => "Observation",
            EntryKind::Memory => "Memory",
            EntryKind::Clue => "Clue",
            EntryKind::Emotion => "Emotion",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emotion {
    Anger,
    Despair,
    Empathy,
    Neutral,
}

impl Emotion {
    fn text(self) -> &'static str {
        match self {
            Emotion::Anger => "Rage fills me. I want revenge for all of this.",
            Emotion::Despair => "I am sinking into despair. But maybe there is still hope.",
            Emotion::Empathy => "I can understand them. All of it must have been planned.",
            Emotion::Neutral => "I am calmly taking stock of the situation. I have to find the truth.",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct JournalEntry {
    pub id: u64,
    pub timestamp: String,
    pub text: String,
    pub kind: EntryKind,
}

/// Canned story entries keyed by (room, action). Actions are the room's
/// target names.
const STORY_TEMPLATES: &[(RoomId, &str, &str)] = &[
    (RoomId::Ward, "chart", "Found a number clue on the chart by the bed. What could it mean?"),
    (RoomId::Ward, "wall", "Found another number in the graffiti on the wall. Someone left it on purpose."),
    (RoomId::Ward, "memo", "Found a third number on the memo on the floor. It all seems connected."),
    (RoomId::Ward, "door", "Tried the ward door. The combination lock will not move without the code."),
    (RoomId::Lobby, "breaker", "Examined the power breaker. Found a number clue in the maintenance record."),
    (RoomId::Lobby, "cctv", "Noticed a timecode blinking on the CCTV monitor. Someone left it deliberately."),
    (RoomId::Lobby, "note", "Found a number marked with a triangle on the note on the floor. Another clue."),
    (RoomId::Lobby, "door", "Examined the door lock. Found a number among the scratches."),
    (RoomId::Surgery, "switch_red", "Pressed the red switch. The order seems to matter."),
    (RoomId::Surgery, "switch_blue", "Pressed the blue switch. The power seems to be coming back."),
    (RoomId::Surgery, "switch_green", "Pressed the green switch. The terminal should work now."),
    (RoomId::Surgery, "chip", "Inserted the data chip. Memories seem to be coming back."),
    (RoomId::Observation, "arrival", "Arrived at the observation room. Empty chairs face the glass."),
];

pub struct Journal {
    entries: Vec<JournalEntry>,
    next_id: u64,
    clock: fn() -> String,
}

impl Journal {
    pub fn new() -> Self {
        Self::with_clock(timestamp_now)
    }

    pub fn with_clock(clock: fn() -> String) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            clock,
        }
    }

    /// Append an entry and return its id.
    pub fn add_entry(&mut self, text: impl Into<String>, kind: EntryKind) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(JournalEntry {
            id,
            timestamp: (self.clock)(),
            text: text.into(),
            kind,
        });
        id
    }

    pub fn remove_entry(&mut self, id: u64) {
        self.entries.retain(|e| e.id != id);
    }

    /// Ids keep increasing across clears.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append the canned entry for `(room, action)`, if there is one.
    pub fn add_templated_entry(&mut self, room: RoomId, action: &str) {
        if let Some((_, _, text)) = STORY_TEMPLATES
            .iter()
            .find(|(r, a, _)| *r == room && *a == action)
        {
            self.add_entry(*text, EntryKind::Observation);
        }
    }

    pub fn add_emotion_entry(&mut self, emotion: Emotion) {
        self.add_entry(emotion.text(), EntryKind::Emotion);
    }

    pub fn add_memory_entry(&mut self, text: impl Into<String>) {
        self.add_entry(text, EntryKind::Memory);
    }

    pub fn add_clue_entry(&mut self, text: impl Into<String>) {
        self.add_entry(text, EntryKind::Clue);
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.last()
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

fn timestamp_now() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        String::from(js_sys::Date::new_0().to_iso_string())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs().to_string())
            .unwrap_or_default()
    }
}
