//! Room identities, transitions and the outcome every room action returns.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoomId {
    /// Room 1: the abandoned hospital ward
    Ward,
    /// Room 2: the dark lobby
    Lobby,
    /// Room 3: the surgery
    Surgery,
    /// Room 4: the observation room (epilogue)
    Observation,
}

impl RoomId {
    pub fn number(self) -> u8 {
        match self {
            RoomId::Ward => 1,
            RoomId::Lobby => 2,
            RoomId::Surgery => 3,
            RoomId::Observation => 4,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            RoomId::Ward => "rooms1/main.html",
            RoomId::Lobby => "rooms2/lobby.html",
            RoomId::Surgery => "rooms3/surgery.html",
            RoomId::Observation => "rooms4/observation.html",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RoomId::Ward => "Old Ward",
            RoomId::Lobby => "Lobby",
            RoomId::Surgery => "Surgery",
            RoomId::Observation => "Observation Room",
        }
    }
}

/// A request to move to another room. The shell decides when to act on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub to: RoomId,
    pub params: Vec<(&'static str, String)>,
}

impl Transition {
    pub fn to(room: RoomId) -> Self {
        Self {
            to: room,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Relative page URL, e.g. `../rooms4/observation.html?accept=1`.
    pub fn href(&self) -> String {
        let mut href = format!("../{}", self.to.path());
        for (i, (k, v)) in self.params.iter().enumerate() {
            href.push(if i == 0 { '?' } else { '&' });
            href.push_str(k);
            href.push('=');
            href.push_str(v);
        }
        href
    }
}

/// What a room action produced. `scene` replaces the scene text when set;
/// `message` is the inline status line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
    pub scene: Option<String>,
    pub message: Option<String>,
    pub transition: Option<Transition>,
    pub offers_choice: bool,
}

impl Outcome {
    /// Nothing happened (unknown target, action not available right now).
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn scene(text: impl Into<String>) -> Self {
        Self {
            scene: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        self.message = Some(text.into());
        self
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn with_choice(mut self) -> Self {
        self.offers_choice = true;
        self
    }

    pub fn is_none(&self) -> bool {
        self == &Self::default()
    }
}
