//! Semantic action IDs for escape-room click targets.

// ── Room choices (0-based index) ───────────────────────────────
/// Choice base: +index. So choice [1] = CHOICE_BASE+0, etc.
pub const CHOICE_BASE: u16 = 100;

// ── Bag overlay ────────────────────────────────────────────────
/// Bag entry base: +index into the inventory listing.
pub const BAG_ITEM_BASE: u16 = 200;
pub const TOGGLE_BAG: u16 = 10;
pub const USE_SELECTED: u16 = 11;

// ── Code lock ──────────────────────────────────────────────────
/// Keypad base: +digit.
pub const KEYPAD_BASE: u16 = 300;
pub const SUBMIT_CODE: u16 = 20;
pub const CANCEL_CODE: u16 = 21;
pub const ERASE_CODE: u16 = 22;

// ── Epilogue ───────────────────────────────────────────────────
pub const RESTART: u16 = 30;
