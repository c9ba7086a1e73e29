//! Virtual-key codes and modifier classification
//!
//! Key codes follow the Windows virtual-key numbering, which is what the
//! interception engine reports. Two codes are synthetic: [`KeyCode::WIN_BOTH`]
//! stands for "either Win key" (there is no physical generic Win key) and
//! [`KeyCode::DISABLED`] is the target that swallows a key.
//!
//! ## Modifier Normalization
//!
//! Every modifier code decomposes into a [`ModifierKind`] and a [`ModifierSide`]:
//! - `LCtrl` / `RCtrl` / `Ctrl` -> `(Ctrl, Left)` / `(Ctrl, Right)` / `(Ctrl, Both)`
//! - `LAlt` / `RAlt` / `Alt` -> `Alt`
//! - `LShift` / `RShift` / `Shift` -> `Shift`
//! - `LWin` / `RWin` / `Win` -> `Win`
//!
//! `Both` is the generic code: it matches either physical key.

use std::fmt;

use serde::{Serialize, Serializer};

// ============================================================================
// Key codes
// ============================================================================

/// A virtual-key code.
///
/// `KeyCode::NONE` (0) is the "no key" value and marks an unassigned
/// single-key cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct KeyCode(u32);

impl KeyCode {
    pub const NONE: KeyCode = KeyCode(0x00);

    pub const BACKSPACE: KeyCode = KeyCode(0x08);
    pub const TAB: KeyCode = KeyCode(0x09);
    pub const ENTER: KeyCode = KeyCode(0x0D);
    pub const SHIFT: KeyCode = KeyCode(0x10);
    pub const CTRL: KeyCode = KeyCode(0x11);
    pub const ALT: KeyCode = KeyCode(0x12);
    pub const PAUSE: KeyCode = KeyCode(0x13);
    pub const CAPS_LOCK: KeyCode = KeyCode(0x14);
    pub const ESCAPE: KeyCode = KeyCode(0x1B);
    pub const SPACE: KeyCode = KeyCode(0x20);
    pub const PAGE_UP: KeyCode = KeyCode(0x21);
    pub const PAGE_DOWN: KeyCode = KeyCode(0x22);
    pub const END: KeyCode = KeyCode(0x23);
    pub const HOME: KeyCode = KeyCode(0x24);
    pub const LEFT: KeyCode = KeyCode(0x25);
    pub const UP: KeyCode = KeyCode(0x26);
    pub const RIGHT: KeyCode = KeyCode(0x27);
    pub const DOWN: KeyCode = KeyCode(0x28);
    pub const PRINT_SCREEN: KeyCode = KeyCode(0x2C);
    pub const INSERT: KeyCode = KeyCode(0x2D);
    pub const DELETE: KeyCode = KeyCode(0x2E);
    pub const L: KeyCode = KeyCode(0x4C);
    pub const LWIN: KeyCode = KeyCode(0x5B);
    pub const RWIN: KeyCode = KeyCode(0x5C);
    pub const APPS: KeyCode = KeyCode(0x5D);
    pub const NUM_LOCK: KeyCode = KeyCode(0x90);
    pub const SCROLL_LOCK: KeyCode = KeyCode(0x91);
    pub const LSHIFT: KeyCode = KeyCode(0xA0);
    pub const RSHIFT: KeyCode = KeyCode(0xA1);
    pub const LCTRL: KeyCode = KeyCode(0xA2);
    pub const RCTRL: KeyCode = KeyCode(0xA3);
    pub const LALT: KeyCode = KeyCode(0xA4);
    pub const RALT: KeyCode = KeyCode(0xA5);

    /// Target that disables the source key.
    pub const DISABLED: KeyCode = KeyCode(0x100);
    /// Either Win key.
    pub const WIN_BOTH: KeyCode = KeyCode(0x104);

    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    /// Code for an ASCII letter or digit (`'A'..='Z'`, `'0'..='9'`).
    pub const fn from_char(c: char) -> Self {
        Self(c.to_ascii_uppercase() as u32)
    }

    pub const fn code(self) -> u32 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Decompose a modifier code into its kind and side.
    pub fn modifier(self) -> Option<(ModifierKind, ModifierSide)> {
        ModifierKind::ALL.into_iter().find_map(|kind| {
            [ModifierSide::Left, ModifierSide::Right, ModifierSide::Both]
                .into_iter()
                .find(|side| kind.code(*side) == self)
                .map(|side| (kind, side))
        })
    }

    pub fn is_modifier(self) -> bool {
        self.modifier().is_some()
    }

    pub fn modifier_kind(self) -> Option<ModifierKind> {
        self.modifier().map(|(kind, _)| kind)
    }

    /// Canonical display name, if the code has one.
    pub fn name(self) -> Option<String> {
        let code = self.0;
        match code {
            0x30..=0x39 | 0x41..=0x5A => char::from_u32(code).map(String::from),
            0x60..=0x69 => Some(format!("Num{}", code - 0x60)),
            0x70..=0x87 => Some(format!("F{}", code - 0x6F)),
            _ => NAMED_KEYS
                .iter()
                .find(|(key, _, _)| *key == self)
                .map(|(_, name, _)| (*name).to_string()),
        }
    }
}

impl From<u32> for KeyCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(&name),
            None => write!(f, "VK 0x{:02X}", self.0),
        }
    }
}

impl Serialize for KeyCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Named keys: code, canonical name, accepted aliases (upper-case).
const NAMED_KEYS: &[(KeyCode, &str, &[&str])] = &[
    (KeyCode::BACKSPACE, "Backspace", &["BACKSPACE", "BACK", "BKSP"]),
    (KeyCode::TAB, "Tab", &["TAB"]),
    (KeyCode::ENTER, "Enter", &["ENTER", "RETURN"]),
    (KeyCode::SHIFT, "Shift", &["SHIFT"]),
    (KeyCode::CTRL, "Ctrl", &["CTRL", "CONTROL"]),
    (KeyCode::ALT, "Alt", &["ALT", "MENU"]),
    (KeyCode::PAUSE, "Pause", &["PAUSE", "BREAK"]),
    (KeyCode::CAPS_LOCK, "CapsLock", &["CAPSLOCK", "CAPS_LOCK", "CAPS"]),
    (KeyCode::ESCAPE, "Esc", &["ESC", "ESCAPE"]),
    (KeyCode::SPACE, "Space", &["SPACE"]),
    (KeyCode::PAGE_UP, "PageUp", &["PAGEUP", "PGUP"]),
    (KeyCode::PAGE_DOWN, "PageDown", &["PAGEDOWN", "PGDN", "PGDOWN"]),
    (KeyCode::END, "End", &["END"]),
    (KeyCode::HOME, "Home", &["HOME"]),
    (KeyCode::LEFT, "Left", &["LEFT", "LEFTARROW"]),
    (KeyCode::UP, "Up", &["UP", "UPARROW"]),
    (KeyCode::RIGHT, "Right", &["RIGHT", "RIGHTARROW"]),
    (KeyCode::DOWN, "Down", &["DOWN", "DOWNARROW"]),
    (KeyCode::PRINT_SCREEN, "PrintScreen", &["PRINTSCREEN", "PRTSC", "SNAPSHOT"]),
    (KeyCode::INSERT, "Insert", &["INSERT", "INS"]),
    (KeyCode::DELETE, "Delete", &["DELETE", "DEL"]),
    (KeyCode::LWIN, "LWin", &["LWIN", "LEFTWIN"]),
    (KeyCode::RWIN, "RWin", &["RWIN", "RIGHTWIN"]),
    (KeyCode::APPS, "Apps", &["APPS", "CONTEXTMENU"]),
    (KeyCode::new(0x6A), "NumMultiply", &["NUMMULTIPLY", "NUMPAD_MULTIPLY"]),
    (KeyCode::new(0x6B), "NumAdd", &["NUMADD", "NUMPAD_PLUS"]),
    (KeyCode::new(0x6D), "NumSubtract", &["NUMSUBTRACT", "NUMPAD_MINUS"]),
    (KeyCode::new(0x6E), "NumDecimal", &["NUMDECIMAL", "NUMPAD_DOT"]),
    (KeyCode::new(0x6F), "NumDivide", &["NUMDIVIDE", "NUMPAD_DIVIDE"]),
    (KeyCode::NUM_LOCK, "NumLock", &["NUMLOCK", "NUM_LOCK"]),
    (KeyCode::SCROLL_LOCK, "ScrollLock", &["SCROLLLOCK", "SCROLL_LOCK"]),
    (KeyCode::LSHIFT, "LShift", &["LSHIFT", "LEFTSHIFT"]),
    (KeyCode::RSHIFT, "RShift", &["RSHIFT", "RIGHTSHIFT"]),
    (KeyCode::LCTRL, "LCtrl", &["LCTRL", "LEFTCTRL"]),
    (KeyCode::RCTRL, "RCtrl", &["RCTRL", "RIGHTCTRL"]),
    (KeyCode::LALT, "LAlt", &["LALT", "LEFTALT"]),
    (KeyCode::RALT, "RAlt", &["RALT", "RIGHTALT", "ALTGR"]),
    (KeyCode::new(0xBA), ";", &[";", "SEMICOLON"]),
    (KeyCode::new(0xBB), "=", &["=", "EQUALS", "EQUAL", "PLUS"]),
    (KeyCode::new(0xBC), ",", &[",", "COMMA"]),
    (KeyCode::new(0xBD), "-", &["-", "MINUS"]),
    (KeyCode::new(0xBE), ".", &[".", "PERIOD", "DOT"]),
    (KeyCode::new(0xBF), "/", &["/", "SLASH"]),
    (KeyCode::new(0xC0), "`", &["`", "GRAVE"]),
    (KeyCode::new(0xDB), "[", &["[", "LBRACE", "LEFTBRACE"]),
    (KeyCode::new(0xDC), "\\", &["\\", "BACKSLASH"]),
    (KeyCode::new(0xDD), "]", &["]", "RBRACE", "RIGHTBRACE"]),
    (KeyCode::new(0xDE), "'", &["'", "APOSTROPHE"]),
    (KeyCode::DISABLED, "Disable", &["DISABLE", "DISABLED"]),
    (KeyCode::WIN_BOTH, "Win", &["WIN", "SUPER", "META", "WINDOWS"]),
];

/// Parse a key name into its code.
///
/// Names are case-insensitive. Besides the canonical names printed by
/// [`KeyCode`]'s `Display`, letters, digits, `F1`-`F24`, `Num0`-`Num9` and
/// raw `0x..` codes are accepted.
///
/// # Example
///
/// ```ignore
/// assert_eq!(parse_key("lctrl"), Some(KeyCode::LCTRL));
/// assert_eq!(parse_key("0x41"), Some(KeyCode::from_char('A')));
/// ```
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let upper = name.trim().to_uppercase();

    if let Some((key, _, _)) = NAMED_KEYS
        .iter()
        .find(|(_, _, aliases)| aliases.contains(&upper.as_str()))
    {
        return Some(*key);
    }

    let mut chars = upper.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_uppercase() || c.is_ascii_digit() {
            return Some(KeyCode::from_char(c));
        }
    }

    if let Some(n) = upper.strip_prefix('F').and_then(|n| n.parse::<u32>().ok()) {
        if (1..=24).contains(&n) {
            return Some(KeyCode::new(0x6F + n));
        }
    }

    if let Some(n) = upper
        .strip_prefix("NUMPAD")
        .or_else(|| upper.strip_prefix("NUM"))
        .and_then(|n| n.parse::<u32>().ok())
    {
        if n <= 9 {
            return Some(KeyCode::new(0x60 + n));
        }
    }

    if let Some(hex) = upper.strip_prefix("0X") {
        if let Ok(code) = u32::from_str_radix(hex, 16) {
            return Some(KeyCode::new(code));
        }
    }

    None
}

// ============================================================================
// Modifiers
// ============================================================================

/// Modifier family, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModifierKind {
    Win,
    Ctrl,
    Alt,
    Shift,
}

impl ModifierKind {
    pub const ALL: [ModifierKind; 4] = [
        ModifierKind::Win,
        ModifierKind::Ctrl,
        ModifierKind::Alt,
        ModifierKind::Shift,
    ];

    /// Code for this modifier on the given side.
    pub fn code(self, side: ModifierSide) -> KeyCode {
        match (self, side) {
            (ModifierKind::Win, ModifierSide::Left) => KeyCode::LWIN,
            (ModifierKind::Win, ModifierSide::Right) => KeyCode::RWIN,
            (ModifierKind::Win, ModifierSide::Both) => KeyCode::WIN_BOTH,
            (ModifierKind::Ctrl, ModifierSide::Left) => KeyCode::LCTRL,
            (ModifierKind::Ctrl, ModifierSide::Right) => KeyCode::RCTRL,
            (ModifierKind::Ctrl, ModifierSide::Both) => KeyCode::CTRL,
            (ModifierKind::Alt, ModifierSide::Left) => KeyCode::LALT,
            (ModifierKind::Alt, ModifierSide::Right) => KeyCode::RALT,
            (ModifierKind::Alt, ModifierSide::Both) => KeyCode::ALT,
            (ModifierKind::Shift, ModifierSide::Left) => KeyCode::LSHIFT,
            (ModifierKind::Shift, ModifierSide::Right) => KeyCode::RSHIFT,
            (ModifierKind::Shift, ModifierSide::Both) => KeyCode::SHIFT,
        }
    }

    pub fn generic(self) -> KeyCode {
        self.code(ModifierSide::Both)
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierKind::Win => write!(f, "Win"),
            ModifierKind::Ctrl => write!(f, "Ctrl"),
            ModifierKind::Alt => write!(f, "Alt"),
            ModifierKind::Shift => write!(f, "Shift"),
        }
    }
}

/// Which physical key of a modifier pair a code refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModifierSide {
    Left,
    Right,
    /// Either key of the pair.
    Both,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_basic() {
        assert_eq!(parse_key("CapsLock"), Some(KeyCode::CAPS_LOCK));
        assert_eq!(parse_key("Escape"), Some(KeyCode::ESCAPE));
        assert_eq!(parse_key("a"), Some(KeyCode::new(0x41)));
        assert_eq!(parse_key("7"), Some(KeyCode::new(0x37)));
    }

    #[test]
    fn test_parse_key_function_and_numpad() {
        assert_eq!(parse_key("F1"), Some(KeyCode::new(0x70)));
        assert_eq!(parse_key("f24"), Some(KeyCode::new(0x87)));
        assert_eq!(parse_key("F25"), None);
        assert_eq!(parse_key("Num5"), Some(KeyCode::new(0x65)));
        assert_eq!(parse_key("numpad0"), Some(KeyCode::new(0x60)));
    }

    #[test]
    fn test_parse_key_modifiers() {
        assert_eq!(parse_key("Ctrl"), Some(KeyCode::CTRL));
        assert_eq!(parse_key("LCtrl"), Some(KeyCode::LCTRL));
        assert_eq!(parse_key("RightAlt"), Some(KeyCode::RALT));
        assert_eq!(parse_key("Win"), Some(KeyCode::WIN_BOTH));
        assert_eq!(parse_key("Super"), Some(KeyCode::WIN_BOTH));
    }

    #[test]
    fn test_parse_key_symbols_and_raw_codes() {
        assert_eq!(parse_key(";"), Some(KeyCode::new(0xBA)));
        assert_eq!(parse_key("Backslash"), Some(KeyCode::new(0xDC)));
        assert_eq!(parse_key("0xA2"), Some(KeyCode::LCTRL));
        assert_eq!(parse_key("Disable"), Some(KeyCode::DISABLED));
    }

    #[test]
    fn test_parse_key_unknown() {
        assert_eq!(parse_key("NotAKey"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for code in [0x08, 0x11, 0x41, 0x5B, 0x65, 0x7A, 0xA3, 0xDE, 0x100, 0x104] {
            let key = KeyCode::new(code);
            assert_eq!(parse_key(&key.to_string()), Some(key), "{}", key);
        }
    }

    #[test]
    fn test_display_unnamed_code() {
        assert_eq!(KeyCode::new(0xE8).to_string(), "VK 0xE8");
    }

    #[test]
    fn test_modifier_decomposition() {
        assert_eq!(
            KeyCode::LCTRL.modifier(),
            Some((ModifierKind::Ctrl, ModifierSide::Left))
        );
        assert_eq!(
            KeyCode::WIN_BOTH.modifier(),
            Some((ModifierKind::Win, ModifierSide::Both))
        );
        assert_eq!(KeyCode::RSHIFT.modifier_kind(), Some(ModifierKind::Shift));
        assert_eq!(KeyCode::ALT.modifier(), Some((ModifierKind::Alt, ModifierSide::Both)));
        assert!(!KeyCode::from_char('A').is_modifier());
        assert!(!KeyCode::DISABLED.is_modifier());
        assert!(!KeyCode::NONE.is_modifier());
    }
}
