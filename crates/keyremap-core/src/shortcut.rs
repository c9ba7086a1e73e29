//! Shortcut representation
//!
//! A [`Shortcut`] holds at most one modifier per [`ModifierKind`], an action
//! key and an optional chord key (a second non-modifier pressed after the
//! action key, as in `Ctrl+K, C`). Modifier order never matters:
//! `Shift+Ctrl+C` and `Ctrl+Shift+C` are the same value.
//!
//! A shortcut is *valid* when it has an action key and at least one
//! modifier. Partially built shortcuts are normal while a row is being
//! edited and are rejected only at commit time.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::keys::{parse_key, KeyCode, ModifierKind, ModifierSide};

/// Largest number of keys a shortcut column accepts.
pub const MAX_SHORTCUT_SIZE: usize = 5;
/// Smallest number of keys a usable shortcut has.
pub const MIN_SHORTCUT_SIZE: usize = 2;

/// A keyboard shortcut such as `Ctrl+Shift+C`.
///
/// Derives `Ord` so it can key the runtime `BTreeMap` tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Shortcut {
    /// Indexed in [`ModifierKind::ALL`] order.
    modifiers: [Option<ModifierSide>; 4],
    action_key: Option<KeyCode>,
    chord_key: Option<KeyCode>,
}

fn slot(kind: ModifierKind) -> usize {
    match kind {
        ModifierKind::Win => 0,
        ModifierKind::Ctrl => 1,
        ModifierKind::Alt => 2,
        ModifierKind::Shift => 3,
    }
}

impl Shortcut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a shortcut from a sequence of key codes.
    ///
    /// `KeyCode::NONE` entries are skipped; everything else goes through
    /// [`Shortcut::set_key`].
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = KeyCode>,
    {
        let mut shortcut = Self::new();
        for key in keys {
            if !key.is_none() {
                shortcut.set_key(key);
            }
        }
        shortcut
    }

    /// Add a key to the shortcut.
    ///
    /// A modifier replaces whatever side was stored for its kind. The first
    /// non-modifier becomes the action key and a later, different one the
    /// chord key. Returns `false` when the shortcut did not change, which
    /// includes a third non-modifier arriving once the chord key is taken:
    /// that key is dropped, never swapped in.
    pub fn set_key(&mut self, key: KeyCode) -> bool {
        if key.is_none() {
            return false;
        }

        if let Some((kind, side)) = key.modifier() {
            let entry = &mut self.modifiers[slot(kind)];
            if *entry == Some(side) {
                return false;
            }
            *entry = Some(side);
            return true;
        }

        match self.action_key {
            None => {
                self.action_key = Some(key);
                true
            }
            Some(action) if action == key => false,
            Some(_) if self.chord_key.is_none() => {
                self.chord_key = Some(key);
                true
            }
            Some(_) => false,
        }
    }

    pub fn modifier(&self, kind: ModifierKind) -> Option<ModifierSide> {
        self.modifiers[slot(kind)]
    }

    /// Present modifiers in display order.
    pub fn modifiers(&self) -> impl Iterator<Item = (ModifierKind, ModifierSide)> + '_ {
        ModifierKind::ALL
            .into_iter()
            .filter_map(|kind| self.modifier(kind).map(|side| (kind, side)))
    }

    pub fn has_modifiers(&self) -> bool {
        self.modifiers.iter().any(Option::is_some)
    }

    pub fn action_key(&self) -> Option<KeyCode> {
        self.action_key
    }

    pub fn chord_key(&self) -> Option<KeyCode> {
        self.chord_key
    }

    pub fn has_chord(&self) -> bool {
        self.chord_key.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_modifiers() && self.action_key.is_none()
    }

    /// An action key and at least one modifier.
    pub fn is_valid(&self) -> bool {
        self.action_key.is_some() && self.has_modifiers()
    }

    pub fn key_count(&self) -> usize {
        self.modifiers().count()
            + usize::from(self.action_key.is_some())
            + usize::from(self.chord_key.is_some())
    }

    /// Codes in display order: modifiers, action key, chord key.
    pub fn key_codes(&self) -> Vec<KeyCode> {
        self.modifiers()
            .map(|(kind, side)| kind.code(side))
            .chain(self.action_key)
            .chain(self.chord_key)
            .collect()
    }

    /// `Win+L` with the Win key on any side and nothing else held.
    pub fn is_win_l(&self) -> bool {
        self.modifier(ModifierKind::Win).is_some()
            && self.modifier(ModifierKind::Ctrl).is_none()
            && self.modifier(ModifierKind::Alt).is_none()
            && self.modifier(ModifierKind::Shift).is_none()
            && self.action_key == Some(KeyCode::L)
            && !self.has_chord()
    }

    /// `Ctrl+Alt+Del` with Ctrl and Alt on any side and nothing else held.
    pub fn is_ctrl_alt_del(&self) -> bool {
        self.modifier(ModifierKind::Win).is_none()
            && self.modifier(ModifierKind::Ctrl).is_some()
            && self.modifier(ModifierKind::Alt).is_some()
            && self.modifier(ModifierKind::Shift).is_none()
            && self.action_key == Some(KeyCode::DELETE)
            && !self.has_chord()
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for key in self.key_codes() {
            if !first {
                f.write_str("+")?;
            }
            write!(f, "{}", key)?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for Shortcut {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Error type for shortcut parsing failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcutParseError {
    #[error("empty shortcut")]
    Empty,

    #[error("empty component in '{input}'")]
    EmptyComponent { input: String },

    #[error("unknown key '{key}'")]
    UnknownKey { key: String },

    #[error("{kind} appears more than once in '{input}'")]
    RepeatedModifier { kind: ModifierKind, input: String },

    #[error("'{input}' has more than two non-modifier keys")]
    TooManyActionKeys { input: String },

    #[error("'{input}' has no action key")]
    MissingActionKey { input: String },

    #[error("'{input}' has more than {} keys", MAX_SHORTCUT_SIZE)]
    TooLong { input: String },
}

/// Parse a shortcut string such as `"Ctrl+Shift+C"` or `"Ctrl+K+C"`.
///
/// Components are separated by `+` and parsed with [`parse_key`]. Each
/// modifier kind may appear once; the first non-modifier is the action key
/// and a second one the chord key.
///
/// # Examples
///
/// ```ignore
/// let a = parse_shortcut("Ctrl+Shift+C")?;
/// let b = parse_shortcut("Shift+Ctrl+C")?;
/// assert_eq!(a, b);
/// ```
pub fn parse_shortcut(input: &str) -> Result<Shortcut, ShortcutParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ShortcutParseError::Empty);
    }

    let mut shortcut = Shortcut::new();
    let mut non_modifiers = 0;

    for part in input.split('+').map(str::trim) {
        if part.is_empty() {
            return Err(ShortcutParseError::EmptyComponent {
                input: input.to_string(),
            });
        }

        let key = parse_key(part).ok_or_else(|| ShortcutParseError::UnknownKey {
            key: part.to_string(),
        })?;

        match key.modifier_kind() {
            Some(kind) => {
                if shortcut.modifier(kind).is_some() {
                    return Err(ShortcutParseError::RepeatedModifier {
                        kind,
                        input: input.to_string(),
                    });
                }
            }
            None => {
                non_modifiers += 1;
                if non_modifiers > 2 || !shortcut.set_key(key) {
                    return Err(ShortcutParseError::TooManyActionKeys {
                        input: input.to_string(),
                    });
                }
                continue;
            }
        }
        shortcut.set_key(key);
    }

    if shortcut.action_key().is_none() {
        return Err(ShortcutParseError::MissingActionKey {
            input: input.to_string(),
        });
    }
    if shortcut.key_count() > MAX_SHORTCUT_SIZE {
        return Err(ShortcutParseError::TooLong {
            input: input.to_string(),
        });
    }

    Ok(shortcut)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyCode {
        KeyCode::from_char(c)
    }

    #[test]
    fn test_modifier_order_does_not_matter() {
        let a = Shortcut::from_keys([KeyCode::CTRL, KeyCode::SHIFT, key('C')]);
        let b = Shortcut::from_keys([KeyCode::SHIFT, KeyCode::CTRL, key('C')]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sides_are_distinct() {
        let left = Shortcut::from_keys([KeyCode::LCTRL, key('C')]);
        let right = Shortcut::from_keys([KeyCode::RCTRL, key('C')]);
        let generic = Shortcut::from_keys([KeyCode::CTRL, key('C')]);
        assert_ne!(left, right);
        assert_ne!(left, generic);
    }

    #[test]
    fn test_from_keys_skips_none() {
        let s = Shortcut::from_keys([KeyCode::CTRL, KeyCode::NONE, key('A')]);
        assert_eq!(s.key_count(), 2);
        assert!(s.is_valid());
    }

    #[test]
    fn test_validity() {
        assert!(!Shortcut::new().is_valid());
        assert!(!Shortcut::from_keys([KeyCode::CTRL]).is_valid());
        assert!(!Shortcut::from_keys([key('A')]).is_valid());
        assert!(Shortcut::from_keys([KeyCode::CTRL, key('A')]).is_valid());
    }

    #[test]
    fn test_second_action_key_becomes_chord() {
        let s = Shortcut::from_keys([KeyCode::CTRL, key('K'), key('C')]);
        assert_eq!(s.action_key(), Some(key('K')));
        assert_eq!(s.chord_key(), Some(key('C')));
        assert_eq!(s.key_count(), 3);
        assert_eq!(s.to_string(), "Ctrl+K+C");
    }

    #[test]
    fn test_set_key_reports_no_change() {
        let mut s = Shortcut::from_keys([KeyCode::LALT, key('F')]);
        assert!(!s.set_key(KeyCode::LALT));
        assert!(!s.set_key(key('F')));
        assert!(s.set_key(KeyCode::RALT));
        assert_eq!(s.modifier(ModifierKind::Alt), Some(ModifierSide::Right));
    }

    #[test]
    fn test_third_action_key_is_dropped() {
        let mut s = Shortcut::from_keys([KeyCode::CTRL, key('A'), key('B')]);
        assert!(!s.set_key(key('C')));
        assert_eq!(s.action_key(), Some(key('A')));
        assert_eq!(s.chord_key(), Some(key('B')));
        assert_eq!(s.to_string(), "Ctrl+A+B");
    }

    #[test]
    fn test_display_order() {
        let s = Shortcut::from_keys([KeyCode::SHIFT, key('X'), KeyCode::LWIN, KeyCode::RCTRL]);
        assert_eq!(s.to_string(), "LWin+RCtrl+Shift+X");
        assert_eq!(
            s.key_codes(),
            vec![KeyCode::LWIN, KeyCode::RCTRL, KeyCode::SHIFT, key('X')]
        );
    }

    #[test]
    fn test_illegal_shortcuts() {
        assert!(Shortcut::from_keys([KeyCode::LWIN, KeyCode::L]).is_win_l());
        assert!(Shortcut::from_keys([KeyCode::WIN_BOTH, KeyCode::L]).is_win_l());
        assert!(!Shortcut::from_keys([KeyCode::LWIN, KeyCode::CTRL, KeyCode::L]).is_win_l());

        assert!(Shortcut::from_keys([KeyCode::ALT, KeyCode::LCTRL, KeyCode::DELETE]).is_ctrl_alt_del());
        assert!(Shortcut::from_keys([KeyCode::RCTRL, KeyCode::RALT, KeyCode::DELETE]).is_ctrl_alt_del());
        assert!(!Shortcut::from_keys([KeyCode::CTRL, KeyCode::ALT, KeyCode::SHIFT, KeyCode::DELETE])
            .is_ctrl_alt_del());
    }

    #[test]
    fn test_parse_shortcut_basic() {
        let s = parse_shortcut("Ctrl+Shift+C").unwrap();
        assert_eq!(s.modifier(ModifierKind::Ctrl), Some(ModifierSide::Both));
        assert_eq!(s.modifier(ModifierKind::Shift), Some(ModifierSide::Both));
        assert_eq!(s.action_key(), Some(key('C')));
        assert_eq!(s, parse_shortcut("shift + ctrl + c").unwrap());
    }

    #[test]
    fn test_parse_shortcut_chord() {
        let s = parse_shortcut("Ctrl+K+D").unwrap();
        assert_eq!(s.chord_key(), Some(key('D')));
    }

    #[test]
    fn test_parse_shortcut_errors() {
        assert_eq!(parse_shortcut("  "), Err(ShortcutParseError::Empty));
        assert!(matches!(
            parse_shortcut("Ctrl+"),
            Err(ShortcutParseError::EmptyComponent { .. })
        ));
        assert!(matches!(
            parse_shortcut("Ctrl+Bogus"),
            Err(ShortcutParseError::UnknownKey { key }) if key == "Bogus"
        ));
        assert!(matches!(
            parse_shortcut("LCtrl+RCtrl+A"),
            Err(ShortcutParseError::RepeatedModifier { kind: ModifierKind::Ctrl, .. })
        ));
        assert!(matches!(
            parse_shortcut("Ctrl+A+B+C"),
            Err(ShortcutParseError::TooManyActionKeys { .. })
        ));
        assert!(matches!(
            parse_shortcut("Ctrl+A+A"),
            Err(ShortcutParseError::TooManyActionKeys { .. })
        ));
        assert!(matches!(
            parse_shortcut("Ctrl+Shift"),
            Err(ShortcutParseError::MissingActionKey { .. })
        ));
        assert!(matches!(
            parse_shortcut("Win+Ctrl+Alt+Shift+K+C"),
            Err(ShortcutParseError::TooLong { .. })
        ));
    }
}
