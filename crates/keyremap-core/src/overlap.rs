//! Scoped overlap detection
//!
//! Both the live edit validator and the commit-time batch validator ask the
//! same question: does this source collide with another row's source in the
//! same application scope? The answer comes from [`ScopedOverlapDetector`].
//!
//! Two sources collide when they are identical, or when they differ only in
//! a modifier where one side is generic and the other is a left/right
//! variant (`Ctrl` vs `LCtrl`). Left vs right of the same modifier never
//! collide. Single keys are only compared with single keys and shortcuts
//! with shortcuts.

use crate::keys::{KeyCode, ModifierKind, ModifierSide};
use crate::model::{AppScope, ErrorKind, KeyInput, RemapTable};
use crate::shortcut::Shortcut;

/// Compare two single-key sources.
///
/// `NONE` never collides with anything.
pub fn keys_overlap(a: KeyCode, b: KeyCode) -> ErrorKind {
    if a.is_none() || b.is_none() {
        return ErrorKind::NoError;
    }
    if a == b {
        return ErrorKind::SameKeyPreviouslyMapped;
    }

    match (a.modifier(), b.modifier()) {
        (Some((kind_a, side_a)), Some((kind_b, side_b)))
            if kind_a == kind_b
                && (side_a == ModifierSide::Both || side_b == ModifierSide::Both) =>
        {
            ErrorKind::ConflictingModifierKey
        }
        _ => ErrorKind::NoError,
    }
}

/// Compare two shortcut sources.
///
/// Incomplete shortcuts never collide.
pub fn shortcuts_overlap(a: &Shortcut, b: &Shortcut) -> ErrorKind {
    if !a.is_valid() || !b.is_valid() {
        return ErrorKind::NoError;
    }
    if a == b {
        return ErrorKind::SameShortcutPreviouslyMapped;
    }
    if a.action_key() != b.action_key() || a.chord_key() != b.chord_key() {
        return ErrorKind::NoError;
    }

    let compatible = ModifierKind::ALL.iter().all(|kind| {
        match (a.modifier(*kind), b.modifier(*kind)) {
            (None, None) => true,
            (Some(x), Some(y)) => x == y || x == ModifierSide::Both || y == ModifierSide::Both,
            _ => false,
        }
    });

    if compatible {
        ErrorKind::ConflictingModifierShortcut
    } else {
        ErrorKind::NoError
    }
}

/// Compare two sources of either shape.
pub fn inputs_overlap(a: &KeyInput, b: &KeyInput) -> ErrorKind {
    match (a, b) {
        (KeyInput::Key(a), KeyInput::Key(b)) => keys_overlap(*a, *b),
        (KeyInput::Shortcut(a), KeyInput::Shortcut(b)) => shortcuts_overlap(a, b),
        _ => ErrorKind::NoError,
    }
}

/// A source that collides with an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    /// Index of the existing row.
    pub row: usize,
    pub kind: ErrorKind,
}

/// Finds rows whose source collides with a candidate in the same scope.
pub struct ScopedOverlapDetector<'a> {
    table: &'a RemapTable,
}

impl<'a> ScopedOverlapDetector<'a> {
    pub fn new(table: &'a RemapTable) -> Self {
        Self { table }
    }

    /// First row (other than `skip_row`) whose source collides with
    /// `candidate` in `scope`.
    pub fn find_conflict(
        &self,
        candidate: &KeyInput,
        scope: &AppScope,
        skip_row: Option<usize>,
    ) -> Option<Conflict> {
        self.table
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != skip_row)
            .filter(|(_, row)| row.scope() == *scope)
            .find_map(|(index, row)| {
                let kind = inputs_overlap(&row.source, candidate);
                kind.is_err().then_some(Conflict { row: index, kind })
            })
    }

    /// First pair of rows whose sources collide, as `(earlier, later)`.
    pub fn find_any_conflict(&self) -> Option<(usize, Conflict)> {
        self.table.iter().enumerate().find_map(|(index, row)| {
            self.table.rows[index + 1..]
                .iter()
                .enumerate()
                .filter(|(_, other)| other.scope() == row.scope())
                .find_map(|(offset, other)| {
                    let kind = inputs_overlap(&row.source, &other.source);
                    kind.is_err().then_some((
                        index,
                        Conflict {
                            row: index + 1 + offset,
                            kind,
                        },
                    ))
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RemapRow;

    fn key(c: char) -> KeyCode {
        KeyCode::from_char(c)
    }

    fn shortcut(keys: &[KeyCode]) -> Shortcut {
        Shortcut::from_keys(keys.iter().copied())
    }

    #[test]
    fn test_keys_overlap() {
        assert_eq!(keys_overlap(key('A'), key('A')), ErrorKind::SameKeyPreviouslyMapped);
        assert_eq!(keys_overlap(key('A'), key('B')), ErrorKind::NoError);
        assert_eq!(keys_overlap(KeyCode::CTRL, KeyCode::LCTRL), ErrorKind::ConflictingModifierKey);
        assert_eq!(keys_overlap(KeyCode::RWIN, KeyCode::WIN_BOTH), ErrorKind::ConflictingModifierKey);
        assert_eq!(keys_overlap(KeyCode::LCTRL, KeyCode::RCTRL), ErrorKind::NoError);
        assert_eq!(keys_overlap(KeyCode::CTRL, KeyCode::ALT), ErrorKind::NoError);
        assert_eq!(keys_overlap(KeyCode::NONE, KeyCode::NONE), ErrorKind::NoError);
    }

    #[test]
    fn test_shortcuts_overlap_exact() {
        let a = shortcut(&[KeyCode::CTRL, KeyCode::SHIFT, key('C')]);
        let b = shortcut(&[KeyCode::SHIFT, KeyCode::CTRL, key('C')]);
        assert_eq!(shortcuts_overlap(&a, &b), ErrorKind::SameShortcutPreviouslyMapped);
    }

    #[test]
    fn test_shortcuts_overlap_hand_variants() {
        let generic = shortcut(&[KeyCode::CTRL, key('C')]);
        let left = shortcut(&[KeyCode::LCTRL, key('C')]);
        let right = shortcut(&[KeyCode::RCTRL, key('C')]);
        assert_eq!(shortcuts_overlap(&generic, &left), ErrorKind::ConflictingModifierShortcut);
        assert_eq!(shortcuts_overlap(&right, &generic), ErrorKind::ConflictingModifierShortcut);
        assert_eq!(shortcuts_overlap(&left, &right), ErrorKind::NoError);
    }

    #[test]
    fn test_shortcuts_overlap_requires_same_modifier_set() {
        let a = shortcut(&[KeyCode::CTRL, key('C')]);
        let b = shortcut(&[KeyCode::CTRL, KeyCode::LSHIFT, key('C')]);
        let c = shortcut(&[KeyCode::CTRL, key('V')]);
        assert_eq!(shortcuts_overlap(&a, &b), ErrorKind::NoError);
        assert_eq!(shortcuts_overlap(&a, &c), ErrorKind::NoError);
    }

    #[test]
    fn test_shortcuts_overlap_ignores_incomplete() {
        let partial = shortcut(&[KeyCode::CTRL]);
        assert_eq!(shortcuts_overlap(&partial, &partial), ErrorKind::NoError);
    }

    #[test]
    fn test_mixed_shapes_never_overlap() {
        let a = KeyInput::Key(KeyCode::CTRL);
        let b = KeyInput::Shortcut(shortcut(&[KeyCode::CTRL, key('A')]));
        assert_eq!(inputs_overlap(&a, &b), ErrorKind::NoError);
    }

    #[test]
    fn test_find_conflict_respects_scope() {
        let ctrl_c = shortcut(&[KeyCode::CTRL, key('C')]);
        let table: RemapTable = [
            RemapRow::new(ctrl_c.clone(), key('X')).for_app("Notepad.exe"),
            RemapRow::new(key('A'), key('B')),
        ]
        .into_iter()
        .collect();
        let detector = ScopedOverlapDetector::new(&table);
        let candidate = KeyInput::Shortcut(ctrl_c);

        assert_eq!(detector.find_conflict(&candidate, &AppScope::os_wide(), None), None);
        assert_eq!(
            detector.find_conflict(&candidate, &AppScope::new("notepad.exe"), None),
            Some(Conflict {
                row: 0,
                kind: ErrorKind::SameShortcutPreviouslyMapped
            })
        );
        assert_eq!(
            detector.find_conflict(&candidate, &AppScope::new("notepad.exe"), Some(0)),
            None
        );
    }

    #[test]
    fn test_find_any_conflict() {
        let table: RemapTable = [
            RemapRow::new(key('A'), key('B')),
            RemapRow::new(KeyCode::LALT, key('C')),
            RemapRow::new(KeyCode::ALT, key('D')),
        ]
        .into_iter()
        .collect();
        let detector = ScopedOverlapDetector::new(&table);
        assert_eq!(
            detector.find_any_conflict(),
            Some((
                1,
                Conflict {
                    row: 2,
                    kind: ErrorKind::ConflictingModifierKey
                }
            ))
        );
    }
}
