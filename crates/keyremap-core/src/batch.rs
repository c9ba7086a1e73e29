//! Commit-time validation of a whole remap table

use std::collections::BTreeSet;

use crate::keys::KeyCode;
use crate::model::{ErrorKind, KeyInput, RemapRow, RemapTable};
use crate::overlap::{inputs_overlap, ScopedOverlapDetector};

/// Check that every row is complete, single-key rows are OS-wide, and no
/// two sources collide.
///
/// Returns `RemapUnsuccessful` on any failure; use [`validate_rows`] to find
/// out which rows are at fault.
pub fn check_if_remappings_are_valid(table: &RemapTable) -> ErrorKind {
    if let Some((index, row)) = table
        .iter()
        .enumerate()
        .find(|(_, row)| !row.source.is_complete() || !row.target.is_complete())
    {
        tracing::debug!("Row {} is incomplete: {} -> {}", index, row.source, row.target);
        return ErrorKind::RemapUnsuccessful;
    }

    if let Some((index, row)) = table.iter().enumerate().find(|(_, row)| is_app_specific_key_row(row)) {
        tracing::debug!(
            "Row {} remaps single key {} for {}; key remaps apply to all apps",
            index,
            row.source,
            row.scope()
        );
        return ErrorKind::RemapUnsuccessful;
    }

    if let Some((first, conflict)) = ScopedOverlapDetector::new(table).find_any_conflict() {
        tracing::debug!(
            "Rows {} and {} collide: {:?}",
            first,
            conflict.row,
            conflict.kind
        );
        return ErrorKind::RemapUnsuccessful;
    }

    ErrorKind::NoError
}

/// Per-row diagnostics for a table.
///
/// Each entry is the first problem found for that row: a single-key source
/// scoped to an app (`RemapUnsuccessful`), a reserved system shortcut, a row
/// mapping onto itself, or a collision with another row in the same scope
/// (reported on both rows). Incomplete rows are not flagged
/// here since [`check_if_remappings_are_valid`] already rejects them.
pub fn validate_rows(table: &RemapTable) -> Vec<ErrorKind> {
    let mut errors: Vec<ErrorKind> = table.iter().map(validate_row).collect();

    for (i, first) in table.iter().enumerate() {
        for (j, second) in table.iter().enumerate().skip(i + 1) {
            if first.scope() != second.scope() {
                continue;
            }
            let kind = inputs_overlap(&first.source, &second.source);
            if kind.is_err() {
                for index in [i, j] {
                    if errors[index].is_ok() {
                        errors[index] = kind;
                    }
                }
            }
        }
    }

    errors
}

/// Single-key remaps have no app dimension.
fn is_app_specific_key_row(row: &RemapRow) -> bool {
    matches!(row.source, KeyInput::Key(_)) && !row.scope().is_os_wide()
}

fn validate_row(row: &RemapRow) -> ErrorKind {
    if is_app_specific_key_row(row) {
        return ErrorKind::RemapUnsuccessful;
    }

    for cell in [&row.source, &row.target] {
        if let KeyInput::Shortcut(shortcut) = cell {
            if shortcut.is_win_l() {
                return ErrorKind::WinL;
            }
            if shortcut.is_ctrl_alt_del() {
                return ErrorKind::CtrlAltDel;
            }
        }
    }

    match (&row.source, &row.target) {
        (KeyInput::Key(a), KeyInput::Key(b)) if !a.is_none() && a == b => ErrorKind::MapToSameKey,
        (KeyInput::Shortcut(a), KeyInput::Shortcut(b)) if a.is_valid() && a == b => {
            ErrorKind::MapToSameShortcut
        }
        _ => ErrorKind::NoError,
    }
}

/// Keys that are remapped away and never produced by another rule.
///
/// Only complete rows with a single-key source count. A key is restored
/// when some row's target is that single key; shortcut targets never
/// restore a key. The result is sorted.
///
/// # Example
///
/// ```ignore
/// // A -> Ctrl+B, C -> A: A comes back from C, but nothing produces C.
/// assert_eq!(get_orphaned_keys(&table), vec![c]);
/// ```
pub fn get_orphaned_keys(table: &RemapTable) -> Vec<KeyCode> {
    let rows = table
        .iter()
        .filter(|row| row.source.is_complete() && row.target.is_complete());

    let mut orphans = BTreeSet::new();
    let mut restored = BTreeSet::new();

    for row in rows {
        let KeyInput::Key(source) = row.source else {
            continue;
        };
        orphans.insert(source);
        if let KeyInput::Key(target) = row.target {
            restored.insert(target);
        }
    }

    let orphans: Vec<KeyCode> = orphans.difference(&restored).copied().collect();
    for key in &orphans {
        tracing::warn!("Key {} is remapped but no rule produces it", key);
    }
    orphans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcut::Shortcut;

    fn key(c: char) -> KeyCode {
        KeyCode::from_char(c)
    }

    fn shortcut(keys: &[KeyCode]) -> Shortcut {
        Shortcut::from_keys(keys.iter().copied())
    }

    fn table(rows: Vec<RemapRow>) -> RemapTable {
        rows.into_iter().collect()
    }

    // ------------------------------------------------------------------------
    // check_if_remappings_are_valid
    // ------------------------------------------------------------------------

    #[test]
    fn test_empty_table_is_valid() {
        assert_eq!(check_if_remappings_are_valid(&RemapTable::new()), ErrorKind::NoError);
    }

    #[test]
    fn test_valid_key_and_shortcut_rows() {
        let t = table(vec![
            RemapRow::new(key('A'), key('B')),
            RemapRow::new(key('C'), shortcut(&[KeyCode::CTRL, key('V')])),
            RemapRow::new(shortcut(&[KeyCode::CTRL, key('C')]), shortcut(&[KeyCode::CTRL, key('V')])),
            RemapRow::new(shortcut(&[KeyCode::ALT, key('X')]), key('Y')).for_app("notepad.exe"),
        ]);
        assert_eq!(check_if_remappings_are_valid(&t), ErrorKind::NoError);
    }

    #[test]
    fn test_incomplete_rows_are_rejected() {
        for row in [
            RemapRow::new(key('A'), KeyCode::NONE),
            RemapRow::new(KeyCode::NONE, key('B')),
            RemapRow::new(key('A'), shortcut(&[KeyCode::CTRL])),
            RemapRow::new(shortcut(&[key('C')]), key('B')),
        ] {
            let t = table(vec![row.clone()]);
            assert_eq!(check_if_remappings_are_valid(&t), ErrorKind::RemapUnsuccessful, "{:?}", row);
        }
    }

    #[test]
    fn test_duplicate_key_sources_are_rejected() {
        let t = table(vec![
            RemapRow::new(key('A'), key('B')),
            RemapRow::new(key('A'), key('C')),
        ]);
        assert_eq!(check_if_remappings_are_valid(&t), ErrorKind::RemapUnsuccessful);
    }

    #[test]
    fn test_overlapping_modifier_sources_are_rejected() {
        let t = table(vec![
            RemapRow::new(KeyCode::CTRL, key('B')),
            RemapRow::new(KeyCode::LCTRL, key('C')),
        ]);
        assert_eq!(check_if_remappings_are_valid(&t), ErrorKind::RemapUnsuccessful);

        let t = table(vec![
            RemapRow::new(KeyCode::LCTRL, key('B')),
            RemapRow::new(KeyCode::RCTRL, key('C')),
        ]);
        assert_eq!(check_if_remappings_are_valid(&t), ErrorKind::NoError);
    }

    #[test]
    fn test_duplicate_shortcut_sources_in_same_app() {
        let ctrl_c = shortcut(&[KeyCode::CTRL, key('C')]);
        let t = table(vec![
            RemapRow::new(ctrl_c.clone(), key('B')).for_app("Notepad.exe"),
            RemapRow::new(ctrl_c.clone(), key('D')).for_app("notepad.exe "),
        ]);
        assert_eq!(check_if_remappings_are_valid(&t), ErrorKind::RemapUnsuccessful);

        let t = table(vec![
            RemapRow::new(ctrl_c.clone(), key('B')).for_app("notepad.exe"),
            RemapRow::new(ctrl_c, key('D')),
        ]);
        assert_eq!(check_if_remappings_are_valid(&t), ErrorKind::NoError);
    }

    #[test]
    fn test_conflicting_shortcut_sources() {
        let t = table(vec![
            RemapRow::new(shortcut(&[KeyCode::CTRL, key('C')]), key('B')),
            RemapRow::new(shortcut(&[KeyCode::RCTRL, key('C')]), key('D')),
        ]);
        assert_eq!(check_if_remappings_are_valid(&t), ErrorKind::RemapUnsuccessful);
    }

    #[test]
    fn test_app_specific_key_rows_are_rejected() {
        let t = table(vec![RemapRow::new(KeyCode::CAPS_LOCK, KeyCode::ESCAPE).for_app("notepad.exe")]);
        assert_eq!(check_if_remappings_are_valid(&t), ErrorKind::RemapUnsuccessful);
        assert_eq!(validate_rows(&t), vec![ErrorKind::RemapUnsuccessful]);

        let t = table(vec![RemapRow::new(KeyCode::CAPS_LOCK, KeyCode::ESCAPE).for_app("   ")]);
        assert_eq!(check_if_remappings_are_valid(&t), ErrorKind::NoError);
    }

    // ------------------------------------------------------------------------
    // validate_rows
    // ------------------------------------------------------------------------

    #[test]
    fn test_validate_rows_reports_each_row() {
        let t = table(vec![
            RemapRow::new(key('A'), key('A')),
            RemapRow::new(shortcut(&[KeyCode::LWIN, KeyCode::L]), key('B')),
            RemapRow::new(KeyCode::SHIFT, key('C')),
            RemapRow::new(KeyCode::RSHIFT, key('D')),
            RemapRow::new(key('E'), key('F')),
        ]);
        assert_eq!(
            validate_rows(&t),
            vec![
                ErrorKind::MapToSameKey,
                ErrorKind::WinL,
                ErrorKind::ConflictingModifierKey,
                ErrorKind::ConflictingModifierKey,
                ErrorKind::NoError,
            ]
        );
    }

    // ------------------------------------------------------------------------
    // get_orphaned_keys
    // ------------------------------------------------------------------------

    #[test]
    fn test_orphan_simple() {
        let t = table(vec![RemapRow::new(key('A'), key('B'))]);
        assert_eq!(get_orphaned_keys(&t), vec![key('A')]);
    }

    #[test]
    fn test_orphan_swap_has_none() {
        let t = table(vec![
            RemapRow::new(key('A'), key('B')),
            RemapRow::new(key('B'), key('A')),
        ]);
        assert!(get_orphaned_keys(&t).is_empty());
    }

    #[test]
    fn test_orphan_shortcut_target_does_not_restore() {
        let t = table(vec![
            RemapRow::new(key('A'), shortcut(&[KeyCode::CTRL, key('B')])),
            RemapRow::new(key('C'), key('A')),
        ]);
        assert_eq!(get_orphaned_keys(&t), vec![key('C')]);
    }

    #[test]
    fn test_orphan_ignores_incomplete_and_shortcut_sources() {
        let t = table(vec![
            RemapRow::new(key('A'), KeyCode::NONE),
            RemapRow::new(shortcut(&[KeyCode::CTRL, key('X')]), key('Y')),
            RemapRow::new(key('D'), key('E')),
            RemapRow::new(key('E'), key('D')),
        ]);
        assert!(get_orphaned_keys(&t).is_empty());
    }

    #[test]
    fn test_orphans_are_sorted() {
        let t = table(vec![
            RemapRow::new(key('Z'), KeyCode::ESCAPE),
            RemapRow::new(key('B'), key('Y')),
        ]);
        assert_eq!(get_orphaned_keys(&t), vec![key('B'), key('Z')]);
    }
}
