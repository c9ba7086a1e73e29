//! Live edit validation
//!
//! Runs each time the user changes one drop-down in the editing surface.
//! Single-key cells go through [`validate_and_update_key_buffer_element`],
//! which writes the cell when the edit is accepted. Shortcut columns go
//! through [`validate_shortcut_buffer_element`], which only reports: the
//! caller applies accepted edits with [`update_remap_buffer`] and performs
//! the returned [`DropDownAction`].
//!
//! ## Shortcut check order
//!
//! 1. Reserved system shortcuts (`Win+L`, `Ctrl+Alt+Del`)
//! 2. `Disable` outside the first slot
//! 3. Slot structure (modifiers first, an action key plus at most one chord
//!    key, size limits)
//! 4. Mapping a shortcut or key onto itself
//! 5. Collisions with other rows in the same app scope (source column only)
//!
//! The first failing check wins. A structural action found in step 3 is still
//! returned when step 4 or 5 fails.

use crate::keys::KeyCode;
use crate::model::{
    AppScope, Column, DropDownAction, EditError, ErrorKind, KeyInput, RemapTable, Selection,
};
use crate::overlap::ScopedOverlapDetector;
use crate::shortcut::{Shortcut, MAX_SHORTCUT_SIZE, MIN_SHORTCUT_SIZE};

// ============================================================================
// Single-key cells
// ============================================================================

/// Validate a single-key selection and write it into the table on success.
///
/// `Unset` and `None` clear the cell. On any error the table is left as it
/// was.
///
/// # Example
///
/// ```ignore
/// // Row 0 already maps A -> B; row 1 tries to map A as well.
/// let result = validate_and_update_key_buffer_element(&mut table, 1, Column::Source, Selection::Key(a))?;
/// assert_eq!(result, ErrorKind::SameKeyPreviouslyMapped);
/// ```
pub fn validate_and_update_key_buffer_element(
    table: &mut RemapTable,
    row: usize,
    column: Column,
    selection: Selection,
) -> Result<ErrorKind, EditError> {
    let current = table.row(row)?;

    let Some(key) = selection.key() else {
        *table.row_mut(row)?.cell_mut(column) = KeyInput::EMPTY;
        return Ok(ErrorKind::NoError);
    };

    let mut error = ErrorKind::NoError;

    if current.cell(column.other()).as_key() == Some(key) {
        error = ErrorKind::MapToSameKey;
    }

    if error.is_ok() && column == Column::Source {
        let detector = ScopedOverlapDetector::new(table);
        if let Some(conflict) = detector.find_conflict(&KeyInput::Key(key), &current.scope(), Some(row)) {
            tracing::debug!(
                "Key {} collides with row {}: {:?}",
                key,
                conflict.row,
                conflict.kind
            );
            error = conflict.kind;
        }
    }

    if error.is_ok() {
        *table.row_mut(row)?.cell_mut(column) = KeyInput::Key(key);
    } else {
        tracing::debug!("Rejected key {} for row {}: {}", key, row, error);
    }

    Ok(error)
}

// ============================================================================
// Shortcut columns
// ============================================================================

/// One drop-down change in a shortcut column.
#[derive(Debug, Clone)]
pub struct ShortcutEdit<'a> {
    pub row: usize,
    pub column: Column,
    /// Index of the drop-down that changed.
    pub slot: usize,
    /// Current value of every drop-down in the column, including `slot`.
    pub selections: &'a [Selection],
    /// Target-app text of the row.
    pub target_app: &'a str,
    /// The column accepts a single key as well as a shortcut.
    pub is_hybrid: bool,
    /// When false the row is OS-wide regardless of `target_app`.
    pub is_app_specific: bool,
}

impl ShortcutEdit<'_> {
    fn scope(&self) -> AppScope {
        if self.is_app_specific {
            AppScope::new(self.target_app)
        } else {
            AppScope::os_wide()
        }
    }
}

/// Number of slots holding an actual key.
pub fn selected_key_count(selections: &[Selection]) -> usize {
    selections.iter().filter(|s| s.key().is_some()).count()
}

/// Value a column's drop-downs describe.
///
/// A hybrid column with exactly one selected key is that key; anything else
/// is the shortcut built from the selected keys.
pub fn candidate_value(selections: &[Selection], is_hybrid: bool) -> KeyInput {
    let keys = selections.iter().filter_map(|s| s.key());
    if is_hybrid && selected_key_count(selections) == 1 {
        if let Some(key) = keys.clone().next() {
            return KeyInput::Key(key);
        }
    }
    KeyInput::Shortcut(Shortcut::from_keys(keys))
}

/// Validate one drop-down change in a shortcut column.
///
/// Never mutates the table.
pub fn validate_shortcut_buffer_element(
    table: &RemapTable,
    edit: &ShortcutEdit<'_>,
) -> Result<(ErrorKind, DropDownAction), EditError> {
    let current = table.row(edit.row)?;
    let selection = *edit.selections.get(edit.slot).ok_or(EditError::SlotOutOfRange {
        slot: edit.slot,
        len: edit.selections.len(),
    })?;

    let candidate = candidate_value(edit.selections, edit.is_hybrid);

    if let KeyInput::Shortcut(shortcut) = &candidate {
        if shortcut.is_win_l() {
            return Ok((ErrorKind::WinL, DropDownAction::NoAction));
        }
        if shortcut.is_ctrl_alt_del() {
            return Ok((ErrorKind::CtrlAltDel, DropDownAction::NoAction));
        }
    }

    let (mut error, action) = match selection {
        Selection::Unset => (ErrorKind::NoError, DropDownAction::NoAction),
        _ => check_slot_structure(edit.selections, edit.slot, selection, edit.is_hybrid),
    };

    if error.is_ok() {
        error = check_self_mapping(&candidate, current.cell(edit.column.other()));
    }

    if error.is_ok() && edit.column == Column::Source {
        let detector = ScopedOverlapDetector::new(table);
        if let Some(conflict) = detector.find_conflict(&candidate, &edit.scope(), Some(edit.row)) {
            error = conflict.kind;
        }
    }

    if error.is_err() {
        tracing::debug!(
            "Rejected slot {} of row {} ({}): {}",
            edit.slot,
            edit.row,
            candidate,
            error
        );
    }

    Ok((error, action))
}

/// Slot rules for a `None` or key selection.
fn check_slot_structure(
    selections: &[Selection],
    slot: usize,
    selection: Selection,
    is_hybrid: bool,
) -> (ErrorKind, DropDownAction) {
    let count = selections.len();
    let is_last = slot + 1 == count;

    if selection == Selection::Key(KeyCode::DISABLED) && slot > 0 {
        return (ErrorKind::ShortcutDisableAsActionKey, DropDownAction::NoAction);
    }

    if count == 1 && !selection.is_modifier() && !is_hybrid {
        return (ErrorKind::ShortcutStartWithModifier, DropDownAction::NoAction);
    }

    if selection.is_modifier() {
        if is_last && count >= MAX_SHORTCUT_SIZE {
            return (
                ErrorKind::ShortcutMaxShortcutSizeOneActionKey,
                DropDownAction::NoAction,
            );
        }
        if has_repeated_modifier(selections, selection) {
            return (
                ErrorKind::ShortcutCannotHaveRepeatedModifier,
                DropDownAction::NoAction,
            );
        }
        let action = if is_last {
            DropDownAction::AddDropDown
        } else {
            DropDownAction::NoAction
        };
        return (ErrorKind::NoError, action);
    }

    if selection == Selection::None {
        let hybrid_pair = is_hybrid && count == MIN_SHORTCUT_SIZE;
        return if (!is_last && count > MIN_SHORTCUT_SIZE) || hybrid_pair {
            (ErrorKind::NoError, DropDownAction::DeleteDropDown)
        } else if is_last {
            (ErrorKind::ShortcutOneActionKey, DropDownAction::NoAction)
        } else {
            (ErrorKind::ShortcutAtleast2Keys, DropDownAction::NoAction)
        };
    }

    if has_extra_action_key(selections) {
        return (ErrorKind::ShortcutOneActionKey, DropDownAction::NoAction);
    }

    if is_last {
        return (ErrorKind::NoError, DropDownAction::NoAction);
    }

    if slot != 0 || is_hybrid {
        let rest_unset = selections[slot + 1..].iter().all(|s| *s == Selection::Unset);
        let action = if rest_unset {
            DropDownAction::ClearUnusedDropDowns
        } else {
            DropDownAction::NoAction
        };
        return (ErrorKind::NoError, action);
    }

    (ErrorKind::ShortcutStartWithModifier, DropDownAction::NoAction)
}

/// The selected modifier's kind appears in more than one slot.
fn has_repeated_modifier(selections: &[Selection], selection: Selection) -> bool {
    let Some(kind) = selection.key().and_then(KeyCode::modifier_kind) else {
        return false;
    };
    selections
        .iter()
        .filter_map(|s| s.key())
        .filter(|key| key.modifier_kind() == Some(kind))
        .count()
        > 1
}

/// More non-modifiers than an action key and a chord key, or the same
/// non-modifier twice.
fn has_extra_action_key(selections: &[Selection]) -> bool {
    let keys: Vec<KeyCode> = selections
        .iter()
        .filter_map(|s| s.key())
        .filter(|key| !key.is_modifier())
        .collect();
    match keys.as_slice() {
        [] | [_] => false,
        [first, second] => first == second,
        _ => true,
    }
}

fn check_self_mapping(candidate: &KeyInput, other: &KeyInput) -> ErrorKind {
    match (candidate, other) {
        (KeyInput::Shortcut(a), KeyInput::Shortcut(b)) if a.is_valid() && b.is_valid() && a == b => {
            ErrorKind::MapToSameShortcut
        }
        (KeyInput::Key(a), KeyInput::Key(b)) if !a.is_none() && a == b => ErrorKind::MapToSameKey,
        _ => ErrorKind::NoError,
    }
}

/// Write a column's drop-down values into the table.
pub fn update_remap_buffer(
    table: &mut RemapTable,
    row: usize,
    column: Column,
    selections: &[Selection],
    is_hybrid: bool,
) -> Result<(), EditError> {
    let value = candidate_value(selections, is_hybrid);
    *table.row_mut(row)?.cell_mut(column) = value;
    Ok(())
}
