//! Remap table data model

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::keys::KeyCode;
use crate::shortcut::Shortcut;

// ============================================================================
// Cell values
// ============================================================================

/// One side of a remapping: a single key or a shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyInput {
    Key(KeyCode),
    Shortcut(Shortcut),
}

impl KeyInput {
    /// Empty single-key cell.
    pub const EMPTY: KeyInput = KeyInput::Key(KeyCode::NONE);

    /// A non-`NONE` key or a valid shortcut.
    pub fn is_complete(&self) -> bool {
        match self {
            KeyInput::Key(key) => !key.is_none(),
            KeyInput::Shortcut(shortcut) => shortcut.is_valid(),
        }
    }

    pub fn as_key(&self) -> Option<KeyCode> {
        match self {
            KeyInput::Key(key) => Some(*key),
            KeyInput::Shortcut(_) => None,
        }
    }

    pub fn as_shortcut(&self) -> Option<&Shortcut> {
        match self {
            KeyInput::Key(_) => None,
            KeyInput::Shortcut(shortcut) => Some(shortcut),
        }
    }
}

impl Default for KeyInput {
    fn default() -> Self {
        KeyInput::EMPTY
    }
}

impl From<KeyCode> for KeyInput {
    fn from(key: KeyCode) -> Self {
        KeyInput::Key(key)
    }
}

impl From<Shortcut> for KeyInput {
    fn from(shortcut: Shortcut) -> Self {
        KeyInput::Shortcut(shortcut)
    }
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyInput::Key(key) if key.is_none() => f.write_str("<none>"),
            KeyInput::Key(key) => write!(f, "{}", key),
            KeyInput::Shortcut(shortcut) if shortcut.is_empty() => f.write_str("<none>"),
            KeyInput::Shortcut(shortcut) => write!(f, "{}", shortcut),
        }
    }
}

impl Serialize for KeyInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Value of one drop-down slot in the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    /// Nothing selected yet.
    #[default]
    Unset,
    /// The explicit "none" entry.
    None,
    Key(KeyCode),
}

impl Selection {
    pub fn key(self) -> Option<KeyCode> {
        match self {
            Selection::Key(key) => Some(key),
            Selection::Unset | Selection::None => None,
        }
    }

    pub fn is_modifier(self) -> bool {
        self.key().is_some_and(KeyCode::is_modifier)
    }
}

impl From<KeyCode> for Selection {
    fn from(key: KeyCode) -> Self {
        Selection::Key(key)
    }
}

/// Column of a remap row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Source,
    Target,
}

impl Column {
    pub fn other(self) -> Column {
        match self {
            Column::Source => Column::Target,
            Column::Target => Column::Source,
        }
    }
}

impl std::str::FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "source" | "from" | "0" => Ok(Self::Source),
            "target" | "to" | "1" => Ok(Self::Target),
            _ => Err(format!("Unknown column: {}", s)),
        }
    }
}

// ============================================================================
// Rows and tables
// ============================================================================

/// Normalized application scope of a row.
///
/// Target-app text is trimmed and lower-cased; empty means OS-wide. Two
/// rows can only conflict when their scopes are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AppScope(String);

impl AppScope {
    pub fn new(app: &str) -> Self {
        Self(app.trim().to_lowercase())
    }

    pub fn os_wide() -> Self {
        Self::default()
    }

    pub fn is_os_wide(&self) -> bool {
        self.0.is_empty()
    }

    /// Lower-cased app name; empty for OS-wide.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_os_wide() {
            f.write_str("<all apps>")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// A single remapping rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapRow {
    pub source: KeyInput,
    pub target: KeyInput,
    /// Target application as typed; empty for OS-wide.
    pub target_app: String,
}

impl RemapRow {
    pub fn new(source: impl Into<KeyInput>, target: impl Into<KeyInput>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            target_app: String::new(),
        }
    }

    pub fn for_app(mut self, app: impl Into<String>) -> Self {
        self.target_app = app.into();
        self
    }

    pub fn scope(&self) -> AppScope {
        AppScope::new(&self.target_app)
    }

    pub fn cell(&self, column: Column) -> &KeyInput {
        match column {
            Column::Source => &self.source,
            Column::Target => &self.target,
        }
    }

    pub fn cell_mut(&mut self, column: Column) -> &mut KeyInput {
        match column {
            Column::Source => &mut self.source,
            Column::Target => &mut self.target,
        }
    }
}

/// The editable set of rules.
///
/// Row order only matters for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapTable {
    pub rows: Vec<RemapRow>,
}

impl RemapTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: RemapRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Result<&RemapRow, EditError> {
        let len = self.rows.len();
        self.rows
            .get(index)
            .ok_or(EditError::RowOutOfRange { row: index, len })
    }

    pub fn row_mut(&mut self, index: usize) -> Result<&mut RemapRow, EditError> {
        let len = self.rows.len();
        self.rows
            .get_mut(index)
            .ok_or(EditError::RowOutOfRange { row: index, len })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RemapRow> {
        self.rows.iter()
    }
}

impl FromIterator<RemapRow> for RemapTable {
    fn from_iter<I: IntoIterator<Item = RemapRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RemapTable {
    type Item = &'a RemapRow;
    type IntoIter = std::slice::Iter<'a, RemapRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// ============================================================================
// Validation results
// ============================================================================

/// Outcome of a validation.
///
/// `NoError` is the only success value. The messages are the ones shown to
/// the user next to the offending drop-down.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    #[error("Remapping successful")]
    NoError,
    #[error("Cannot remap a key to itself")]
    MapToSameKey,
    #[error("Cannot remap a shortcut to itself")]
    MapToSameShortcut,
    #[error("This key has already been remapped")]
    SameKeyPreviouslyMapped,
    #[error("This shortcut has already been remapped")]
    SameShortcutPreviouslyMapped,
    #[error("Conflicting modifier key")]
    ConflictingModifierKey,
    #[error("Conflicting modifier shortcut")]
    ConflictingModifierShortcut,
    #[error("Shortcuts must start with a modifier key")]
    ShortcutStartWithModifier,
    #[error("Shortcut cannot contain a repeated modifier")]
    ShortcutCannotHaveRepeatedModifier,
    #[error("Shortcuts can only have up to 4 modifier keys")]
    ShortcutMaxShortcutSizeOneActionKey,
    #[error("Shortcuts must contain an action key")]
    ShortcutOneActionKey,
    #[error("Shortcuts must have at least 2 keys")]
    ShortcutAtleast2Keys,
    #[error("Disable can not be an action or a modifier key")]
    ShortcutDisableAsActionKey,
    #[error("Win+L is reserved by the system and cannot be remapped")]
    WinL,
    #[error("Ctrl+Alt+Del is reserved by the system and cannot be remapped")]
    CtrlAltDel,
    #[error("Some remappings were not applied")]
    RemapUnsuccessful,
}

impl ErrorKind {
    pub fn is_ok(self) -> bool {
        self == ErrorKind::NoError
    }

    pub fn is_err(self) -> bool {
        !self.is_ok()
    }
}

/// Structural change the editing surface should make to a shortcut column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum DropDownAction {
    #[default]
    NoAction,
    AddDropDown,
    DeleteDropDown,
    ClearUnusedDropDowns,
}

impl fmt::Display for DropDownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropDownAction::NoAction => write!(f, "no action"),
            DropDownAction::AddDropDown => write!(f, "add drop-down"),
            DropDownAction::DeleteDropDown => write!(f, "delete drop-down"),
            DropDownAction::ClearUnusedDropDowns => write!(f, "clear unused drop-downs"),
        }
    }
}

/// Caller misuse of the editing API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("row {row} is out of range (table has {len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("slot {slot} is out of range (column has {len} drop-downs)")]
    SlotOutOfRange { slot: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_input_completeness() {
        assert!(!KeyInput::EMPTY.is_complete());
        assert!(KeyInput::Key(KeyCode::from_char('A')).is_complete());
        assert!(!KeyInput::Shortcut(Shortcut::from_keys([KeyCode::CTRL])).is_complete());
        assert!(KeyInput::Shortcut(Shortcut::from_keys([KeyCode::CTRL, KeyCode::L])).is_complete());
    }

    #[test]
    fn test_app_scope_normalization() {
        assert_eq!(AppScope::new("  Notepad.EXE "), AppScope::new("notepad.exe"));
        assert!(AppScope::new("   ").is_os_wide());
        assert_ne!(AppScope::new("code.exe"), AppScope::os_wide());
    }

    #[test]
    fn test_row_out_of_range() {
        let table = RemapTable::new();
        assert_eq!(
            table.row(2).unwrap_err(),
            EditError::RowOutOfRange { row: 2, len: 0 }
        );
    }

    #[test]
    fn test_column_parse() {
        assert_eq!("Source".parse::<Column>().unwrap(), Column::Source);
        assert_eq!("to".parse::<Column>().unwrap(), Column::Target);
        assert!("middle".parse::<Column>().is_err());
        assert_eq!(Column::Source.other(), Column::Target);
    }

    #[test]
    fn test_key_input_display() {
        assert_eq!(KeyInput::EMPTY.to_string(), "<none>");
        let shortcut = Shortcut::from_keys([KeyCode::CTRL, KeyCode::from_char('C')]);
        assert_eq!(KeyInput::from(shortcut).to_string(), "Ctrl+C");
    }
}
