//! Runtime lookup tables
//!
//! A validated [`RemapTable`] is compiled into three lookup maps consumed by
//! the interception engine:
//!
//! - single-key remaps, keyed by physical key code
//! - OS-wide shortcut remaps
//! - app-specific shortcut remaps, keyed by lower-cased app name
//!
//! The maps are built by [`RuntimeTablesBuilder`] and frozen into a
//! [`RuntimeTables`] snapshot. Snapshots are never patched: every commit
//! produces a new one.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::keys::{KeyCode, ModifierSide};
use crate::model::{KeyInput, RemapRow, RemapTable};
use crate::normalize::preprocess_remap_table;
use crate::shortcut::Shortcut;

pub type SingleKeyRemapTable = BTreeMap<KeyCode, KeyInput>;
pub type ShortcutRemapTable = BTreeMap<Shortcut, KeyInput>;
pub type AppSpecificShortcutRemapTable = BTreeMap<String, ShortcutRemapTable>;

/// Immutable snapshot of the compiled remappings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeTables {
    pub single_key: SingleKeyRemapTable,
    pub os_level_shortcuts: ShortcutRemapTable,
    pub app_specific_shortcuts: AppSpecificShortcutRemapTable,
}

impl RuntimeTables {
    pub fn is_empty(&self) -> bool {
        self.single_key.is_empty()
            && self.os_level_shortcuts.is_empty()
            && self.app_specific_shortcuts.values().all(BTreeMap::is_empty)
    }

    /// Editable single-key rows, with left/right modifier pairs folded back
    /// into generic codes.
    pub fn single_key_rows(&self) -> RemapTable {
        preprocess_remap_table(&self.single_key)
            .into_iter()
            .map(|(source, target)| RemapRow::new(source, target))
            .collect()
    }

    /// Editable shortcut rows, OS-wide rows first.
    pub fn shortcut_rows(&self) -> RemapTable {
        let os_level = self
            .os_level_shortcuts
            .iter()
            .map(|(source, target)| RemapRow::new(source.clone(), target.clone()));

        let app_specific = self.app_specific_shortcuts.iter().flat_map(|(app, table)| {
            table
                .iter()
                .map(move |(source, target)| RemapRow::new(source.clone(), target.clone()).for_app(app.clone()))
        });

        os_level.chain(app_specific).collect()
    }
}

/// Compiles remap tables into a [`RuntimeTables`] snapshot.
///
/// # Example
///
/// ```ignore
/// let tables = RuntimeTablesBuilder::from_snapshot(&previous)
///     .apply_shortcut_remappings(&table, false)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuntimeTablesBuilder {
    tables: RuntimeTables,
}

impl RuntimeTablesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a previous snapshot so untouched maps carry over.
    pub fn from_snapshot(previous: &RuntimeTables) -> Self {
        Self {
            tables: previous.clone(),
        }
    }

    /// Replace the single-key map with the table's single-key rows.
    ///
    /// Rows that are incomplete, have a shortcut source, or carry a target
    /// app are skipped. A generic modifier source is stored under both its
    /// left and right codes.
    pub fn apply_single_key_remappings(mut self, table: &RemapTable) -> Self {
        self.tables.single_key.clear();

        for row in table {
            let KeyInput::Key(source) = row.source else {
                continue;
            };
            if !row.source.is_complete() || !row.target.is_complete() {
                tracing::debug!("Skipping incomplete row {} -> {}", row.source, row.target);
                continue;
            }
            if !row.scope().is_os_wide() {
                tracing::warn!(
                    "Ignoring app-specific key remap {} -> {} for {}",
                    row.source,
                    row.target,
                    row.scope()
                );
                continue;
            }

            match source.modifier() {
                Some((kind, ModifierSide::Both)) => {
                    for side in [ModifierSide::Left, ModifierSide::Right] {
                        self.insert_single_key(kind.code(side), &row.target);
                    }
                }
                _ => self.insert_single_key(source, &row.target),
            }
        }

        self
    }

    fn insert_single_key(&mut self, source: KeyCode, target: &KeyInput) {
        tracing::debug!("Registered key remap: {} -> {}", source, target);
        self.tables.single_key.insert(source, target.clone());
    }

    /// Replace the shortcut maps with the table's shortcut rows.
    ///
    /// The OS-wide map is always rebuilt. The app-specific map is cleared
    /// unless `keep_previous_app_specific` is set, in which case existing
    /// entries stay and rows from `table` overwrite them one by one.
    /// Generic modifiers are kept as-is; the engine matches them against
    /// either physical key.
    pub fn apply_shortcut_remappings(mut self, table: &RemapTable, keep_previous_app_specific: bool) -> Self {
        self.tables.os_level_shortcuts.clear();
        if !keep_previous_app_specific {
            self.tables.app_specific_shortcuts.clear();
        }

        for row in table {
            let KeyInput::Shortcut(source) = &row.source else {
                continue;
            };
            if !source.is_valid() || !row.target.is_complete() {
                tracing::debug!("Skipping incomplete row {} -> {}", row.source, row.target);
                continue;
            }

            let scope = row.scope();
            let map = if scope.is_os_wide() {
                &mut self.tables.os_level_shortcuts
            } else {
                self.tables
                    .app_specific_shortcuts
                    .entry(scope.as_str().to_string())
                    .or_default()
            };

            tracing::debug!("Registered shortcut remap: {} -> {} ({})", source, row.target, scope);
            map.insert(source.clone(), row.target.clone());
        }

        self
    }

    pub fn build(self) -> RuntimeTables {
        tracing::info!(
            "Compiled {} key remap(s), {} OS-wide shortcut remap(s), {} app(s) with shortcut remaps",
            self.tables.single_key.len(),
            self.tables.os_level_shortcuts.len(),
            self.tables.app_specific_shortcuts.len()
        );
        self.tables
    }
}
