//! Save pipeline
//!
//! Saving a table runs, in order: batch validation, the orphaned-key report,
//! the runtime table builder, and finally hands the new snapshot to a
//! [`RuntimeSink`]. A table that fails validation never reaches the sink.

use std::convert::Infallible;
use std::sync::Arc;

use thiserror::Error;

use crate::batch::{check_if_remappings_are_valid, get_orphaned_keys};
use crate::keys::KeyCode;
use crate::model::{ErrorKind, RemapTable};
use crate::runtime::{RuntimeTables, RuntimeTablesBuilder};

/// Receives each committed snapshot.
pub trait RuntimeSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `is_app_specific_update` is set when the shortcut maps (and so the
    /// app-specific map) were rebuilt.
    fn commit(&mut self, tables: Arc<RuntimeTables>, is_app_specific_update: bool) -> Result<(), Self::Error>;
}

/// Keeps the most recent snapshot in memory.
#[derive(Debug, Default)]
pub struct SnapshotSink {
    current: Option<Arc<RuntimeTables>>,
    commits: usize,
}

impl SnapshotSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Arc<RuntimeTables>> {
        self.current.as_ref()
    }

    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl RuntimeSink for SnapshotSink {
    type Error = Infallible;

    fn commit(&mut self, tables: Arc<RuntimeTables>, _is_app_specific_update: bool) -> Result<(), Infallible> {
        self.current = Some(tables);
        self.commits += 1;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum SaveError<E: std::error::Error + 'static> {
    #[error("{0}")]
    Rejected(ErrorKind),

    #[error("failed to publish runtime tables")]
    Sink(#[source] E),
}

/// Result of a successful save.
#[derive(Debug, Clone)]
pub struct SaveReport {
    pub tables: Arc<RuntimeTables>,
    /// Keys remapped away with no rule producing them; advisory only.
    pub orphaned_keys: Vec<KeyCode>,
}

fn validate(table: &RemapTable) -> Result<Vec<KeyCode>, ErrorKind> {
    let result = check_if_remappings_are_valid(table);
    if result.is_err() {
        tracing::warn!("Refusing to save remappings: {}", result);
        return Err(result);
    }
    Ok(get_orphaned_keys(table))
}

fn publish<S: RuntimeSink>(
    sink: &mut S,
    tables: RuntimeTables,
    orphaned_keys: Vec<KeyCode>,
    is_app_specific_update: bool,
) -> Result<SaveReport, SaveError<S::Error>> {
    let tables = Arc::new(tables);
    sink.commit(Arc::clone(&tables), is_app_specific_update)
        .map_err(SaveError::Sink)?;
    tracing::info!("Committed runtime tables");
    Ok(SaveReport {
        tables,
        orphaned_keys,
    })
}

/// Save the single-key rows of `table`, keeping `previous`'s shortcut maps.
pub fn save_single_key_remappings<S: RuntimeSink>(
    table: &RemapTable,
    previous: &RuntimeTables,
    sink: &mut S,
) -> Result<SaveReport, SaveError<S::Error>> {
    let orphaned_keys = validate(table).map_err(SaveError::Rejected)?;
    let tables = RuntimeTablesBuilder::from_snapshot(previous)
        .apply_single_key_remappings(table)
        .build();
    publish(sink, tables, orphaned_keys, false)
}

/// Save the shortcut rows of `table`, keeping `previous`'s single-key map.
pub fn save_shortcut_remappings<S: RuntimeSink>(
    table: &RemapTable,
    previous: &RuntimeTables,
    keep_previous_app_specific: bool,
    sink: &mut S,
) -> Result<SaveReport, SaveError<S::Error>> {
    let orphaned_keys = validate(table).map_err(SaveError::Rejected)?;
    let tables = RuntimeTablesBuilder::from_snapshot(previous)
        .apply_shortcut_remappings(table, keep_previous_app_specific)
        .build();
    publish(sink, tables, orphaned_keys, true)
}

/// Save a table holding both single-key and shortcut rows from scratch.
pub fn save_remappings<S: RuntimeSink>(
    table: &RemapTable,
    sink: &mut S,
) -> Result<SaveReport, SaveError<S::Error>> {
    let orphaned_keys = validate(table).map_err(SaveError::Rejected)?;
    let tables = RuntimeTablesBuilder::new()
        .apply_single_key_remappings(table)
        .apply_shortcut_remappings(table, false)
        .build();
    publish(sink, tables, orphaned_keys, true)
}
