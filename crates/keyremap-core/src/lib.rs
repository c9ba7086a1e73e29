//! Remapping rule engine for keyremap
//!
//! This crate holds the editable remap table model, the validation run on
//! every interactive edit, the batch validation run before a commit, and the
//! compilation of a validated table into the runtime lookup tables used by
//! the key-interception engine.

pub mod batch;
pub mod commit;
pub mod keys;
pub mod live;
pub mod model;
pub mod normalize;
pub mod overlap;
pub mod runtime;
pub mod shortcut;

pub use batch::{check_if_remappings_are_valid, get_orphaned_keys, validate_rows};
pub use commit::{
    save_remappings, save_shortcut_remappings, save_single_key_remappings, RuntimeSink, SaveError,
    SaveReport, SnapshotSink,
};
pub use keys::{parse_key, KeyCode, ModifierKind, ModifierSide};
pub use live::{
    update_remap_buffer, validate_and_update_key_buffer_element, validate_shortcut_buffer_element,
    ShortcutEdit,
};
pub use model::*;
pub use normalize::preprocess_remap_table;
pub use runtime::{
    AppSpecificShortcutRemapTable, RuntimeTables, RuntimeTablesBuilder, ShortcutRemapTable,
    SingleKeyRemapTable,
};
pub use shortcut::{parse_shortcut, Shortcut, ShortcutParseError, MAX_SHORTCUT_SIZE, MIN_SHORTCUT_SIZE};
