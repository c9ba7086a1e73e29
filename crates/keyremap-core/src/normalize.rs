//! Modifier normalization for single-key tables
//!
//! The runtime single-key table only holds physical codes, so a rule such as
//! `Ctrl -> A` is stored as `LCtrl -> A` plus `RCtrl -> A`. Before such a
//! table is shown for editing again, matching left/right pairs are folded
//! back into the generic code.

use crate::keys::ModifierKind;
use crate::keys::ModifierSide;
use crate::runtime::SingleKeyRemapTable;

/// Fold left/right modifier pairs with identical targets into the generic
/// code.
///
/// Pairs whose targets differ, or with only one side present, are left
/// alone. Applying this twice gives the same result as applying it once.
pub fn preprocess_remap_table(table: &SingleKeyRemapTable) -> SingleKeyRemapTable {
    let mut normalized = table.clone();

    for kind in ModifierKind::ALL {
        let left = kind.code(ModifierSide::Left);
        let right = kind.code(ModifierSide::Right);

        let merge = match (normalized.get(&left), normalized.get(&right)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        };

        if merge {
            if let Some(target) = normalized.remove(&left) {
                normalized.remove(&right);
                tracing::debug!("Folded {} and {} into {}", left, right, kind.generic());
                normalized.insert(kind.generic(), target);
            }
        }
    }

    normalized
}
