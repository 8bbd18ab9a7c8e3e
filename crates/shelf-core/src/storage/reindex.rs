//! Position reindexing
//!
//! Every partition keeps positions dense: the items of one type hold
//! exactly `0..n-1`. The functions here rewrite positions after
//! structural changes and are meant to run inside the transaction that
//! made the change.
//!
//! Writes are limited to rows whose position actually changes.

use rusqlite::{params, Connection};
use tracing::debug;

use crate::models::ItemType;
use crate::storage::error::StoreResult;

/// An item's id and its current stored position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: String,
    pub position: i64,
}

/// Load a partition ordered by current position
///
/// Ties (only possible in a damaged partition) break on id so the
/// resulting order is deterministic.
pub fn load_partition(conn: &Connection, item_type: ItemType) -> StoreResult<Vec<Slot>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, position FROM items WHERE type = ? ORDER BY position ASC, id ASC",
    )?;
    let slots = stmt
        .query_map(params![item_type.as_str()], |row| {
            Ok(Slot {
                id: row.get(0)?,
                position: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(slots)
}

/// Persist `slots` so that each one's position equals its index
///
/// Returns the number of rows written.
pub fn apply_order(conn: &Connection, slots: &[Slot]) -> StoreResult<usize> {
    let mut stmt = conn.prepare_cached("UPDATE items SET position = ? WHERE id = ?")?;
    let mut written = 0;
    for (index, slot) in slots.iter().enumerate() {
        let index = index as i64;
        if slot.position != index {
            stmt.execute(params![index, slot.id])?;
            written += 1;
        }
    }
    Ok(written)
}

/// Renumber a partition to `0..n-1` keeping its current order
pub fn renumber(conn: &Connection, item_type: ItemType) -> StoreResult<usize> {
    let slots = load_partition(conn, item_type)?;
    let written = apply_order(conn, &slots)?;
    debug!(partition = %item_type, items = slots.len(), written, "renumbered partition");
    Ok(written)
}

/// Clamp a requested index into `[0, len]`; negatives prepend
pub fn clamp_target(target: i64, len: usize) -> usize {
    if target <= 0 {
        0
    } else {
        (target as u64).min(len as u64) as usize
    }
}

/// Move the slot at `from` so it ends up at `target` (clamped)
///
/// `target` is interpreted against the sequence with the moved slot
/// removed, so `len` after removal is the append position.
pub fn plan_move(slots: &mut Vec<Slot>, from: usize, target: i64) {
    let moved = slots.remove(from);
    let index = clamp_target(target, slots.len());
    slots.insert(index, moved);
}

/// Move one item within its partition
///
/// Returns `None` when the item is not in `item_type`'s partition (it was
/// deleted or lives in the other list), otherwise the number of rows
/// written. Moving an item to its own position writes nothing.
pub fn reorder(
    conn: &Connection,
    item_type: ItemType,
    item_id: &str,
    target: i64,
) -> StoreResult<Option<usize>> {
    let mut slots = load_partition(conn, item_type)?;
    let Some(from) = slots.iter().position(|s| s.id == item_id) else {
        return Ok(None);
    };

    let in_place = slots
        .iter()
        .enumerate()
        .all(|(index, slot)| slot.position == index as i64);
    if in_place && clamp_target(target, slots.len() - 1) == from {
        return Ok(Some(0));
    }

    plan_move(&mut slots, from, target);
    let written = apply_order(conn, &slots)?;
    debug!(partition = %item_type, item_id, target, written, "reordered item");
    Ok(Some(written))
}

/// Shift every position in a partition up by `by` to open slots at the head
pub fn shift(conn: &Connection, item_type: ItemType, by: i64) -> StoreResult<usize> {
    if by == 0 {
        return Ok(0);
    }
    let shifted = conn
        .prepare_cached("UPDATE items SET position = position + ? WHERE type = ?")?
        .execute(params![by, item_type.as_str()])?;
    Ok(shifted)
}

/// Renumber a partition newest-first by creation time
///
/// Maintenance path for databases whose positions were written by
/// something other than this crate.
pub fn repair(conn: &Connection, item_type: ItemType) -> StoreResult<usize> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, position FROM items WHERE type = ? ORDER BY created_at DESC, id ASC",
    )?;
    let slots = stmt
        .query_map(params![item_type.as_str()], |row| {
            Ok(Slot {
                id: row.get(0)?,
                position: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    apply_order(conn, &slots)
}

/// Check that a partition's positions are exactly `0..n-1`
pub fn is_dense(conn: &Connection, item_type: ItemType) -> StoreResult<bool> {
    let (count, distinct, min, max): (i64, i64, Option<i64>, Option<i64>) = conn
        .prepare_cached(
            "SELECT COUNT(*), COUNT(DISTINCT position), MIN(position), MAX(position)
             FROM items WHERE type = ?",
        )?
        .query_row(params![item_type.as_str()], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;

    Ok(match (min, max) {
        (None, None) => count == 0,
        (Some(min), Some(max)) => min == 0 && max == count - 1 && distinct == count,
        _ => false,
    })
}
