//! Position planning for a user's ordered workout list
//!
//! Every positional change to an owner's list is expressed as a
//! [`Reposition`]. The planner turns it into at most one conditional
//! [`RangeShift`] that SQL backends apply as a range UPDATE, and into a
//! pure in-memory renumbering ([`reindex`]) used by the memory backend and
//! by tests. Both paths derive from the same boundaries, so the stores and
//! the in-memory model cannot disagree about which rows move.
//!
//! Positions are zero-based: an owner with `n` workouts holds exactly
//! `0..n`.

use serde::{Deserialize, Serialize};

use crate::error::{RepsheetError, Result};

/// First position of every owner's list
pub const ORIGIN: i32 = 0;

/// What to do with a desired position outside the valid range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionPolicy {
    /// Fail with [`RepsheetError::InvalidPosition`]
    #[default]
    Reject,
    /// Snap to the nearest valid bound
    Clamp,
}

/// A single positional operation on one owner's list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reposition {
    /// A new row takes position `at`
    Insert { at: i32 },
    /// The row at `at` leaves the list
    Remove { at: i32 },
    /// The row at `from` moves to `to`
    Move { from: i32, to: i32 },
}

/// Add `delta` to every position in `start..=end` of one owner's list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeShift {
    pub start: i32,
    pub end: i32,
    pub delta: i32,
}

impl RangeShift {
    pub fn contains(&self, position: i32) -> bool {
        self.start <= position && position <= self.end
    }

    pub fn apply(&self, position: i32) -> i32 {
        if self.contains(position) {
            position + self.delta
        } else {
            position
        }
    }
}

impl Reposition {
    /// The range update that keeps a list of `count` rows dense around this
    /// operation. `count` is the number of rows before the operation.
    ///
    /// The row being moved or removed never falls inside the returned range.
    pub fn range_shift(&self, count: i64) -> Option<RangeShift> {
        let last = last_position(count);
        let shift = match *self {
            Self::Insert { at } => RangeShift {
                start: at,
                end: last,
                delta: 1,
            },
            Self::Remove { at } => RangeShift {
                start: at + 1,
                end: last,
                delta: -1,
            },
            Self::Move { from, to } if to < from => RangeShift {
                start: to,
                end: from - 1,
                delta: 1,
            },
            Self::Move { from, to } if to > from => RangeShift {
                start: from + 1,
                end: to,
                delta: -1,
            },
            Self::Move { .. } => return None,
        };

        (shift.start <= shift.end).then_some(shift)
    }
}

/// Apply `op` to the positions of one owner's list.
///
/// Returns the new position of each input entry, in input order. The removed
/// entry of a [`Reposition::Remove`] maps to `None`. An inserted row is not
/// part of the input; it takes the `at` position the operation names.
pub fn reindex(positions: &[i32], op: Reposition) -> Vec<Option<i32>> {
    let shift = op.range_shift(positions.len() as i64);

    positions
        .iter()
        .map(|&position| match op {
            Reposition::Remove { at } if position == at => None,
            Reposition::Move { from, to } if position == from => Some(to),
            _ => Some(shift.map_or(position, |s| s.apply(position))),
        })
        .collect()
}

/// Resolve a desired insert position against a list of `count` rows.
///
/// Valid positions are `ORIGIN..=count`; `count` appends.
pub fn resolve_insert(desired: i32, count: i64, policy: PositionPolicy) -> Result<i32> {
    resolve(desired, ORIGIN, ORIGIN + to_position(count), policy)
}

/// Resolve a desired target position for moving a row within a list of
/// `count` rows. Valid positions are `ORIGIN..count`.
pub fn resolve_move(desired: i32, count: i64, policy: PositionPolicy) -> Result<i32> {
    if count <= 0 {
        return Err(RepsheetError::Internal(
            "cannot move a row within an empty list".to_string(),
        ));
    }
    resolve(desired, ORIGIN, last_position(count), policy)
}

fn resolve(desired: i32, min: i32, max: i32, policy: PositionPolicy) -> Result<i32> {
    if (min..=max).contains(&desired) {
        return Ok(desired);
    }
    match policy {
        PositionPolicy::Reject => Err(RepsheetError::InvalidPosition {
            position: desired,
            min,
            max,
        }),
        PositionPolicy::Clamp => Ok(desired.clamp(min, max)),
    }
}

/// Why a list of positions is not dense
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DensityViolation {
    /// `position` is held by more than one row
    Duplicate { position: i32 },
    /// No row holds `position`
    Gap { position: i32 },
}

/// Check that `positions` is exactly `ORIGIN..ORIGIN + len`, in any order.
pub fn check_density(positions: &[i32]) -> std::result::Result<(), DensityViolation> {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();

    for (index, &position) in sorted.iter().enumerate() {
        let expected = ORIGIN + to_position(index as i64);
        if index > 0 && sorted[index - 1] == position {
            return Err(DensityViolation::Duplicate { position });
        }
        if position != expected {
            return Err(DensityViolation::Gap { position: expected });
        }
    }
    Ok(())
}

fn to_position(count: i64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn last_position(count: i64) -> i32 {
    to_position(count) - 1 + ORIGIN
}
