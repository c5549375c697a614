//! Level Lookup
//!
//! Ranks a canonical swim time against the thresholds of one
//! (age bracket, gender, event, distance) group.
//!
//! Thresholds are times: a swim "beats" a threshold when it is strictly faster
//! (smaller). Within a group, faster thresholds carry higher levels.
//!
//! Ties between identical thresholds resolve to the lowest level value.
//! Rows with the dirty-row sentinel time never take part.

use serde::Serialize;
use std::cmp::Ordering;

use crate::data::{GroupKey, LevelTable, ReferenceRecord};
use crate::utils::time_parsing::round_to_centiseconds;

/// Distance to the nearest threshold not yet beaten
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelGap {
    /// Seconds to cut, rounded to 2 decimal places
    pub gap_seconds: f64,
    pub level: u32,
}

/// Achieved level for `time` in the group identified by `key`
///
/// Returns `None` for an empty group and when `time` is slower than or equal to
/// every threshold. A time faster than every threshold gets the fastest level.
pub fn find_level(table: &LevelTable, key: &GroupKey, time: f64) -> Option<u32> {
    find_level_in(table.group(key), time)
}

/// Gap to the next level for `time` in the group identified by `key`
///
/// Returns `None` for an empty group and when every threshold is slower than `time`.
pub fn next_level_gap(table: &LevelTable, key: &GroupKey, time: f64) -> Option<LevelGap> {
    next_level_gap_in(table.group(key), time)
}

/// Smallest threshold strictly greater than `time`, over pre-filtered rows
pub fn find_level_in<'a>(rows: impl IntoIterator<Item = &'a ReferenceRecord>, time: f64) -> Option<u32> {
    rows.into_iter()
        .filter(|r| r.has_threshold() && r.time > time)
        .min_by(|a, b| by_time_then_level(a, b))
        .map(|r| r.level)
}

/// Largest threshold less than or equal to `time`, over pre-filtered rows
pub fn next_level_gap_in<'a>(
    rows: impl IntoIterator<Item = &'a ReferenceRecord>,
    time: f64,
) -> Option<LevelGap> {
    rows.into_iter()
        .filter(|r| r.has_threshold() && r.time <= time)
        // max by time, lowest level among equal times
        .min_by(|a, b| b.time.total_cmp(&a.time).then(a.level.cmp(&b.level)))
        .map(|r| LevelGap {
            gap_seconds: round_to_centiseconds(time - r.time),
            level: r.level,
        })
}

fn by_time_then_level(a: &ReferenceRecord, b: &ReferenceRecord) -> Ordering {
    a.time.total_cmp(&b.time).then(a.level.cmp(&b.level))
}
