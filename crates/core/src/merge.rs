use std::collections::HashSet;

use crate::domain::RosterEntry;

/// Merge a freshly fetched page into the accumulated list.
///
/// Order-preserving, deduplicating append: `prev` keeps its relative order,
/// and an item of `next` is appended only when its id is not present yet.
/// Idempotent — merging the same page twice yields the same list, which is
/// what protects against re-fetches and races that naive concatenation
/// would turn into duplicate rows.
pub fn merge(prev: Vec<RosterEntry>, next: Vec<RosterEntry>) -> Vec<RosterEntry> {
    let mut seen: HashSet<i64> = prev.iter().map(|entry| entry.id).collect();
    let mut merged = prev;
    for entry in next {
        if seen.insert(entry.id) {
            merged.push(entry);
        }
    }
    merged
}
