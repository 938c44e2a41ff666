//! Filtering, ordering and capping for `list` operations.
//!
//! The rules are shared by every collection:
//!
//! | bounds given | kept                         | order      | limit   |
//! |--------------|------------------------------|------------|---------|
//! | none         | all                          | ascending  | ignored |
//! | start only   | `ts >= start`                | ascending  | applied |
//! | end only     | `ts <= end`                  | descending | applied |
//! | both         | `start <= ts <= end`         | ascending  | ignored |
//!
//! An end-only query asks "what comes before X", so the records closest to
//! X come first. Records with equal timestamps are ordered by key.

use std::cmp::Ordering;

use huddle_types::Timestamp;

use crate::record::Record;

/// Options accepted by `list` operations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Keep only records owned by this user.
    pub creator_id: Option<String>,
    /// Inclusive lower bound on the record's primary timestamp.
    pub start: Option<Timestamp>,
    /// Inclusive upper bound on the record's primary timestamp.
    pub end: Option<Timestamp>,
    /// Row cap, honoured only when exactly one of `start`/`end` is set.
    pub limit: Option<usize>,
}

/// Sort direction chosen for a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl ListOptions {
    /// No filters: every record, ascending.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn created_by(mut self, creator_id: impl Into<String>) -> Self {
        self.creator_id = Some(creator_id.into());
        self
    }

    pub fn since(mut self, start: Timestamp) -> Self {
        self.start = Some(start);
        self
    }

    pub fn until(mut self, end: Timestamp) -> Self {
        self.end = Some(end);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Descending only for end-only queries.
    pub fn direction(&self) -> SortDirection {
        match (self.start, self.end) {
            (None, Some(_)) => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }

    /// The row cap that actually applies to this query.
    pub fn effective_limit(&self) -> Option<usize> {
        match (self.start, self.end) {
            (Some(_), None) | (None, Some(_)) => self.limit,
            _ => None,
        }
    }

    fn matches<R: Record>(&self, record: &R) -> bool {
        if let Some(creator) = &self.creator_id {
            if record.owner() != creator {
                return false;
            }
        }
        let ts = record.timestamp();
        if let Some(start) = self.start {
            if ts < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if ts > end {
                return false;
            }
        }
        true
    }

    /// Filter, order and cap `records` according to these options.
    pub fn apply<R: Record>(&self, records: Vec<R>) -> Vec<R> {
        let mut kept: Vec<(Timestamp, String, R)> = records
            .into_iter()
            .filter(|r| self.matches(r))
            .map(|r| (r.timestamp(), r.key(), r))
            .collect();

        let ascending = |a: &(Timestamp, String, R), b: &(Timestamp, String, R)| -> Ordering {
            a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1))
        };
        match self.direction() {
            SortDirection::Ascending => kept.sort_by(ascending),
            SortDirection::Descending => kept.sort_by(|a, b| ascending(b, a)),
        }

        if let Some(limit) = self.effective_limit() {
            kept.truncate(limit);
        }
        kept.into_iter().map(|(_, _, r)| r).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use huddle_types::{parse_timestamp, Event};

    fn base() -> Timestamp {
        parse_timestamp("2026-12-01T09:00:00+09:00").unwrap()
    }

    fn at(hours: i64) -> Timestamp {
        base() + Duration::hours(hours)
    }

    fn event(room: &str, creator: &str, start_hours: i64) -> Event {
        Event {
            chat_room_id: room.into(),
            creator_id: creator.into(),
            title: format!("event {room}"),
            start_time: at(start_hours),
            end_time: at(start_hours + 1),
            fee: String::new(),
            capacity: 10,
            description: String::new(),
            show_creator: true,
        }
    }

    /// T1 < T2 < T3 < T4, stored out of order.
    fn four() -> Vec<Event> {
        vec![
            event("t3", "a", 30),
            event("t1", "a", 10),
            event("t4", "b", 40),
            event("t2", "b", 20),
        ]
    }

    fn keys(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.chat_room_id.as_str()).collect()
    }

    #[test]
    fn unbounded_is_ascending() {
        let out = ListOptions::all().apply(four());
        assert_eq!(keys(&out), vec!["t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn end_only_is_descending_and_excludes_later() {
        let out = ListOptions::all().until(at(35)).apply(four());
        assert_eq!(keys(&out), vec!["t3", "t2", "t1"]);
    }

    #[test]
    fn start_only_is_ascending_and_excludes_earlier() {
        let out = ListOptions::all().since(at(15)).apply(four());
        assert_eq!(keys(&out), vec!["t2", "t3", "t4"]);
    }

    #[test]
    fn both_bounds_are_inclusive() {
        let out = ListOptions::all().since(at(20)).until(at(30)).apply(four());
        assert_eq!(keys(&out), vec!["t2", "t3"]);
    }

    #[test]
    fn creator_filter() {
        let out = ListOptions::all().created_by("b").apply(four());
        assert_eq!(keys(&out), vec!["t2", "t4"]);
    }

    #[test]
    fn limit_applies_with_one_bound() {
        let out = ListOptions::all().since(at(0)).limit(3).apply(four());
        assert_eq!(keys(&out), vec!["t1", "t2", "t3"]);

        let out = ListOptions::all().until(at(100)).limit(2).apply(four());
        assert_eq!(keys(&out), vec!["t4", "t3"]);
    }

    #[test]
    fn limit_ignored_with_both_bounds_or_none() {
        let out = ListOptions::all()
            .since(at(0))
            .until(at(100))
            .limit(2)
            .apply(four());
        assert_eq!(out.len(), 4);

        let out = ListOptions::all().limit(1).apply(four());
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn equal_timestamps_ordered_by_key() {
        let events = vec![event("b", "x", 5), event("a", "x", 5), event("c", "x", 5)];
        let asc = ListOptions::all().apply(events.clone());
        assert_eq!(keys(&asc), vec!["a", "b", "c"]);
        let desc = ListOptions::all().until(at(5)).apply(events);
        assert_eq!(keys(&desc), vec!["c", "b", "a"]);
    }

    #[test]
    fn bounds_compare_instants_across_offsets() {
        let utc_bound = parse_timestamp("2026-12-01T01:00:00Z").unwrap(); // == base()+1h
        let out = ListOptions::all()
            .since(utc_bound)
            .apply(vec![event("early", "x", 0), event("on", "x", 1)]);
        assert_eq!(keys(&out), vec!["on"]);
    }

    #[test]
    fn empty_match_is_empty() {
        let out = ListOptions::all().since(at(1000)).apply(four());
        assert!(out.is_empty());
    }

    #[test]
    fn direction_and_effective_limit() {
        let o = ListOptions::all().limit(5);
        assert_eq!(o.direction(), SortDirection::Ascending);
        assert_eq!(o.effective_limit(), None);
        let o = o.until(at(0));
        assert_eq!(o.direction(), SortDirection::Descending);
        assert_eq!(o.effective_limit(), Some(5));
    }
}
