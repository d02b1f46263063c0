//! Bounded, append-only narrative log.
//!
//! Events are numbered as they are recorded. When a capacity is set and the
//! log grows past it, the oldest entries are dropped first; the survivors
//! keep their relative order.

use std::collections::VecDeque;

use granary_types::{Event, EventId, EventKind, Severity, Subphase};

/// FIFO event log with optional capacity.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<Event>,
    capacity: Option<usize>,
    next_id: EventId,
}

impl EventLog {
    /// Create an empty log. `None` means unbounded.
    pub const fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            next_id: EventId::FIRST,
        }
    }

    /// Rebuild a log from persisted entries.
    ///
    /// `next_id` is raised past the newest entry if needed, so identifiers
    /// stay unique even if the snapshot carried a stale counter. Entries
    /// beyond `capacity` are evicted oldest first.
    pub fn restore(entries: Vec<Event>, next_id: EventId, capacity: Option<usize>) -> Self {
        let floor = entries
            .iter()
            .map(|e| e.id.next())
            .max()
            .unwrap_or(EventId::FIRST);
        let mut log = Self {
            entries: entries.into(),
            capacity,
            next_id: next_id.max(floor),
        };
        log.evict();
        log
    }

    /// Create, append, and return a new event.
    pub fn record(
        &mut self,
        day: u64,
        subphase: Subphase,
        kind: EventKind,
        severity: Severity,
        text: impl Into<String>,
    ) -> Event {
        let event = Event {
            id: self.next_id,
            day,
            subphase,
            kind,
            severity,
            text: text.into(),
        };
        self.next_id = self.next_id.next();
        self.entries.push_back(event.clone());
        self.evict();
        event
    }

    fn evict(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.entries.len() > capacity {
            self.entries.pop_front();
        }
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no events are retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity, if any.
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Identifier the next recorded event will receive.
    pub const fn next_id(&self) -> EventId {
        self.next_id
    }

    /// Retained events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }

    /// The most recent `limit` events, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Event> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Events recorded after `id`, oldest first.
    pub fn since(&self, id: EventId) -> Vec<Event> {
        self.entries.iter().filter(|e| e.id > id).cloned().collect()
    }

    /// Copy of every retained event, oldest first.
    pub fn to_vec(&self) -> Vec<Event> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(log: &mut EventLog, text: &str) -> Event {
        log.record(1, Subphase::Morning, EventKind::Player, Severity::MIN, text)
    }

    #[test]
    fn ids_are_monotonic() {
        let mut log = EventLog::new(None);
        let a = push(&mut log, "a");
        let b = push(&mut log, "b");
        assert_eq!(a.id, EventId(1));
        assert_eq!(b.id, EventId(2));
        assert_eq!(log.next_id(), EventId(3));
    }

    #[test]
    fn unbounded_log_keeps_everything() {
        let mut log = EventLog::new(None);
        for i in 0..500 {
            push(&mut log, &format!("event {i}"));
        }
        assert_eq!(log.len(), 500);
    }

    #[test]
    fn overflow_evicts_oldest_and_keeps_order() {
        let mut log = EventLog::new(Some(3));
        for text in ["a", "b", "c", "d", "e"] {
            push(&mut log, text);
        }
        let texts: Vec<_> = log.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["c", "d", "e"]);
        // Eviction does not reuse identifiers.
        assert_eq!(log.next_id(), EventId(6));
    }

    #[test]
    fn recent_returns_tail_in_order() {
        let mut log = EventLog::new(None);
        for text in ["a", "b", "c", "d"] {
            push(&mut log, text);
        }
        let recent: Vec<_> = log.recent(2).into_iter().map(|e| e.text).collect();
        assert_eq!(recent, ["c", "d"]);
        assert_eq!(log.recent(10).len(), 4);
    }

    #[test]
    fn since_filters_by_id() {
        let mut log = EventLog::new(None);
        let first = push(&mut log, "a");
        push(&mut log, "b");
        push(&mut log, "c");
        assert_eq!(log.since(first.id).len(), 2);
    }

    #[test]
    fn restore_raises_stale_counter() {
        let mut source = EventLog::new(None);
        push(&mut source, "a");
        push(&mut source, "b");
        let log = EventLog::restore(source.to_vec(), EventId(1), Some(1));
        assert_eq!(log.len(), 1);
        assert_eq!(log.next_id(), EventId(3));
    }
}
