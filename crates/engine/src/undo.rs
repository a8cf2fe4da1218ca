//! Bounded log of recent deletions.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::model::{Item, ItemId, Person};

/// Default number of deletions that can be undone.
pub const DEFAULT_UNDO_LIMIT: usize = 10;

/// A deletion that can be reverted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum UndoEntry {
    /// A removed person together with every quantity they held.
    Person {
        removed_person: Person,
        restored_quantities: Vec<(ItemId, f64)>,
    },
    /// A full copy of a removed item.
    Item { removed_item: Item },
}

impl UndoEntry {
    /// Name of the removed entity, for "restored ..." notices.
    pub fn label(&self) -> &str {
        match self {
            Self::Person { removed_person, .. } => &removed_person.name,
            Self::Item { removed_item } => &removed_item.name,
        }
    }
}

/// LIFO stack that forgets its oldest entries past `limit`.
#[derive(Clone, Debug, PartialEq)]
pub struct UndoLog {
    entries: VecDeque<UndoEntry>,
    limit: usize,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::with_limit(DEFAULT_UNDO_LIMIT)
    }
}

impl UndoLog {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn push(&mut self, entry: UndoEntry) {
        if self.limit == 0 {
            return;
        }
        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&UndoEntry> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &UndoEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemId, PersonId};

    fn entry(name: &str) -> UndoEntry {
        UndoEntry::Item {
            removed_item: Item::new(ItemId(0), name.to_string(), 1.0),
        }
    }

    #[test]
    fn pops_most_recent_first() {
        let mut log = UndoLog::default();
        log.push(entry("a"));
        log.push(entry("b"));

        assert_eq!(log.pop().unwrap().label(), "b");
        assert_eq!(log.pop().unwrap().label(), "a");
        assert!(log.pop().is_none());
    }

    #[test]
    fn drops_oldest_past_limit() {
        let mut log = UndoLog::with_limit(2);
        log.push(entry("a"));
        log.push(entry("b"));
        log.push(entry("c"));

        assert_eq!(log.len(), 2);
        let labels: Vec<_> = log.iter().map(UndoEntry::label).collect();
        assert_eq!(labels, vec!["b", "c"]);
    }

    #[test]
    fn zero_limit_keeps_nothing() {
        let mut log = UndoLog::with_limit(0);
        log.push(entry("a"));
        assert!(log.is_empty());
    }

    #[test]
    fn person_entry_json_shape() {
        let entry = UndoEntry::Person {
            removed_person: Person {
                id: PersonId(4),
                name: "Amy".to_string(),
            },
            restored_quantities: vec![(ItemId(1), 2.0)],
        };
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["kind"], "person");
        assert_eq!(json["removedPerson"]["name"], "Amy");
        assert_eq!(json["restoredQuantities"][0][0], 1);
        let back: UndoEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
