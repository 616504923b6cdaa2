//! Append-only, newest-first log of lifecycle events.

use std::{fmt, sync::Arc};

use serde::{Serialize, Serializer};
use shared::domain::{LifeEvent, LifeState};

use crate::clock::Clock;

/// Persistent newest-first list. Cloning shares every existing entry, so a
/// new snapshot costs one node no matter how long the log has grown.
#[derive(Clone, Default)]
pub struct EventLog {
    head: Option<Arc<Node>>,
    len: usize,
}

struct Node {
    event: LifeEvent,
    next: Option<Arc<Node>>,
}

impl EventLog {
    pub const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn newest(&self) -> Option<&LifeEvent> {
        self.head.as_deref().map(|node| &node.event)
    }

    pub fn get(&self, index: usize) -> Option<&LifeEvent> {
        self.iter().nth(index)
    }

    /// Newest first.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    pub fn append(
        &mut self,
        label: impl Into<String>,
        state: LifeState,
        clock: &dyn Clock,
    ) -> &LifeEvent {
        self.push_front(LifeEvent {
            label: label.into(),
            timestamp_ms: clock.now_ms(),
            color: state.color_tag(),
        })
    }

    pub fn push_front(&mut self, event: LifeEvent) -> &LifeEvent {
        let next = self.head.take();
        self.len += 1;
        let node = self.head.insert(Arc::new(Node { event, next }));
        &node.event
    }
}

impl Drop for EventLog {
    // Unlink iteratively; the default recursive drop can overflow the stack
    // on very long logs.
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(node) = cursor {
            match Arc::try_unwrap(node) {
                Ok(mut node) => cursor = node.next.take(),
                Err(_) => break,
            }
        }
    }
}

pub struct Iter<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a LifeEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some(&node.event)
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a LifeEvent;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for EventLog {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Serialize for EventLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
