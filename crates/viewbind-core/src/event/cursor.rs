use std::collections::VecDeque;

use super::{Event, EventKind};
use crate::errors::{Result, ViewError};

/// Consumable view, read front to back
///
/// The application engine removes events one at a time and may push one
/// back after peeking. Subtrees can be skipped or captured whole, which is
/// what lets unknown properties and splices be consumed out of lockstep
/// with the template recursion.
#[derive(Debug, Clone, Default)]
pub struct EventCursor {
    events: VecDeque<Event>,
    consumed: usize,
}

impl EventCursor {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
            consumed: 0,
        }
    }

    pub fn peek(&self) -> Option<&Event> {
        self.events.front()
    }

    pub fn next_event(&mut self) -> Option<Event> {
        let event = self.events.pop_front();
        if event.is_some() {
            self.consumed += 1;
        }
        event
    }

    /// Remove the next event, failing if the view ended early
    ///
    /// # Errors
    ///
    /// Returns `MalformedStream` when no events remain.
    pub fn require_next(&mut self, expecting: &str) -> Result<Event> {
        self.next_event().ok_or_else(|| {
            ViewError::malformed(format!("view ended while expecting {}", expecting))
        })
    }

    /// Put an event back at the front
    pub fn push_front(&mut self, event: Event) {
        self.consumed = self.consumed.saturating_sub(1);
        self.events.push_front(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Number of events removed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Discard the rest of the subtree opened by `trigger`
    ///
    /// For scalar triggers there is nothing left to skip. Returns the number
    /// of events discarded, not counting the trigger.
    ///
    /// # Errors
    ///
    /// Returns `MalformedStream` if nesting inside the subtree is broken or
    /// the view ends before the subtree is closed.
    pub fn skip_subtree(&mut self, trigger: &Event) -> Result<usize> {
        let mut skipped = 0;
        self.walk_subtree(trigger, |_| skipped += 1)?;
        Ok(skipped)
    }

    /// Remove and return the subtree opened by `trigger`, trigger included
    ///
    /// # Errors
    ///
    /// Same conditions as [`EventCursor::skip_subtree`].
    pub fn take_subtree(&mut self, trigger: Event) -> Result<Vec<Event>> {
        let mut captured = Vec::new();
        let opener = trigger.clone();
        captured.push(trigger);
        self.walk_subtree(&opener, |event| captured.push(event))?;
        Ok(captured)
    }

    fn walk_subtree(&mut self, trigger: &Event, mut sink: impl FnMut(Event)) -> Result<()> {
        if !trigger.kind.is_begin() {
            if trigger.kind.is_end() {
                return Err(ViewError::malformed(format!(
                    "unexpected {} with no open element",
                    trigger
                )));
            }
            return Ok(());
        }

        let mut open: Vec<Event> = vec![trigger.clone()];
        while let Some(top) = open.last() {
            let event = self
                .next_event()
                .ok_or_else(|| ViewError::malformed(format!("view ended inside {}", top)))?;

            if event.kind.is_begin() {
                open.push(event.clone());
            } else if event.kind.is_end() {
                if !top.is_closed_by(&event) {
                    return Err(ViewError::malformed(format!(
                        "{} does not close {}",
                        event, top
                    )));
                }
                open.pop();
            } else if event.kind == EventKind::Discriminator
                && !matches!(open.last(), Some(e) if e.kind == EventKind::BeginObject)
            {
                return Err(ViewError::malformed(format!(
                    "discriminator {} outside of an object",
                    event
                )));
            }
            sink(event);
        }
        Ok(())
    }
}
