use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use crate::event::{Event, EventId, EventKind};
use crate::job::{Job, SourceId};
use crate::time::SimTime;

/// Entry stored in the event queue: the event plus the id it was scheduled under.
///
/// Entries are totally ordered by `(time, kind rank, id)`, so equal-time events
/// come out completions first and then in the order they were scheduled.
#[derive(Debug)]
pub struct EventEntry {
    id: EventId,
    event: Event,
}

impl EventEntry {
    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn time(&self) -> SimTime {
        self.event.time
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn into_event(self) -> Event {
        self.event
    }

    fn key(&self) -> (SimTime, u8, EventId) {
        (self.event.time, self.event.kind.tie_rank(), self.id)
    }
}

impl PartialEq for EventEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for EventEntry {}

impl PartialOrd for EventEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse the ordering for min-heap behavior in BinaryHeap
        other.key().cmp(&self.key())
    }
}

/// Time-ordered queue of pending events together with the simulation clock.
///
/// The clock moves to an event's time when that event is popped. Pending
/// arrivals are also indexed per source so the next one can be looked up
/// without scanning the heap.
#[derive(Debug, Default)]
pub struct EventQueue {
    next_event_id: u64,
    events: BinaryHeap<EventEntry>,
    arrivals: HashMap<SourceId, BTreeMap<(SimTime, EventId), Job>>,
    clock: SimTime,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `event` at its absolute time and returns the id it was given.
    pub fn schedule(&mut self, event: Event) -> EventId {
        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        if event.kind == EventKind::ArrivalCreated {
            self.arrivals
                .entry(event.job.source())
                .or_default()
                .insert((event.time, id), event.job.clone());
        }
        self.events.push(EventEntry { id, event });
        id
    }

    /// Current simulation time: the time of the last popped event.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.clock
    }

    /// Returns a reference to the next scheduled event or `None` if none are left.
    pub fn peek(&self) -> Option<&EventEntry> {
        self.events.peek()
    }

    /// Removes and returns the next scheduled event or `None` if none are left.
    pub fn pop(&mut self) -> Option<EventEntry> {
        let entry = self.events.pop()?;
        self.clock = entry.time();
        if entry.event.kind == EventKind::ArrivalCreated {
            self.unindex_arrival(&entry);
        }
        Some(entry)
    }

    /// Job of the earliest pending arrival for `source`, if any.
    pub fn next_arrival_for(&self, source: SourceId) -> Option<&Job> {
        self.arrivals
            .get(&source)
            .and_then(BTreeMap::first_key_value)
            .map(|(_, job)| job)
    }

    /// Number of sources with at least one pending arrival.
    pub fn sources_with_arrivals(&self) -> usize {
        self.arrivals.len()
    }

    fn unindex_arrival(&mut self, entry: &EventEntry) {
        let source = entry.event.job.source();
        if let Some(pending) = self.arrivals.get_mut(&source) {
            pending.remove(&(entry.time(), entry.id));
            if pending.is_empty() {
                self.arrivals.remove(&source);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
