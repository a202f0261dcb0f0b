//! External events and the queues that deliver them.
//!
//! Event queues are how anything outside the stepping loop injects work at a
//! chosen simulation time: traffic generators, trace replayers, forced update
//! requests.  The world drains every queue up to `now + Δ` each tick,
//! advancing the clock to each event's timestamp before applying it and
//! running a full host-update pass afterwards, so routers always see the
//! post-event state before the next event lands.

use std::collections::VecDeque;

use dtn_core::SimResult;

use crate::world::World;

/// A timestamped effect on the world.
///
/// The taxonomy is open: implementors can spawn traffic, flip bus properties,
/// force connections — anything reachable through `&mut World`.
pub trait ExternalEvent {
    /// The simulation time this event is due.
    fn time(&self) -> f64;

    /// Apply the event.  Runs with the clock already advanced to
    /// [`time`][Self::time].
    fn process(&self, world: &mut World) -> SimResult<()>;
}

/// An ordered source of external events.
///
/// `next_events_time` must be non-decreasing across calls and must not
/// consume anything; `next_event` consumes.
pub trait EventQueue {
    /// Time of the next event, or `f64::INFINITY` when the queue is empty.
    fn next_events_time(&self) -> f64;

    /// Remove and return the next event.  `None` when empty.
    fn next_event(&mut self) -> Option<Box<dyn ExternalEvent>>;
}

// ── ScheduledUpdatesQueue ─────────────────────────────────────────────────────

/// The no-op event emitted by [`ScheduledUpdatesQueue`].
///
/// Its whole effect is the host-update pass the drain loop runs after every
/// event.
struct ScheduledUpdate {
    time: f64,
}

impl ExternalEvent for ScheduledUpdate {
    fn time(&self) -> f64 {
        self.time
    }

    fn process(&self, _world: &mut World) -> SimResult<()> {
        Ok(())
    }
}

/// Queue of requested extra host-update passes.
///
/// Times are kept sorted and deduplicated: asking twice for an update at the
/// same instant yields one pass.
#[derive(Default)]
pub struct ScheduledUpdatesQueue {
    times: VecDeque<f64>,
}

impl ScheduledUpdatesQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a host-update pass at simulation time `time`.
    pub fn add_update(&mut self, time: f64) {
        match self.times.iter().position(|&t| t >= time) {
            Some(i) if self.times[i] == time => {} // already scheduled
            Some(i) => self.times.insert(i, time),
            None => self.times.push_back(time),
        }
    }

    /// Number of pending update requests.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

impl EventQueue for ScheduledUpdatesQueue {
    fn next_events_time(&self) -> f64 {
        self.times.front().copied().unwrap_or(f64::INFINITY)
    }

    fn next_event(&mut self) -> Option<Box<dyn ExternalEvent>> {
        let time = self.times.pop_front()?;
        Some(Box::new(ScheduledUpdate { time }))
    }
}
