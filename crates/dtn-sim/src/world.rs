//! The `World` struct and its stepping loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::trace;

use dtn_core::{HostAddress, SimClock, SimError, SimResult, SimRng, WorldConfig};
use dtn_net::NetworkStore;

use crate::events::{EventQueue, ExternalEvent, ScheduledUpdatesQueue};
use crate::host::DtnHost;
use crate::listener::UpdateListener;

/// Which queue holds the next due event.
///
/// The scheduled-updates queue is always considered first and selection uses
/// strict `<`, so equal timestamps resolve to the earliest-registered queue.
#[derive(Copy, Clone, Debug)]
enum QueueSource {
    Scheduled,
    External(usize),
}

/// Cooperative cancellation handle for a running world.
///
/// Clone it out of the world before entering the stepping loop and flip it
/// from any thread; the loop notices at the next host boundary.  Write-once:
/// a cancelled world stays cancelled.
#[derive(Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// The world: all hosts, the connectivity store, the clock, and the queues.
///
/// Drives the per-interval cycle: external events, movement, host updates,
/// listener fan-out — in that order, every [`update`][World::update].
pub struct World {
    config: WorldConfig,
    clock: SimClock,

    /// Hosts indexed by their network address.
    hosts: Vec<DtnHost>,
    net: NetworkStore,

    event_queues: Vec<Box<dyn EventQueue>>,
    scheduled_updates: ScheduledUpdatesQueue,
    next_event_time: f64,
    next_queue: QueueSource,

    update_listeners: Vec<Box<dyn UpdateListener>>,

    /// Current "simulate connectivity" flag; sticky-off under
    /// `simulate_connections_once`.
    simulate_connections: bool,

    cancelled: Arc<AtomicBool>,

    /// Wall-clock anchor for real-time pacing, set on the first update.
    wall_start: Option<Instant>,
}

impl World {
    pub(crate) fn new(
        config: WorldConfig,
        hosts: Vec<DtnHost>,
        net: NetworkStore,
        event_queues: Vec<Box<dyn EventQueue>>,
        update_listeners: Vec<Box<dyn UpdateListener>>,
    ) -> Self {
        let simulate_connections = config.simulate_connections;
        let mut world = Self {
            config,
            clock: SimClock::new(),
            hosts,
            net,
            event_queues,
            scheduled_updates: ScheduledUpdatesQueue::new(),
            next_event_time: f64::INFINITY,
            next_queue: QueueSource::Scheduled,
            update_listeners,
            simulate_connections,
            cancelled: Arc::new(AtomicBool::new(false)),
            wall_start: None,
        };
        world.select_next_queue();
        world
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The hosts, indexed by network address.
    pub fn hosts(&self) -> &[DtnHost] {
        &self.hosts
    }

    /// The connectivity store.
    pub fn net(&self) -> &NetworkStore {
        &self.net
    }

    pub fn net_mut(&mut self) -> &mut NetworkStore {
        &mut self.net
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// World extent `(width, height)`.
    pub fn size(&self) -> (f64, f64) {
        (self.config.width, self.config.height)
    }

    pub fn update_interval(&self) -> f64 {
        self.config.update_interval
    }

    /// The host with network address `address`.
    ///
    /// An out-of-range address is a fatal error; a host stored under the
    /// wrong index would be one too, and is checked in debug builds.
    pub fn node_by_address(&self, address: HostAddress) -> SimResult<&DtnHost> {
        let Some(host) = self.hosts.get(address.index()) else {
            return Err(SimError::NoHostForAddress {
                address: address.0,
                max_valid: self.hosts.len().saturating_sub(1) as u32,
            });
        };
        debug_assert_eq!(host.address(), address, "host indexing failed");
        Ok(host)
    }

    /// A handle for cancelling this world from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken(Arc::clone(&self.cancelled))
    }

    /// Request an extra host-update pass at simulation time `time`.
    pub fn schedule_update(&mut self, time: f64) {
        self.scheduled_updates.add_update(time);
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Run one update round: drain external events due within the next
    /// interval, move all hosts, advance the clock by the interval, update
    /// all hosts, and inform the update listeners.
    pub fn update(&mut self) -> SimResult<()> {
        let run_until = self.clock.time() + self.config.update_interval;

        if self.config.realtime {
            self.pace_to_wall_clock();
        }

        self.select_next_queue();

        // process all events due before the next interval boundary
        while self.next_event_time <= run_until {
            self.clock.set_time(self.next_event_time);
            if let Some(event) = self.take_next_event() {
                event.process(self)?;
            }
            // update all hosts after every event
            self.update_hosts()?;
            self.select_next_queue();
        }

        // the movement pass uses the full nominal interval even when events
        // advanced the clock partway through it
        self.move_hosts(self.config.update_interval);
        self.clock.set_time(run_until);

        self.update_hosts()?;

        trace!("tick done at {}", self.clock);
        let (listeners, hosts) = (&mut self.update_listeners, &self.hosts);
        for listener in listeners {
            listener.updated(hosts);
        }
        Ok(())
    }

    /// Move hosts for `time` seconds before the run starts.
    ///
    /// Pre-sets the clock to `-time`, advances in update intervals, takes a
    /// final fractional step to land exactly on zero, and leaves the clock
    /// there.  Only movement runs: no events, no host updates, no listeners.
    pub fn warmup_movement_model(&mut self, time: f64) {
        if time <= 0.0 {
            return;
        }
        self.clock.set_time(-time);

        while self.clock.time() < -self.config.update_interval {
            self.move_hosts(self.config.update_interval);
            self.clock.advance(self.config.update_interval);
        }
        let final_step = -self.clock.time();
        self.move_hosts(final_step);
        self.clock.set_time(0.0);
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Find the queue holding the earliest next event.  The scheduled-updates
    /// queue is registration slot 0; strict `<` keeps ties stable.
    fn select_next_queue(&mut self) {
        let mut source = QueueSource::Scheduled;
        let mut earliest = self.scheduled_updates.next_events_time();
        for (i, queue) in self.event_queues.iter().enumerate() {
            if queue.next_events_time() < earliest {
                earliest = queue.next_events_time();
                source = QueueSource::External(i);
            }
        }
        self.next_event_time = earliest;
        self.next_queue = source;
    }

    fn take_next_event(&mut self) -> Option<Box<dyn ExternalEvent>> {
        match self.next_queue {
            QueueSource::Scheduled => self.scheduled_updates.next_event(),
            QueueSource::External(i) => self.event_queues[i].next_event(),
        }
    }

    /// Update every host once, in shuffled order when configured.
    ///
    /// The shuffle RNG is seeded with the pass's integer time, so the order
    /// depends only on the tick, not on run history.  Cancellation is checked
    /// between hosts; a cancelled pass simply stops (no rollback).
    fn update_hosts(&mut self) -> SimResult<()> {
        let mut order: Vec<usize> = (0..self.hosts.len()).collect();
        if self.config.randomize_update_order {
            SimRng::for_int_time(self.clock.int_time()).shuffle(&mut order);
        }

        let now = self.clock.time();
        let simulate_connections = self.simulate_connections;
        for idx in order {
            if self.cancelled.load(Ordering::Acquire) {
                break;
            }
            // explicit field borrows so the borrow checker sees disjoint access
            let (hosts, net) = (&mut self.hosts, &mut self.net);
            hosts[idx].update(net, now, simulate_connections)?;
        }

        if self.config.simulate_connections_once && self.simulate_connections {
            self.simulate_connections = false;
        }
        Ok(())
    }

    /// Move every host by `dt` and push the new locations into the store.
    fn move_hosts(&mut self, dt: f64) {
        let (hosts, net) = (&mut self.hosts, &mut self.net);
        for host in hosts.iter_mut() {
            host.move_step(dt);
            for &iface in host.interfaces() {
                net.update_location(iface, host.location());
            }
        }
    }

    /// Sleep until wall-clock time catches up with simulation time.
    ///
    /// Anchored at the first update round.  `std::thread::sleep` cannot be
    /// interrupted, so unlike the event drain this step cannot fail.
    fn pace_to_wall_clock(&mut self) {
        let start = *self.wall_start.get_or_insert_with(Instant::now);
        let target = Duration::from_secs_f64(self.clock.time().max(0.0));
        let elapsed = start.elapsed();
        if target > elapsed {
            std::thread::sleep(target - elapsed);
        }
    }
}
