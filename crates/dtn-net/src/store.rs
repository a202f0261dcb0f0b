//! `NetworkStore` — the connectivity arena.
//!
//! Owns every interface, the connection arena, the per-kind grids, and the
//! per-host bus and router slots.  All operations that touch more than one
//! interface go through `&mut self` plus IDs, which is what keeps the
//! bidirectional connection graph free of reference cycles and the borrow
//! checker out of the way.
//!
//! # Bidirectionality
//!
//! Every mutation updates both endpoints in the same call: `establish`
//! appends the connection to both interfaces, `disconnect` removes it from
//! both.  A connection found on one side but not the other is corruption from
//! an earlier bug and surfaces as a fatal [`SimError`].

use std::rc::Rc;

use log::debug;

use dtn_core::bus::{ENERGY_VALUE_ID, RANGE_ID, SCAN_INTERVAL_ID, SPEED_ID};
use dtn_core::{
    BusValue, ConnectionId, Coord, HostAddress, InterfaceId, ModuleCommunicationBus, SimError,
    SimResult, SimRng,
};

use crate::connection::{Connection, ConnectionArena};
use crate::grid::GridRegistry;
use crate::interface::{Interface, InterfacePrototype};
use crate::listener::{ConnectionListener, Router};
use crate::radio::RadioModel;

/// All connectivity state of one world.
pub struct NetworkStore {
    /// Interface state, indexed by `InterfaceId`.
    pub(crate) interfaces: Vec<Interface>,
    /// Radio policy per interface, parallel to `interfaces`.  Kept apart so a
    /// radio can be invoked while the rest of the store is borrowed mutably.
    pub(crate) radios: Vec<Rc<dyn RadioModel>>,

    pub(crate) connections: ConnectionArena,
    pub(crate) grids: GridRegistry,

    /// Per-host module communication bus, indexed by `HostAddress`.
    pub(crate) buses: Vec<ModuleCommunicationBus>,
    /// Per-host routing hooks, indexed by `HostAddress`.
    pub(crate) routers: Vec<Box<dyn Router>>,

    pub(crate) listeners: Vec<Box<dyn ConnectionListener>>,
}

impl Default for NetworkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkStore {
    pub fn new() -> Self {
        Self {
            interfaces: Vec::new(),
            radios: Vec::new(),
            connections: ConnectionArena::new(),
            grids: GridRegistry::new(),
            buses: Vec::new(),
            routers: Vec::new(),
            listeners: Vec::new(),
        }
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Allocate the bus and router slot for a new host.  Addresses are handed
    /// out densely in registration order.
    pub fn add_host(&mut self, router: Box<dyn Router>) -> HostAddress {
        self.buses.push(ModuleCommunicationBus::new());
        self.routers.push(router);
        HostAddress((self.buses.len() - 1) as u32)
    }

    /// Replicate `proto` onto `host` at `location`.
    ///
    /// The first interface of a host registers the network properties on the
    /// host's bus and subscribes to their changes.  Interfaces with a
    /// positive transmit range join their kind's connectivity grid; a range
    /// of zero stays out, which is exactly what keeps such interfaces out of
    /// everyone's neighbourhood queries.
    pub fn add_interface(
        &mut self,
        proto: &InterfacePrototype,
        host: HostAddress,
        location: Coord,
        rng: &mut SimRng,
    ) -> SimResult<InterfaceId> {
        let (mut iface, radio) = proto.replicate(rng);
        iface.host = host;
        iface.location = location;

        let id = InterfaceId(self.interfaces.len() as u32);

        let bus = &mut self.buses[host.index()];
        if !bus.contains_property(SCAN_INTERVAL_ID) && !bus.contains_property(RANGE_ID) {
            bus.add_property(SCAN_INTERVAL_ID, BusValue::Double(iface.scan_interval))?;
            bus.add_property(RANGE_ID, BusValue::Double(iface.transmit_range))?;
            bus.add_property(SPEED_ID, BusValue::Int(iface.transmit_speed))?;
            bus.subscribe(SCAN_INTERVAL_ID, id);
            bus.subscribe(RANGE_ID, id);
            bus.subscribe(SPEED_ID, id);
        }

        if iface.transmit_range > 0.0 {
            let grid = self.grids.register(&iface.kind, iface.transmit_range);
            grid.add_interface(id, location);
            iface.in_grid = true;
        }

        self.interfaces.push(iface);
        self.radios.push(radio);
        Ok(id)
    }

    /// Attach a link-transition listener.
    pub fn add_connection_listener(&mut self, listener: Box<dyn ConnectionListener>) {
        self.listeners.push(listener);
    }

    // ── Plain accessors ───────────────────────────────────────────────────

    pub fn interface(&self, id: InterfaceId) -> &Interface {
        &self.interfaces[id.index()]
    }

    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    pub fn host_count(&self) -> usize {
        self.buses.len()
    }

    /// The module communication bus of `host`.
    pub fn bus(&self, host: HostAddress) -> &ModuleCommunicationBus {
        &self.buses[host.index()]
    }

    pub fn bus_mut(&mut self, host: HostAddress) -> &mut ModuleCommunicationBus {
        &mut self.buses[host.index()]
    }

    /// The connection under `id`, if still live.
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// All live connections in the world.
    pub fn connections(&self) -> impl Iterator<Item = (ConnectionId, &Connection)> {
        self.connections.iter()
    }

    /// The endpoint of `con` opposite `iface`.
    pub fn peer_interface(&self, con: ConnectionId, iface: InterfaceId) -> SimResult<InterfaceId> {
        let c = self
            .connections
            .get(con)
            .ok_or(SimError::StaleConnection(con))?;
        c.other_interface(iface)
            .ok_or(SimError::NotAnEndpoint { connection: con, iface })
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    /// Push a new host location down to `iface`: updates the cached
    /// coordinate and relocates the interface in its grid.
    pub fn update_location(&mut self, iface: InterfaceId, location: Coord) {
        let it = &mut self.interfaces[iface.index()];
        it.location = location;
        if it.in_grid {
            if let Some(grid) = self.grids.grid_mut(&it.kind) {
                grid.update_location(iface, location);
            }
        }
    }

    /// Mutual in-range test: the weaker radio determines the link, and the
    /// bound is closed (distance exactly equal to the range still connects).
    pub fn is_within_range(&self, a: InterfaceId, b: InterfaceId) -> bool {
        let ia = &self.interfaces[a.index()];
        let ib = &self.interfaces[b.index()];
        let smaller = ia.transmit_range.min(ib.transmit_range);
        ia.location.distance(ib.location) <= smaller
    }

    /// Candidate neighbours of `iface` from its kind's grid (the interface
    /// itself included; radios filter it out).
    pub fn near_interfaces(&self, iface: InterfaceId) -> Vec<InterfaceId> {
        let it = &self.interfaces[iface.index()];
        match self.grids.grid(&it.kind) {
            Some(grid) => grid.near_interfaces(iface),
            None => Vec::new(),
        }
    }

    // ── State predicates ──────────────────────────────────────────────────

    /// Whether `a` and `b` can talk at all (same interface kind).
    pub fn kinds_match(&self, a: InterfaceId, b: InterfaceId) -> bool {
        self.interfaces[a.index()].kind == self.interfaces[b.index()].kind
    }

    /// Whether a live connection between `a` and `b` exists.
    pub fn is_connected(&self, a: InterfaceId, b: InterfaceId) -> bool {
        self.interfaces[a.index()]
            .connections
            .iter()
            .any(|&c| self.connections.get(c).and_then(|c| c.other_interface(a)) == Some(b))
    }

    /// Flag a connection as carrying (or done carrying) a transfer.  Called
    /// by the routing layer; the core only reads the flag.
    pub fn set_transferring(&mut self, con: ConnectionId, transferring: bool) -> SimResult<()> {
        let c = self
            .connections
            .get_mut(con)
            .ok_or(SimError::StaleConnection(con))?;
        c.set_transferring(transferring);
        Ok(())
    }

    /// Whether any live connection of `iface` is mid-transfer.
    pub fn is_transferring(&self, iface: InterfaceId) -> bool {
        self.interfaces[iface.index()]
            .connections
            .iter()
            .any(|&c| self.connections.get(c).is_some_and(Connection::is_transferring))
    }

    /// Whether `iface` is allowed on at `now`.
    ///
    /// No activeness handler means always on (and no battery check either).
    /// Otherwise the handler decides, vetoed by an empty battery read off the
    /// host's bus.  Transitions have a side effect: going inactive stashes
    /// the transmit range and publishes 0 on the bus; coming back publishes
    /// the stashed value.  Either publish runs the normal subscriber path.
    pub fn is_active(&mut self, iface: InterfaceId, now: f64) -> SimResult<bool> {
        let (active, host) = {
            let it = &self.interfaces[iface.index()];
            let Some(handler) = &it.activeness else {
                return Ok(true);
            };
            let mut active = handler.is_active(now, it.activeness_jitter_value);
            if active && self.buses[it.host.index()].get_double(ENERGY_VALUE_ID, 1.0) <= 0.0 {
                // battery exhausted
                active = false;
            }
            (active, it.host)
        };

        let range = self.interfaces[iface.index()].transmit_range;
        if !active && range > 0.0 {
            self.interfaces[iface.index()].old_transmit_range = range;
            self.publish(host, RANGE_ID, BusValue::Double(0.0))?;
        } else if active && range == 0.0 {
            let old = self.interfaces[iface.index()].old_transmit_range;
            self.publish(host, RANGE_ID, BusValue::Double(old))?;
        }
        Ok(active)
    }

    /// Whether `iface` is in a scan pulse at `now`.
    ///
    /// Continuous scanners (interval 0) scan whenever active.  Periodic
    /// scanners scan at the exact instant a round starts; asking past the end
    /// of the current round starts the next one.
    pub fn is_scanning(&mut self, iface: InterfaceId, now: f64) -> SimResult<bool> {
        if !self.is_active(iface, now)? {
            return Ok(false);
        }
        let it = &mut self.interfaces[iface.index()];
        if it.scan_interval > 0.0 {
            if now < it.last_scan_time {
                // not yet time for the first scan
                return Ok(false);
            }
            if now > it.last_scan_time + it.scan_interval {
                it.last_scan_time = now;
                return Ok(true);
            }
            return Ok(now == it.last_scan_time);
        }
        Ok(true)
    }

    // ── Graph mutation ────────────────────────────────────────────────────

    /// Wire `iface` and `other` together unconditionally.
    ///
    /// Precondition checks (range, activeness, compatibility) belong to the
    /// [`RadioModel`] calling this.  Appends the connection to both sides,
    /// fires the connection listeners with the initiating host first, then
    /// the routing hooks of both hosts.
    pub fn establish(
        &mut self,
        iface: InterfaceId,
        other: InterfaceId,
        now: f64,
    ) -> SimResult<ConnectionId> {
        let ia = &self.interfaces[iface.index()];
        let ib = &self.interfaces[other.index()];
        let speed = ia.transmit_speed.min(ib.transmit_speed);
        let (host_a, host_b) = (ia.host, ib.host);

        let id = self
            .connections
            .insert(Connection::new(iface, host_a, other, host_b, speed));
        self.interfaces[iface.index()].connections.push(id);
        self.interfaces[other.index()].connections.push(id);

        debug!("link up: {host_a} <-> {host_b} at t={now:.1}");
        for l in &mut self.listeners {
            l.hosts_connected(now, host_a, host_b);
        }

        // inform both routing layers
        let (routers, connections) = (&mut self.routers, &self.connections);
        if let Some(con) = connections.get(id) {
            routers[host_a.index()].connection_up(con);
            routers[host_b.index()].connection_up(con);
        }
        Ok(id)
    }

    /// Tear down `con`, initiated by endpoint `iface`.
    ///
    /// The connection goes down, listeners fire, both endpoints drop it, both
    /// routing layers are told.  A connection the peer does not mirror is a
    /// fatal invariant violation.
    pub fn disconnect(&mut self, con: ConnectionId, iface: InterfaceId, now: f64) -> SimResult<()> {
        let other = self.peer_interface(con, iface)?;
        let host_a = self.interfaces[iface.index()].host;
        let host_b = self.interfaces[other.index()].host;

        if let Some(c) = self.connections.get_mut(con) {
            c.set_up(false);
        }

        debug!("link down: {host_a} <-> {host_b} at t={now:.1}");
        for l in &mut self.listeners {
            l.hosts_disconnected(now, host_a, host_b);
        }

        // tear down the mirror entry first; its absence means corruption
        let peer_list = &mut self.interfaces[other.index()].connections;
        let Some(pos) = peer_list.iter().position(|&c| c == con) else {
            return Err(SimError::MissingPeerConnection {
                connection: con,
                peer: other,
            });
        };
        peer_list.remove(pos);

        let (routers, connections) = (&mut self.routers, &self.connections);
        if let Some(c) = connections.get(con) {
            routers[host_a.index()].connection_down(c);
            routers[host_b.index()].connection_down(c);
        }

        let own_list = &mut self.interfaces[iface.index()].connections;
        let Some(pos) = own_list.iter().position(|&c| c == con) else {
            return Err(SimError::MissingPeerConnection {
                connection: con,
                peer: iface,
            });
        };
        own_list.remove(pos);

        self.connections.remove(con);
        Ok(())
    }

    /// Tear down every connection between `iface` and interfaces of `other`'s
    /// host.  Doing nothing when no such link exists is fine; only a
    /// half-present link is an error.
    pub fn destroy_connection(
        &mut self,
        iface: InterfaceId,
        other: InterfaceId,
        now: f64,
    ) -> SimResult<()> {
        let my_host = self.interfaces[iface.index()].host;
        let peer_host = self.interfaces[other.index()].host;

        let victims: Vec<ConnectionId> = self.interfaces[iface.index()]
            .connections
            .iter()
            .copied()
            .filter(|&c| {
                self.connections.get(c).and_then(|c| c.other_host(my_host)) == Some(peer_host)
            })
            .collect();
        for con in victims {
            self.disconnect(con, iface, now)?;
        }
        Ok(())
    }

    /// Tear down every live connection of `iface` (it went inactive).
    pub fn destroy_all_connections(&mut self, iface: InterfaceId, now: f64) -> SimResult<()> {
        while let Some(&con) = self.interfaces[iface.index()].connections.first() {
            self.disconnect(con, iface, now)?;
        }
        Ok(())
    }

    // ── Driving ───────────────────────────────────────────────────────────

    /// Run `iface`'s radio update.
    pub fn update_interface(&mut self, iface: InterfaceId, now: f64) -> SimResult<()> {
        let radio = Rc::clone(&self.radios[iface.index()]);
        radio.update(iface, self, now)
    }

    /// Force a connection through `iface`'s radio (no range or activeness
    /// checks).
    pub fn create_connection(
        &mut self,
        iface: InterfaceId,
        other: InterfaceId,
        now: f64,
    ) -> SimResult<()> {
        let radio = Rc::clone(&self.radios[iface.index()]);
        radio.create_connection(iface, other, self, now)
    }

    /// Run the routing-layer update hook of `host`.
    pub fn router_update(&mut self, host: HostAddress, now: f64) {
        self.routers[host.index()].update(now);
    }

    // ── Bus plumbing ──────────────────────────────────────────────────────

    /// Store `value` under `key` on `host`'s bus and synchronously notify
    /// every subscriber.
    pub fn publish(&mut self, host: HostAddress, key: &str, value: BusValue) -> SimResult<()> {
        let subscribers = self.buses[host.index()].update_property(key, value);
        for sub in subscribers {
            self.module_value_changed(sub, key, value)?;
        }
        Ok(())
    }

    /// Bus change notification for one subscribed interface.  Only the three
    /// network properties are expected; anything else means a wiring bug.
    fn module_value_changed(
        &mut self,
        iface: InterfaceId,
        key: &str,
        value: BusValue,
    ) -> SimResult<()> {
        let wrong_type = || SimError::BusValueType { key: key.to_owned() };
        let it = &mut self.interfaces[iface.index()];
        match key {
            SCAN_INTERVAL_ID => it.scan_interval = value.as_double().ok_or_else(wrong_type)?,
            SPEED_ID => it.transmit_speed = value.as_int().ok_or_else(wrong_type)?,
            RANGE_ID => it.transmit_range = value.as_double().ok_or_else(wrong_type)?,
            _ => return Err(SimError::UnexpectedBusKey(key.to_owned())),
        }
        Ok(())
    }
}
