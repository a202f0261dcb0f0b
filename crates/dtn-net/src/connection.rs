//! Connections and the arena that owns them.
//!
//! # Why an arena
//!
//! A connection references two interfaces and each interface lists its live
//! connections — a cycle.  Storing connections under stable integer IDs in an
//! arena breaks the cycle without reference counting: interfaces hold plain
//! `ConnectionId`s and endpoints resolve through the arena.  Slots are
//! recycled through a free list, so a long run does not leak arena capacity
//! as links churn.

use std::fmt;

use dtn_core::{ConnectionId, HostAddress, InterfaceId};

// ── Connection ────────────────────────────────────────────────────────────────

/// A symmetric link between two interfaces.
///
/// `from` is the interface whose update established the link; the distinction
/// only matters for listener ordering, never for link semantics.
#[derive(Clone, Debug)]
pub struct Connection {
    from: InterfaceId,
    to: InterfaceId,
    from_host: HostAddress,
    to_host: HostAddress,
    up: bool,
    transferring: bool,
    speed: i32,
}

impl Connection {
    pub(crate) fn new(
        from: InterfaceId,
        from_host: HostAddress,
        to: InterfaceId,
        to_host: HostAddress,
        speed: i32,
    ) -> Self {
        Self {
            from,
            to,
            from_host,
            to_host,
            up: true,
            transferring: false,
            speed,
        }
    }

    /// The endpoint opposite `iface`, or `None` if `iface` is not an endpoint.
    pub fn other_interface(&self, iface: InterfaceId) -> Option<InterfaceId> {
        if iface == self.from {
            Some(self.to)
        } else if iface == self.to {
            Some(self.from)
        } else {
            None
        }
    }

    /// The host opposite `host`, or `None` if `host` owns neither endpoint.
    pub fn other_host(&self, host: HostAddress) -> Option<HostAddress> {
        if host == self.from_host {
            Some(self.to_host)
        } else if host == self.to_host {
            Some(self.from_host)
        } else {
            None
        }
    }

    /// Whether the link is currently up.  Torn-down connections stay down for
    /// any listener still holding a reference during the teardown callbacks.
    #[inline]
    pub fn is_up(&self) -> bool {
        self.up
    }

    pub(crate) fn set_up(&mut self, up: bool) {
        self.up = up;
    }

    /// Whether a transfer is in flight on this link.  Maintained by the
    /// routing layer; the core only reads it.
    #[inline]
    pub fn is_transferring(&self) -> bool {
        self.transferring
    }

    pub(crate) fn set_transferring(&mut self, transferring: bool) {
        self.transferring = transferring;
    }

    /// Link speed in bits per second — the weaker endpoint's speed.
    #[inline]
    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn endpoints(&self) -> (InterfaceId, InterfaceId) {
        (self.from, self.to)
    }

    pub fn hosts(&self) -> (HostAddress, HostAddress) {
        (self.from_host, self.to_host)
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <-> {} ({})",
            self.from_host,
            self.to_host,
            if self.up { "up" } else { "down" }
        )
    }
}

// ── ConnectionArena ───────────────────────────────────────────────────────────

/// Free-list arena of live connections, indexed by [`ConnectionId`].
#[derive(Default)]
pub struct ConnectionArena {
    slots: Vec<Option<Connection>>,
    free: Vec<ConnectionId>,
}

impl ConnectionArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a connection and return its stable ID.
    pub(crate) fn insert(&mut self, con: Connection) -> ConnectionId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id.index()] = Some(con);
                id
            }
            None => {
                self.slots.push(Some(con));
                ConnectionId((self.slots.len() - 1) as u32)
            }
        }
    }

    /// The connection under `id`, or `None` if it has been torn down.
    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Remove the connection under `id`, recycling the slot.
    pub(crate) fn remove(&mut self, id: ConnectionId) -> Option<Connection> {
        let con = self.slots.get_mut(id.index()).and_then(Option::take);
        if con.is_some() {
            self.free.push(id);
        }
        con
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all live connections.
    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, &Connection)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|c| (ConnectionId(i as u32), c)))
    }
}
