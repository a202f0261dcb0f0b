//! The simulated host: a location, a movement model, and its interfaces.

use std::fmt;

use dtn_core::{Coord, HostAddress, InterfaceId, ModuleCommunicationBus, SimResult};
use dtn_net::NetworkStore;

use crate::movement::MovementModel;

/// One mobile node.
///
/// Hosts are thin: radio state lives in the [`NetworkStore`] (the host keeps
/// the IDs), the bus and routing hooks live in the store's per-host slots,
/// and movement is delegated to the model.  A host's `address` equals its
/// index in the world's host list for the entire run.
pub struct DtnHost {
    address: HostAddress,
    location: Coord,
    movement: Box<dyn MovementModel>,
    interfaces: Vec<InterfaceId>,
}

impl fmt::Debug for DtnHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DtnHost")
            .field("address", &self.address)
            .field("location", &self.location)
            .field("interfaces", &self.interfaces)
            .finish_non_exhaustive()
    }
}

impl DtnHost {
    pub(crate) fn new(
        address: HostAddress,
        location: Coord,
        movement: Box<dyn MovementModel>,
    ) -> Self {
        Self {
            address,
            location,
            movement,
            interfaces: Vec::new(),
        }
    }

    pub(crate) fn attach_interface(&mut self, iface: InterfaceId) {
        self.interfaces.push(iface);
    }

    /// The host's network address (== its index in the world's host list).
    pub fn address(&self) -> HostAddress {
        self.address
    }

    /// Current position.
    pub fn location(&self) -> Coord {
        self.location
    }

    /// The host's interfaces, in attachment order.
    pub fn interfaces(&self) -> &[InterfaceId] {
        &self.interfaces
    }

    /// This host's module communication bus (stored in the connectivity
    /// store's per-host slot).
    pub fn com_bus<'a>(&self, net: &'a NetworkStore) -> &'a ModuleCommunicationBus {
        net.bus(self.address)
    }

    /// Advance the movement model by `dt` seconds.
    pub fn move_step(&mut self, dt: f64) {
        self.location = self.movement.step(self.location, dt);
    }

    /// One host-update: refresh every interface's connectivity (unless
    /// connection simulation is off), then run the routing-layer hook.
    pub fn update(
        &self,
        net: &mut NetworkStore,
        now: f64,
        simulate_connections: bool,
    ) -> SimResult<()> {
        if simulate_connections {
            for &iface in &self.interfaces {
                net.update_location(iface, self.location);
                net.update_interface(iface, now)?;
            }
        }
        net.router_update(self.address, now);
        Ok(())
    }
}

impl fmt::Display for DtnHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{} at {}", self.address.0, self.location)
    }
}
