//! Callback seams toward the layers this core does not implement.

use dtn_core::HostAddress;

use crate::connection::Connection;

/// Observer of link transitions, e.g. a connectivity report writer.
///
/// Fired exactly once per transition, with the host whose update ran first.
/// `now` is the simulation time of the transition (the clock is not global,
/// so listeners are handed the timestamp).
pub trait ConnectionListener {
    fn hosts_connected(&mut self, now: f64, a: HostAddress, b: HostAddress);
    fn hosts_disconnected(&mut self, now: f64, a: HostAddress, b: HostAddress);
}

/// Per-host routing callback surface.
///
/// The routing layer is an external collaborator; the core only promises to
/// call these hooks.  All methods default to no-ops so a router implements
/// only what it needs.
pub trait Router {
    /// A link involving this router's host came up.
    fn connection_up(&mut self, _con: &Connection) {}

    /// A link involving this router's host went down.
    fn connection_down(&mut self, _con: &Connection) {}

    /// Called once per host-update pass, after connectivity has been
    /// refreshed.
    fn update(&mut self, _now: f64) {}
}

/// A [`Router`] that does nothing.  The default for hosts whose traffic is
/// not being simulated.
pub struct PassiveRouter;

impl Router for PassiveRouter {}
