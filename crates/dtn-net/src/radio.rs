//! Radio behavior: the polymorphic half of a network interface.
//!
//! Interface *state* is a plain struct in the store; what varies between
//! radio technologies is *policy* — when to connect, what to tear down, what
//! a forced connection means.  That policy is this trait.  Implementations
//! hold no per-interface state (replicas of one prototype share the radio
//! through an `Rc`), which is what lets a radio mutate the store it is stored
//! in without aliasing itself.

use dtn_core::{InterfaceId, SimResult};

use crate::store::NetworkStore;

/// Connectivity policy for one kind of radio.
pub trait RadioModel {
    /// Refresh `iface`'s connectivity: tear down whatever no longer holds,
    /// then look for new neighbours.  Called once per host-update pass.
    fn update(&self, iface: InterfaceId, net: &mut NetworkStore, now: f64) -> SimResult<()>;

    /// Checked connection attempt from `iface` to `other`.  Implementations
    /// verify their preconditions and call
    /// [`NetworkStore::establish`] only when all of them hold.
    fn connect(
        &self,
        iface: InterfaceId,
        other: InterfaceId,
        net: &mut NetworkStore,
        now: f64,
    ) -> SimResult<()>;

    /// Forced connection: skip the range and activeness checks.  Used by
    /// external events that wire hosts together regardless of geometry.
    fn create_connection(
        &self,
        iface: InterfaceId,
        other: InterfaceId,
        net: &mut NetworkStore,
        now: f64,
    ) -> SimResult<()>;
}

/// The standard radio: symmetric broadcast with a binary in-range test.
///
/// - Inactive interfaces hold no connections at all.
/// - A live link survives as long as both endpoints stay mutually in range;
///   scanning only gates *new* links.
/// - New links need: this side scanning, matching kinds, the peer active,
///   mutual range, and no existing link between the pair.
pub struct SimpleBroadcast;

impl RadioModel for SimpleBroadcast {
    fn update(&self, iface: InterfaceId, net: &mut NetworkStore, now: f64) -> SimResult<()> {
        if !net.is_active(iface, now)? {
            net.destroy_all_connections(iface, now)?;
            return Ok(());
        }

        // first break the links that fell out of range
        let live = net.interface(iface).connections().to_vec();
        for con in live {
            let peer = net.peer_interface(con, iface)?;
            if !net.is_within_range(iface, peer) {
                net.disconnect(con, iface, now)?;
            }
        }

        // then try the current neighbourhood
        for other in net.near_interfaces(iface) {
            self.connect(iface, other, net, now)?;
        }
        Ok(())
    }

    fn connect(
        &self,
        iface: InterfaceId,
        other: InterfaceId,
        net: &mut NetworkStore,
        now: f64,
    ) -> SimResult<()> {
        if other != iface
            && net.is_scanning(iface, now)?
            && net.kinds_match(iface, other)
            && net.is_active(other, now)?
            && net.is_within_range(iface, other)
            && !net.is_connected(iface, other)
        {
            net.establish(iface, other, now)?;
        }
        Ok(())
    }

    fn create_connection(
        &self,
        iface: InterfaceId,
        other: InterfaceId,
        net: &mut NetworkStore,
        now: f64,
    ) -> SimResult<()> {
        if other != iface && !net.is_connected(iface, other) {
            net.establish(iface, other, now)?;
        }
        Ok(())
    }
}
