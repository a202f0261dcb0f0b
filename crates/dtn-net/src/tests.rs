//! Unit tests for the connectivity layer.

use std::cell::RefCell;
use std::rc::Rc;

use dtn_core::bus::{ENERGY_VALUE_ID, RANGE_ID, SCAN_INTERVAL_ID, SPEED_ID};
use dtn_core::{
    BusValue, Coord, HostAddress, InterfaceId, InterfaceSettings, SimError, SimRng,
};

use crate::{
    ActivenessHandler, ConnectionListener, InterfacePrototype, NetworkStore, PassiveRouter,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn proto(kind: &str, range: f64, speed: i32) -> InterfacePrototype {
    InterfacePrototype::simple_broadcast(InterfaceSettings::new(kind, range, speed)).unwrap()
}

fn proto_with(settings: InterfaceSettings) -> InterfacePrototype {
    InterfacePrototype::simple_broadcast(settings).unwrap()
}

/// Add one host carrying one replica of `p` at `(x, y)`.
fn spawn(
    net: &mut NetworkStore,
    rng: &mut SimRng,
    p: &InterfacePrototype,
    x: f64,
    y: f64,
) -> (HostAddress, InterfaceId) {
    let host = net.add_host(Box::new(PassiveRouter));
    let iface = net
        .add_interface(p, host, Coord::new(x, y), rng)
        .unwrap();
    (host, iface)
}

/// Connection listener that records `(now, up, a, b)` tuples.
#[derive(Clone, Default)]
struct LinkLog(Rc<RefCell<Vec<(f64, bool, HostAddress, HostAddress)>>>);

impl LinkLog {
    fn events(&self) -> Vec<(f64, bool, HostAddress, HostAddress)> {
        self.0.borrow().clone()
    }
}

impl ConnectionListener for LinkLog {
    fn hosts_connected(&mut self, now: f64, a: HostAddress, b: HostAddress) {
        self.0.borrow_mut().push((now, true, a, b));
    }

    fn hosts_disconnected(&mut self, now: f64, a: HostAddress, b: HostAddress) {
        self.0.borrow_mut().push((now, false, a, b));
    }
}

// ── Grid ──────────────────────────────────────────────────────────────────────

mod grid {
    use super::*;

    #[test]
    fn neighbours_within_3x3_cells() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = proto("T", 10.0, 100);
        let (_, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &p, 15.0, 0.0); // adjacent cell
        let (_, c) = spawn(&mut net, &mut rng, &p, 25.0, 0.0); // two cells away

        let near = net.near_interfaces(a);
        assert!(near.contains(&a), "query includes the interface itself");
        assert!(near.contains(&b));
        assert!(!near.contains(&c));
    }

    #[test]
    fn boundary_point_belongs_to_upper_cell() {
        // cell side 10: x = 10.0 sits in cell 1, so an interface at x = 29.99
        // (cell 2) sees it, and one at x = 0 (cell 0) does too via the
        // neighbourhood — but one at x = 30.01 (cell 3) must not.
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = proto("T", 10.0, 100);
        let (_, edge) = spawn(&mut net, &mut rng, &p, 10.0, 0.0);
        let (_, far) = spawn(&mut net, &mut rng, &p, 30.01, 0.0);

        assert!(!net.near_interfaces(far).contains(&edge));
        assert!(!net.near_interfaces(edge).contains(&far));
    }

    #[test]
    fn update_location_relocates() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = proto("T", 10.0, 100);
        let (_, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &p, 50.0, 0.0);

        assert!(!net.near_interfaces(a).contains(&b));
        net.update_location(b, Coord::new(5.0, 0.0));
        assert!(net.near_interfaces(a).contains(&b));
    }

    #[test]
    fn registering_larger_range_grows_cells() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let (_, a) = spawn(&mut net, &mut rng, &proto("T", 5.0, 100), 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &proto("T", 5.0, 100), 12.0, 0.0);
        // side 5: cells 0 and 2 — not neighbours
        assert!(!net.near_interfaces(a).contains(&b));

        // a third interface with range 15 grows the shared grid
        let (_, _) = spawn(&mut net, &mut rng, &proto("T", 15.0, 100), 40.0, 40.0);
        assert_eq!(net.grids.grid("T").unwrap().cell_size(), 15.0);
        assert!(net.near_interfaces(a).contains(&b));
    }

    #[test]
    fn removed_interface_disappears_from_queries() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = proto("T", 10.0, 100);
        let (_, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &p, 5.0, 0.0);

        net.grids.grid_mut("T").unwrap().remove_interface(b);
        assert!(!net.near_interfaces(a).contains(&b));
        assert!(net.near_interfaces(b).is_empty());
    }

    #[test]
    fn different_kinds_use_different_grids() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let (_, a) = spawn(&mut net, &mut rng, &proto("T", 10.0, 100), 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &proto("U", 10.0, 100), 1.0, 0.0);

        assert!(!net.near_interfaces(a).contains(&b));
    }
}

// ── Connection graph ──────────────────────────────────────────────────────────

mod connections {
    use super::*;

    #[test]
    fn update_connects_hosts_in_range() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = proto("T", 10.0, 100);
        let (ha, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (hb, b) = spawn(&mut net, &mut rng, &p, 5.0, 0.0);

        net.update_interface(a, 1.0).unwrap();

        assert!(net.is_connected(a, b));
        assert_eq!(net.interface(a).connections().len(), 1);
        assert_eq!(net.interface(b).connections().len(), 1);
        // mirrored: same ID on both sides
        assert_eq!(net.interface(a).connections(), net.interface(b).connections());

        let con = net.connection(net.interface(a).connections()[0]).unwrap();
        assert!(con.is_up());
        assert!(!con.is_transferring());
        assert_eq!(con.hosts(), (ha, hb));
    }

    #[test]
    fn at_most_one_connection_per_pair() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = proto("T", 10.0, 100);
        let (_, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &p, 5.0, 0.0);

        net.update_interface(a, 1.0).unwrap();
        net.update_interface(b, 1.0).unwrap();
        net.update_interface(a, 2.0).unwrap();

        assert_eq!(net.connections().count(), 1);
    }

    #[test]
    fn no_self_loops() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let (_, a) = spawn(&mut net, &mut rng, &proto("T", 10.0, 100), 0.0, 0.0);

        net.update_interface(a, 1.0).unwrap();
        assert!(net.interface(a).connections().is_empty());
    }

    #[test]
    fn connection_speed_is_the_weaker_side() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let (_, a) = spawn(&mut net, &mut rng, &proto("T", 10.0, 250), 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &proto("T", 10.0, 100), 5.0, 0.0);

        net.update_interface(a, 1.0).unwrap();
        let con = net.connection(net.interface(a).connections()[0]).unwrap();
        assert_eq!(con.speed(), 100);
    }

    #[test]
    fn destroy_restores_prior_lists() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = proto("T", 10.0, 100);
        let (_, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &p, 5.0, 0.0);

        net.update_interface(a, 1.0).unwrap();
        net.destroy_connection(a, b, 2.0).unwrap();

        assert!(net.interface(a).connections().is_empty());
        assert!(net.interface(b).connections().is_empty());
        assert_eq!(net.connections().count(), 0);
    }

    #[test]
    fn destroy_without_link_is_a_noop() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = proto("T", 10.0, 100);
        let (_, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &p, 50.0, 0.0);

        net.destroy_connection(a, b, 1.0).unwrap();
        assert_eq!(net.connections().count(), 0);
    }

    #[test]
    fn missing_mirror_entry_is_fatal() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = proto("T", 10.0, 100);
        let (_, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &p, 5.0, 0.0);

        net.update_interface(a, 1.0).unwrap();
        let con = net.interface(a).connections()[0];

        // corrupt the graph: drop the mirror entry behind the store's back
        net.interfaces[b.index()].connections.clear();

        let err = net.disconnect(con, a, 2.0).unwrap_err();
        assert!(matches!(err, SimError::MissingPeerConnection { .. }));
    }

    #[test]
    fn display_shows_endpoints_and_state() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = proto("T", 10.0, 100);
        let (_, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &p, 5.0, 0.0);

        net.update_interface(a, 1.0).unwrap();
        assert_eq!(
            net.interface(a).to_string(),
            "T of HostAddress(0) (range 10.0, 1 connection(s))"
        );
        let con = net.connection(net.interface(a).connections()[0]).unwrap();
        assert_eq!(con.to_string(), "HostAddress(0) <-> HostAddress(1) (up)");
    }

    #[test]
    fn forced_connection_ignores_range() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = proto("T", 10.0, 100);
        let (_, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &p, 90.0, 0.0);

        net.create_connection(a, b, 1.0).unwrap();
        assert!(net.is_connected(a, b));
    }

    #[test]
    fn listeners_fire_once_per_transition() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let log = LinkLog::default();
        net.add_connection_listener(Box::new(log.clone()));

        let p = proto("T", 10.0, 100);
        let (ha, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (hb, b) = spawn(&mut net, &mut rng, &p, 5.0, 0.0);

        net.update_interface(a, 1.0).unwrap();
        net.update_interface(b, 1.0).unwrap(); // already connected: no event
        net.destroy_connection(a, b, 3.0).unwrap();

        assert_eq!(
            log.events(),
            vec![(1.0, true, ha, hb), (3.0, false, ha, hb)]
        );
    }
}

// ── Range semantics ───────────────────────────────────────────────────────────

mod range {
    use super::*;

    #[test]
    fn exact_boundary_is_in_range() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = proto("T", 10.0, 100);
        let (_, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &p, 10.0, 0.0);

        assert!(net.is_within_range(a, b));
        net.update_interface(a, 1.0).unwrap();
        assert!(net.is_connected(a, b));
    }

    #[test]
    fn weaker_radio_dominates() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let (_, a) = spawn(&mut net, &mut rng, &proto("T", 20.0, 100), 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &proto("T", 10.0, 100), 15.0, 0.0);

        assert!(!net.is_within_range(a, b));
        net.update_interface(a, 1.0).unwrap();
        net.update_interface(b, 1.0).unwrap();
        assert!(!net.is_connected(a, b));
    }

    #[test]
    fn zero_range_never_connects() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let (_, a) = spawn(&mut net, &mut rng, &proto("T", 10.0, 100), 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &proto("T", 0.0, 100), 0.0, 0.0);

        net.update_interface(a, 1.0).unwrap();
        net.update_interface(b, 1.0).unwrap();
        assert!(!net.is_connected(a, b));
        assert!(net.interface(b).connections().is_empty());
    }

    #[test]
    fn incompatible_kinds_never_connect() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let (_, a) = spawn(&mut net, &mut rng, &proto("T", 10.0, 100), 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &proto("U", 10.0, 100), 1.0, 0.0);

        net.update_interface(a, 1.0).unwrap();
        net.update_interface(b, 1.0).unwrap();
        assert!(!net.is_connected(a, b));
    }
}

// ── Scanning ──────────────────────────────────────────────────────────────────

mod scanning {
    use super::*;

    #[test]
    fn interval_zero_scans_whenever_active() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let (_, a) = spawn(&mut net, &mut rng, &proto("T", 10.0, 100), 0.0, 0.0);

        for t in 0..10 {
            assert!(net.is_scanning(a, f64::from(t)).unwrap());
        }
    }

    #[test]
    fn scan_round_bookkeeping() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let mut settings = InterfaceSettings::new("T", 10.0, 100);
        settings.scan_interval = 5.0;
        let (_, a) = spawn(&mut net, &mut rng, &proto_with(settings), 0.0, 0.0);
        net.interfaces[a.index()].last_scan_time = 3.0;

        // before the first scan
        assert!(!net.is_scanning(a, 1.0).unwrap());
        // the exact scan instant
        assert!(net.is_scanning(a, 3.0).unwrap());
        // inside the round but past its instant
        assert!(!net.is_scanning(a, 4.0).unwrap());
        assert!(!net.is_scanning(a, 8.0).unwrap());
        // past the round: a new round starts and the clock advances
        assert!(net.is_scanning(a, 9.0).unwrap());
        assert_eq!(net.interface(a).last_scan_time, 9.0);
        assert!(!net.is_scanning(a, 10.0).unwrap());
    }

    #[test]
    fn scanning_gates_new_connections_only() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let mut settings = InterfaceSettings::new("T", 10.0, 100);
        settings.scan_interval = 5.0;
        let p = proto_with(settings);
        let (_, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &p, 5.0, 0.0);
        net.interfaces[a.index()].last_scan_time = 3.0;
        net.interfaces[b.index()].last_scan_time = 4.5;

        // neither side is in a scan pulse at t=1
        net.update_interface(a, 1.0).unwrap();
        net.update_interface(b, 1.0).unwrap();
        assert!(!net.is_connected(a, b));

        // a's scan instant
        net.update_interface(a, 3.0).unwrap();
        assert!(net.is_connected(a, b));

        // the link persists outside scan pulses
        net.update_interface(a, 4.0).unwrap();
        net.update_interface(b, 4.0).unwrap();
        assert!(net.is_connected(a, b));
    }

    #[test]
    fn replicas_draw_distinct_scan_phases() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let mut settings = InterfaceSettings::new("T", 10.0, 100);
        settings.scan_interval = 100.0;
        let p = proto_with(settings);
        let (_, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &p, 5.0, 0.0);

        let pa = net.interface(a).last_scan_time;
        let pb = net.interface(b).last_scan_time;
        assert!((0.0..100.0).contains(&pa));
        assert!((0.0..100.0).contains(&pb));
        assert_ne!(pa, pb);
    }
}

// ── Activeness ────────────────────────────────────────────────────────────────

mod activeness {
    use super::*;

    fn windowed(kind: &str, periods: Vec<(f64, f64)>) -> InterfacePrototype {
        let mut settings = InterfaceSettings::new(kind, 10.0, 100);
        settings.active_periods = Some(periods);
        proto_with(settings)
    }

    #[test]
    fn jitter_shifts_windows() {
        let h = ActivenessHandler::new(vec![(10.0, 20.0)]).unwrap();
        assert!(h.is_active(15.0, 0));
        assert!(!h.is_active(15.0, 10));
        assert!(h.is_active(25.0, 10));
        assert!(!h.is_active(5.0, 0));
    }

    #[test]
    fn no_handler_means_always_active() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let (host, a) = spawn(&mut net, &mut rng, &proto("T", 10.0, 100), 0.0, 0.0);

        // even with an exhausted battery: no handler, no battery check
        net.publish(host, ENERGY_VALUE_ID, BusValue::Double(0.0)).unwrap();
        assert!(net.is_active(a, 0.0).unwrap());
    }

    #[test]
    fn empty_battery_forces_inactive() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = windowed("T", vec![(0.0, 1_000.0)]);
        let (host, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);

        assert!(net.is_active(a, 5.0).unwrap());
        net.publish(host, ENERGY_VALUE_ID, BusValue::Double(0.0)).unwrap();
        assert!(!net.is_active(a, 5.0).unwrap());
        net.publish(host, ENERGY_VALUE_ID, BusValue::Double(0.5)).unwrap();
        assert!(net.is_active(a, 5.0).unwrap());
    }

    #[test]
    fn going_inactive_zeroes_range_and_back() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = windowed("T", vec![(0.0, 5.0), (10.0, 20.0)]);
        let (host, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);

        assert!(net.is_active(a, 3.0).unwrap());
        assert_eq!(net.interface(a).transmit_range(), 10.0);

        // window closed: range published as 0 through the bus
        assert!(!net.is_active(a, 7.0).unwrap());
        assert_eq!(net.interface(a).transmit_range(), 0.0);
        assert_eq!(net.bus(host).get_double(RANGE_ID, -1.0), 0.0);

        // window reopened: the stashed range comes back
        assert!(net.is_active(a, 12.0).unwrap());
        assert_eq!(net.interface(a).transmit_range(), 10.0);
        assert_eq!(net.bus(host).get_double(RANGE_ID, -1.0), 10.0);
    }

    #[test]
    fn inactive_interface_tears_down_its_links() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = windowed("T", vec![(0.0, 5.0)]);
        let (_, a) = spawn(&mut net, &mut rng, &p, 0.0, 0.0);
        let (_, b) = spawn(&mut net, &mut rng, &p, 5.0, 0.0);

        net.update_interface(a, 1.0).unwrap();
        assert!(net.is_connected(a, b));

        net.update_interface(a, 6.0).unwrap();
        assert!(!net.is_connected(a, b));
        assert!(net.interface(b).connections().is_empty());
    }
}

// ── Bus dispatch ──────────────────────────────────────────────────────────────

mod bus {
    use super::*;

    #[test]
    fn publishing_network_properties_reconfigures_the_interface() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let (host, a) = spawn(&mut net, &mut rng, &proto("T", 10.0, 100), 0.0, 0.0);

        net.publish(host, RANGE_ID, BusValue::Double(25.0)).unwrap();
        net.publish(host, SPEED_ID, BusValue::Int(9_600)).unwrap();
        net.publish(host, SCAN_INTERVAL_ID, BusValue::Double(2.0)).unwrap();

        let it = net.interface(a);
        assert_eq!(it.transmit_range(), 25.0);
        assert_eq!(it.transmit_speed(), 9_600);
        assert_eq!(it.scan_interval(), 2.0);
    }

    #[test]
    fn unexpected_key_is_fatal() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let (host, a) = spawn(&mut net, &mut rng, &proto("T", 10.0, 100), 0.0, 0.0);

        // wire the interface to a key it has no business receiving
        net.bus_mut(host).subscribe(ENERGY_VALUE_ID, a);
        let err = net
            .publish(host, ENERGY_VALUE_ID, BusValue::Double(0.8))
            .unwrap_err();
        assert!(matches!(err, SimError::UnexpectedBusKey(_)));
    }

    #[test]
    fn wrong_value_type_is_fatal() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let (host, _) = spawn(&mut net, &mut rng, &proto("T", 10.0, 100), 0.0, 0.0);

        let err = net.publish(host, RANGE_ID, BusValue::Int(3)).unwrap_err();
        assert!(matches!(err, SimError::BusValueType { .. }));
    }

    #[test]
    fn only_the_first_interface_registers_bus_properties() {
        let mut net = NetworkStore::new();
        let mut rng = SimRng::new(0);
        let p = proto("T", 10.0, 100);

        let host = net.add_host(Box::new(PassiveRouter));
        let first = net
            .add_interface(&p, host, Coord::new(0.0, 0.0), &mut rng)
            .unwrap();
        let second = net
            .add_interface(&p, host, Coord::new(0.0, 0.0), &mut rng)
            .unwrap();

        net.publish(host, RANGE_ID, BusValue::Double(3.0)).unwrap();
        assert_eq!(net.interface(first).transmit_range(), 3.0);
        // the second interface never subscribed, so it keeps its own range
        assert_eq!(net.interface(second).transmit_range(), 10.0);
    }
}
