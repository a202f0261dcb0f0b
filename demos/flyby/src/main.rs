//! flyby — smallest runnable scenario for the DTN connectivity simulator.
//!
//! One stationary host and one host driving past it on a straight line.
//! Their radios connect when the mover enters range and drop the link when it
//! leaves; every transition is printed as it happens, plus a per-tick summary
//! at the end.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use dtn_core::{Coord, HostAddress, InterfaceSettings, WorldConfig};
use dtn_net::{ConnectionListener, InterfacePrototype};
use dtn_sim::{LinearMovement, StationaryMovement, WorldBuilder};

// ── Constants ─────────────────────────────────────────────────────────────────

const RADIO_RANGE: f64 = 5.0; // world units
const RADIO_SPEED: i32 = 250_000; // bits per second
const TICKS: u32 = 25;

// ── Listener ──────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct PrintingListener(Rc<RefCell<usize>>);

impl ConnectionListener for PrintingListener {
    fn hosts_connected(&mut self, now: f64, a: HostAddress, b: HostAddress) {
        *self.0.borrow_mut() += 1;
        println!("t={now:>5.1}  UP    h{} <-> h{}", a.0, b.0);
    }

    fn hosts_disconnected(&mut self, now: f64, a: HostAddress, b: HostAddress) {
        *self.0.borrow_mut() += 1;
        println!("t={now:>5.1}  DOWN  h{} <-> h{}", a.0, b.0);
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    println!("=== flyby — DTN connectivity core ===");
    println!("Range: {RADIO_RANGE}  |  Ticks: {TICKS}");
    println!();

    let proto = InterfacePrototype::simple_broadcast(InterfaceSettings::new(
        "wifi",
        RADIO_RANGE,
        RADIO_SPEED,
    ))?;

    let listener = PrintingListener::default();
    let mut world = WorldBuilder::new(WorldConfig::default())?
        .connection_listener(Box::new(listener.clone()))
        .host(
            Coord::new(0.0, 0.0),
            Box::new(StationaryMovement),
            vec![proto.clone()],
        )
        .host(
            Coord::new(-10.0, 0.0),
            Box::new(LinearMovement::new(1.0, 0.0)),
            vec![proto],
        )
        .build()?;

    for _ in 0..TICKS {
        world.update()?;
    }

    println!();
    println!("{} transitions in {:.0} simulated seconds", listener.0.borrow(), world.clock().time());
    for host in world.hosts() {
        let links = host
            .interfaces()
            .iter()
            .map(|&i| world.net().interface(i).connections().len())
            .sum::<usize>();
        println!("{host}: {links} live link(s)");
    }
    Ok(())
}
