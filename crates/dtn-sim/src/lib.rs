//! `dtn-sim` — the stepping loop of the DTN connectivity simulator.
//!
//! # The update cycle
//!
//! ```text
//! World::update():
//!   ① Pacing     — optionally sleep until wall clock catches up (realtime).
//!   ② Events     — drain every queue while next.time ≤ now + Δ, advancing
//!                  the clock to each event and updating all hosts after it.
//!   ③ Movement   — every host moves by the full nominal interval Δ.
//!   ④ Clock      — jump to now + Δ.
//!   ⑤ Updates    — every host refreshes connectivity + routing, in an order
//!                  shuffled by a SimRng seeded with floor(sim_time).
//!   ⑥ Fan-out    — every UpdateListener sees the finished round.
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`world`]    | `World`, `CancelToken`                                   |
//! | [`builder`]  | `WorldBuilder`                                           |
//! | [`host`]     | `DtnHost`                                                |
//! | [`events`]   | `EventQueue`, `ExternalEvent`, `ScheduledUpdatesQueue`   |
//! | [`movement`] | `MovementModel`, `StationaryMovement`, `LinearMovement`  |
//! | [`listener`] | `UpdateListener`                                         |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dtn_core::{Coord, InterfaceSettings, WorldConfig};
//! use dtn_net::InterfacePrototype;
//! use dtn_sim::{StationaryMovement, WorldBuilder};
//!
//! let proto = InterfacePrototype::simple_broadcast(InterfaceSettings::new("T", 10.0, 250_000))?;
//! let mut world = WorldBuilder::new(WorldConfig::default())?
//!     .host(Coord::new(0.0, 0.0), Box::new(StationaryMovement), vec![proto.clone()])
//!     .host(Coord::new(5.0, 0.0), Box::new(StationaryMovement), vec![proto])
//!     .build()?;
//! for _ in 0..3600 {
//!     world.update()?;
//! }
//! ```

pub mod builder;
pub mod events;
pub mod host;
pub mod listener;
pub mod movement;
pub mod world;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use builder::WorldBuilder;
pub use events::{EventQueue, ExternalEvent, ScheduledUpdatesQueue};
pub use host::DtnHost;
pub use listener::UpdateListener;
pub use movement::{LinearMovement, MovementModel, StationaryMovement};
pub use world::{CancelToken, World};
