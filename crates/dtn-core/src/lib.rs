//! `dtn-core` — foundational types for the DTN connectivity simulator.
//!
//! This crate is a dependency of every other `dtn-*` crate.  It intentionally
//! has no `dtn-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`ids`]      | `HostAddress`, `InterfaceId`, `ConnectionId`             |
//! | [`coord`]    | `Coord`, Euclidean distance                              |
//! | [`time`]     | `SimClock`                                               |
//! | [`rng`]      | `SimRng` (deterministic streams)                         |
//! | [`bus`]      | `ModuleCommunicationBus`, `BusValue`, well-known keys    |
//! | [`settings`] | `WorldConfig`, `InterfaceSettings`                       |
//! | [`error`]    | `SettingsError`, `SimError`, `SimResult`                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                        |
//! |---------|---------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to the config and value types. |

pub mod bus;
pub mod coord;
pub mod error;
pub mod ids;
pub mod rng;
pub mod settings;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use bus::{BusValue, ModuleCommunicationBus};
pub use coord::Coord;
pub use error::{SettingsError, SimError, SimResult};
pub use ids::{ConnectionId, HostAddress, InterfaceId};
pub use rng::{SimRng, INIT_SEED};
pub use settings::{InterfaceSettings, WorldConfig};
pub use time::SimClock;
