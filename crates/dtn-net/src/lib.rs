//! `dtn-net` — the connectivity layer of the DTN simulator.
//!
//! Models per-host radio interfaces that opportunistically form symmetric
//! links while their hosts are mutually in range, with duty-cycled scanning,
//! activeness windows, and a spatial grid keeping neighbour search
//! sub-linear.
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`store`]      | `NetworkStore` — the arena every operation goes through |
//! | [`interface`]  | `Interface` state, `InterfacePrototype`               |
//! | [`radio`]      | `RadioModel` trait, `SimpleBroadcast`                 |
//! | [`connection`] | `Connection`, `ConnectionArena`                       |
//! | [`grid`]       | `ConnectivityGrid`, `GridRegistry`                    |
//! | [`activeness`] | `ActivenessHandler`                                   |
//! | [`listener`]   | `ConnectionListener`, `Router`, `PassiveRouter`       |
//!
//! # Ownership model
//!
//! Interfaces, connections, buses and routers all live inside
//! [`NetworkStore`], indexed by the typed IDs from `dtn-core`.  Code outside
//! the store holds IDs, never references, so the cyclic
//! interface↔connection↔interface shape never turns into a reference cycle.

pub mod activeness;
pub mod connection;
pub mod grid;
pub mod interface;
pub mod listener;
pub mod radio;
pub mod store;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use activeness::ActivenessHandler;
pub use connection::{Connection, ConnectionArena};
pub use grid::{ConnectivityGrid, GridRegistry};
pub use interface::{Interface, InterfacePrototype};
pub use listener::{ConnectionListener, PassiveRouter, Router};
pub use radio::{RadioModel, SimpleBroadcast};
pub use store::NetworkStore;
