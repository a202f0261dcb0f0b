//! Error types shared by the whole workspace.
//!
//! Two distinct kinds, mirroring how faults actually surface:
//!
//! - [`SettingsError`] — rejected configuration, detected while building the
//!   world.  The simulation never starts.
//! - [`SimError`] — a broken runtime invariant (corrupted connection graph,
//!   unexpected bus traffic, bad address lookup).  Not recoverable; callers
//!   propagate it out of the run and stop.
//!
//! Everything else — an interface going inactive, a scan finding no peers, an
//! event queue running dry — is ordinary control flow and has no error type.

use thiserror::Error;

use crate::ids::{ConnectionId, InterfaceId};

/// Rejected configuration, surfaced before the run starts.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("negative value {value} not accepted for setting {setting}")]
    NegativeValue { setting: &'static str, value: f64 },

    #[error("setting {setting} must be positive, got {value}")]
    NonPositiveValue { setting: &'static str, value: f64 },

    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("activeness period starts after it ends ({start} > {end})")]
    InvalidActivePeriod { start: f64, end: f64 },
}

/// A broken simulation invariant.  Terminates the run with a diagnostic.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("no host for address {address}; valid range is 0-{max_valid}")]
    NoHostForAddress { address: u32, max_valid: u32 },

    #[error("connection {connection} not found on peer interface {peer}")]
    MissingPeerConnection {
        connection: ConnectionId,
        peer: InterfaceId,
    },

    #[error("connection {0} is not live")]
    StaleConnection(ConnectionId),

    #[error("interface {iface} is not an endpoint of connection {connection}")]
    NotAnEndpoint {
        connection: ConnectionId,
        iface: InterfaceId,
    },

    #[error("unexpected bus key {0}")]
    UnexpectedBusKey(String),

    #[error("bus value for {key} has the wrong type")]
    BusValueType { key: String },

    #[error("bus property {0} added twice")]
    DuplicateBusProperty(String),
}

/// Shorthand result type for runtime simulation code.
pub type SimResult<T> = Result<T, SimError>;
