//! Per-interface radio state and the prototype it is replicated from.

use std::fmt;
use std::rc::Rc;

use dtn_core::{Coord, ConnectionId, HostAddress, InterfaceSettings, SettingsError, SimRng};

use crate::activeness::ActivenessHandler;
use crate::radio::{RadioModel, SimpleBroadcast};

// ── Interface ─────────────────────────────────────────────────────────────────

/// The state of one network interface.
///
/// Lives in the [`NetworkStore`][crate::NetworkStore] arena; all behavior that
/// touches more than one interface (connecting, disconnecting, range tests)
/// is a store method, so nothing here ever needs to reach a second interface.
pub struct Interface {
    pub(crate) kind: String,
    pub(crate) host: HostAddress,
    pub(crate) location: Coord,

    pub(crate) transmit_range: f64,
    /// Shadow of `transmit_range` while activeness has zeroed it.
    pub(crate) old_transmit_range: f64,
    pub(crate) transmit_speed: i32,

    /// Seconds between scan rounds; 0 scans continuously.
    pub(crate) scan_interval: f64,
    /// Start of the current (or most recent) scan round.
    pub(crate) last_scan_time: f64,

    pub(crate) activeness: Option<ActivenessHandler>,
    /// This interface's own activeness offset, drawn at replication.
    pub(crate) activeness_jitter_value: u32,

    /// Live links, insertion-ordered.  Mirrored on every peer.
    pub(crate) connections: Vec<ConnectionId>,

    /// Whether the interface is in its kind's connectivity grid.
    pub(crate) in_grid: bool,
}

impl Interface {
    /// Interface type tag; two interfaces can connect iff their kinds match.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The owning host.
    pub fn host(&self) -> HostAddress {
        self.host
    }

    /// Location of the owning host, as last pushed into the store.
    pub fn location(&self) -> Coord {
        self.location
    }

    /// Current effective radio range.  Zero while activeness holds the
    /// interface off.
    pub fn transmit_range(&self) -> f64 {
        self.transmit_range
    }

    /// Link speed in bits per second.
    pub fn transmit_speed(&self) -> i32 {
        self.transmit_speed
    }

    /// Seconds between scan rounds (0 = continuous).
    pub fn scan_interval(&self) -> f64 {
        self.scan_interval
    }

    /// Live connections, oldest first.
    pub fn connections(&self) -> &[ConnectionId] {
        &self.connections
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} (range {:.1}, {} connection(s))",
            self.kind,
            self.host,
            self.transmit_range,
            self.connections.len()
        )
    }
}

// ── InterfacePrototype ────────────────────────────────────────────────────────

/// Validated interface configuration plus the radio behavior to stamp onto
/// every replica.
///
/// Hosts never share interface state; they share a prototype and each call to
/// [`NetworkStore::add_interface`][crate::NetworkStore::add_interface]
/// replicates it.  Replication copies the configuration, shares the radio
/// (radios are policy objects), and draws the replica's own activeness jitter
/// and initial scan phase from the interface-initialization RNG so scans
/// desynchronize across hosts.
#[derive(Clone)]
pub struct InterfacePrototype {
    settings: InterfaceSettings,
    activeness: Option<ActivenessHandler>,
    radio: Rc<dyn RadioModel>,
}

impl InterfacePrototype {
    /// Validate `settings` and pair them with a radio.
    pub fn new(settings: InterfaceSettings, radio: Rc<dyn RadioModel>) -> Result<Self, SettingsError> {
        settings.validate()?;
        let activeness = match &settings.active_periods {
            Some(periods) => Some(ActivenessHandler::new(periods.clone())?),
            None => None,
        };
        Ok(Self {
            settings,
            activeness,
            radio,
        })
    }

    /// Prototype with the standard [`SimpleBroadcast`] radio.
    pub fn simple_broadcast(settings: InterfaceSettings) -> Result<Self, SettingsError> {
        Self::new(settings, Rc::new(SimpleBroadcast))
    }

    pub fn settings(&self) -> &InterfaceSettings {
        &self.settings
    }

    /// Stamp out a fresh, unbound interface.
    pub(crate) fn replicate(&self, rng: &mut SimRng) -> (Interface, Rc<dyn RadioModel>) {
        let s = &self.settings;

        let jitter = if s.activeness_jitter_max > 0 {
            rng.gen_range(0..s.activeness_jitter_max)
        } else {
            0
        };
        // draw the initial scan phase from [0, scanInterval)
        let last_scan_time = if s.scan_interval > 0.0 {
            rng.gen_range(0.0..s.scan_interval)
        } else {
            0.0
        };

        let iface = Interface {
            kind: s.kind.clone(),
            host: HostAddress::INVALID,
            location: Coord::default(),
            transmit_range: s.transmit_range,
            old_transmit_range: s.transmit_range,
            transmit_speed: s.transmit_speed,
            scan_interval: s.scan_interval,
            last_scan_time,
            activeness: self.activeness.clone(),
            activeness_jitter_value: jitter,
            connections: Vec::new(),
            in_grid: false,
        };
        (iface, Rc::clone(&self.radio))
    }
}
