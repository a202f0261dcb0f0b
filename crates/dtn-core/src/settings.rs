//! Configuration structs.
//!
//! Typically deserialized from a TOML/JSON file by the application crate and
//! validated before any simulation object is built; validation failures are
//! [`SettingsError`]s and the run never starts.  Field names keep the setting
//! ids of the classic configuration surface (`transmitRange`,
//! `Optimization.randomizeUpdateOrder`, …) in their error messages so a bad
//! config file points back at the offending key.

use crate::error::SettingsError;

// ── World-level configuration ─────────────────────────────────────────────────

/// Top-level world configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldConfig {
    /// World width (x extent).  The world is bounded; there is no wrap-around.
    pub width: f64,
    /// World height (y extent).
    pub height: f64,

    /// Nominal update interval Δ in seconds.  Must be positive.
    pub update_interval: f64,

    /// Whether connections are simulated at all.  When false, host updates
    /// only run routing hooks.
    pub simulate_connections: bool,

    /// Shuffle the host-update order every pass (`Optimization.randomizeUpdateOrder`).
    pub randomize_update_order: bool,

    /// Freeze connectivity after the first update pass
    /// (`Optimization.simulateConnectionsOnce`).
    pub simulate_connections_once: bool,

    /// Pace simulation time to wall-clock time (`Optimization.realtime`).
    pub realtime: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            update_interval: 1.0,
            simulate_connections: true,
            randomize_update_order: true,
            simulate_connections_once: false,
            realtime: false,
        }
    }
}

impl WorldConfig {
    /// Reject configurations the stepping loop cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.update_interval <= 0.0 {
            return Err(SettingsError::NonPositiveValue {
                setting: "updateInterval",
                value: self.update_interval,
            });
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(SettingsError::NonPositiveValue {
                setting: "worldSize",
                value: self.width.min(self.height),
            });
        }
        Ok(())
    }
}

// ── Interface configuration ───────────────────────────────────────────────────

/// Group-level configuration for one kind of network interface.
///
/// `kind` groups interfaces that can talk to each other: two interfaces are
/// compatible iff their kinds match exactly.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterfaceSettings {
    /// Interface type tag; compatibility is exact string equality.
    pub kind: String,

    /// Radio range in world units (`transmitRange`).  Zero means the
    /// interface never participates in connectivity.
    pub transmit_range: f64,

    /// Link speed in bits per second (`transmitSpeed`).
    pub transmit_speed: i32,

    /// Seconds between scan rounds (`scanInterval`).  Zero means the
    /// interface scans continuously.
    pub scan_interval: f64,

    /// Upper bound for the per-interface activeness offset jitter
    /// (`activenessOffsetJitter`).  Each replica draws its own offset in
    /// `[0, jitter_max)`.
    pub activeness_jitter_max: u32,

    /// Inclusive `[start, end]` windows of simulation time during which the
    /// interface is allowed to be on.  `None` means no activeness handling at
    /// all: always on, and no battery check either.
    pub active_periods: Option<Vec<(f64, f64)>>,
}

impl InterfaceSettings {
    /// A continuously scanning, always-on interface of the given kind.
    pub fn new(kind: impl Into<String>, transmit_range: f64, transmit_speed: i32) -> Self {
        Self {
            kind: kind.into(),
            transmit_range,
            transmit_speed,
            scan_interval: 0.0,
            activeness_jitter_max: 0,
            active_periods: None,
        }
    }

    /// Reject negative ranges, speeds and intervals, and inverted activeness
    /// periods.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.transmit_range < 0.0 {
            return Err(SettingsError::NegativeValue {
                setting: "transmitRange",
                value: self.transmit_range,
            });
        }
        if self.transmit_speed < 0 {
            return Err(SettingsError::NegativeValue {
                setting: "transmitSpeed",
                value: f64::from(self.transmit_speed),
            });
        }
        if self.scan_interval < 0.0 {
            return Err(SettingsError::NegativeValue {
                setting: "scanInterval",
                value: self.scan_interval,
            });
        }
        if let Some(periods) = &self.active_periods {
            for &(start, end) in periods {
                if start > end {
                    return Err(SettingsError::InvalidActivePeriod { start, end });
                }
            }
        }
        Ok(())
    }
}
