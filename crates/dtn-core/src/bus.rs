//! Per-host module communication bus.
//!
//! A late-bound property store that lets loosely coupled subsystems of one
//! host (radio, energy model, routing extensions) share named values and react
//! to each other's changes without direct references.
//!
//! # Contract
//!
//! - Keys are dotted strings (`"Network.radioRange"`); the well-known ones are
//!   exported as constants below.
//! - Values are typed [`BusValue`]s, not dynamic objects.
//! - A property may be added only once per host; re-adding is a [`SimError`].
//! - Subscriptions are many-to-one.  Updating a property must notify every
//!   subscriber synchronously: [`ModuleCommunicationBus::update_property`]
//!   stores the value and hands the subscriber set back to the caller, which
//!   owns the subscriber state and performs the actual callbacks before doing
//!   anything else.  (The bus cannot call into interfaces itself without
//!   aliasing the store that contains both.)

use std::collections::HashMap;

use crate::error::{SimError, SimResult};
use crate::ids::InterfaceId;

/// Bus id of the "scanning interval" variable.  Value type: double.
pub const SCAN_INTERVAL_ID: &str = "Network.scanInterval";
/// Bus id of the "radio range" variable.  Value type: double.
pub const RANGE_ID: &str = "Network.radioRange";
/// Bus id of the "transmission speed" variable.  Value type: integer.
pub const SPEED_ID: &str = "Network.speed";
/// Bus id of the "remaining battery" variable.  Value type: double.  The
/// connectivity core only ever reads this; an energy model owns it.
pub const ENERGY_VALUE_ID: &str = "Energy.value";

/// A typed value on the bus.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BusValue {
    Double(f64),
    Int(i32),
    Bool(bool),
}

impl BusValue {
    /// The value as a double, if it is one.
    #[inline]
    pub fn as_double(self) -> Option<f64> {
        match self {
            BusValue::Double(v) => Some(v),
            _ => None,
        }
    }

    /// The value as an integer, if it is one.
    #[inline]
    pub fn as_int(self) -> Option<i32> {
        match self {
            BusValue::Int(v) => Some(v),
            _ => None,
        }
    }
}

/// One host's property store with publish-subscribe semantics.
#[derive(Default)]
pub struct ModuleCommunicationBus {
    values: HashMap<String, BusValue>,
    subscribers: HashMap<String, Vec<InterfaceId>>,
}

impl ModuleCommunicationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new property.  Each key may be added once per host.
    pub fn add_property(&mut self, key: &str, value: BusValue) -> SimResult<()> {
        if self.values.contains_key(key) {
            return Err(SimError::DuplicateBusProperty(key.to_owned()));
        }
        self.values.insert(key.to_owned(), value);
        Ok(())
    }

    /// Whether `key` has been added.
    pub fn contains_property(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Current value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<BusValue> {
        self.values.get(key).copied()
    }

    /// Double-valued property, or `default` when the property is absent or
    /// not a double.
    pub fn get_double(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(BusValue::as_double).unwrap_or(default)
    }

    /// Subscribe `iface` to change notifications for `key`.
    ///
    /// Subscribing does not require the property to exist yet; the first
    /// update will still be delivered.
    pub fn subscribe(&mut self, key: &str, iface: InterfaceId) {
        self.subscribers.entry(key.to_owned()).or_default().push(iface);
    }

    /// Store a new value for `key` (creating the property if needed) and
    /// return the subscribers that must be notified of the change.
    ///
    /// The caller dispatches the notifications; see the module docs.
    #[must_use = "subscribers returned here must be notified by the caller"]
    pub fn update_property(&mut self, key: &str, value: BusValue) -> Vec<InterfaceId> {
        self.values.insert(key.to_owned(), value);
        self.subscribers.get(key).cloned().unwrap_or_default()
    }
}
