//! Activeness windows: when is an interface allowed to be powered on?

use dtn_core::SettingsError;

/// A predicate over simulation time built from inclusive `[start, end]`
/// windows.  An interface carrying a handler is allowed on only while the
/// (jitter-shifted) time falls inside one of the windows.
///
/// Jitter shifts every window forward by the interface's own offset, so
/// replicas of one prototype do not all power up on the same tick.
#[derive(Clone, Debug)]
pub struct ActivenessHandler {
    /// Windows sorted by start time.
    periods: Vec<(f64, f64)>,
}

impl ActivenessHandler {
    /// Build a handler from `[start, end]` windows.
    ///
    /// An empty list is legal and means "never active".
    pub fn new(mut periods: Vec<(f64, f64)>) -> Result<Self, SettingsError> {
        for &(start, end) in &periods {
            if start > end {
                return Err(SettingsError::InvalidActivePeriod { start, end });
            }
        }
        periods.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { periods })
    }

    /// Whether the interface may be on at `now`, with its windows shifted by
    /// `jitter` seconds.
    pub fn is_active(&self, now: f64, jitter: u32) -> bool {
        let shift = f64::from(jitter);
        self.periods
            .iter()
            .any(|&(start, end)| now >= start + shift && now <= end + shift)
    }
}
