//! World-level observer seam.

use crate::host::DtnHost;

/// Observer called once per completed [`World::update`][crate::World::update]
/// round, after the final host-update pass.  Report writers and UIs hang off
/// this.
pub trait UpdateListener {
    fn updated(&mut self, hosts: &[DtnHost]);
}
