//! Per-call host ordering.

use std::iter;

use crate::pool::host::Host;

/// The order in which one call tries the hosts of a pool.
///
/// Split into the hosts that may fail over (`leading`) and the host whose
/// failure ends the call (`last`), so a pool can never yield an empty order.
#[derive(Debug, Clone)]
pub struct HostOrder {
    leading: Vec<Host>,
    last: Host,
}

impl HostOrder {
    pub(crate) fn new(leading: Vec<Host>, last: Host) -> Self {
        Self { leading, last }
    }

    /// Number of hosts the call may attempt.
    pub fn len(&self) -> usize {
        self.leading.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Host> {
        self.leading.iter().chain(iter::once(&self.last))
    }

    pub fn last(&self) -> &Host {
        &self.last
    }

    pub fn into_parts(self) -> (Vec<Host>, Host) {
        (self.leading, self.last)
    }
}
