use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};

/// Bounded pool of bridge-side ports for relays
#[derive(Debug, Clone)]
pub struct RelayPortPool {
    free: Arc<Mutex<BTreeSet<u16>>>,
}

impl RelayPortPool {
    pub fn new(ports: Range<u16>) -> Self {
        Self {
            free: Arc::new(Mutex::new(ports.collect())),
        }
    }

    /// Lowest free port; the port goes back to the pool when the lease is dropped
    pub fn acquire(&self) -> Option<PortLease> {
        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        let port = free.pop_first()?;
        Some(PortLease {
            port,
            pool: self.free.clone(),
        })
    }

    pub fn available(&self) -> usize {
        self.free.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[derive(Debug)]
pub struct PortLease {
    port: u16,
    pool: Arc<Mutex<BTreeSet<u16>>>,
}

impl PortLease {
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Drop for PortLease {
    fn drop(&mut self) {
        self.pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.port);
    }
}
