use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;

use crate::domain::errors::{DomainError, Result};
use crate::domain::value_objects::CameraId;

type LockMap = Arc<StdMutex<HashMap<CameraId, Arc<Mutex<()>>>>>;

/// Serializes start/stop per camera while letting different cameras proceed in parallel.
///
/// An entry lives only while some request holds or waits for it, so the map
/// stays bounded by the number of in-flight requests.
pub struct CameraLocks {
    locks: LockMap,
    wait_timeout: Duration,
}

impl CameraLocks {
    pub fn new(wait_timeout: Duration) -> Self {
        Self {
            locks: Arc::new(StdMutex::new(HashMap::new())),
            wait_timeout,
        }
    }

    /// Wait for exclusive access to a camera; `CameraBusy` once the wait times out.
    /// Access is released when the returned guard is dropped.
    pub async fn acquire(&self, vid: &CameraId) -> Result<CameraGuard> {
        let lock = self.get_or_create_lock(vid);

        match timeout(self.wait_timeout, lock.clone().lock_owned()).await {
            Ok(guard) => Ok(CameraGuard {
                vid: vid.clone(),
                guard: Some(guard),
                lock,
                locks: self.locks.clone(),
            }),
            Err(_) => {
                tracing::warn!(
                    vid = %vid,
                    timeout_ms = self.wait_timeout.as_millis() as u64,
                    "Timed out waiting for another request on this camera"
                );
                prune(&self.locks, vid, &lock);
                Err(DomainError::CameraBusy(vid.to_string()))
            }
        }
    }

    /// Cameras that currently have a lock entry
    pub fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn get_or_create_lock(&self, vid: &CameraId) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(vid.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

// Drops the entry when the map and `lock` are its only owners. The count is
// read under the map lock, where new handles are cloned out.
fn prune(locks: &LockMap, vid: &CameraId, lock: &Arc<Mutex<()>>) {
    let mut map = locks.lock().unwrap_or_else(PoisonError::into_inner);
    if Arc::strong_count(lock) == 2 {
        map.remove(vid);
    }
}

/// Exclusive access to one camera
pub struct CameraGuard {
    vid: CameraId,
    guard: Option<OwnedMutexGuard<()>>,
    lock: Arc<Mutex<()>>,
    locks: LockMap,
}

impl CameraGuard {
    pub fn vid(&self) -> &CameraId {
        &self.vid
    }
}

impl Drop for CameraGuard {
    fn drop(&mut self) {
        // release first: the owned guard holds its own handle on the lock
        self.guard.take();
        prune(&self.locks, &self.vid, &self.lock);
    }
}
