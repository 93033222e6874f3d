use std::collections::BTreeMap;

use tokio::sync::Mutex;

use crate::domain::entities::{Session, SessionSummary};
use crate::domain::value_objects::CameraId;

/// Single source of truth for which cameras have an active session.
///
/// A pure data structure: it never stops relays. Callers take sessions out
/// with [`SessionRegistry::remove`] or [`SessionRegistry::drain`] and release
/// what they own.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<BTreeMap<CameraId, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns the replaced session, if any.
    pub async fn put(&self, session: Session) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.vid().clone(), session)
    }

    pub async fn get(&self, vid: &CameraId) -> Option<SessionSummary> {
        let sessions = self.sessions.lock().await;
        sessions.get(vid).map(Session::summary)
    }

    pub async fn contains(&self, vid: &CameraId) -> bool {
        self.sessions.lock().await.contains_key(vid)
    }

    /// Atomic take-and-delete
    pub async fn remove(&self, vid: &CameraId) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(vid)
    }

    /// Snapshot ordered by camera id
    pub async fn list(&self) -> Vec<SessionSummary> {
        let sessions = self.sessions.lock().await;
        sessions.values().map(Session::summary).collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Remove every session at once (shutdown)
    pub async fn drain(&self) -> Vec<Session> {
        let mut sessions = self.sessions.lock().await;
        std::mem::take(&mut *sessions).into_values().collect()
    }
}
