//! In-memory session store.
//!
//! Every session sits behind its own mutex so that at most one mutation per
//! session is in flight while different sessions never contend. The map lock
//! is only held to look up or insert entries.

use crate::error::GameError;
use crate::invariants::{InvariantSet, SessionInvariants};
use crate::session::{GameSession, SessionId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, error, info, instrument};

type Slot = Arc<Mutex<GameSession>>;

/// Process-wide mapping from session id to the latest session snapshot.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<BTreeMap<SessionId, Slot>>>,
    next_id: Arc<AtomicU64>,
}

// Writes replace whole values, so a panic mid-operation never leaves a
// half-edited session behind and poisoned locks are safe to reuse.
fn lock(slot: &Slot) -> MutexGuard<'_, GameSession> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session store");
        Self::default()
    }

    fn slot(&self, id: SessionId) -> Option<Slot> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Gets a snapshot of a session.
    #[instrument(skip(self))]
    pub fn get(&self, id: SessionId) -> Option<GameSession> {
        let session = self.slot(id).map(|slot| lock(&slot).clone());
        if session.is_none() {
            debug!(session_id = %id, "Session not found");
        }
        session
    }

    /// Inserts or replaces the entry for `session.id`.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub fn put(&self, session: GameSession) {
        check_invariants(&session);
        let id = *session.id();
        match self.slot(id) {
            Some(slot) => *lock(&slot) = session,
            None => {
                self.sessions
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(id, Arc::new(Mutex::new(session)));
            }
        }
        debug!("Session stored");
    }

    /// Allocates a fresh id, builds a session for it and stores it.
    #[instrument(skip(self, build))]
    pub fn create<F>(&self, build: F) -> GameSession
    where
        F: FnOnce(SessionId) -> GameSession,
    {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let session = build(id);
        self.put(session.clone());
        info!(session_id = %id, "Created new session");
        session
    }

    /// Runs a read-compute-write transaction on one session.
    ///
    /// The session stays locked while `f` computes its successor. The stored
    /// value is replaced only when `f` succeeds; on error nothing is written.
    #[instrument(skip(self, f))]
    pub fn update<F>(&self, id: SessionId, f: F) -> Result<GameSession, GameError>
    where
        F: FnOnce(&GameSession) -> Result<GameSession, GameError>,
    {
        let slot = self
            .slot(id)
            .ok_or_else(|| GameError::session_not_found(id))?;
        let mut guard = lock(&slot);
        let next = f(&*guard)?;
        check_invariants(&next);
        *guard = next.clone();
        debug!(session_id = %id, "Session updated");
        Ok(next)
    }

    /// Lists all session ids in ascending order.
    #[instrument(skip(self))]
    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }

    /// Snapshots of every session in ascending id order.
    #[instrument(skip(self))]
    pub fn snapshots(&self) -> Vec<GameSession> {
        let slots: Vec<Slot> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        slots.iter().map(|slot| lock(slot).clone()).collect()
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Checks if the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn check_invariants(session: &GameSession) {
    if let Err(violations) = SessionInvariants::check_all(session) {
        error!(session_id = %session.id(), ?violations, "Session invariants violated");
        debug_assert!(false, "session invariants violated: {violations:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GameErrorKind, StateRejection};
    use crate::session::Player;
    use crate::win::standard_lines;

    fn fresh(store: &SessionStore) -> GameSession {
        store.create(|id| GameSession::new(id, 3, standard_lines(3)))
    }

    #[test]
    fn test_create_allocates_increasing_ids() {
        let store = SessionStore::new();
        let a = fresh(&store);
        let b = fresh(&store);
        assert_eq!(*a.id(), SessionId(1));
        assert_eq!(*b.id(), SessionId(2));
        assert_eq!(store.ids(), vec![SessionId(1), SessionId(2)]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_get_returns_stored_snapshot() {
        let store = SessionStore::new();
        let session = fresh(&store);
        assert_eq!(store.get(*session.id()), Some(session));
        assert_eq!(store.get(SessionId(99)), None);
    }

    #[test]
    fn test_put_replaces() {
        let store = SessionStore::new();
        let mut session = fresh(&store);
        session.count = 5;
        store.put(session.clone());
        assert_eq!(*store.get(*session.id()).unwrap().count(), 5);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let store = SessionStore::new();
        let session = fresh(&store);
        let result = store.update(*session.id(), |_| {
            Err(GameError::invalid_state(StateRejection::NotFinished))
        });
        assert!(result.is_err());
        assert_eq!(store.get(*session.id()), Some(session));
    }

    #[test]
    fn test_update_missing_session() {
        let store = SessionStore::new();
        let err = store.update(SessionId(7), |s| Ok(s.clone())).unwrap_err();
        assert_eq!(err.kind, GameErrorKind::SessionNotFound(SessionId(7)));
    }

    #[test]
    fn test_concurrent_updates_serialize() {
        let store = SessionStore::new();
        let id = *fresh(&store).id();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store
                            .update(id, |s| {
                                let mut next = s.clone();
                                next.count += 1;
                                Ok(next)
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*store.get(id).unwrap().count(), 800);
    }

    #[test]
    fn test_snapshots_in_id_order() {
        let store = SessionStore::new();
        for _ in 0..3 {
            fresh(&store);
        }
        let mut second = store.get(SessionId(2)).unwrap();
        second
            .players
            .push(Player::new("p".into(), "P".into()));
        store.put(second);
        let snaps = store.snapshots();
        let ids: Vec<_> = snaps.iter().map(|s| *s.id()).collect();
        assert_eq!(ids, vec![SessionId(1), SessionId(2), SessionId(3)]);
        assert_eq!(snaps[1].players_joined(), 1);
    }
}
