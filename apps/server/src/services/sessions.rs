// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory linking session store.
//!
//! The map sits behind an `RwLock`; each session has its own `Mutex`, so
//! highlight state is only ever mutated by one request at a time while
//! other sessions proceed.

use std::collections::VecDeque;
use std::sync::Arc;

use budget_link_core::{LinkingSession, RecordingScene};
use rustc_hash::FxHashMap;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::ApiError;

/// A session and the server-side mirror of its scene materials.
#[derive(Debug)]
pub struct SessionEntry {
    pub session: LinkingSession,
    pub scene: RecordingScene,
}

impl SessionEntry {
    pub fn new(session: LinkingSession) -> Self {
        let scene = RecordingScene::from_elements(session.scene_elements());
        Self { session, scene }
    }
}

#[derive(Debug, Default)]
struct Sessions {
    entries: FxHashMap<Uuid, Arc<Mutex<SessionEntry>>>,
    /// Insertion order, oldest first.
    order: VecDeque<Uuid>,
}

/// Bounded session registry.
#[derive(Debug)]
pub struct SessionStore {
    inner: RwLock<Sessions>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            inner: RwLock::new(Sessions::default()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Registers a session, evicting the oldest ones when full.
    pub async fn insert(&self, entry: SessionEntry) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.inner.write().await;
        while sessions.entries.len() >= self.max_sessions {
            let Some(oldest) = sessions.order.pop_front() else {
                break;
            };
            sessions.entries.remove(&oldest);
            tracing::info!(session = %oldest, "Evicted linking session");
        }
        sessions.entries.insert(id, Arc::new(Mutex::new(entry)));
        sessions.order.push_back(id);
        id
    }

    pub async fn get(&self, id: &str) -> Result<Arc<Mutex<SessionEntry>>, ApiError> {
        let uuid = Uuid::parse_str(id).map_err(|_| ApiError::SessionNotFound(id.to_string()))?;
        self.inner
            .read()
            .await
            .entries
            .get(&uuid)
            .cloned()
            .ok_or_else(|| ApiError::SessionNotFound(id.to_string()))
    }

    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let uuid = Uuid::parse_str(id).map_err(|_| ApiError::SessionNotFound(id.to_string()))?;
        let mut sessions = self.inner.write().await;
        if sessions.entries.remove(&uuid).is_none() {
            return Err(ApiError::SessionNotFound(id.to_string()));
        }
        sessions.order.retain(|s| *s != uuid);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget_link_core::{BudgetItem, SceneElement};

    fn entry() -> SessionEntry {
        SessionEntry::new(LinkingSession::new(
            vec![BudgetItem::new("1", "")],
            vec![SceneElement::new("a", "1_")],
        ))
    }

    #[tokio::test]
    async fn evicts_oldest_when_full() {
        let store = SessionStore::new(2);
        let first = store.insert(entry()).await;
        let second = store.insert(entry()).await;
        let third = store.insert(entry()).await;

        assert_eq!(store.len().await, 2);
        assert!(store.get(&first.to_string()).await.is_err());
        assert!(store.get(&second.to_string()).await.is_ok());
        assert!(store.get(&third.to_string()).await.is_ok());
    }

    #[tokio::test]
    async fn remove_and_bad_ids() {
        let store = SessionStore::new(4);
        let id = store.insert(entry()).await.to_string();
        assert!(store.remove(&id).await.is_ok());
        assert!(matches!(store.remove(&id).await, Err(ApiError::SessionNotFound(_))));
        assert!(matches!(store.get("not-a-uuid").await, Err(ApiError::SessionNotFound(_))));
    }
}
