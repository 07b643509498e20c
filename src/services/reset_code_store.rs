use crate::models::password_reset::ResetRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

pub type ResetPredicate<'a> = &'a (dyn Fn(&ResetRequest) -> bool + Send + Sync);

/// Keyed storage for outstanding reset requests.
///
/// Every operation is atomic with respect to the others, so conditional
/// removals never clobber a request written concurrently for the same email.
#[async_trait]
pub trait ResetCodeStore: Send + Sync {
    /// Stores `request` for `email`, returning the request it replaced.
    async fn insert(&self, email: &str, request: ResetRequest) -> Option<ResetRequest>;
    async fn get(&self, email: &str) -> Option<ResetRequest>;
    /// Removes the entry for `email` only if `predicate` holds for it.
    async fn remove_if(&self, email: &str, predicate: ResetPredicate<'_>) -> Option<ResetRequest>;
    /// Sets the reset token on the entry for `email` if `predicate` holds.
    async fn attach_token(
        &self,
        email: &str,
        predicate: ResetPredicate<'_>,
        token: String,
    ) -> bool;
    /// Returns one entry satisfying `predicate` without removing it.
    async fn find_first(&self, predicate: ResetPredicate<'_>) -> Option<(String, ResetRequest)>;
    /// Removes one entry satisfying `predicate`, whichever is found first.
    async fn remove_first(&self, predicate: ResetPredicate<'_>) -> Option<(String, ResetRequest)>;
    /// Drops every entry that expired before `now`; returns how many.
    async fn purge_expired(&self, now: DateTime<Utc>) -> usize;
    async fn len(&self) -> usize;
}

/// Process-local store. A single async mutex serializes all access.
#[derive(Default)]
pub struct InMemoryResetCodeStore {
    entries: Mutex<HashMap<String, ResetRequest>>,
}

impl InMemoryResetCodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResetCodeStore for InMemoryResetCodeStore {
    async fn insert(&self, email: &str, request: ResetRequest) -> Option<ResetRequest> {
        self.entries.lock().await.insert(email.to_string(), request)
    }

    async fn get(&self, email: &str) -> Option<ResetRequest> {
        self.entries.lock().await.get(email).cloned()
    }

    async fn remove_if(&self, email: &str, predicate: ResetPredicate<'_>) -> Option<ResetRequest> {
        let mut entries = self.entries.lock().await;
        match entries.get(email) {
            Some(request) if predicate(request) => entries.remove(email),
            _ => None,
        }
    }

    async fn attach_token(
        &self,
        email: &str,
        predicate: ResetPredicate<'_>,
        token: String,
    ) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get_mut(email) {
            Some(request) if predicate(request) => {
                request.reset_token = Some(token);
                true
            }
            _ => false,
        }
    }

    async fn find_first(&self, predicate: ResetPredicate<'_>) -> Option<(String, ResetRequest)> {
        self.entries
            .lock()
            .await
            .iter()
            .find(|(_, request)| predicate(request))
            .map(|(email, request)| (email.clone(), request.clone()))
    }

    async fn remove_first(&self, predicate: ResetPredicate<'_>) -> Option<(String, ResetRequest)> {
        let mut entries = self.entries.lock().await;
        let email = entries
            .iter()
            .find(|(_, request)| predicate(request))
            .map(|(email, _)| email.clone())?;
        entries.remove_entry(&email)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, request| !request.is_expired(now));
        before - entries.len()
    }

    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
