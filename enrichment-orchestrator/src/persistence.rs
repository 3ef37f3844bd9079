use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use enrichment_common::{Lead, TriState};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("no lead found with id {0}")]
    NotFound(i64),
}

/// Narrow persistence seam: `findById`, `findManyByIds`, `updateFields`.
/// The orchestrator never needs transactions across these calls.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Option<Lead>;
    async fn find_many_by_ids(&self, ids: &[i64]) -> Vec<Lead>;
    async fn update_fields(
        &self,
        id: i64,
        phone_number: Option<String>,
        email_verified: Option<TriState>,
    ) -> Result<(), PersistenceError>;
}

/// In-memory `PersistenceStore`, suitable for running the core without an
/// external database and for tests.
pub struct InMemoryPersistenceStore {
    leads: Mutex<HashMap<i64, Lead>>,
}

impl InMemoryPersistenceStore {
    pub fn new(leads: Vec<Lead>) -> Arc<Self> {
        let leads = leads.into_iter().map(|lead| (lead.id, lead)).collect();
        Arc::new(Self {
            leads: Mutex::new(leads),
        })
    }
}

#[async_trait]
impl PersistenceStore for InMemoryPersistenceStore {
    async fn find_by_id(&self, id: i64) -> Option<Lead> {
        self.leads.lock().await.get(&id).cloned()
    }

    async fn find_many_by_ids(&self, ids: &[i64]) -> Vec<Lead> {
        let leads = self.leads.lock().await;
        ids.iter().filter_map(|id| leads.get(id).cloned()).collect()
    }

    async fn update_fields(
        &self,
        id: i64,
        phone_number: Option<String>,
        email_verified: Option<TriState>,
    ) -> Result<(), PersistenceError> {
        let mut leads = self.leads.lock().await;
        let lead = leads.get_mut(&id).ok_or(PersistenceError::NotFound(id))?;

        if let Some(phone_number) = phone_number {
            lead.phone_number = Some(phone_number);
        }
        if let Some(email_verified) = email_verified {
            lead.email_verified = email_verified;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(id: i64) -> Lead {
        Lead {
            id,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            company_name: None,
            job_title: None,
            phone_number: None,
            email_verified: TriState::Unknown,
        }
    }

    #[tokio::test]
    async fn find_by_id_returns_stored_lead() {
        let store = InMemoryPersistenceStore::new(vec![lead(1)]);
        assert_eq!(store.find_by_id(1).await.map(|l| l.id), Some(1));
        assert_eq!(store.find_by_id(2).await, None);
    }

    #[tokio::test]
    async fn find_many_by_ids_skips_missing() {
        let store = InMemoryPersistenceStore::new(vec![lead(1), lead(2)]);
        let found = store.find_many_by_ids(&[1, 3, 2]).await;
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn update_fields_writes_back_phone_and_email_verified() {
        let store = InMemoryPersistenceStore::new(vec![lead(1)]);
        store
            .update_fields(1, Some("+1-555".to_string()), Some(TriState::True))
            .await
            .unwrap();

        let updated = store.find_by_id(1).await.unwrap();
        assert_eq!(updated.phone_number, Some("+1-555".to_string()));
        assert_eq!(updated.email_verified, TriState::True);
    }

    #[tokio::test]
    async fn update_fields_on_unknown_lead_errors() {
        let store = InMemoryPersistenceStore::new(vec![]);
        let result = store.update_fields(99, None, None).await;
        assert!(matches!(result, Err(PersistenceError::NotFound(99))));
    }
}
