use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{
    CategoryId, NewNomination, NewNomineeSummary, Nomination, NominationId, NomineeSummary,
    SummaryFlagsPatch, SummaryId, SummaryKey, SummarySubject, UserId,
};
use super::repository::{NominationStore, RepositoryError};

#[derive(Debug, Default)]
struct StoreState {
    next_nomination_id: u64,
    next_summary_id: u64,
    nominations: BTreeMap<NominationId, Nomination>,
    summaries: BTreeMap<SummaryId, NomineeSummary>,
    summary_keys: HashMap<SummaryKey, SummaryId>,
}

impl StoreState {
    fn individual_count(&self, nominee_id: UserId, category_id: CategoryId) -> u32 {
        let count = self
            .nominations
            .values()
            .filter(|record| {
                record.category_id == category_id && record.subject.nominee_id() == Some(nominee_id)
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Process-local store. A single lock covers rows and the key index, so the
/// uniqueness check and the insert are one atomic step, and a summary refresh
/// counts and writes without another writer in between.
#[derive(Debug, Default, Clone)]
pub struct InMemoryNominationStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryNominationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }

    pub fn summary_count(&self) -> usize {
        self.lock().map(|state| state.summaries.len()).unwrap_or(0)
    }
}

impl NominationStore for InMemoryNominationStore {
    fn insert_nomination(&self, nomination: NewNomination) -> Result<Nomination, RepositoryError> {
        let mut state = self.lock()?;
        state.next_nomination_id += 1;
        let id = NominationId(state.next_nomination_id);
        let now = Utc::now();

        let record = Nomination {
            id,
            creator_id: nomination.creator_id,
            category_id: nomination.category_id,
            subject: nomination.subject,
            answers: nomination.answers,
            ai_summary: None,
            location: nomination.location,
            created_at: now,
            updated_at: now,
        };
        state.nominations.insert(id, record.clone());
        Ok(record)
    }

    fn fetch_nomination(&self, id: NominationId) -> Result<Option<Nomination>, RepositoryError> {
        Ok(self.lock()?.nominations.get(&id).cloned())
    }

    fn record_ai_summary(&self, id: NominationId, summary: &str) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        let record = state
            .nominations
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        record.ai_summary = Some(summary.to_string());
        Ok(())
    }

    fn count_nominations(
        &self,
        nominee_id: UserId,
        category_id: CategoryId,
    ) -> Result<u32, RepositoryError> {
        Ok(self.lock()?.individual_count(nominee_id, category_id))
    }

    fn nominations_for_nominee(
        &self,
        nominee_id: UserId,
        category_id: CategoryId,
    ) -> Result<Vec<Nomination>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .nominations
            .values()
            .filter(|record| {
                record.category_id == category_id && record.subject.nominee_id() == Some(nominee_id)
            })
            .cloned()
            .collect())
    }

    fn find_summary(&self, key: &SummaryKey) -> Result<Option<NomineeSummary>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .summary_keys
            .get(key)
            .and_then(|id| state.summaries.get(id))
            .cloned())
    }

    fn fetch_summary(&self, id: SummaryId) -> Result<Option<NomineeSummary>, RepositoryError> {
        Ok(self.lock()?.summaries.get(&id).cloned())
    }

    fn list_summaries(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<NomineeSummary>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .summaries
            .values()
            .filter(|summary| category_id.map_or(true, |id| summary.key.category_id == id))
            .cloned()
            .collect())
    }

    fn insert_summary(
        &self,
        summary: NewNomineeSummary,
    ) -> Result<NomineeSummary, RepositoryError> {
        let mut state = self.lock()?;
        if state.summary_keys.contains_key(&summary.key) {
            return Err(RepositoryError::Conflict);
        }

        state.next_summary_id += 1;
        let id = SummaryId(state.next_summary_id);
        let now = Utc::now();
        let record = NomineeSummary {
            id,
            key: summary.key,
            location: summary.location,
            total_nominations: summary.total_nominations,
            flags: summary.flags,
            created_at: now,
            updated_at: now,
        };
        state.summary_keys.insert(record.key, id);
        state.summaries.insert(id, record.clone());
        Ok(record)
    }

    fn refresh_summary(&self, id: SummaryId) -> Result<NomineeSummary, RepositoryError> {
        let mut state = self.lock()?;
        let key = state
            .summaries
            .get(&id)
            .map(|summary| summary.key)
            .ok_or(RepositoryError::NotFound)?;
        let total = match key.subject {
            SummarySubject::Nominee(nominee_id) => {
                Some(state.individual_count(nominee_id, key.category_id))
            }
            SummarySubject::TeamNomination(_) => None,
        };

        let summary = state
            .summaries
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(total) = total {
            summary.total_nominations = total;
        }
        summary.updated_at = Utc::now();
        Ok(summary.clone())
    }

    fn apply_summary_flags(
        &self,
        id: SummaryId,
        patch: SummaryFlagsPatch,
    ) -> Result<NomineeSummary, RepositoryError> {
        let mut state = self.lock()?;
        let summary = state
            .summaries
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        patch.apply(&mut summary.flags);
        summary.updated_at = Utc::now();
        Ok(summary.clone())
    }

    fn delete_summary(&self, id: SummaryId) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        let removed = state.summaries.remove(&id).ok_or(RepositoryError::NotFound)?;
        state.summary_keys.remove(&removed.key);
        Ok(())
    }
}
