use std::sync::Arc;

use tracing::debug;

use super::domain::{
    NewNomineeSummary, Nomination, NomineeSummary, SummaryFlags, SummaryKey, SummarySubject,
};
use super::repository::{NominationStore, RepositoryError};

/// Upper bound on insert attempts when concurrent writers race to create a key.
const MAX_RECONCILE_ATTEMPTS: usize = 3;

/// Keeps the summary row for a nomination's key in step with the stored nominations.
///
/// Individual rows always take their total from the stored nominations rather than
/// incrementing, so repeated or out-of-order calls converge on the same state. An
/// existing row is refreshed by the store in one step, so a late reconciliation can
/// neither lower a newer total nor revert a flag change made in between.
/// Team rows are seeded at one and never recounted: a team nomination is its own key.
pub struct SummaryReconciler<S> {
    store: Arc<S>,
}

impl<S> SummaryReconciler<S>
where
    S: NominationStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn reconcile(&self, nomination: &Nomination) -> Result<NomineeSummary, RepositoryError> {
        let key = nomination.summary_key();

        for attempt in 1..=MAX_RECONCILE_ATTEMPTS {
            if let Some(existing) = self.store.find_summary(&key)? {
                match self.store.refresh_summary(existing.id) {
                    Err(RepositoryError::NotFound) => {
                        debug!(%key, attempt, "summary removed before refresh, retrying");
                        continue;
                    }
                    refreshed => return refreshed,
                }
            }

            match self.store.insert_summary(self.seed(nomination, key)?) {
                Ok(created) => {
                    debug!(summary_id = %created.id, %key, "nominee summary created");
                    return Ok(created);
                }
                Err(RepositoryError::Conflict) => {
                    debug!(%key, attempt, "summary created concurrently, retrying as update");
                }
                Err(err) => return Err(err),
            }
        }

        Err(RepositoryError::Conflict)
    }

    fn seed(
        &self,
        nomination: &Nomination,
        key: SummaryKey,
    ) -> Result<NewNomineeSummary, RepositoryError> {
        Ok(NewNomineeSummary {
            key,
            location: nomination.location.clone(),
            total_nominations: self.total_for(&key)?.unwrap_or(1).max(1),
            flags: SummaryFlags::default(),
        })
    }

    fn total_for(&self, key: &SummaryKey) -> Result<Option<u32>, RepositoryError> {
        match key.subject {
            SummarySubject::Nominee(nominee_id) => self
                .store
                .count_nominations(nominee_id, key.category_id)
                .map(Some),
            SummarySubject::TeamNomination(_) => Ok(None),
        }
    }
}
