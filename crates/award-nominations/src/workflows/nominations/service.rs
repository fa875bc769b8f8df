use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use super::domain::{
    CategoryId, Nomination, NominationDraft, NominationId, NominationReceipt, NomineeSummary,
    SummaryFlagsPatch, SummaryId, SummaryKey, UserId,
};
use super::intake::{IntakeGuard, NominationShapeError};
use super::ranking::rank;
use super::reconciler::SummaryReconciler;
use super::repository::{NominationStore, RepositoryError};
use super::summarizer::{SummaryEnricher, SummaryGenerator};

/// Service composing intake validation, the store, AI enrichment, and reconciliation.
pub struct NominationService<S, G> {
    guard: IntakeGuard,
    store: Arc<S>,
    enricher: SummaryEnricher<G>,
    reconciler: SummaryReconciler<S>,
}

impl<S, G> NominationService<S, G>
where
    S: NominationStore + 'static,
    G: SummaryGenerator + 'static,
{
    pub fn new(store: Arc<S>, generator: Arc<G>, summary_timeout: Duration) -> Self {
        Self {
            guard: IntakeGuard::new(),
            reconciler: SummaryReconciler::new(store.clone()),
            enricher: SummaryEnricher::new(generator, summary_timeout),
            store,
        }
    }

    /// Validate and persist a nomination, then enrich and reconcile it.
    ///
    /// Only validation and the nomination write can fail the call. Enrichment falls back
    /// to placeholder text and a reconciliation failure is logged; the next
    /// reconciliation for the same key re-derives the correct total.
    pub async fn create(
        &self,
        draft: NominationDraft,
        acting_user: UserId,
    ) -> Result<NominationReceipt, NominationServiceError> {
        let validated = self.guard.validate(draft, acting_user)?;
        let mut nomination = self.store.insert_nomination(validated)?;
        info!(
            nomination_id = %nomination.id,
            category_id = %nomination.category_id,
            team = nomination.subject.is_team(),
            "nomination accepted"
        );

        let ai_summary = self.enricher.summarize_answers(&nomination.answers).await;
        match self.store.record_ai_summary(nomination.id, &ai_summary) {
            Ok(()) => nomination.ai_summary = Some(ai_summary),
            Err(err) => {
                warn!(nomination_id = %nomination.id, error = %err, "failed to store ai summary");
            }
        }

        let summary = match self.reconciler.reconcile(&nomination) {
            Ok(summary) => Some(summary.view()),
            Err(err) => {
                error!(
                    nomination_id = %nomination.id,
                    key = %nomination.summary_key(),
                    error = %err,
                    "summary reconciliation failed; nomination kept"
                );
                None
            }
        };

        Ok(NominationReceipt {
            nomination: nomination.view(),
            summary,
        })
    }

    pub fn get_nomination(&self, id: NominationId) -> Result<Nomination, NominationServiceError> {
        let nomination = self
            .store
            .fetch_nomination(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(nomination)
    }

    /// Re-run reconciliation for a stored nomination.
    pub fn reconcile(&self, id: NominationId) -> Result<NomineeSummary, NominationServiceError> {
        let nomination = self.get_nomination(id)?;
        Ok(self.reconciler.reconcile(&nomination)?)
    }

    pub fn summary_for_nominee(
        &self,
        nominee_id: UserId,
        category_id: CategoryId,
    ) -> Result<NomineeSummary, NominationServiceError> {
        self.summary_by_key(&SummaryKey::nominee(nominee_id, category_id))
    }

    pub fn summary_for_nomination(
        &self,
        id: NominationId,
    ) -> Result<NomineeSummary, NominationServiceError> {
        let nomination = self.get_nomination(id)?;
        self.summary_by_key(&nomination.summary_key())
    }

    pub fn nominations_for_nominee(
        &self,
        nominee_id: UserId,
        category_id: CategoryId,
    ) -> Result<Vec<Nomination>, NominationServiceError> {
        Ok(self
            .store
            .nominations_for_nominee(nominee_id, category_id)?)
    }

    /// Summaries ordered for presentation.
    pub fn ranked_summaries(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<NomineeSummary>, NominationServiceError> {
        let summaries = self.store.list_summaries(category_id)?;
        Ok(rank(summaries))
    }

    /// Apply an admin flag change. The nomination total is left untouched.
    pub fn update_summary_flags(
        &self,
        id: SummaryId,
        patch: SummaryFlagsPatch,
    ) -> Result<NomineeSummary, NominationServiceError> {
        Ok(self.store.apply_summary_flags(id, patch)?)
    }

    pub fn delete_summary(&self, id: SummaryId) -> Result<(), NominationServiceError> {
        self.store.delete_summary(id)?;
        info!(summary_id = %id, "nominee summary deleted");
        Ok(())
    }

    fn summary_by_key(&self, key: &SummaryKey) -> Result<NomineeSummary, NominationServiceError> {
        let summary = self
            .store
            .find_summary(key)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(summary)
    }
}

/// Error raised by the nomination service.
#[derive(Debug, thiserror::Error)]
pub enum NominationServiceError {
    #[error(transparent)]
    Shape(#[from] NominationShapeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
