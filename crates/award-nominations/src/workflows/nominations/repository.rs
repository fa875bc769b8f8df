use super::domain::{
    CategoryId, NewNomination, NewNomineeSummary, Nomination, NominationId, NomineeSummary,
    SummaryFlagsPatch, SummaryId, SummaryKey, UserId,
};

/// Persistence seam for nominations and their summaries.
///
/// Implementations must enforce summary uniqueness per [`SummaryKey`]: `insert_summary`
/// fails with [`RepositoryError::Conflict`] when a row for the key already exists. The
/// reconciler relies on that to resolve concurrent first nominations for one key.
///
/// Existing rows are never written back whole. Totals and flags each have their own
/// write, and each must be atomic against the other and against new nominations.
pub trait NominationStore: Send + Sync {
    /// Persist a nomination together with its answers and team members as one record.
    fn insert_nomination(&self, nomination: NewNomination) -> Result<Nomination, RepositoryError>;
    fn fetch_nomination(&self, id: NominationId) -> Result<Option<Nomination>, RepositoryError>;
    /// Write the AI summary text onto an existing nomination.
    fn record_ai_summary(&self, id: NominationId, summary: &str) -> Result<(), RepositoryError>;
    /// Authoritative count of individual nominations for a nominee within a category.
    fn count_nominations(
        &self,
        nominee_id: UserId,
        category_id: CategoryId,
    ) -> Result<u32, RepositoryError>;
    /// Individual nominations for a nominee within a category, oldest first.
    fn nominations_for_nominee(
        &self,
        nominee_id: UserId,
        category_id: CategoryId,
    ) -> Result<Vec<Nomination>, RepositoryError>;

    fn find_summary(&self, key: &SummaryKey) -> Result<Option<NomineeSummary>, RepositoryError>;
    fn fetch_summary(&self, id: SummaryId) -> Result<Option<NomineeSummary>, RepositoryError>;
    /// Summaries in insertion order, optionally restricted to one category.
    fn list_summaries(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<NomineeSummary>, RepositoryError>;
    fn insert_summary(&self, summary: NewNomineeSummary)
        -> Result<NomineeSummary, RepositoryError>;
    /// Re-derive `total_nominations` from the stored nominations and touch `updated_at`,
    /// as one step. Team-keyed rows keep their total. Flags are left as stored.
    fn refresh_summary(&self, id: SummaryId) -> Result<NomineeSummary, RepositoryError>;
    /// Apply a partial flag change and touch `updated_at`. The total is left as stored.
    fn apply_summary_flags(
        &self,
        id: SummaryId,
        patch: SummaryFlagsPatch,
    ) -> Result<NomineeSummary, RepositoryError>;
    fn delete_summary(&self, id: SummaryId) -> Result<(), RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
