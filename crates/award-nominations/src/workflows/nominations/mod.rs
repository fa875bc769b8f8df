//! Nomination intake and nominee-summary reconciliation.
//!
//! A nomination names either one individual or one team within a category. Every
//! accepted nomination is enriched with a best-effort AI summary and then reconciled
//! into the [`NomineeSummary`] row for its key, whose total always re-derives from
//! the stored nominations.

pub mod domain;
pub mod intake;
pub mod memory;
pub mod ranking;
pub mod reconciler;
pub mod repository;
pub mod router;
pub mod service;
pub mod summarizer;

#[cfg(test)]
mod tests;

pub use domain::{
    CategoryId, NewNomination, NewNomineeSummary, Nomination, NominationAnswer, NominationDraft,
    NominationId, NominationReceipt, NominationSubject, NominationView, NomineeSummary,
    NomineeSummaryView, SummaryFlags, SummaryFlagsPatch, SummaryId, SummaryKey, SummarySubject,
    UserId,
};
pub use intake::{IntakeGuard, NominationShapeError};
pub use memory::InMemoryNominationStore;
pub use ranking::{presentation_score, rank};
pub use reconciler::SummaryReconciler;
pub use repository::{NominationStore, RepositoryError};
pub use router::{nomination_router, ACTING_USER_HEADER};
pub use service::{NominationService, NominationServiceError};
pub use summarizer::{
    ConfiguredSummaryGenerator, DisabledSummaryGenerator, EnrichmentError, HttpSummaryGenerator,
    SummaryEnricher, SummaryGenerator, FALLBACK_AI_SUMMARY,
};
