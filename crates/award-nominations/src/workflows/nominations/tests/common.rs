use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::workflows::nominations::domain::{
    CategoryId, NewNomination, NewNomineeSummary, Nomination, NominationAnswer, NominationDraft,
    NominationId, NomineeSummary, SummaryFlags, SummaryFlagsPatch, SummaryId, SummaryKey, UserId,
};
use crate::workflows::nominations::memory::InMemoryNominationStore;
use crate::workflows::nominations::repository::{NominationStore, RepositoryError};
use crate::workflows::nominations::summarizer::{EnrichmentError, SummaryGenerator};
use crate::workflows::nominations::{nomination_router, NominationService};

pub(super) const SUBMITTER: UserId = UserId(42);

pub(super) fn answers() -> Vec<NominationAnswer> {
    vec![
        NominationAnswer {
            question: "What impact did they have?".to_string(),
            answer: "Led the migration that cut build times in half.".to_string(),
        },
        NominationAnswer {
            question: "How do they support others?".to_string(),
            answer: "Runs weekly office hours for new hires.".to_string(),
        },
    ]
}

pub(super) fn individual_draft(nominee: u64, category: u64) -> NominationDraft {
    NominationDraft {
        category_id: CategoryId(category),
        nominee_id: Some(UserId(nominee)),
        team_name: None,
        team_members: Vec::new(),
        answers: answers(),
        location: Some("Berlin".to_string()),
    }
}

pub(super) fn team_draft(name: &str, members: &[u64], category: u64) -> NominationDraft {
    NominationDraft {
        category_id: CategoryId(category),
        nominee_id: None,
        team_name: Some(name.to_string()),
        team_members: members.iter().copied().map(UserId).collect(),
        answers: answers(),
        location: Some("Lisbon".to_string()),
    }
}

pub(super) fn summary_row(
    id: u64,
    winner: bool,
    shortlisted: bool,
    pinned: bool,
    total: u32,
) -> NomineeSummary {
    let now = Utc::now();
    NomineeSummary {
        id: SummaryId(id),
        key: SummaryKey::nominee(UserId(id), CategoryId(1)),
        location: None,
        total_nominations: total,
        flags: SummaryFlags {
            is_pinned: pinned,
            is_shortlisted: shortlisted,
            is_winner: winner,
        },
        created_at: now,
        updated_at: now,
    }
}

pub(super) type TestService = NominationService<InMemoryNominationStore, StaticGenerator>;

pub(super) fn build_service() -> (TestService, Arc<InMemoryNominationStore>) {
    let store = Arc::new(InMemoryNominationStore::new());
    let service = NominationService::new(
        store.clone(),
        Arc::new(StaticGenerator::new("Consistently raises the bar.")),
        Duration::from_secs(1),
    );
    (service, store)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    nomination_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Generator returning fixed text and recording every payload it sees.
pub(super) struct StaticGenerator {
    text: String,
    payloads: Mutex<Vec<String>>,
}

impl StaticGenerator {
    pub(super) fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn payloads(&self) -> Vec<String> {
        self.payloads.lock().expect("payload mutex poisoned").clone()
    }
}

#[async_trait]
impl SummaryGenerator for StaticGenerator {
    async fn summarize(&self, payload: &str) -> Result<String, EnrichmentError> {
        self.payloads
            .lock()
            .expect("payload mutex poisoned")
            .push(payload.to_string());
        Ok(self.text.clone())
    }
}

pub(super) struct FailingGenerator;

#[async_trait]
impl SummaryGenerator for FailingGenerator {
    async fn summarize(&self, _payload: &str) -> Result<String, EnrichmentError> {
        Err(EnrichmentError::Status {
            status: 503,
            body: "model overloaded".to_string(),
        })
    }
}

pub(super) struct SlowGenerator {
    pub(super) delay: Duration,
}

#[async_trait]
impl SummaryGenerator for SlowGenerator {
    async fn summarize(&self, _payload: &str) -> Result<String, EnrichmentError> {
        tokio::time::sleep(self.delay).await;
        Ok("too late".to_string())
    }
}

/// Store whose every operation fails.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl NominationStore for UnavailableStore {
    fn insert_nomination(&self, _nomination: NewNomination) -> Result<Nomination, RepositoryError> {
        offline()
    }

    fn fetch_nomination(&self, _id: NominationId) -> Result<Option<Nomination>, RepositoryError> {
        offline()
    }

    fn record_ai_summary(&self, _id: NominationId, _summary: &str) -> Result<(), RepositoryError> {
        offline()
    }

    fn count_nominations(
        &self,
        _nominee_id: UserId,
        _category_id: CategoryId,
    ) -> Result<u32, RepositoryError> {
        offline()
    }

    fn nominations_for_nominee(
        &self,
        _nominee_id: UserId,
        _category_id: CategoryId,
    ) -> Result<Vec<Nomination>, RepositoryError> {
        offline()
    }

    fn find_summary(&self, _key: &SummaryKey) -> Result<Option<NomineeSummary>, RepositoryError> {
        offline()
    }

    fn fetch_summary(&self, _id: SummaryId) -> Result<Option<NomineeSummary>, RepositoryError> {
        offline()
    }

    fn list_summaries(
        &self,
        _category_id: Option<CategoryId>,
    ) -> Result<Vec<NomineeSummary>, RepositoryError> {
        offline()
    }

    fn insert_summary(
        &self,
        _summary: NewNomineeSummary,
    ) -> Result<NomineeSummary, RepositoryError> {
        offline()
    }

    fn refresh_summary(&self, _id: SummaryId) -> Result<NomineeSummary, RepositoryError> {
        offline()
    }

    fn apply_summary_flags(
        &self,
        _id: SummaryId,
        _patch: SummaryFlagsPatch,
    ) -> Result<NomineeSummary, RepositoryError> {
        offline()
    }

    fn delete_summary(&self, _id: SummaryId) -> Result<(), RepositoryError> {
        offline()
    }
}

/// Wraps the memory store with two faults: summary lookups can be hidden for a
/// number of calls (simulating a concurrent creator winning the race), and summary
/// writes can be switched off entirely.
#[derive(Default)]
pub(super) struct FaultyStore {
    pub(super) inner: InMemoryNominationStore,
    hidden_lookups: AtomicUsize,
    summaries_offline: AtomicBool,
    pub(super) insert_attempts: AtomicUsize,
}

impl FaultyStore {
    pub(super) fn hide_next_lookups(&self, count: usize) {
        self.hidden_lookups.store(count, Ordering::SeqCst);
    }

    pub(super) fn take_summaries_offline(&self) {
        self.summaries_offline.store(true, Ordering::SeqCst);
    }

    fn summaries_available(&self) -> Result<(), RepositoryError> {
        if self.summaries_offline.load(Ordering::SeqCst) {
            offline()
        } else {
            Ok(())
        }
    }
}

impl NominationStore for FaultyStore {
    fn insert_nomination(&self, nomination: NewNomination) -> Result<Nomination, RepositoryError> {
        self.inner.insert_nomination(nomination)
    }

    fn fetch_nomination(&self, id: NominationId) -> Result<Option<Nomination>, RepositoryError> {
        self.inner.fetch_nomination(id)
    }

    fn record_ai_summary(&self, id: NominationId, summary: &str) -> Result<(), RepositoryError> {
        self.inner.record_ai_summary(id, summary)
    }

    fn count_nominations(
        &self,
        nominee_id: UserId,
        category_id: CategoryId,
    ) -> Result<u32, RepositoryError> {
        self.inner.count_nominations(nominee_id, category_id)
    }

    fn nominations_for_nominee(
        &self,
        nominee_id: UserId,
        category_id: CategoryId,
    ) -> Result<Vec<Nomination>, RepositoryError> {
        self.inner.nominations_for_nominee(nominee_id, category_id)
    }

    fn find_summary(&self, key: &SummaryKey) -> Result<Option<NomineeSummary>, RepositoryError> {
        self.summaries_available()?;
        let hidden = self
            .hidden_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if hidden {
            return Ok(None);
        }
        self.inner.find_summary(key)
    }

    fn fetch_summary(&self, id: SummaryId) -> Result<Option<NomineeSummary>, RepositoryError> {
        self.summaries_available()?;
        self.inner.fetch_summary(id)
    }

    fn list_summaries(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<NomineeSummary>, RepositoryError> {
        self.summaries_available()?;
        self.inner.list_summaries(category_id)
    }

    fn insert_summary(
        &self,
        summary: NewNomineeSummary,
    ) -> Result<NomineeSummary, RepositoryError> {
        self.summaries_available()?;
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_summary(summary)
    }

    fn refresh_summary(&self, id: SummaryId) -> Result<NomineeSummary, RepositoryError> {
        self.summaries_available()?;
        self.inner.refresh_summary(id)
    }

    fn apply_summary_flags(
        &self,
        id: SummaryId,
        patch: SummaryFlagsPatch,
    ) -> Result<NomineeSummary, RepositoryError> {
        self.summaries_available()?;
        self.inner.apply_summary_flags(id, patch)
    }

    fn delete_summary(&self, id: SummaryId) -> Result<(), RepositoryError> {
        self.summaries_available()?;
        self.inner.delete_summary(id)
    }
}

type InterleavedWrite = Box<dyn FnOnce(&InMemoryNominationStore) + Send>;

/// Memory store that runs one scripted write right after the next summary lookup
/// finds a row, standing in for another request landing between a reconciler's read
/// and its write.
#[derive(Default)]
pub(super) struct InterleavingStore {
    pub(super) inner: InMemoryNominationStore,
    pending: Mutex<Option<InterleavedWrite>>,
}

impl InterleavingStore {
    pub(super) fn after_next_lookup(
        &self,
        write: impl FnOnce(&InMemoryNominationStore) + Send + 'static,
    ) {
        *self.pending.lock().expect("pending mutex poisoned") = Some(Box::new(write));
    }
}

impl NominationStore for InterleavingStore {
    fn insert_nomination(&self, nomination: NewNomination) -> Result<Nomination, RepositoryError> {
        self.inner.insert_nomination(nomination)
    }

    fn fetch_nomination(&self, id: NominationId) -> Result<Option<Nomination>, RepositoryError> {
        self.inner.fetch_nomination(id)
    }

    fn record_ai_summary(&self, id: NominationId, summary: &str) -> Result<(), RepositoryError> {
        self.inner.record_ai_summary(id, summary)
    }

    fn count_nominations(
        &self,
        nominee_id: UserId,
        category_id: CategoryId,
    ) -> Result<u32, RepositoryError> {
        self.inner.count_nominations(nominee_id, category_id)
    }

    fn nominations_for_nominee(
        &self,
        nominee_id: UserId,
        category_id: CategoryId,
    ) -> Result<Vec<Nomination>, RepositoryError> {
        self.inner.nominations_for_nominee(nominee_id, category_id)
    }

    fn find_summary(&self, key: &SummaryKey) -> Result<Option<NomineeSummary>, RepositoryError> {
        let found = self.inner.find_summary(key)?;
        if found.is_some() {
            let pending = self.pending.lock().expect("pending mutex poisoned").take();
            if let Some(write) = pending {
                write(&self.inner);
            }
        }
        Ok(found)
    }

    fn fetch_summary(&self, id: SummaryId) -> Result<Option<NomineeSummary>, RepositoryError> {
        self.inner.fetch_summary(id)
    }

    fn list_summaries(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<NomineeSummary>, RepositoryError> {
        self.inner.list_summaries(category_id)
    }

    fn insert_summary(
        &self,
        summary: NewNomineeSummary,
    ) -> Result<NomineeSummary, RepositoryError> {
        self.inner.insert_summary(summary)
    }

    fn refresh_summary(&self, id: SummaryId) -> Result<NomineeSummary, RepositoryError> {
        self.inner.refresh_summary(id)
    }

    fn apply_summary_flags(
        &self,
        id: SummaryId,
        patch: SummaryFlagsPatch,
    ) -> Result<NomineeSummary, RepositoryError> {
        self.inner.apply_summary_flags(id, patch)
    }

    fn delete_summary(&self, id: SummaryId) -> Result<(), RepositoryError> {
        self.inner.delete_summary(id)
    }
}
