use award_nominations::config::SummarizerConfig;
use award_nominations::error::AppError;
use award_nominations::workflows::nominations::{
    ConfiguredSummaryGenerator, InMemoryNominationStore, NominationService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type ApiNominationService =
    NominationService<InMemoryNominationStore, ConfiguredSummaryGenerator>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wire the nomination service against the in-process store and the configured summarizer.
pub(crate) fn build_nomination_service(
    summarizer: &SummarizerConfig,
) -> Result<Arc<ApiNominationService>, AppError> {
    let generator = ConfiguredSummaryGenerator::from_config(summarizer)?;
    if generator.is_enabled() {
        info!(model = %summarizer.model, "ai summarizer enabled");
    } else {
        info!("ai summarizer not configured, nominations will carry fallback text");
    }

    Ok(Arc::new(NominationService::new(
        Arc::new(InMemoryNominationStore::new()),
        Arc::new(generator),
        summarizer.timeout,
    )))
}
