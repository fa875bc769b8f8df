use std::cmp::Reverse;

use super::domain::{NomineeSummary, SummaryFlags};

/// Weighted presentation score: winner 4, shortlisted 2, pinned 1.
pub fn presentation_score(flags: &SummaryFlags) -> u8 {
    4 * u8::from(flags.is_winner) + 2 * u8::from(flags.is_shortlisted) + u8::from(flags.is_pinned)
}

/// Order summaries for display: score descending, then total nominations descending.
/// The sort is stable, so full ties keep their input order.
pub fn rank(mut summaries: Vec<NomineeSummary>) -> Vec<NomineeSummary> {
    summaries.sort_by_key(|summary| {
        (
            Reverse(presentation_score(&summary.flags)),
            Reverse(summary.total_nominations),
        )
    });
    summaries
}
