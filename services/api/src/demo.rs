use crate::infra::{build_nomination_service, ApiNominationService};
use award_nominations::config::AppConfig;
use award_nominations::error::AppError;
use award_nominations::workflows::nominations::{
    presentation_score, CategoryId, NominationAnswer, NominationDraft, NomineeSummary,
    SummaryFlagsPatch, UserId,
};
use chrono::Utc;
use clap::Args;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Category the sample nominations are filed under
    #[arg(long, default_value_t = 1)]
    pub(crate) category: u64,
    /// How many times the leading individual nominee is nominated
    #[arg(long, default_value_t = 3)]
    pub(crate) repeat: u32,
    /// Skip the admin flag step (shortlist and winner selection)
    #[arg(long)]
    pub(crate) skip_flags: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        category,
        repeat,
        skip_flags,
    } = args;
    let category = CategoryId(category);

    let config = AppConfig::load()?;
    let service = build_nomination_service(&config.summarizer)?;

    println!(
        "Award nominations demo ({})",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    );
    println!("Category {category}");

    let submissions = demo_submissions(category, repeat.max(1));
    for (submitter, draft) in submissions {
        match service.create(draft, submitter).await {
            Ok(receipt) => {
                let nomination = &receipt.nomination;
                let subject = match (&nomination.nominee_id, &nomination.team_name) {
                    (Some(nominee), _) => format!("user {nominee}"),
                    (None, Some(team)) => format!("team {team}"),
                    (None, None) => "unknown subject".to_string(),
                };
                println!(
                    "- Nomination {} by user {} for {}",
                    nomination.id, nomination.creator_id, subject
                );
                if let Some(ai_summary) = &nomination.ai_summary {
                    println!("  AI summary: {ai_summary}");
                }
                match receipt.summary {
                    Some(summary) => println!(
                        "  Summary {} now totals {}",
                        summary.id, summary.total_nominations
                    ),
                    None => println!("  Summary not reconciled yet"),
                }
            }
            Err(err) => println!("- Nomination rejected: {err}"),
        }
    }

    if !skip_flags {
        apply_demo_flags(&service, category);
    }

    println!("\nRanked summaries");
    match service.ranked_summaries(Some(category)) {
        Ok(ranked) => {
            for (position, summary) in ranked.iter().enumerate() {
                println!("{}. {}", position + 1, describe(summary));
            }
        }
        Err(err) => println!("  Ranking unavailable: {err}"),
    }

    Ok(())
}

fn apply_demo_flags(service: &ApiNominationService, category: CategoryId) {
    println!("\nAdmin review");
    let picks = [
        (
            UserId(102),
            SummaryFlagsPatch {
                is_winner: Some(true),
                ..SummaryFlagsPatch::default()
            },
        ),
        (
            UserId(101),
            SummaryFlagsPatch {
                is_shortlisted: Some(true),
                is_pinned: Some(true),
                ..SummaryFlagsPatch::default()
            },
        ),
    ];

    for (nominee, patch) in picks {
        let updated = service
            .summary_for_nominee(nominee, category)
            .and_then(|summary| service.update_summary_flags(summary.id, patch));
        match updated {
            Ok(summary) => println!("- {}", describe(&summary)),
            Err(err) => println!("- Flag update for user {nominee} failed: {err}"),
        }
    }
}

fn describe(summary: &NomineeSummary) -> String {
    let view = summary.view();
    let subject = match (view.nominee_id, view.team_nomination_id) {
        (Some(nominee), _) => format!("user {nominee}"),
        (None, Some(nomination)) => format!("team nomination {nomination}"),
        (None, None) => "unknown subject".to_string(),
    };
    let mut marks = Vec::new();
    if view.is_winner {
        marks.push("winner");
    }
    if view.is_shortlisted {
        marks.push("shortlisted");
    }
    if view.is_pinned {
        marks.push("pinned");
    }
    let marks = if marks.is_empty() {
        "no flags".to_string()
    } else {
        marks.join(", ")
    };

    format!(
        "{subject}: {} nomination(s), score {} ({marks})",
        view.total_nominations,
        presentation_score(&summary.flags)
    )
}

fn demo_submissions(category: CategoryId, repeat: u32) -> Vec<(UserId, NominationDraft)> {
    let mut submissions = Vec::new();
    for submitter in 0..repeat {
        submissions.push((
            UserId(10 + u64::from(submitter)),
            NominationDraft {
                category_id: category,
                nominee_id: Some(UserId(101)),
                answers: answers("Led the incident review rotation and wrote the runbooks."),
                location: Some("Berlin".to_string()),
                ..NominationDraft::default()
            },
        ));
    }

    submissions.push((
        UserId(20),
        NominationDraft {
            category_id: category,
            nominee_id: Some(UserId(102)),
            answers: answers("Shipped the billing migration without downtime."),
            location: Some("Lisbon".to_string()),
            ..NominationDraft::default()
        },
    ));
    submissions.push((
        UserId(21),
        NominationDraft {
            category_id: category,
            team_name: Some("Platform Guild".to_string()),
            team_members: vec![UserId(103), UserId(104), UserId(103)],
            answers: answers("Cut CI times in half for every product team."),
            location: Some("Remote".to_string()),
            ..NominationDraft::default()
        },
    ));
    // Both shapes at once; rejected before anything is stored.
    submissions.push((
        UserId(22),
        NominationDraft {
            category_id: category,
            nominee_id: Some(UserId(105)),
            team_name: Some("Ambiguous".to_string()),
            answers: answers("Should never be stored."),
            ..NominationDraft::default()
        },
    ));

    submissions
}

fn answers(impact: &str) -> Vec<NominationAnswer> {
    vec![
        NominationAnswer {
            question: "What impact did they have?".to_string(),
            answer: impact.to_string(),
        },
        NominationAnswer {
            question: "How did they support others?".to_string(),
            answer: "Paired with newer colleagues every week.".to_string(),
        },
    ]
}
