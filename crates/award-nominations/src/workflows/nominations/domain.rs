use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier for a platform user (submitter, nominee, or team member).
    UserId
);
numeric_id!(
    /// Identifier for a sponsor-defined award category.
    CategoryId
);
numeric_id!(
    /// Identifier assigned by the store to a persisted nomination.
    NominationId
);
numeric_id!(
    /// Identifier assigned by the store to a nominee summary row.
    SummaryId
);

/// Inbound nomination as submitted by a user, before shape validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NominationDraft {
    pub category_id: CategoryId,
    #[serde(default)]
    pub nominee_id: Option<UserId>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_members: Vec<UserId>,
    #[serde(default)]
    pub answers: Vec<NominationAnswer>,
    #[serde(default)]
    pub location: Option<String>,
}

/// One question/answer pair. Position in the owning list is the display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominationAnswer {
    pub question: String,
    pub answer: String,
}

/// Who a nomination names. Individual and team shapes are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NominationSubject {
    Individual { nominee_id: UserId },
    Team { team_name: String, members: Vec<UserId> },
}

impl NominationSubject {
    pub fn nominee_id(&self) -> Option<UserId> {
        match self {
            NominationSubject::Individual { nominee_id } => Some(*nominee_id),
            NominationSubject::Team { .. } => None,
        }
    }

    pub fn is_team(&self) -> bool {
        matches!(self, NominationSubject::Team { .. })
    }
}

/// Validated nomination ready to be persisted; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNomination {
    pub creator_id: UserId,
    pub category_id: CategoryId,
    pub subject: NominationSubject,
    pub answers: Vec<NominationAnswer>,
    pub location: Option<String>,
}

/// Persisted nomination. Answers and team members are owned by the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nomination {
    pub id: NominationId,
    pub creator_id: UserId,
    pub category_id: CategoryId,
    pub subject: NominationSubject,
    pub answers: Vec<NominationAnswer>,
    pub ai_summary: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Nomination {
    pub fn summary_key(&self) -> SummaryKey {
        SummaryKey::for_nomination(self)
    }

    pub fn view(&self) -> NominationView {
        let (nominee_id, team_name, team_members) = match &self.subject {
            NominationSubject::Individual { nominee_id } => (Some(*nominee_id), None, Vec::new()),
            NominationSubject::Team { team_name, members } => {
                (None, Some(team_name.clone()), members.clone())
            }
        };

        NominationView {
            id: self.id,
            creator_id: self.creator_id,
            category_id: self.category_id,
            nominee_id,
            team_name,
            team_members,
            answers: self.answers.clone(),
            ai_summary: self.ai_summary.clone(),
            location: self.location.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The subject half of a summary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SummarySubject {
    Nominee(UserId),
    TeamNomination(NominationId),
}

/// Uniqueness key for nominee summaries: one row per subject and category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SummaryKey {
    pub subject: SummarySubject,
    pub category_id: CategoryId,
}

impl SummaryKey {
    pub fn nominee(nominee_id: UserId, category_id: CategoryId) -> Self {
        Self {
            subject: SummarySubject::Nominee(nominee_id),
            category_id,
        }
    }

    pub fn team(nomination_id: NominationId, category_id: CategoryId) -> Self {
        Self {
            subject: SummarySubject::TeamNomination(nomination_id),
            category_id,
        }
    }

    pub fn for_nomination(nomination: &Nomination) -> Self {
        match nomination.subject.nominee_id() {
            Some(nominee_id) => Self::nominee(nominee_id, nomination.category_id),
            None => Self::team(nomination.id, nomination.category_id),
        }
    }
}

impl fmt::Display for SummaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subject {
            SummarySubject::Nominee(id) => write!(f, "nominee {id} / category {}", self.category_id),
            SummarySubject::TeamNomination(id) => {
                write!(f, "team nomination {id} / category {}", self.category_id)
            }
        }
    }
}

/// Presentation flags on a summary, set only through explicit admin updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SummaryFlags {
    pub is_pinned: bool,
    pub is_shortlisted: bool,
    pub is_winner: bool,
}

/// Partial flag update; absent fields keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryFlagsPatch {
    #[serde(default)]
    pub is_pinned: Option<bool>,
    #[serde(default)]
    pub is_shortlisted: Option<bool>,
    #[serde(default)]
    pub is_winner: Option<bool>,
}

impl SummaryFlagsPatch {
    pub fn apply(&self, flags: &mut SummaryFlags) {
        if let Some(value) = self.is_pinned {
            flags.is_pinned = value;
        }
        if let Some(value) = self.is_shortlisted {
            flags.is_shortlisted = value;
        }
        if let Some(value) = self.is_winner {
            flags.is_winner = value;
        }
    }
}

/// Summary row awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNomineeSummary {
    pub key: SummaryKey,
    pub location: Option<String>,
    pub total_nominations: u32,
    pub flags: SummaryFlags,
}

/// Denormalized aggregate of nominations for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NomineeSummary {
    pub id: SummaryId,
    pub key: SummaryKey,
    pub location: Option<String>,
    pub total_nominations: u32,
    pub flags: SummaryFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NomineeSummary {
    pub fn view(&self) -> NomineeSummaryView {
        let (nominee_id, team_nomination_id) = match self.key.subject {
            SummarySubject::Nominee(id) => (Some(id), None),
            SummarySubject::TeamNomination(id) => (None, Some(id)),
        };

        NomineeSummaryView {
            id: self.id,
            nominee_id,
            team_nomination_id,
            category_id: self.key.category_id,
            location: self.location.clone(),
            total_nominations: self.total_nominations,
            is_pinned: self.flags.is_pinned,
            is_shortlisted: self.flags.is_shortlisted,
            is_winner: self.flags.is_winner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Wire shape of a nominee summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NomineeSummaryView {
    pub id: SummaryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominee_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_nomination_id: Option<NominationId>,
    pub category_id: CategoryId,
    pub location: Option<String>,
    pub total_nominations: u32,
    pub is_pinned: bool,
    pub is_shortlisted: bool,
    pub is_winner: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire shape of a nomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NominationView {
    pub id: NominationId,
    pub creator_id: UserId,
    pub category_id: CategoryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominee_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    pub team_members: Vec<UserId>,
    pub answers: Vec<NominationAnswer>,
    pub ai_summary: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a successful nomination create, composed for the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NominationReceipt {
    pub nomination: NominationView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<NomineeSummaryView>,
}
