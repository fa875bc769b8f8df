use std::collections::HashSet;

use super::domain::{NewNomination, NominationAnswer, NominationDraft, NominationSubject, UserId};

/// Shape violations raised before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NominationShapeError {
    #[error("a nomination requires either a nominee or a team")]
    MissingSubject,
    #[error("an individual nomination cannot carry a team name")]
    TeamNameWithNominee,
    #[error("an individual nomination cannot carry team members")]
    TeamMembersWithNominee,
    #[error("a team nomination requires a team name")]
    MissingTeamName,
    #[error("a team nomination requires at least one team member")]
    MissingTeamMembers,
    #[error("a nomination requires at least one answer")]
    MissingAnswers,
    #[error("answer {index} is missing its question text")]
    BlankQuestion { index: usize },
    #[error("answer {index} is missing its answer text")]
    BlankAnswer { index: usize },
}

impl NominationShapeError {
    /// Name of the request field that violated the shape rules.
    pub fn field(&self) -> String {
        match self {
            NominationShapeError::MissingSubject => "nomineeId".to_string(),
            NominationShapeError::TeamNameWithNominee | NominationShapeError::MissingTeamName => {
                "teamName".to_string()
            }
            NominationShapeError::TeamMembersWithNominee
            | NominationShapeError::MissingTeamMembers => "teamMembers".to_string(),
            NominationShapeError::MissingAnswers => "answers".to_string(),
            NominationShapeError::BlankQuestion { index } => format!("answers[{index}].question"),
            NominationShapeError::BlankAnswer { index } => format!("answers[{index}].answer"),
        }
    }
}

/// Turns a draft into a persistable nomination, enforcing the individual/team split.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(
        &self,
        draft: NominationDraft,
        creator_id: UserId,
    ) -> Result<NewNomination, NominationShapeError> {
        let NominationDraft {
            category_id,
            nominee_id,
            team_name,
            team_members,
            answers,
            location,
        } = draft;

        let team_name = team_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let subject = match nominee_id {
            Some(nominee_id) => {
                if team_name.is_some() {
                    return Err(NominationShapeError::TeamNameWithNominee);
                }
                if !team_members.is_empty() {
                    return Err(NominationShapeError::TeamMembersWithNominee);
                }
                NominationSubject::Individual { nominee_id }
            }
            None if team_name.is_none() && team_members.is_empty() => {
                return Err(NominationShapeError::MissingSubject);
            }
            None => {
                let team_name = team_name.ok_or(NominationShapeError::MissingTeamName)?;
                if team_members.is_empty() {
                    return Err(NominationShapeError::MissingTeamMembers);
                }
                NominationSubject::Team {
                    team_name,
                    members: distinct_members(team_members),
                }
            }
        };

        let answers = validate_answers(answers)?;
        let location = location
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(NewNomination {
            creator_id,
            category_id,
            subject,
            answers,
            location,
        })
    }
}

fn validate_answers(
    answers: Vec<NominationAnswer>,
) -> Result<Vec<NominationAnswer>, NominationShapeError> {
    if answers.is_empty() {
        return Err(NominationShapeError::MissingAnswers);
    }

    for (index, entry) in answers.iter().enumerate() {
        if entry.question.trim().is_empty() {
            return Err(NominationShapeError::BlankQuestion { index });
        }
        if entry.answer.trim().is_empty() {
            return Err(NominationShapeError::BlankAnswer { index });
        }
    }

    Ok(answers)
}

// Team members form a set; keep the first occurrence of each id.
fn distinct_members(members: Vec<UserId>) -> Vec<UserId> {
    let mut seen = HashSet::with_capacity(members.len());
    members
        .into_iter()
        .filter(|member| seen.insert(*member))
        .collect()
}
