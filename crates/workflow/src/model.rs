//! Manuscript data model
//!
//! The manuscript record is the entity tracked by the workflow: content,
//! authors, round history, payment reference, and the transition history
//! that the tracking timeline renders. All mutations that touch the
//! workflow status go through [`Manuscript::apply_transition`], which is
//! the single place the state machine invariant is enforced.

use chrono::{DateTime, Utc};
use scholarflow_common::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payment::PaymentRecord;
use crate::review::{Recommendation, ReviewEntry, RevisionRound};
use crate::state::WorkflowState;

/// Ordered manuscript author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
    pub university: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
}

/// Free-text body sections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sections {
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub methods: String,
    #[serde(default)]
    pub results: String,
    #[serde(default)]
    pub discussion: String,
    #[serde(default)]
    pub conclusion: String,
}

/// Attached files, opaque paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Files {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manuscript: Option<String>,
    #[serde(default)]
    pub supplementary: Vec<String>,
}

/// Publication fee in minor currency units; zero means waived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub amount: u64,
    pub currency: String,
}

impl Fee {
    pub fn is_waived(&self) -> bool {
        self.amount == 0
    }
}

/// One applied workflow transition, for the tracking timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub from: WorkflowState,
    pub to: WorkflowState,
    pub actor: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}

/// The manuscript record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manuscript {
    pub id: Uuid,

    /// Human-readable manuscript code, e.g. SF-2026-0042
    pub code: String,

    pub title: String,

    #[serde(rename = "abstract")]
    pub abstract_text: String,

    pub sections: Sections,

    pub keywords: Vec<String>,

    pub authors: Vec<Author>,

    pub files: Files,

    pub status: WorkflowState,

    /// Assigned editor; exactly one at a time, reassignment replaces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<Uuid>,

    /// Revision round history, round numbers strictly increasing
    pub rounds: Vec<RevisionRound>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentRecord>,

    pub fee: Fee,

    /// Applied transitions, oldest first
    pub history: Vec<TransitionEvent>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Manuscript {
    /// Whether the manuscript has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The latest round (round 1 exists from submission onward)
    pub fn current_round(&self) -> Option<&RevisionRound> {
        self.rounds.last()
    }

    pub(crate) fn current_round_mut(&mut self) -> Option<&mut RevisionRound> {
        self.rounds.last_mut()
    }

    /// Round lookup by number
    pub fn round(&self, number: u32) -> Option<&RevisionRound> {
        self.rounds.iter().find(|r| r.number == number)
    }

    /// At most one round may be open at a time; it is always the latest
    pub fn open_round(&self) -> Option<&RevisionRound> {
        self.current_round().filter(|r| r.is_open())
    }

    /// Whether a verified payment is on record
    pub fn has_verified_payment(&self) -> bool {
        self.payment.as_ref().map(|p| p.is_verified()).unwrap_or(false)
    }

    /// Apply a checked state transition, recording it in the history.
    ///
    /// Fails with `IllegalTransition` and leaves the record untouched
    /// when the transition table does not permit the move.
    pub fn apply_transition(
        &mut self,
        to: WorkflowState,
        actor: Uuid,
        reason: Option<String>,
    ) -> Result<()> {
        self.status.guard(to)?;
        let from = self.status;
        let now = Utc::now();
        self.history.push(TransitionEvent {
            from,
            to,
            actor,
            reason,
            at: now,
        });
        self.status = to;
        self.updated_at = now;
        scholarflow_common::metrics::record_transition(from.as_str(), to.as_str());
        tracing::info!(
            manuscript_id = %self.id,
            from = %from,
            to = %to,
            "Workflow transition applied"
        );
        Ok(())
    }

    /// Open the next revision round. Fails with `RoundOpen` if the
    /// current round has not been closed yet.
    pub fn append_round(&mut self) -> Result<u32> {
        if let Some(open) = self.open_round() {
            return Err(AppError::RoundOpen { round: open.number });
        }
        let number = self.rounds.last().map(|r| r.number + 1).unwrap_or(1);
        self.rounds.push(RevisionRound::new(number));
        self.updated_at = Utc::now();
        Ok(number)
    }

    /// Record a completed review for a round.
    ///
    /// Fails with `RoundClosed` if the round already has an aggregate
    /// decision, `ReviewerNotFound` if the reviewer was never assigned,
    /// and `DuplicateReview` if the reviewer already submitted; the
    /// original entry is preserved in all failure cases.
    pub fn record_review(
        &mut self,
        round: u32,
        reviewer_id: Uuid,
        completed: CompletedReview,
    ) -> Result<()> {
        let round_ref = self
            .rounds
            .iter_mut()
            .find(|r| r.number == round)
            .ok_or(AppError::RoundNotFound { round })?;

        if !round_ref.is_open() {
            return Err(AppError::RoundClosed { round });
        }

        let entry = round_ref
            .entry_mut(reviewer_id)
            .ok_or_else(|| AppError::ReviewerNotFound {
                id: reviewer_id.to_string(),
            })?;

        if entry.is_complete() {
            return Err(AppError::DuplicateReview {
                reviewer_id: reviewer_id.to_string(),
                round,
            });
        }

        entry.recommendation = Some(completed.recommendation);
        entry.comments_for_author = completed.comments_for_author;
        entry.confidential_comments = completed.confidential_comments;
        entry.checklist = completed.checklist;
        entry.review_file = completed.review_file;
        entry.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Close a round by recording its aggregate decision.
    ///
    /// Idempotent: re-closing a closed round returns the recorded
    /// decision. Fails with `IncompleteReviews` (and changes nothing)
    /// while any assigned entry is pending.
    pub fn close_round(&mut self, round: u32) -> Result<Recommendation> {
        let round_ref = self
            .rounds
            .iter_mut()
            .find(|r| r.number == round)
            .ok_or(AppError::RoundNotFound { round })?;

        if let Some(decision) = round_ref.decision {
            return Ok(decision);
        }

        let decision = round_ref.aggregate()?;
        round_ref.decision = Some(decision);
        round_ref.closed_at = Some(Utc::now());
        self.updated_at = Utc::now();
        Ok(decision)
    }

    /// Author-facing copy: confidential reviewer comments stripped
    pub fn redacted(&self) -> Manuscript {
        let mut copy = self.clone();
        for round in &mut copy.rounds {
            round.entries = round.entries.iter().map(ReviewEntry::redacted).collect();
        }
        copy
    }
}

/// The fields a reviewer submits to complete an entry
#[derive(Debug, Clone, Deserialize)]
pub struct CompletedReview {
    pub recommendation: Recommendation,
    pub comments_for_author: String,
    pub confidential_comments: Option<String>,
    pub checklist: Vec<crate::review::ChecklistItem>,
    pub review_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::ReviewEntry;

    fn sample_manuscript() -> Manuscript {
        let now = Utc::now();
        Manuscript {
            id: Uuid::new_v4(),
            code: "SF-2026-0001".to_string(),
            title: "On the Thermal Stability of Perovskite Cells".to_string(),
            abstract_text: "We study degradation pathways.".to_string(),
            sections: Sections::default(),
            keywords: vec!["perovskite".into(), "stability".into()],
            authors: vec![Author {
                name: "R. Iyer".into(),
                email: "r.iyer@example.edu".into(),
                university: "Example University".into(),
                affiliation: Some("Materials Lab".into()),
            }],
            files: Files::default(),
            status: WorkflowState::Submitted,
            editor: None,
            rounds: vec![RevisionRound::new(1)],
            payment: None,
            fee: Fee {
                amount: 49900,
                currency: "USD".into(),
            },
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn completed(rec: Recommendation) -> CompletedReview {
        CompletedReview {
            recommendation: rec,
            comments_for_author: "See notes".into(),
            confidential_comments: None,
            checklist: Vec::new(),
            review_file: None,
        }
    }

    #[test]
    fn test_apply_transition_records_history() {
        let mut m = sample_manuscript();
        let editor = Uuid::new_v4();
        m.apply_transition(WorkflowState::EditorAssigned, editor, None)
            .unwrap();

        assert_eq!(m.status, WorkflowState::EditorAssigned);
        assert_eq!(m.history.len(), 1);
        assert_eq!(m.history[0].from, WorkflowState::Submitted);
        assert_eq!(m.history[0].to, WorkflowState::EditorAssigned);
    }

    #[test]
    fn test_illegal_transition_leaves_record_untouched() {
        let mut m = sample_manuscript();
        let err = m
            .apply_transition(WorkflowState::Published, Uuid::new_v4(), None)
            .unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition { .. }));
        assert_eq!(m.status, WorkflowState::Submitted);
        assert!(m.history.is_empty());
    }

    #[test]
    fn test_append_round_fails_while_open() {
        let mut m = sample_manuscript();
        // Round 1 is open from submission
        assert!(matches!(
            m.append_round(),
            Err(AppError::RoundOpen { round: 1 })
        ));

        let reviewer = Uuid::new_v4();
        m.rounds[0].entries.push(ReviewEntry::pending(reviewer, 1));
        m.record_review(1, reviewer, completed(Recommendation::AcceptMajorRevisions))
            .unwrap();
        m.close_round(1).unwrap();

        assert_eq!(m.append_round().unwrap(), 2);
        assert_eq!(m.current_round().unwrap().number, 2);
    }

    #[test]
    fn test_duplicate_review_preserves_original() {
        let mut m = sample_manuscript();
        let reviewer = Uuid::new_v4();
        m.rounds[0].entries.push(ReviewEntry::pending(reviewer, 1));

        m.record_review(1, reviewer, completed(Recommendation::Accept))
            .unwrap();
        let err = m
            .record_review(1, reviewer, completed(Recommendation::Reject))
            .unwrap_err();

        assert!(matches!(err, AppError::DuplicateReview { .. }));
        assert_eq!(
            m.rounds[0].entry(reviewer).unwrap().recommendation,
            Some(Recommendation::Accept)
        );
    }

    #[test]
    fn test_record_review_unassigned_reviewer() {
        let mut m = sample_manuscript();
        m.rounds[0]
            .entries
            .push(ReviewEntry::pending(Uuid::new_v4(), 1));
        let err = m
            .record_review(1, Uuid::new_v4(), completed(Recommendation::Accept))
            .unwrap_err();
        assert!(matches!(err, AppError::ReviewerNotFound { .. }));
    }

    #[test]
    fn test_close_round_is_idempotent() {
        let mut m = sample_manuscript();
        let reviewer = Uuid::new_v4();
        m.rounds[0].entries.push(ReviewEntry::pending(reviewer, 1));
        m.record_review(1, reviewer, completed(Recommendation::Accept))
            .unwrap();

        let first = m.close_round(1).unwrap();
        let second = m.close_round(1).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Recommendation::Accept);
    }

    #[test]
    fn test_review_after_close_is_round_closed() {
        let mut m = sample_manuscript();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        m.rounds[0].entries.push(ReviewEntry::pending(a, 1));
        m.record_review(1, a, completed(Recommendation::Accept)).unwrap();
        m.close_round(1).unwrap();

        m.rounds[0].entries.push(ReviewEntry::pending(b, 1));
        let err = m
            .record_review(1, b, completed(Recommendation::Accept))
            .unwrap_err();
        assert!(matches!(err, AppError::RoundClosed { round: 1 }));
    }

    #[test]
    fn test_redacted_strips_all_rounds() {
        let mut m = sample_manuscript();
        let reviewer = Uuid::new_v4();
        m.rounds[0].entries.push(ReviewEntry::pending(reviewer, 1));
        m.record_review(
            1,
            reviewer,
            CompletedReview {
                recommendation: Recommendation::Accept,
                comments_for_author: "Fine".into(),
                confidential_comments: Some("Not convinced".into()),
                checklist: Vec::new(),
                review_file: None,
            },
        )
        .unwrap();

        let redacted = m.redacted();
        assert!(redacted.rounds[0].entries[0].confidential_comments.is_none());
        assert!(m.rounds[0].entries[0].confidential_comments.is_some());
    }
}
