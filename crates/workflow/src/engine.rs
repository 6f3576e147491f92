//! Workflow engine
//!
//! Orchestrates the manuscript lifecycle: submission, editor and
//! reviewer assignment, review recording, round close, resubmission,
//! and the editor's final decision. Every operation runs as one store
//! update under the manuscript's lock, so checks and mutations are
//! atomic per manuscript.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use scholarflow_common::config::{PaymentConfig, ReviewConfig};
use scholarflow_common::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{
    Author, CompletedReview, Fee, Files, Manuscript, Sections, TransitionEvent,
};
use crate::review::{ChecklistItem, Recommendation, ReviewEntry, RevisionRound};
use crate::state::WorkflowState;
use crate::store::ManuscriptStore;

/// Manuscript submission payload
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub sections: Sections,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub authors: Vec<Author>,
    #[serde(default)]
    pub files: Files,
}

/// Review submission payload, as posted by a reviewer
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewSubmission {
    pub decision: Recommendation,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub comments_for_author: String,
    #[serde(default)]
    pub confidential_comments_to_editor: Option<String>,
    #[serde(default)]
    pub optional_file: Option<String>,
}

impl From<ReviewSubmission> for CompletedReview {
    fn from(r: ReviewSubmission) -> Self {
        CompletedReview {
            recommendation: r.decision,
            comments_for_author: r.comments_for_author,
            confidential_comments: r.confidential_comments_to_editor,
            checklist: r.checklist,
            review_file: r.optional_file,
        }
    }
}

/// Author resubmission payload; absent fields keep the prior content
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Resubmission {
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub sections: Option<Sections>,
    pub files: Option<Files>,
}

/// The editor's binding final decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinalVerdict {
    Accepted,
    Rejected,
}

/// The workflow engine
pub struct WorkflowEngine {
    store: Arc<ManuscriptStore>,
    code_prefix: String,
    max_reviewers: usize,
    max_rounds: u32,
    fee: Fee,
}

impl WorkflowEngine {
    pub fn new(store: Arc<ManuscriptStore>, review: &ReviewConfig, payment: &PaymentConfig) -> Self {
        Self {
            store,
            code_prefix: review.code_prefix.clone(),
            max_reviewers: review.max_reviewers_per_round,
            max_rounds: review.max_rounds,
            fee: Fee {
                amount: payment.publication_fee,
                currency: payment.currency.clone(),
            },
        }
    }

    pub fn store(&self) -> &Arc<ManuscriptStore> {
        &self.store
    }

    /// Generate a human-readable manuscript code
    fn next_code(&self) -> String {
        let suffix: u16 = rand::random();
        format!("{}-{}-{:04}", self.code_prefix, Utc::now().year(), suffix % 10000)
    }

    /// Author submits a manuscript; round 1 begins
    pub async fn submit(&self, actor: Uuid, submission: Submission) -> Result<Manuscript> {
        if submission.title.trim().is_empty() {
            return Err(AppError::MissingField {
                field: "title".to_string(),
            });
        }
        if submission.authors.is_empty() {
            return Err(AppError::Validation {
                message: "At least one author is required".to_string(),
                field: Some("authors".to_string()),
            });
        }

        let now = Utc::now();
        let manuscript = Manuscript {
            id: Uuid::new_v4(),
            code: self.next_code(),
            title: submission.title,
            abstract_text: submission.abstract_text,
            sections: submission.sections,
            keywords: submission.keywords,
            authors: submission.authors,
            files: submission.files,
            status: WorkflowState::Submitted,
            editor: None,
            rounds: vec![RevisionRound::new(1)],
            payment: None,
            fee: self.fee.clone(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let snapshot = manuscript.clone();
        self.store.insert(manuscript).await;

        metrics::counter!("scholarflow_manuscripts_submitted_total").increment(1);
        tracing::info!(
            manuscript_id = %snapshot.id,
            code = %snapshot.code,
            actor = %actor,
            "Manuscript submitted"
        );
        Ok(snapshot)
    }

    /// Assign (or replace) the manuscript's editor; exactly one at a time
    pub async fn assign_editor(&self, id: Uuid, editor: Uuid, actor: Uuid) -> Result<Manuscript> {
        let (_, snapshot) = self
            .store
            .update(id, |m| match m.status {
                WorkflowState::Submitted => {
                    m.editor = Some(editor);
                    m.apply_transition(WorkflowState::EditorAssigned, actor, None)
                }
                WorkflowState::EditorAssigned => {
                    // Reassignment replaces, does not duplicate or re-transition
                    let previous = m.editor.replace(editor);
                    m.updated_at = Utc::now();
                    tracing::info!(
                        manuscript_id = %m.id,
                        previous = ?previous,
                        editor = %editor,
                        "Editor reassigned"
                    );
                    Ok(())
                }
                other => Err(AppError::IllegalTransition {
                    from: other.as_str().to_string(),
                    attempted: WorkflowState::EditorAssigned.as_str().to_string(),
                }),
            })
            .await?;
        Ok(snapshot)
    }

    /// Editor assigns reviewers for the current round; opens review.
    ///
    /// Legal from `editor-assigned` (round 1): creates one pending entry
    /// per reviewer and advances through `reviewers-assigned` into
    /// `under-review`. Also legal from `under-review` while every entry of
    /// the open round is still pending: replaces the reviewer set without
    /// a transition. Once any review has landed the set is fixed.
    pub async fn assign_reviewers(
        &self,
        id: Uuid,
        reviewers: Vec<Uuid>,
        actor: Uuid,
    ) -> Result<Manuscript> {
        if reviewers.is_empty() {
            return Err(AppError::Validation {
                message: "At least one reviewer must be assigned".to_string(),
                field: Some("reviewers".to_string()),
            });
        }
        if reviewers.len() > self.max_reviewers {
            return Err(AppError::Validation {
                message: format!("At most {} reviewers per round", self.max_reviewers),
                field: Some("reviewers".to_string()),
            });
        }
        let mut unique = reviewers.clone();
        unique.sort_unstable();
        unique.dedup();
        if unique.len() != reviewers.len() {
            return Err(AppError::Validation {
                message: "Duplicate reviewer ids".to_string(),
                field: Some("reviewers".to_string()),
            });
        }

        let (_, snapshot) = self
            .store
            .update(id, |m| match m.status {
                WorkflowState::EditorAssigned => {
                    let number = match m.current_round_mut() {
                        Some(round) if round.is_open() && round.entries.is_empty() => {
                            let number = round.number;
                            for reviewer in &reviewers {
                                round.entries.push(ReviewEntry::pending(*reviewer, number));
                            }
                            number
                        }
                        _ => {
                            return Err(AppError::Internal {
                                message: "No open round awaiting reviewer assignment"
                                    .to_string(),
                            })
                        }
                    };
                    m.apply_transition(WorkflowState::ReviewersAssigned, actor, None)?;
                    // The round is open with pending entries, review starts
                    m.apply_transition(WorkflowState::UnderReview, actor, None)?;
                    tracing::info!(
                        manuscript_id = %m.id,
                        round = number,
                        reviewers = reviewers.len(),
                        "Reviewers assigned, round open"
                    );
                    Ok(())
                }
                WorkflowState::UnderReview => {
                    let round = m
                        .current_round_mut()
                        .filter(|r| r.is_open())
                        .ok_or(AppError::Internal {
                            message: "No open round awaiting reviewer assignment".to_string(),
                        })?;
                    if round.entries.iter().any(|e| e.is_complete()) {
                        return Err(AppError::IllegalTransition {
                            from: WorkflowState::UnderReview.as_str().to_string(),
                            attempted: WorkflowState::ReviewersAssigned.as_str().to_string(),
                        });
                    }
                    let number = round.number;
                    round.entries = reviewers
                        .iter()
                        .map(|r| ReviewEntry::pending(*r, number))
                        .collect();
                    m.updated_at = Utc::now();
                    tracing::info!(
                        manuscript_id = %m.id,
                        round = number,
                        reviewers = reviewers.len(),
                        "Reviewer set replaced before first review"
                    );
                    Ok(())
                }
                other => Err(AppError::IllegalTransition {
                    from: other.as_str().to_string(),
                    attempted: WorkflowState::ReviewersAssigned.as_str().to_string(),
                }),
            })
            .await?;
        Ok(snapshot)
    }

    /// A reviewer submits their evaluation for a round
    pub async fn record_review(
        &self,
        id: Uuid,
        round: u32,
        reviewer: Uuid,
        submission: ReviewSubmission,
    ) -> Result<Manuscript> {
        let (_, snapshot) = self
            .store
            .update(id, |m| m.record_review(round, reviewer, submission.into()))
            .await?;

        metrics::counter!("scholarflow_reviews_recorded_total").increment(1);
        tracing::info!(
            manuscript_id = %id,
            round,
            reviewer = %reviewer,
            "Review recorded"
        );
        Ok(snapshot)
    }

    /// Close a round and advance the manuscript on its aggregate.
    ///
    /// Idempotent: re-closing a closed round returns the recorded
    /// aggregate without a second transition. Fails with
    /// `IncompleteReviews` (fully a no-op) while entries are pending.
    pub async fn close_round(&self, id: Uuid, round: u32, actor: Uuid) -> Result<Recommendation> {
        let (decision, _) = self
            .store
            .update(id, |m| {
                let existing = m
                    .round(round)
                    .ok_or(AppError::RoundNotFound { round })?
                    .decision;
                if let Some(decision) = existing {
                    return Ok(decision);
                }
                // Both exits of a close are only legal from under-review
                m.status.guard(WorkflowState::FinalDecision)?;
                let decision = m.close_round(round)?;
                let target = if decision.is_accept() {
                    WorkflowState::FinalDecision
                } else {
                    WorkflowState::RevisionRequired
                };
                m.apply_transition(target, actor, Some(format!("aggregate: {decision}")))?;
                Ok(decision)
            })
            .await?;

        metrics::counter!("scholarflow_rounds_closed_total").increment(1);
        Ok(decision)
    }

    /// Author resubmits after revisions were required; opens round N+1
    /// and re-enters review immediately. The prior round's reviewers
    /// carry forward as pending entries; the editor may replace them
    /// before the first round-N+1 review lands.
    pub async fn resubmit(&self, id: Uuid, update: Resubmission, actor: Uuid) -> Result<Manuscript> {
        let max_rounds = self.max_rounds;
        let (_, snapshot) = self
            .store
            .update(id, |m| {
                m.status.guard(WorkflowState::Resubmission)?;
                if let Some(open) = m.open_round() {
                    return Err(AppError::RoundOpen { round: open.number });
                }
                let next = m.rounds.last().map(|r| r.number + 1).unwrap_or(1);
                if next > max_rounds {
                    return Err(AppError::Validation {
                        message: format!("Maximum of {max_rounds} revision rounds reached"),
                        field: None,
                    });
                }
                let carried: Vec<Uuid> = m
                    .rounds
                    .last()
                    .map(|r| r.entries.iter().map(|e| e.reviewer_id).collect())
                    .unwrap_or_default();
                m.apply_transition(WorkflowState::Resubmission, actor, None)?;
                let number = m.append_round()?;
                if let Some(abstract_text) = update.abstract_text.clone() {
                    m.abstract_text = abstract_text;
                }
                if let Some(sections) = update.sections.clone() {
                    m.sections = sections;
                }
                if let Some(files) = update.files.clone() {
                    m.files = files;
                }
                if let Some(round) = m.current_round_mut() {
                    round.entries = carried
                        .iter()
                        .map(|r| ReviewEntry::pending(*r, number))
                        .collect();
                }
                m.apply_transition(WorkflowState::UnderReview, actor, None)?;
                tracing::info!(
                    manuscript_id = %m.id,
                    round = number,
                    reviewers = carried.len(),
                    "Manuscript resubmitted, review reopened"
                );
                Ok(())
            })
            .await?;
        Ok(snapshot)
    }

    /// Editor's binding decision after review concluded with accept.
    ///
    /// A verdict contradicting the reviewer aggregate is an override and
    /// requires a reason, which is kept in the transition history.
    /// Acceptance advances to `payment-pending`, or straight to
    /// `published` when the fee is waived.
    pub async fn record_decision(
        &self,
        id: Uuid,
        verdict: FinalVerdict,
        override_reason: Option<String>,
        actor: Uuid,
    ) -> Result<Manuscript> {
        let (_, snapshot) = self
            .store
            .update(id, |m| {
                let aggregate = m.current_round().and_then(|r| r.decision);
                let target = match verdict {
                    FinalVerdict::Accepted => WorkflowState::Accepted,
                    FinalVerdict::Rejected => WorkflowState::Rejected,
                };
                m.status.guard(target)?;

                let overrides = matches!(
                    (verdict, aggregate),
                    (FinalVerdict::Rejected, Some(agg)) if agg.is_accept()
                );
                if overrides && override_reason.is_none() {
                    return Err(AppError::MissingField {
                        field: "override_reason".to_string(),
                    });
                }
                if overrides {
                    tracing::warn!(
                        manuscript_id = %m.id,
                        editor = %actor,
                        reason = override_reason.as_deref().unwrap_or_default(),
                        "Editor overriding reviewer aggregate"
                    );
                }

                m.apply_transition(target, actor, override_reason.clone())?;

                if verdict == FinalVerdict::Accepted {
                    if m.fee.is_waived() {
                        m.apply_transition(
                            WorkflowState::Published,
                            actor,
                            Some("fee waived".to_string()),
                        )?;
                    } else {
                        m.apply_transition(WorkflowState::PaymentPending, actor, None)?;
                    }
                }
                Ok(())
            })
            .await?;
        Ok(snapshot)
    }

    /// Point-in-time snapshot of a manuscript
    pub async fn manuscript(&self, id: Uuid) -> Result<Manuscript> {
        self.store.get(id).await
    }

    /// The tracking timeline: applied transitions, oldest first
    pub async fn timeline(&self, id: Uuid) -> Result<Vec<TransitionEvent>> {
        Ok(self.store.get(id).await?.history)
    }

    /// Snapshot of every manuscript
    pub async fn list(&self) -> Vec<Manuscript> {
        self.store.list().await
    }
}
