//! Workflow state machine
//!
//! Defines the manuscript lifecycle states and the legal transitions
//! between them. Every state change in the system goes through
//! [`WorkflowState::guard`]; an out-of-order attempt is rejected with
//! `IllegalTransition` and the manuscript is left untouched.

use scholarflow_common::errors::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Manuscript lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowState {
    Submitted,
    EditorAssigned,
    ReviewersAssigned,
    UnderReview,
    RevisionRequired,
    Resubmission,
    FinalDecision,
    Accepted,
    PaymentPending,
    Published,
    Rejected,
}

impl WorkflowState {
    /// All states, in lifecycle order
    pub const ALL: &'static [WorkflowState] = &[
        WorkflowState::Submitted,
        WorkflowState::EditorAssigned,
        WorkflowState::ReviewersAssigned,
        WorkflowState::UnderReview,
        WorkflowState::RevisionRequired,
        WorkflowState::Resubmission,
        WorkflowState::FinalDecision,
        WorkflowState::Accepted,
        WorkflowState::PaymentPending,
        WorkflowState::Published,
        WorkflowState::Rejected,
    ];

    /// Wire string for this state
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Submitted => "submitted",
            WorkflowState::EditorAssigned => "editor-assigned",
            WorkflowState::ReviewersAssigned => "reviewers-assigned",
            WorkflowState::UnderReview => "under-review",
            WorkflowState::RevisionRequired => "revision-required",
            WorkflowState::Resubmission => "resubmission",
            WorkflowState::FinalDecision => "final-decision",
            WorkflowState::Accepted => "accepted",
            WorkflowState::PaymentPending => "payment-pending",
            WorkflowState::Published => "published",
            WorkflowState::Rejected => "rejected",
        }
    }

    /// Parse a state from its wire string
    pub fn parse(s: &str) -> Option<WorkflowState> {
        WorkflowState::ALL.iter().copied().find(|st| st.as_str() == s)
    }

    /// States this state may legally transition to
    pub fn valid_targets(&self) -> &'static [WorkflowState] {
        match self {
            WorkflowState::Submitted => &[WorkflowState::EditorAssigned],
            WorkflowState::EditorAssigned => &[WorkflowState::ReviewersAssigned],
            WorkflowState::ReviewersAssigned => &[WorkflowState::UnderReview],
            WorkflowState::UnderReview => {
                &[WorkflowState::RevisionRequired, WorkflowState::FinalDecision]
            }
            WorkflowState::RevisionRequired => &[WorkflowState::Resubmission],
            // Automatic re-entry into review for the new round; the prior
            // round's reviewers carry forward as pending entries.
            WorkflowState::Resubmission => &[WorkflowState::UnderReview],
            WorkflowState::FinalDecision => {
                &[WorkflowState::Accepted, WorkflowState::Rejected]
            }
            // Straight to published when the fee is waived.
            WorkflowState::Accepted => {
                &[WorkflowState::PaymentPending, WorkflowState::Published]
            }
            // Rollback to accepted when verification fails or times out.
            WorkflowState::PaymentPending => {
                &[WorkflowState::Published, WorkflowState::Accepted]
            }
            WorkflowState::Published | WorkflowState::Rejected => &[],
        }
    }

    /// Whether a transition to `to` is legal from this state
    pub fn can_transition(&self, to: WorkflowState) -> bool {
        self.valid_targets().contains(&to)
    }

    /// Check a transition, producing the typed error on violation
    pub fn guard(&self, to: WorkflowState) -> Result<()> {
        if self.can_transition(to) {
            Ok(())
        } else {
            scholarflow_common::metrics::record_rejected_transition(self.as_str(), to.as_str());
            Err(AppError::IllegalTransition {
                from: self.as_str().to_string(),
                attempted: to.as_str().to_string(),
            })
        }
    }

    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Published | WorkflowState::Rejected)
    }

    /// Whether the manuscript is in active review (a round is open)
    pub fn in_review(&self) -> bool {
        matches!(
            self,
            WorkflowState::ReviewersAssigned | WorkflowState::UnderReview
        )
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
