//! Review entries and revision rounds
//!
//! One [`ReviewEntry`] holds a single reviewer's evaluation of one
//! revision round; a [`RevisionRound`] bundles the entries for a round
//! and, once every entry is complete, the aggregate decision.

use chrono::{DateTime, Utc};
use scholarflow_common::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reviewer recommendation, ordered by severity (most severe last).
///
/// The derived `Ord` drives aggregation: the aggregate decision of a
/// round is the maximum recommendation across its entries, so a single
/// reject or major-revision outweighs any number of accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    Accept,
    AcceptMinorRevisions,
    AcceptMajorRevisions,
    Reject,
}

impl Recommendation {
    /// Wire string for this recommendation
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Accept => "accept",
            Recommendation::AcceptMinorRevisions => "accept-minor-revisions",
            Recommendation::AcceptMajorRevisions => "accept-major-revisions",
            Recommendation::Reject => "reject",
        }
    }

    /// Parse a recommendation from its wire string
    pub fn parse(s: &str) -> Option<Recommendation> {
        match s {
            "accept" => Some(Recommendation::Accept),
            "accept-minor-revisions" => Some(Recommendation::AcceptMinorRevisions),
            "accept-major-revisions" => Some(Recommendation::AcceptMajorRevisions),
            "reject" => Some(Recommendation::Reject),
            _ => None,
        }
    }

    /// Whether this recommendation lets the manuscript advance towards
    /// a final decision without another revision round
    pub fn is_accept(&self) -> bool {
        matches!(self, Recommendation::Accept)
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One boolean criterion on the evaluation checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
    pub checked: bool,
}

/// One reviewer's evaluation of one revision round.
///
/// Keyed by `(reviewer_id, round)`. Created pending when the reviewer is
/// assigned; completed when a recommendation is submitted; immutable
/// afterwards. Confidential comments are editor-only and must never
/// reach an author-facing view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub reviewer_id: Uuid,

    pub round: u32,

    /// None while the review is in progress
    pub recommendation: Option<Recommendation>,

    pub comments_for_author: String,

    /// Editor-only; stripped from author-facing serialization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidential_comments: Option<String>,

    pub checklist: Vec<ChecklistItem>,

    /// Optional uploaded review document, opaque path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_file: Option<String>,

    pub assigned_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ReviewEntry {
    /// Create a pending entry for a newly assigned reviewer
    pub fn pending(reviewer_id: Uuid, round: u32) -> Self {
        Self {
            reviewer_id,
            round,
            recommendation: None,
            comments_for_author: String::new(),
            confidential_comments: None,
            checklist: Vec::new(),
            review_file: None,
            assigned_at: Utc::now(),
            completed_at: None,
        }
    }

    /// An entry is complete once a recommendation has been submitted
    pub fn is_complete(&self) -> bool {
        self.recommendation.is_some()
    }

    /// Copy with confidential material removed, for author-facing views
    pub fn redacted(&self) -> ReviewEntry {
        ReviewEntry {
            confidential_comments: None,
            ..self.clone()
        }
    }
}

/// One complete cycle of review for a manuscript revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRound {
    pub number: u32,

    pub submitted_at: DateTime<Utc>,

    pub entries: Vec<ReviewEntry>,

    /// Aggregate decision; None until every entry is complete and the
    /// round is closed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Recommendation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl RevisionRound {
    /// Open a new round
    pub fn new(number: u32) -> Self {
        Self {
            number,
            submitted_at: Utc::now(),
            entries: Vec::new(),
            decision: None,
            closed_at: None,
        }
    }

    /// A round is open until its aggregate decision is recorded
    pub fn is_open(&self) -> bool {
        self.decision.is_none()
    }

    /// Entries still awaiting a recommendation
    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_complete()).count()
    }

    /// Entry for a given reviewer, if assigned
    pub fn entry(&self, reviewer_id: Uuid) -> Option<&ReviewEntry> {
        self.entries.iter().find(|e| e.reviewer_id == reviewer_id)
    }

    pub(crate) fn entry_mut(&mut self, reviewer_id: Uuid) -> Option<&mut ReviewEntry> {
        self.entries.iter_mut().find(|e| e.reviewer_id == reviewer_id)
    }

    /// Compute the aggregate decision: the most severe recommendation
    /// among the entries. Undefined until every assigned entry is
    /// complete.
    pub fn aggregate(&self) -> Result<Recommendation> {
        if self.entries.is_empty() {
            return Err(AppError::IncompleteReviews {
                round: self.number,
                pending: 0,
            });
        }
        let pending = self.pending_count();
        if pending > 0 {
            return Err(AppError::IncompleteReviews {
                round: self.number,
                pending,
            });
        }
        self.entries
            .iter()
            .filter_map(|e| e.recommendation)
            .max()
            .ok_or(AppError::IncompleteReviews {
                round: self.number,
                pending: 0,
            })
    }
}
