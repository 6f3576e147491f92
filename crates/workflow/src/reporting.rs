//! Reporting views
//!
//! Pure read-only aggregations over manuscript snapshots. Everything
//! here is recomputed from `ManuscriptStore::list` on demand, so the
//! views can never drift from the workflow state.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::model::Manuscript;
use crate::payment::PaymentStatus;
use crate::state::WorkflowState;

/// Manuscripts per workflow state
pub fn status_counts(manuscripts: &[Manuscript]) -> HashMap<WorkflowState, usize> {
    let mut counts = HashMap::new();
    for m in manuscripts {
        *counts.entry(m.status).or_insert(0) += 1;
    }
    counts
}

/// Total verified payment amount per currency, in minor units
pub fn revenue(manuscripts: &[Manuscript]) -> HashMap<String, u64> {
    let mut totals = HashMap::new();
    for m in manuscripts {
        if let Some(record) = &m.payment {
            if record.status == PaymentStatus::Verified {
                *totals.entry(record.currency.clone()).or_insert(0) += record.amount;
            }
        }
    }
    totals
}

/// An author's standing in the contributor ranking
#[derive(Debug, Clone, Serialize)]
pub struct Contributor {
    pub name: String,
    pub email: String,
    pub university: String,
    pub manuscripts: usize,
    pub published: usize,
}

/// Authors ranked by manuscript count, published count breaking ties.
/// Authors are keyed by email; the latest-seen name wins.
pub fn top_contributors(manuscripts: &[Manuscript], n: usize) -> Vec<Contributor> {
    let mut by_email: HashMap<String, Contributor> = HashMap::new();
    for m in manuscripts {
        for author in &m.authors {
            let entry = by_email
                .entry(author.email.clone())
                .or_insert_with(|| Contributor {
                    name: author.name.clone(),
                    email: author.email.clone(),
                    university: author.university.clone(),
                    manuscripts: 0,
                    published: 0,
                });
            entry.name = author.name.clone();
            entry.manuscripts += 1;
            if m.status == WorkflowState::Published {
                entry.published += 1;
            }
        }
    }

    let mut ranked: Vec<Contributor> = by_email.into_values().collect();
    ranked.sort_by(|a, b| {
        b.manuscripts
            .cmp(&a.manuscripts)
            .then(b.published.cmp(&a.published))
            .then(a.email.cmp(&b.email))
    });
    ranked.truncate(n);
    ranked
}

/// Open (non-terminal) manuscripts per assigned editor
pub fn editor_load(manuscripts: &[Manuscript]) -> HashMap<Uuid, usize> {
    let mut load = HashMap::new();
    for m in manuscripts {
        if m.is_terminal() {
            continue;
        }
        if let Some(editor) = m.editor {
            *load.entry(editor).or_insert(0) += 1;
        }
    }
    load
}

/// Bundle of reporting views for the publisher dashboard
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_manuscripts: usize,
    pub status_counts: HashMap<WorkflowState, usize>,
    pub revenue: HashMap<String, u64>,
    pub top_contributors: Vec<Contributor>,
    pub editor_load: HashMap<Uuid, usize>,
}

impl DashboardSummary {
    pub fn compute(manuscripts: &[Manuscript]) -> Self {
        Self {
            total_manuscripts: manuscripts.len(),
            status_counts: status_counts(manuscripts),
            revenue: revenue(manuscripts),
            top_contributors: top_contributors(manuscripts, 10),
            editor_load: editor_load(manuscripts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Author, Fee, Files, Sections};
    use crate::payment::PaymentRecord;
    use crate::review::RevisionRound;
    use chrono::Utc;

    fn manuscript(status: WorkflowState, author_email: &str) -> Manuscript {
        let now = Utc::now();
        Manuscript {
            id: Uuid::new_v4(),
            code: "SF-2026-0100".to_string(),
            title: "A Study".to_string(),
            abstract_text: String::new(),
            sections: Sections::default(),
            keywords: Vec::new(),
            authors: vec![Author {
                name: "A. Author".into(),
                email: author_email.to_string(),
                university: "U".into(),
                affiliation: None,
            }],
            files: Files::default(),
            status,
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

    fn verified_payment(amount: u64, currency: &str) -> PaymentRecord {
        PaymentRecord {
            manuscript_id: Uuid::new_v4(),
            amount,
            currency: currency.to_string(),
            order_id: "order_abc".into(),
            payment_id: Some("pay_abc".into()),
            status: PaymentStatus::Verified,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_counts() {
        let all = vec![
            manuscript(WorkflowState::Submitted, "a@x.edu"),
            manuscript(WorkflowState::Submitted, "b@x.edu"),
            manuscript(WorkflowState::Published, "c@x.edu"),
        ];
        let counts = status_counts(&all);
        assert_eq!(counts[&WorkflowState::Submitted], 2);
        assert_eq!(counts[&WorkflowState::Published], 1);
        assert!(!counts.contains_key(&WorkflowState::Rejected));
    }

    #[test]
    fn test_revenue_counts_only_verified() {
        let mut paid = manuscript(WorkflowState::Published, "a@x.edu");
        paid.payment = Some(verified_payment(49900, "USD"));

        let mut pending = manuscript(WorkflowState::PaymentPending, "b@x.edu");
        pending.payment = Some(PaymentRecord {
            status: PaymentStatus::Pending,
            ..verified_payment(49900, "USD")
        });

        let mut eur = manuscript(WorkflowState::Published, "c@x.edu");
        eur.payment = Some(verified_payment(30000, "EUR"));

        let totals = revenue(&[paid, pending, eur]);
        assert_eq!(totals["USD"], 49900);
        assert_eq!(totals["EUR"], 30000);
    }

    #[test]
    fn test_top_contributors_ranking() {
        let all = vec![
            manuscript(WorkflowState::Published, "prolific@x.edu"),
            manuscript(WorkflowState::Submitted, "prolific@x.edu"),
            manuscript(WorkflowState::Rejected, "other@x.edu"),
        ];
        let ranked = top_contributors(&all, 10);
        assert_eq!(ranked[0].email, "prolific@x.edu");
        assert_eq!(ranked[0].manuscripts, 2);
        assert_eq!(ranked[0].published, 1);
        assert_eq!(ranked.len(), 2);

        assert_eq!(top_contributors(&all, 1).len(), 1);
    }

    #[test]
    fn test_editor_load_excludes_terminal() {
        let editor = Uuid::new_v4();
        let mut open = manuscript(WorkflowState::UnderReview, "a@x.edu");
        open.editor = Some(editor);
        let mut done = manuscript(WorkflowState::Published, "a@x.edu");
        done.editor = Some(editor);
        let unassigned = manuscript(WorkflowState::Submitted, "b@x.edu");

        let load = editor_load(&[open, done, unassigned]);
        assert_eq!(load[&editor], 1);
        assert_eq!(load.len(), 1);
    }

    #[test]
    fn test_dashboard_summary() {
        let mut paid = manuscript(WorkflowState::Published, "a@x.edu");
        paid.payment = Some(verified_payment(49900, "USD"));
        let all = vec![paid, manuscript(WorkflowState::Submitted, "b@x.edu")];

        let summary = DashboardSummary::compute(&all);
        assert_eq!(summary.total_manuscripts, 2);
        assert_eq!(summary.revenue["USD"], 49900);
        assert_eq!(summary.top_contributors.len(), 2);
    }
}
