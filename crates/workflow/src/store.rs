//! Manuscript store
//!
//! Provides the data-access contract the workflow consumes: get/insert,
//! round append, review recording, and round close. Writes to a single
//! manuscript are serialized through a per-manuscript lock so concurrent
//! actions (an editor closing a round while a late review arrives)
//! cannot race into an inconsistent state; operations on different
//! manuscripts proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use scholarflow_common::errors::{AppError, Result};
use scholarflow_common::metrics::set_manuscript_count;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::model::{CompletedReview, Manuscript};
use crate::review::Recommendation;

/// In-memory manuscript store with per-manuscript write serialization
#[derive(Default)]
pub struct ManuscriptStore {
    entries: RwLock<HashMap<Uuid, Arc<Mutex<Manuscript>>>>,
}

impl ManuscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly created manuscript
    pub async fn insert(&self, manuscript: Manuscript) {
        let mut entries = self.entries.write().await;
        entries.insert(manuscript.id, Arc::new(Mutex::new(manuscript)));
        set_manuscript_count(entries.len());
    }

    async fn slot(&self, id: Uuid) -> Result<Arc<Mutex<Manuscript>>> {
        let entries = self.entries.read().await;
        entries
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::ManuscriptNotFound { id: id.to_string() })
    }

    /// Get a point-in-time snapshot of a manuscript
    pub async fn get(&self, id: Uuid) -> Result<Manuscript> {
        let slot = self.slot(id).await?;
        let guard = slot.lock().await;
        Ok(guard.clone())
    }

    /// Snapshot every manuscript (for reporting views)
    pub async fn list(&self) -> Vec<Manuscript> {
        let slots: Vec<Arc<Mutex<Manuscript>>> = {
            let entries = self.entries.read().await;
            entries.values().cloned().collect()
        };
        let mut all = Vec::with_capacity(slots.len());
        for slot in slots {
            all.push(slot.lock().await.clone());
        }
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        all
    }

    /// Run a mutation under the manuscript's lock.
    ///
    /// The closure either succeeds and its changes are kept, or fails
    /// and must leave the record unchanged (all model mutations uphold
    /// this). The post-mutation snapshot is returned alongside the
    /// closure's result.
    pub async fn update<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Manuscript) -> Result<R>,
    ) -> Result<(R, Manuscript)> {
        let slot = self.slot(id).await?;
        let mut guard = slot.lock().await;
        let out = f(&mut guard)?;
        Ok((out, guard.clone()))
    }

    /// Open the next revision round; fails with `RoundOpen` if a round
    /// is already open
    pub async fn append_round(&self, id: Uuid) -> Result<u32> {
        let (number, _) = self.update(id, |m| m.append_round()).await?;
        Ok(number)
    }

    /// Record a reviewer's completed evaluation for a round
    pub async fn record_review(
        &self,
        id: Uuid,
        round: u32,
        reviewer_id: Uuid,
        review: CompletedReview,
    ) -> Result<()> {
        let (out, _) = self
            .update(id, |m| m.record_review(round, reviewer_id, review))
            .await?;
        Ok(out)
    }

    /// Close a round, computing its aggregate decision. Idempotent;
    /// fails with `IncompleteReviews` (no state change) while entries
    /// are pending.
    pub async fn close_round(&self, id: Uuid, round: u32) -> Result<Recommendation> {
        let (decision, _) = self.update(id, |m| m.close_round(round)).await?;
        Ok(decision)
    }
}
