//! Change batch submission

use std::sync::Arc;

use record_reconciler_provider::{Change, ChangeAction, ChangeBatch, DnsProvider};

use crate::error::ReconcileError;
use crate::types::StagedChanges;

/// A submission that stopped at a rejected batch.
///
/// Batches accepted before the failure are already applied by the provider.
#[derive(Debug)]
pub struct SubmitFailure {
    pub accepted: Vec<String>,
    /// Staged changes whose batch was never accepted.
    pub remaining: StagedChanges,
    pub error: ReconcileError,
}

/// Submits staged changes, one atomic batch per zone.
pub struct ChangeSubmitter {
    provider: Arc<dyn DnsProvider>,
    comment: String,
}

impl ChangeSubmitter {
    #[must_use]
    pub fn new(provider: Arc<dyn DnsProvider>, comment: impl Into<String>) -> Self {
        Self {
            provider,
            comment: comment.into(),
        }
    }

    /// Group `staged` by zone and submit; returns the change ids in
    /// submission order.
    ///
    /// The upsert always targets `current_zone_id`. A removal in the same
    /// zone joins the upsert batch after it. Batches are submitted in order
    /// and submission stops at the first failure.
    pub async fn submit(
        &self,
        current_zone_id: &str,
        staged: &StagedChanges,
    ) -> Result<Vec<String>, SubmitFailure> {
        let mut batches: Vec<(String, Vec<Change>)> = Vec::new();

        if let Some(record_set) = &staged.upsert {
            batches.push((
                current_zone_id.to_string(),
                vec![Change {
                    action: ChangeAction::Upsert,
                    record_set: record_set.clone(),
                }],
            ));
        }

        if let Some(removal) = &staged.remove {
            let change = Change {
                action: ChangeAction::Delete,
                record_set: removal.record_set.clone(),
            };
            match batches.iter_mut().find(|(zone, _)| *zone == removal.zone_id) {
                Some((_, changes)) => changes.push(change),
                None => batches.push((removal.zone_id.clone(), vec![change])),
            }
        }

        let mut change_ids = Vec::with_capacity(batches.len());
        let mut remaining = staged.clone();
        for (zone_id, changes) in batches {
            let batch = ChangeBatch {
                comment: Some(self.comment.clone()),
                changes,
            };
            let info = match self.provider.change_record_sets(&zone_id, &batch).await {
                Ok(info) => info,
                Err(e) => {
                    if !change_ids.is_empty() {
                        log::warn!(
                            "Zone {zone_id} rejected its batch after {change_ids:?} were accepted"
                        );
                    }
                    return Err(SubmitFailure {
                        accepted: change_ids,
                        remaining,
                        error: e.into(),
                    });
                }
            };
            for change in &batch.changes {
                match change.action {
                    ChangeAction::Delete => remaining.remove = None,
                    ChangeAction::Upsert | ChangeAction::Create => remaining.upsert = None,
                }
            }
            log::info!(
                "Submitted {} change(s) to zone {zone_id}: {}",
                batch.changes.len(),
                info.id
            );
            change_ids.push(info.id);
        }
        Ok(change_ids)
    }
}
