//! Change propagation polling

use std::sync::Arc;

use record_reconciler_provider::{ChangeStatus, DnsProvider};

use crate::error::ReconcileResult;

/// Result of one polling pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    AllPropagated,
    /// The first change id that is still pending.
    Pending(String),
}

/// Checks whether submitted changes have propagated.
pub struct CompletionPoller {
    provider: Arc<dyn DnsProvider>,
}

impl CompletionPoller {
    #[must_use]
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self { provider }
    }

    /// Check `change_ids` in order, stopping at the first pending one.
    pub async fn poll(&self, change_ids: &[String]) -> ReconcileResult<PollStatus> {
        for id in change_ids {
            let info = self.provider.get_change(id).await?;
            if info.status == ChangeStatus::Pending {
                log::debug!("Change {id} still pending");
                return Ok(PollStatus::Pending(id.clone()));
            }
        }
        Ok(PollStatus::AllPropagated)
    }
}
