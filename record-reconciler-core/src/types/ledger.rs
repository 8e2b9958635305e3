//! Operation ledger carried across invocations

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use record_reconciler_provider::RecordSet;

use super::props::RecordProps;

/// A record set staged for deletion, with the zone that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedRemoval {
    pub zone_id: String,
    pub record_set: RecordSet,
}

/// Changes waiting to be submitted. The upsert targets the current zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsert: Option<RecordSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove: Option<StagedRemoval>,
}

impl StagedChanges {
    pub fn is_empty(&self) -> bool {
        self.upsert.is_none() && self.remove.is_none()
    }
}

/// Pipeline steps still to run, in execution order.
///
/// A step is removed once it has completed; a retry serializes whatever is left.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationLedger {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub get_hosted_zone: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub get_record_set: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_record_set: Option<StagedChanges>,
    /// Change ids still to confirm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_update_complete: Option<Vec<String>>,
}

impl OperationLedger {
    /// Ledger for a run without carried-over state.
    pub fn fresh() -> Self {
        Self {
            get_hosted_zone: true,
            get_record_set: true,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.get_hosted_zone
            && !self.get_record_set
            && self.update_record_set.is_none()
            && self.check_update_complete.is_none()
    }
}

/// Everything a retry carries forward to the next invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassBackData {
    pub ops: OperationLedger,
    pub props: RecordProps,
    pub links: BTreeMap<String, String>,
}

impl PassBackData {
    /// True when there is no pending operation to resume.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
