//! Type definition module

mod event;
mod ledger;
mod outcome;
mod props;
mod response;

pub use event::{component_safe_name, ComponentDef, Operation, PrevState, ReconcileEvent};
pub use ledger::{OperationLedger, PassBackData, StagedChanges, StagedRemoval};
pub use outcome::{Failure, FailureKind, Outcome};
pub use props::RecordProps;
pub use response::{LogEntry, ReconcileResponse};

// Re-export the provider library's public types
pub use record_reconciler_provider::{
    AliasTarget, Change, ChangeAction, ChangeBatch, ChangeInfo, ChangeStatus, DnsRecordType,
    GeoLocation, RecordSet, RecordValue, RoutingPolicy, Zone,
};
