//! Record Reconciler Core Library
//!
//! Converges a single hosted-DNS record set towards a declarative definition:
//! - Zone resolution (explicit id or public-zone suffix scan)
//! - Current record lookup and desired record construction
//! - Diff, change staging (including rename clean-up) and batch submission
//! - Change propagation polling, expressed as retry outcomes
//!
//! The provider is reached only through the [`DnsProvider`] trait, so the
//! pipeline is independent of any particular DNS backend. One call to
//! [`Reconciler::handle`] is one invocation; waiting for propagation is
//! returned to the caller as [`Outcome::RetryAfter`] together with the
//! operation ledger to pass back on the next invocation.

pub mod config;
pub mod context;
pub mod error;
pub mod services;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::ReconcilerConfig;
pub use context::ReconcileContext;
pub use error::{ReconcileError, ReconcileResult};
pub use services::Reconciler;
pub use types::{
    ComponentDef, Failure, FailureKind, LogEntry, Operation, OperationLedger, Outcome,
    PassBackData, ReconcileEvent, ReconcileResponse, RecordProps,
};

pub use record_reconciler_provider::DnsProvider;
