//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use record_reconciler_provider::ProviderError;

/// Reconciler error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ReconcileError {
    /// None of `domain`, `target_s3_bucket` or `base_domain` yields a name
    #[error("No domain could be resolved from the component definition")]
    NoDomain,

    /// No public zone is authoritative for the domain
    #[error("No hosted zone found for {0}")]
    NoHostedZone(String),

    /// Neither an alias source nor static records were supplied
    #[error("No API, CloudFront, or S3 data to build the record from")]
    NoAliasSource,

    /// `target_s3_region` is not in the website-endpoint table
    #[error("Unknown S3 website region: {0}")]
    UnknownS3Region(String),

    /// The recorded zone id and the requested one differ
    #[error("Hosted zone id cannot change from {prior} to {requested}")]
    ZoneChanged { prior: String, requested: String },

    /// Operation ledger does not match the pipeline's expectations
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl ReconcileError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.), used for log levels.
    ///
    /// **Update this method when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::NoDomain
            | Self::NoHostedZone(_)
            | Self::NoAliasSource
            | Self::UnknownS3Region(_)
            | Self::ZoneChanged { .. } => true,
            Self::Provider(e) => e.is_expected(),
            Self::Ledger(_) => false,
        }
    }

    /// Whether re-running the same step later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider(e) if e.is_retryable())
    }

    /// The provider error, when this wraps one.
    pub fn as_provider(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(e) => Some(e),
            _ => None,
        }
    }
}

/// Reconciler Result type alias
pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;
