use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{ChangeBatch, ChangeInfo, RecordSetPage, RecordSetQuery, Zone, ZonePage};

/// Raw API error (internal).
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Error code as reported by the provider.
    pub code: Option<String>,
    /// Raw error message.
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Extra request context used when mapping errors (internal).
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Zone id the request targeted (for `ZoneNotFound`).
    pub zone_id: Option<String>,
    /// Change id the request targeted (for `ChangeNotFound`).
    pub change_id: Option<String>,
}

/// Maps raw provider API errors onto [`ProviderError`] (internal).
pub(crate) trait ProviderErrorMapper {
    /// Provider identifier.
    fn provider_name(&self) -> &'static str;

    /// Map a raw API error to the unified error type.
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// Shortcut: parse error.
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// Shortcut: unknown error (fallback).
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// Hosted-DNS provider: read/write/list operations on zones, record sets and
/// change status.
///
/// Implementations must serialize each [`ChangeBatch`] atomically: either all
/// of its actions apply or none do.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Provider identifier.
    fn id(&self) -> &'static str;

    /// Fetch a zone by id.
    ///
    /// Fails with [`ProviderError::ZoneNotFound`] for unknown ids.
    async fn get_zone(&self, zone_id: &str) -> Result<Zone>;

    /// List one page of zones, starting at `marker` (first page when `None`).
    async fn list_zones(&self, marker: Option<&str>) -> Result<ZonePage>;

    /// List one page of record sets in `zone_id`, starting at the query position.
    async fn list_record_sets(
        &self,
        zone_id: &str,
        query: &RecordSetQuery,
    ) -> Result<RecordSetPage>;

    /// Submit a change batch against `zone_id`, returning the change receipt.
    async fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<ChangeInfo>;

    /// Fetch the current status of a submitted change.
    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo>;

    /// Check that the credentials are accepted by listing a single page of zones.
    async fn validate_credentials(&self) -> Result<bool> {
        match self.list_zones(None).await {
            Ok(_) => Ok(true),
            Err(ProviderError::InvalidCredentials { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
