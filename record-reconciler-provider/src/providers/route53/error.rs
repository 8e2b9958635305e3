//! Route 53 error mapping
//!
//! Reference: <https://docs.aws.amazon.com/Route53/latest/APIReference/CommonErrors.html>
//!
//! ## Code groups
//!
//! - **Credentials**: `InvalidClientTokenId`, `SignatureDoesNotMatch`, `IncompleteSignature`,
//!   `ExpiredToken`, `MissingAuthenticationToken`, `UnrecognizedClientException`
//! - **Permission**: `AccessDenied`
//! - **Not found**: `NoSuchHostedZone`, `NoSuchHealthCheck`, `NoSuchChange`
//! - **Rejected batch**: `InvalidChangeBatch`
//! - **Parameters**: `InvalidInput`, `InvalidArgument`, `InvalidDomainName`, `InvalidPaginationToken`
//! - **Throttling**: `Throttling`, `ThrottlingException`, `PriorRequestNotComplete`
//! - **Service**: `ServiceUnavailable`, `InternalFailure`
//!
//! Anything else falls back to `Unknown` with the raw code preserved.

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::Route53Provider;

impl ProviderErrorMapper for Route53Provider {
    fn provider_name(&self) -> &'static str {
        "route53"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        match raw.code.as_deref() {
            // ============ Credentials ============
            Some(
                "InvalidClientTokenId"
                | "SignatureDoesNotMatch"
                | "IncompleteSignature"
                | "ExpiredToken"
                | "MissingAuthenticationToken"
                | "UnrecognizedClientException",
            ) => ProviderError::InvalidCredentials {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("AccessDenied") => ProviderError::PermissionDenied {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            // ============ Not found ============
            Some("NoSuchHostedZone") => ProviderError::ZoneNotFound {
                provider: self.provider_name().to_string(),
                zone_id: context.zone_id.unwrap_or_default(),
                raw_message: Some(raw.message),
            },

            Some("NoSuchHealthCheck") => ProviderError::HealthCheckNotFound {
                provider: self.provider_name().to_string(),
                raw_message: Some(raw.message),
            },

            Some("NoSuchChange") => ProviderError::ChangeNotFound {
                provider: self.provider_name().to_string(),
                change_id: context.change_id.unwrap_or_default(),
                raw_message: Some(raw.message),
            },

            Some("InvalidChangeBatch") => ProviderError::InvalidChangeBatch {
                provider: self.provider_name().to_string(),
                raw_message: raw.message,
            },

            // ============ Parameters ============
            Some("InvalidInput" | "InvalidArgument") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "input".to_string(),
                detail: raw.message,
            },
            Some("InvalidDomainName") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "name".to_string(),
                detail: raw.message,
            },
            Some("InvalidPaginationToken") => ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "marker".to_string(),
                detail: raw.message,
            },

            // ============ Transient ============
            Some("Throttling" | "ThrottlingException" | "PriorRequestNotComplete") => {
                ProviderError::RateLimited {
                    provider: self.provider_name().to_string(),
                    retry_after: None,
                    raw_message: Some(raw.message),
                }
            }

            Some("ServiceUnavailable" | "InternalFailure") => ProviderError::NetworkError {
                provider: self.provider_name().to_string(),
                detail: raw.message,
            },

            _ => self.unknown_error(raw),
        }
    }
}
