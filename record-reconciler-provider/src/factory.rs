//! Provider factory.

use std::sync::Arc;

use crate::error::Result;
use crate::traits::DnsProvider;
use crate::types::ProviderCredentials;

#[cfg(feature = "route53")]
use crate::error::ProviderError;
#[cfg(feature = "route53")]
use crate::providers::Route53Provider;

/// Creates a [`DnsProvider`] instance from the given credentials.
///
/// The concrete provider type is determined by the [`ProviderCredentials`] variant.
/// Blank keys are rejected up front with [`ProviderError::InvalidCredentials`]
/// rather than surfacing later as a signature failure.
///
/// # Examples
///
/// ```rust,no_run
/// use record_reconciler_provider::{create_provider, ProviderCredentials};
///
/// let provider = create_provider(ProviderCredentials::Route53 {
///     access_key_id: "AKIA...".to_string(),
///     secret_access_key: "...".to_string(),
///     session_token: None,
/// }).unwrap();
/// ```
pub fn create_provider(credentials: ProviderCredentials) -> Result<Arc<dyn DnsProvider>> {
    match credentials {
        #[cfg(feature = "route53")]
        ProviderCredentials::Route53 {
            access_key_id,
            secret_access_key,
            session_token,
        } => {
            if access_key_id.trim().is_empty() || secret_access_key.trim().is_empty() {
                return Err(ProviderError::InvalidCredentials {
                    provider: "route53".to_string(),
                    raw_message: Some("access key id and secret access key are required".into()),
                });
            }
            let session_token = session_token.filter(|t| !t.trim().is_empty());
            Ok(Arc::new(Route53Provider::new(
                access_key_id,
                secret_access_key,
                session_token,
            )))
        }
    }
}

#[cfg(all(test, feature = "route53"))]
mod tests {
    use super::*;

    #[test]
    fn creates_route53_provider() {
        let provider = create_provider(ProviderCredentials::Route53 {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: Some(String::new()),
        });
        assert!(matches!(provider, Ok(p) if p.id() == "route53"));
    }

    #[test]
    fn rejects_blank_keys() {
        let result = create_provider(ProviderCredentials::Route53 {
            access_key_id: "  ".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: None,
        });
        assert!(matches!(
            result,
            Err(ProviderError::InvalidCredentials { .. })
        ));
    }
}
