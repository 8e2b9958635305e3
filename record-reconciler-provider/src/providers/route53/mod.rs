//! AWS Route 53 Provider

mod error;
mod http;
mod provider;
mod sign;
/// Route 53 REST/XML wire types.
pub(crate) mod types;

use reqwest::Client;

use crate::providers::common::create_http_client;

/// Route 53 global API host.
pub(crate) const ROUTE53_HOST: &str = "route53.amazonaws.com";
/// Region used to sign requests to the global endpoint.
pub(crate) const ROUTE53_SIGNING_REGION: &str = "us-east-1";
/// Signing service name.
pub(crate) const ROUTE53_SERVICE: &str = "route53";
/// REST API version path segment.
pub(crate) const API_VERSION: &str = "2013-04-01";
/// XML namespace for request bodies.
pub(crate) const ROUTE53_XMLNS: &str = "https://route53.amazonaws.com/doc/2013-04-01/";
/// Maximum page size accepted by the list APIs.
pub(crate) const MAX_PAGE_SIZE: u32 = 300;

/// AWS Route 53 provider implementation.
///
/// Authenticates with AWS Signature Version 4.
///
/// # Construction
///
/// ```rust,no_run
/// use record_reconciler_provider::Route53Provider;
///
/// let provider = Route53Provider::new(
///     "your-access-key-id".to_string(),
///     "your-secret-access-key".to_string(),
///     None,
/// );
/// ```
pub struct Route53Provider {
    pub(crate) client: Client,
    pub(crate) access_key_id: String,
    pub(crate) secret_access_key: String,
    pub(crate) session_token: Option<String>,
    pub(crate) host: String,
    pub(crate) signing_region: String,
    pub(crate) max_retries: u32,
    pub(crate) page_size: Option<u32>,
}

/// Builder for [`Route53Provider`].
pub struct Route53ProviderBuilder {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    host: String,
    signing_region: String,
    max_retries: u32,
    page_size: Option<u32>,
}

impl Route53ProviderBuilder {
    fn new(access_key_id: String, secret_access_key: String) -> Self {
        Self {
            access_key_id,
            secret_access_key,
            session_token: None,
            host: ROUTE53_HOST.to_string(),
            signing_region: ROUTE53_SIGNING_REGION.to_string(),
            max_retries: 2,
            page_size: None,
        }
    }

    /// Session token for temporary credentials.
    pub fn session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token;
        self
    }

    /// Override the API host and signing region (e.g. `route53.amazonaws.com.cn`
    /// with `cn-northwest-1`).
    pub fn endpoint(mut self, host: impl Into<String>, signing_region: impl Into<String>) -> Self {
        self.host = host.into();
        self.signing_region = signing_region.into();
        self
    }

    /// Set the maximum number of automatic retries for transient errors (default: 2).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Page size for list calls (clamped to `1..=300`; provider default when unset).
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size.clamp(1, MAX_PAGE_SIZE));
        self
    }

    /// Build the [`Route53Provider`] instance.
    pub fn build(self) -> Route53Provider {
        Route53Provider {
            client: create_http_client(),
            access_key_id: self.access_key_id,
            secret_access_key: self.secret_access_key,
            session_token: self.session_token,
            host: self.host,
            signing_region: self.signing_region,
            max_retries: self.max_retries,
            page_size: self.page_size,
        }
    }
}

impl Route53Provider {
    /// Creates a new Route 53 provider with default settings (global endpoint, 2 retries).
    pub fn new(
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
    ) -> Self {
        Self::builder(access_key_id, secret_access_key)
            .session_token(session_token)
            .build()
    }

    /// Returns a builder for customizing the provider configuration.
    pub fn builder(access_key_id: String, secret_access_key: String) -> Route53ProviderBuilder {
        Route53ProviderBuilder::new(access_key_id, secret_access_key)
    }
}
