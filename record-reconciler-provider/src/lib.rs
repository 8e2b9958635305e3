//! # record-reconciler-provider
//!
//! Hosted-DNS provider abstraction used by the record reconciler: zone lookup,
//! paginated record-set listing, atomic change batches and change-status polling.
//!
//! ## Supported Providers
//!
//! | Provider | Feature Flag | Auth Method |
//! |----------|-------------|-------------|
//! | [AWS Route 53](https://aws.amazon.com/route53/) | `route53` | AWS Signature V4 |
//!
//! ## Feature Flags
//!
//! - **`route53`** *(default)*: Enable the Route 53 provider.
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls instead.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use record_reconciler_provider::{
//!     create_provider, DnsProvider, DnsRecordType, ProviderCredentials, RecordSetQuery,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = create_provider(ProviderCredentials::Route53 {
//!         access_key_id: "AKIA...".to_string(),
//!         secret_access_key: "...".to_string(),
//!         session_token: None,
//!     })?;
//!
//!     let page = provider.list_zones(None).await?;
//!     for zone in &page.zones {
//!         println!("{} ({})", zone.name, zone.id);
//!     }
//!
//!     let records = provider
//!         .list_record_sets(
//!             &page.zones[0].id,
//!             &RecordSetQuery::starting_at("www.example.com", DnsRecordType::A),
//!         )
//!         .await?;
//!     println!("{} record set(s) on first page", records.record_sets.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, ProviderError>`](ProviderError):
//!
//! - [`ProviderError::ZoneNotFound`]: unknown hosted zone id
//! - [`ProviderError::InvalidChangeBatch`]: the change batch was rejected as a whole
//! - [`ProviderError::RateLimited`]: throttled or a prior change still in flight (retryable)
//! - [`ProviderError::NetworkError`]: network connectivity issue (retryable)
//!
//! Transient errors are retried by the HTTP layer with exponential backoff; callers
//! can check [`ProviderError::is_retryable`] for anything that still gets through.

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

pub use error::{ProviderError, Result};

pub use factory::create_provider;

// Core trait only; the error mapper stays internal
pub use traits::DnsProvider;

pub use types::{
    AliasTarget, Change, ChangeAction, ChangeBatch, ChangeInfo, ChangeStatus, DnsRecordType,
    GeoLocation, ProviderCredentials, RecordSet, RecordSetCursor, RecordSetPage, RecordSetQuery,
    RecordValue, RoutingPolicy, Zone, ZonePage, normalize_record_name,
};

pub use providers::common::{normalize_domain_name, strip_resource_prefix};
pub use utils::log_sanitizer;

#[cfg(feature = "route53")]
pub use providers::{Route53Provider, Route53ProviderBuilder};
