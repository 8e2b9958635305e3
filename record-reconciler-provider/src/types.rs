use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};
use crate::providers::common::normalize_domain_name;

// ============ Zones ============

/// A hosted zone: a provider-managed namespace authoritative for a domain suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Bare zone identifier (no `/hostedzone/` prefix).
    pub id: String,
    /// Zone name without the trailing dot, e.g. `example.com`.
    pub name: String,
    /// Whether the zone is private (VPC-scoped).
    pub private: bool,
    /// Number of record sets in the zone, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<u64>,
}

impl Zone {
    /// Whether `domain` is the zone apex or lies below it.
    ///
    /// Matching is label-aware: `a.example.com` is inside `example.com`,
    /// `badexample.com` is not.
    pub fn contains(&self, domain: &str) -> bool {
        let domain = normalize_domain_name(domain).to_lowercase();
        let zone = self.name.to_lowercase();
        domain == zone || domain.ends_with(&format!(".{zone}"))
    }
}

/// One page of a zone listing.
#[derive(Debug, Clone, Default)]
pub struct ZonePage {
    /// Zones on this page, in provider listing order.
    pub zones: Vec<Zone>,
    /// Marker for the next page; `None` when this is the last page.
    pub next_marker: Option<String>,
}

// ============ Record sets ============

/// DNS record types supported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    A,
    Aaaa,
    Caa,
    Cname,
    Ds,
    Https,
    Mx,
    Naptr,
    Ns,
    Ptr,
    Soa,
    Spf,
    Srv,
    Sshfp,
    Svcb,
    Tlsa,
    Txt,
}

impl DnsRecordType {
    /// Wire representation of the type, e.g. `"AAAA"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Caa => "CAA",
            Self::Cname => "CNAME",
            Self::Ds => "DS",
            Self::Https => "HTTPS",
            Self::Mx => "MX",
            Self::Naptr => "NAPTR",
            Self::Ns => "NS",
            Self::Ptr => "PTR",
            Self::Soa => "SOA",
            Self::Spf => "SPF",
            Self::Srv => "SRV",
            Self::Sshfp => "SSHFP",
            Self::Svcb => "SVCB",
            Self::Tlsa => "TLSA",
            Self::Txt => "TXT",
        }
    }

    /// Parse a record type string (case-insensitive).
    pub fn parse(record_type: &str, provider: &str) -> Result<Self> {
        let parsed = match record_type.trim().to_uppercase().as_str() {
            "A" => Self::A,
            "AAAA" => Self::Aaaa,
            "CAA" => Self::Caa,
            "CNAME" => Self::Cname,
            "DS" => Self::Ds,
            "HTTPS" => Self::Https,
            "MX" => Self::Mx,
            "NAPTR" => Self::Naptr,
            "NS" => Self::Ns,
            "PTR" => Self::Ptr,
            "SOA" => Self::Soa,
            "SPF" => Self::Spf,
            "SRV" => Self::Srv,
            "SSHFP" => Self::Sshfp,
            "SVCB" => Self::Svcb,
            "TLSA" => Self::Tlsa,
            "TXT" => Self::Txt,
            _ => {
                return Err(ProviderError::UnsupportedRecordType {
                    provider: provider.to_string(),
                    record_type: record_type.to_string(),
                });
            }
        };
        Ok(parsed)
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alias target: points the record at another provider-managed endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTarget {
    /// Zone id that owns `dns_name` (e.g. the fixed CDN zone id).
    pub hosted_zone_id: String,
    /// Target DNS name, without the trailing dot.
    pub dns_name: String,
    /// Whether the provider should evaluate the health of the target.
    pub evaluate_target_health: bool,
}

/// What a record set resolves to: exactly one of literal values or an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordValue {
    /// Literal values with a time-to-live.
    Static {
        /// Time-to-live in seconds.
        ttl: u32,
        /// Record values, e.g. IP addresses.
        records: Vec<String>,
    },
    /// Alias to a provider-managed endpoint.
    Alias(AliasTarget),
}

/// Geo-routing location. A subdivision (US state) fixes the country to `US`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continent_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdivision_code: Option<String>,
}

impl GeoLocation {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.continent_code.is_none()
            && self.country_code.is_none()
            && self.subdivision_code.is_none()
    }
}

/// Optional routing metadata attached to a record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u64>,
    /// Latency-routing region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_location: Option<GeoLocation>,
    /// `PRIMARY` or `SECONDARY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_value_answer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check_id: Option<String>,
}

/// A named, typed DNS entry within a zone.
///
/// Identified by `(name, record_type)` within its zone. Compare record sets only
/// after [`normalized`](Self::normalized): unset and empty fields must collapse
/// to the same representation for structural equality to mean "no diff".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Fully-qualified name without the trailing dot.
    pub name: String,
    pub record_type: DnsRecordType,
    pub value: RecordValue,
    #[serde(flatten)]
    pub routing: RoutingPolicy,
}

impl RecordSet {
    /// Canonical form used for comparison and submission.
    ///
    /// - names lowercased, trailing dot stripped, `\052` unescaped to `*`
    /// - empty strings and empty geo locations become absent
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.name = normalize_record_name(&self.name);
        self.value = match self.value {
            RecordValue::Static { ttl, records } => RecordValue::Static {
                ttl,
                records: records
                    .into_iter()
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect(),
            },
            RecordValue::Alias(alias) => RecordValue::Alias(AliasTarget {
                hosted_zone_id: alias.hosted_zone_id.trim().to_string(),
                dns_name: normalize_record_name(&alias.dns_name),
                evaluate_target_health: alias.evaluate_target_health,
            }),
        };

        let routing = &mut self.routing;
        routing.set_identifier = non_empty(routing.set_identifier.take());
        routing.region = non_empty(routing.region.take());
        routing.failover = non_empty(routing.failover.take());
        routing.health_check_id = non_empty(routing.health_check_id.take());
        routing.geo_location = routing
            .geo_location
            .take()
            .map(|geo| GeoLocation {
                continent_code: non_empty(geo.continent_code),
                country_code: non_empty(geo.country_code),
                subdivision_code: non_empty(geo.subdivision_code),
            })
            .filter(|geo| !geo.is_empty());
        self
    }

    /// Whether this record set matches `(name, record_type)`.
    pub fn matches(&self, name: &str, record_type: DnsRecordType) -> bool {
        self.record_type == record_type
            && normalize_record_name(&self.name) == normalize_record_name(name)
    }
}

/// Normalize a provider record name: strip the trailing dot, lowercase, and
/// unescape the wildcard octal escape.
pub fn normalize_record_name(name: &str) -> String {
    normalize_domain_name(name.trim())
        .replace("\\052", "*")
        .to_lowercase()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Where to start a record-set listing.
///
/// Listings are ordered by name then type, so starting at `(name, type)` puts
/// the matching record set first when it exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSetQuery {
    pub start_name: String,
    pub start_type: Option<DnsRecordType>,
    pub start_identifier: Option<String>,
    /// Page size; `None` uses the provider default.
    pub max_items: Option<u32>,
}

impl RecordSetQuery {
    /// Query starting at `(name, record_type)`.
    pub fn starting_at(name: &str, record_type: DnsRecordType) -> Self {
        Self {
            start_name: name.to_string(),
            start_type: Some(record_type),
            ..Self::default()
        }
    }
}

/// Position of the next page in a record-set listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSetCursor {
    pub name: String,
    pub record_type: Option<DnsRecordType>,
    pub identifier: Option<String>,
}

impl RecordSetCursor {
    /// The query that fetches the page this cursor points at.
    pub fn to_query(&self, max_items: Option<u32>) -> RecordSetQuery {
        RecordSetQuery {
            start_name: self.name.clone(),
            start_type: self.record_type,
            start_identifier: self.identifier.clone(),
            max_items,
        }
    }
}

/// One page of a record-set listing.
#[derive(Debug, Clone, Default)]
pub struct RecordSetPage {
    pub record_sets: Vec<RecordSet>,
    /// Next page position; `None` when the listing is exhausted.
    pub next: Option<RecordSetCursor>,
}

// ============ Changes ============

/// Action applied to a record set inside a change batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Create,
    Upsert,
    Delete,
}

impl ChangeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Upsert => "UPSERT",
            Self::Delete => "DELETE",
        }
    }
}

/// A single action in a change batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub action: ChangeAction,
    pub record_set: RecordSet,
}

/// An atomic set of actions submitted together against one zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub changes: Vec<Change>,
}

/// Propagation state of a submitted change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeStatus {
    #[serde(rename = "PENDING")]
    Pending,
    /// Converged across the provider's serving infrastructure.
    #[serde(rename = "INSYNC")]
    Propagated,
}

/// Provider receipt for a submitted change batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInfo {
    /// Bare change identifier (no `/change/` prefix).
    pub id: String,
    pub status: ChangeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

// ============ Credentials ============

/// Type-safe credential container.
///
/// Pass this to [`create_provider()`](crate::create_provider) to instantiate a provider.
///
/// Serialized as a tagged enum:
///
/// ```json
/// { "provider": "route53", "credentials": { "access_key_id": "...", "secret_access_key": "..." } }
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum ProviderCredentials {
    /// AWS credentials for Route 53. Requires feature `route53`.
    #[cfg(feature = "route53")]
    #[serde(rename = "route53")]
    Route53 {
        access_key_id: String,
        secret_access_key: String,
        /// Session token for temporary (STS) credentials.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_token: Option<String>,
    },
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "route53")]
            Self::Route53 {
                access_key_id,
                session_token,
                ..
            } => f
                .debug_struct("Route53")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<redacted>")
                .field("session_token", &session_token.as_ref().map(|_| "<redacted>"))
                .finish(),
            #[allow(unreachable_patterns)]
            _ => f.write_str("ProviderCredentials"),
        }
    }
}
