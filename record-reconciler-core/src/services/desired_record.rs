//! Desired record construction

use record_reconciler_provider::{
    AliasTarget, DnsRecordType, GeoLocation, RecordSet, RecordValue, RoutingPolicy,
};

use crate::config::ReconcilerConfig;
use crate::error::{ReconcileError, ReconcileResult};
use crate::types::ComponentDef;

use super::alias_targets::{s3_website_target, CLOUDFRONT_HOSTED_ZONE_ID};

/// The record set a definition asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRecord {
    pub record_set: RecordSet,
    /// Static fields that were supplied but dropped because an alias won.
    pub ignored_fields: Vec<&'static str>,
}

impl DesiredRecord {
    /// Zone id of the alias target, if the record is an alias.
    pub fn alias_zone_id(&self) -> Option<&str> {
        match &self.record_set.value {
            RecordValue::Alias(alias) => Some(&alias.hosted_zone_id),
            RecordValue::Static { .. } => None,
        }
    }
}

/// Build the normalized record set for `domain`.
///
/// Alias sources are tried in priority order: API gateway (zone id and
/// domain name together), CloudFront, then the S3 website region. Without
/// any of them, non-empty `resource_records` give a static record set.
pub fn build(
    def: &ComponentDef,
    domain: &str,
    record_type: DnsRecordType,
    config: &ReconcilerConfig,
) -> ReconcileResult<DesiredRecord> {
    let value = match alias_target(def)? {
        Some(alias) => RecordValue::Alias(alias),
        None if has_records(def) => RecordValue::Static {
            ttl: def.ttl.unwrap_or(config.default_ttl),
            records: def.resource_records.clone(),
        },
        None => return Err(ReconcileError::NoAliasSource),
    };

    let mut ignored_fields = Vec::new();
    if matches!(value, RecordValue::Alias(_)) {
        if def.ttl.is_some() {
            ignored_fields.push("ttl");
        }
        if has_records(def) {
            ignored_fields.push("resource_records");
        }
    }

    let record_set = RecordSet {
        name: domain.to_string(),
        record_type,
        value,
        routing: routing_policy(def),
    }
    .normalized();

    Ok(DesiredRecord {
        record_set,
        ignored_fields,
    })
}

fn has_records(def: &ComponentDef) -> bool {
    def.resource_records.iter().any(|r| !r.trim().is_empty())
}

fn alias_target(def: &ComponentDef) -> ReconcileResult<Option<AliasTarget>> {
    let evaluate_target_health = def.evaluate_target_health.unwrap_or(false);

    if let (Some(zone_id), Some(dns_name)) = (
        present(def.target_api_hosted_zone_id.as_deref()),
        present(def.target_api_domain_name.as_deref()),
    ) {
        return Ok(Some(AliasTarget {
            hosted_zone_id: zone_id.to_string(),
            dns_name: dns_name.to_string(),
            evaluate_target_health,
        }));
    }

    if let Some(dns_name) = present(def.target_cloudfront_domain_name.as_deref()) {
        return Ok(Some(AliasTarget {
            hosted_zone_id: CLOUDFRONT_HOSTED_ZONE_ID.to_string(),
            dns_name: dns_name.to_string(),
            evaluate_target_health,
        }));
    }

    if let Some(region) = present(def.target_s3_region.as_deref()) {
        let (zone_id, dns_name) = s3_website_target(region)?;
        return Ok(Some(AliasTarget {
            hosted_zone_id: zone_id.to_string(),
            dns_name,
            evaluate_target_health,
        }));
    }

    Ok(None)
}

fn routing_policy(def: &ComponentDef) -> RoutingPolicy {
    // A subdivision is only valid under the US.
    let country = if present(def.state.as_deref()).is_some() {
        Some("US".to_string())
    } else {
        def.country.clone()
    };

    RoutingPolicy {
        set_identifier: def.identifier.clone(),
        weight: def.weight,
        region: def.region.clone(),
        geo_location: Some(GeoLocation {
            continent_code: def.continent.clone(),
            country_code: country,
            subdivision_code: def.state.clone(),
        }),
        failover: def.failover.clone(),
        multi_value_answer: def.multivalue_answer,
        health_check_id: def.health_check_id.clone(),
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
