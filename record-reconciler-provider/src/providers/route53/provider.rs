//! Route 53 `DnsProvider` trait implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{ProviderError, Result};
use crate::providers::common::{normalize_domain_name, strip_resource_prefix};
use crate::traits::{DnsProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{
    AliasTarget, ChangeBatch, ChangeInfo, ChangeStatus, DnsRecordType, GeoLocation, RecordSet,
    RecordSetCursor, RecordSetPage, RecordSetQuery, RecordValue, RoutingPolicy, Zone, ZonePage,
};

use super::types::{
    AliasTargetXml, ChangeBatchXml, ChangeInfoResponse, ChangeInfoXml, ChangeList,
    ChangeResourceRecordSetsRequest, ChangeXml, GeoLocationXml, GetHostedZoneResponse, HostedZone,
    ListHostedZonesResponse, ListResourceRecordSetsResponse, ResourceRecord, ResourceRecordList,
    ResourceRecordSet,
};
use super::{ROUTE53_XMLNS, Route53Provider};

impl Route53Provider {
    /// Convert a hosted zone to the shared model.
    pub(crate) fn convert_zone(zone: HostedZone) -> Zone {
        Zone {
            id: strip_resource_prefix(&zone.id, "hostedzone"),
            name: normalize_domain_name(&zone.name),
            private: zone
                .config
                .and_then(|c| c.private_zone)
                .unwrap_or(false),
            record_count: zone.resource_record_set_count,
        }
    }

    /// Convert a listed record set; record types outside the shared model are skipped.
    pub(crate) fn convert_record_set(&self, rrset: ResourceRecordSet) -> Option<RecordSet> {
        let record_type = match DnsRecordType::parse(&rrset.record_type, self.provider_name()) {
            Ok(t) => t,
            Err(e) => {
                log::debug!("Skipping record set {}: {e}", rrset.name);
                return None;
            }
        };

        let value = match rrset.alias_target {
            Some(alias) => RecordValue::Alias(AliasTarget {
                hosted_zone_id: alias.hosted_zone_id,
                dns_name: alias.dns_name,
                evaluate_target_health: alias.evaluate_target_health,
            }),
            None => RecordValue::Static {
                ttl: rrset.ttl.unwrap_or_default(),
                records: rrset
                    .resource_records
                    .map(|list| list.items.into_iter().map(|r| r.value).collect())
                    .unwrap_or_default(),
            },
        };

        let geo_location = rrset.geo_location.map(|geo| GeoLocation {
            continent_code: geo.continent_code,
            country_code: geo.country_code,
            subdivision_code: geo.subdivision_code,
        });

        Some(
            RecordSet {
                name: rrset.name,
                record_type,
                value,
                routing: RoutingPolicy {
                    set_identifier: rrset.set_identifier,
                    weight: rrset.weight,
                    region: rrset.region,
                    geo_location,
                    failover: rrset.failover,
                    multi_value_answer: rrset.multi_value_answer,
                    health_check_id: rrset.health_check_id,
                },
            }
            .normalized(),
        )
    }

    /// Convert a shared record set into its wire form.
    pub(crate) fn to_resource_record_set(record_set: &RecordSet) -> ResourceRecordSet {
        let routing = &record_set.routing;
        let (ttl, resource_records, alias_target) = match &record_set.value {
            RecordValue::Static { ttl, records } => (
                Some(*ttl),
                Some(ResourceRecordList {
                    items: records
                        .iter()
                        .map(|value| ResourceRecord {
                            value: value.clone(),
                        })
                        .collect(),
                }),
                None,
            ),
            RecordValue::Alias(alias) => (
                None,
                None,
                Some(AliasTargetXml {
                    hosted_zone_id: alias.hosted_zone_id.clone(),
                    dns_name: alias.dns_name.clone(),
                    evaluate_target_health: alias.evaluate_target_health,
                }),
            ),
        };

        ResourceRecordSet {
            name: record_set.name.clone(),
            record_type: record_set.record_type.as_str().to_string(),
            set_identifier: routing.set_identifier.clone(),
            weight: routing.weight,
            region: routing.region.clone(),
            geo_location: routing.geo_location.as_ref().map(|geo| GeoLocationXml {
                continent_code: geo.continent_code.clone(),
                country_code: geo.country_code.clone(),
                subdivision_code: geo.subdivision_code.clone(),
            }),
            failover: routing.failover.clone(),
            multi_value_answer: routing.multi_value_answer,
            ttl,
            resource_records,
            alias_target,
            health_check_id: routing.health_check_id.clone(),
        }
    }

    /// Convert a change receipt. `PENDING` and `INSYNC` are the only documented states.
    pub(crate) fn convert_change_info(&self, info: ChangeInfoXml) -> Result<ChangeInfo> {
        let status = match info.status.as_str() {
            "PENDING" => ChangeStatus::Pending,
            "INSYNC" => ChangeStatus::Propagated,
            other => {
                return Err(self.parse_error(format!("unknown change status '{other}'")));
            }
        };

        let submitted_at = info.submitted_at.as_deref().and_then(|ts| {
            DateTime::parse_from_rfc3339(ts)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        });

        Ok(ChangeInfo {
            id: strip_resource_prefix(&info.id, "change"),
            status,
            submitted_at,
            comment: info.comment,
        })
    }

    /// Query parameters for a record-set listing page.
    fn record_set_query_params(&self, query: &RecordSetQuery) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if !query.start_name.is_empty() {
            params.push(("name".to_string(), query.start_name.clone()));
            if let Some(record_type) = query.start_type {
                params.push(("type".to_string(), record_type.as_str().to_string()));
                if let Some(identifier) = &query.start_identifier {
                    params.push(("identifier".to_string(), identifier.clone()));
                }
            }
        }
        if let Some(max_items) = query.max_items.or(self.page_size) {
            params.push(("maxitems".to_string(), max_items.to_string()));
        }
        params
    }
}

#[async_trait]
impl DnsProvider for Route53Provider {
    fn id(&self) -> &'static str {
        "route53"
    }

    async fn get_zone(&self, zone_id: &str) -> Result<Zone> {
        let zone_id = strip_resource_prefix(zone_id, "hostedzone");
        let response: GetHostedZoneResponse = self
            .get(
                &format!("hostedzone/{zone_id}"),
                &[],
                ErrorContext {
                    zone_id: Some(zone_id.clone()),
                    ..Default::default()
                },
            )
            .await?;

        Ok(Self::convert_zone(response.hosted_zone))
    }

    async fn list_zones(&self, marker: Option<&str>) -> Result<ZonePage> {
        let mut params = Vec::new();
        if let Some(marker) = marker {
            params.push(("marker".to_string(), marker.to_string()));
        }
        if let Some(size) = self.page_size {
            params.push(("maxitems".to_string(), size.to_string()));
        }

        let response: ListHostedZonesResponse = self
            .get("hostedzone", &params, ErrorContext::default())
            .await?;

        let next_marker = if response.is_truncated {
            response.next_marker
        } else {
            None
        };

        Ok(ZonePage {
            zones: response
                .hosted_zones
                .items
                .into_iter()
                .map(Self::convert_zone)
                .collect(),
            next_marker,
        })
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        query: &RecordSetQuery,
    ) -> Result<RecordSetPage> {
        let zone_id = strip_resource_prefix(zone_id, "hostedzone");
        let params = self.record_set_query_params(query);

        let response: ListResourceRecordSetsResponse = self
            .get(
                &format!("hostedzone/{zone_id}/rrset"),
                &params,
                ErrorContext {
                    zone_id: Some(zone_id.clone()),
                    ..Default::default()
                },
            )
            .await?;

        let next = match (response.is_truncated, response.next_record_name) {
            (true, Some(name)) => Some(RecordSetCursor {
                name,
                record_type: response
                    .next_record_type
                    .as_deref()
                    .and_then(|t| DnsRecordType::parse(t, self.provider_name()).ok()),
                identifier: response.next_record_identifier,
            }),
            _ => None,
        };

        Ok(RecordSetPage {
            record_sets: response
                .resource_record_sets
                .items
                .into_iter()
                .filter_map(|rrset| self.convert_record_set(rrset))
                .collect(),
            next,
        })
    }

    async fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<ChangeInfo> {
        let zone_id = strip_resource_prefix(zone_id, "hostedzone");

        if batch.changes.is_empty() {
            return Err(ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "changes".to_string(),
                detail: "change batch must contain at least one change".to_string(),
            });
        }

        let request = ChangeResourceRecordSetsRequest {
            xmlns: ROUTE53_XMLNS,
            change_batch: ChangeBatchXml {
                comment: batch.comment.clone(),
                changes: ChangeList {
                    items: batch
                        .changes
                        .iter()
                        .map(|change| ChangeXml {
                            action: change.action.as_str(),
                            resource_record_set: Self::to_resource_record_set(&change.record_set),
                        })
                        .collect(),
                },
            },
        };

        let response: ChangeInfoResponse = self
            .post(
                &format!("hostedzone/{zone_id}/rrset/"),
                &request,
                ErrorContext {
                    zone_id: Some(zone_id.clone()),
                    ..Default::default()
                },
            )
            .await?;

        let info = self.convert_change_info(response.change_info)?;
        log::info!(
            "[route53] Submitted {} change(s) to zone {zone_id} as {}",
            batch.changes.len(),
            info.id
        );
        Ok(info)
    }

    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo> {
        let change_id = strip_resource_prefix(change_id, "change");
        let response: ChangeInfoResponse = self
            .get(
                &format!("change/{change_id}"),
                &[],
                ErrorContext {
                    change_id: Some(change_id.clone()),
                    ..Default::default()
                },
            )
            .await?;

        self.convert_change_info(response.change_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::route53::types::HostedZoneConfig;

    fn provider() -> Route53Provider {
        Route53Provider::new("ak".to_string(), "sk".to_string(), None)
    }

    #[test]
    fn zone_conversion_strips_prefix_and_dot() {
        let zone = Route53Provider::convert_zone(HostedZone {
            id: "/hostedzone/Z111".to_string(),
            name: "example.com.".to_string(),
            config: Some(HostedZoneConfig {
                private_zone: Some(true),
            }),
            resource_record_set_count: Some(3),
        });
        assert_eq!(zone.id, "Z111");
        assert_eq!(zone.name, "example.com");
        assert!(zone.private);
        assert_eq!(zone.record_count, Some(3));
    }

    #[test]
    fn record_set_conversion_normalizes_alias() {
        let set = provider()
            .convert_record_set(ResourceRecordSet {
                name: "WWW.example.com.".to_string(),
                record_type: "A".to_string(),
                alias_target: Some(AliasTargetXml {
                    hosted_zone_id: "Z2FDTNDATAQYW2".to_string(),
                    dns_name: "d1.cloudfront.net.".to_string(),
                    evaluate_target_health: false,
                }),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(set.name, "www.example.com");
        assert_eq!(
            set.value,
            RecordValue::Alias(AliasTarget {
                hosted_zone_id: "Z2FDTNDATAQYW2".to_string(),
                dns_name: "d1.cloudfront.net".to_string(),
                evaluate_target_health: false,
            })
        );
    }

    #[test]
    fn unknown_record_type_is_skipped() {
        let set = provider().convert_record_set(ResourceRecordSet {
            name: "x.example.com.".to_string(),
            record_type: "LOC".to_string(),
            ..Default::default()
        });
        assert!(set.is_none());
    }

    #[test]
    fn static_record_set_round_trips_through_wire_form() {
        let original = RecordSet {
            name: "api.example.com".to_string(),
            record_type: DnsRecordType::A,
            value: RecordValue::Static {
                ttl: 300,
                records: vec!["192.0.2.1".to_string()],
            },
            routing: RoutingPolicy {
                set_identifier: Some("blue".to_string()),
                weight: Some(10),
                ..RoutingPolicy::default()
            },
        };
        let wire = Route53Provider::to_resource_record_set(&original);
        assert_eq!(wire.ttl, Some(300));
        assert!(wire.alias_target.is_none());
        assert_eq!(provider().convert_record_set(wire), Some(original));
    }

    #[test]
    fn change_info_statuses() {
        let pending = provider()
            .convert_change_info(ChangeInfoXml {
                id: "/change/C1".to_string(),
                status: "PENDING".to_string(),
                submitted_at: Some("2017-03-10T01:36:41.958Z".to_string()),
                comment: None,
            })
            .unwrap();
        assert_eq!(pending.id, "C1");
        assert_eq!(pending.status, ChangeStatus::Pending);
        assert!(pending.submitted_at.is_some());

        let synced = provider()
            .convert_change_info(ChangeInfoXml {
                id: "C2".to_string(),
                status: "INSYNC".to_string(),
                submitted_at: None,
                comment: Some("done".to_string()),
            })
            .unwrap();
        assert_eq!(synced.status, ChangeStatus::Propagated);

        let bogus = provider().convert_change_info(ChangeInfoXml {
            id: "C3".to_string(),
            status: "WEIRD".to_string(),
            submitted_at: None,
            comment: None,
        });
        assert!(matches!(bogus, Err(ProviderError::ParseError { .. })));
    }

    #[test]
    fn record_query_params_follow_api_rules() {
        let p = provider();
        let query = RecordSetQuery {
            start_name: "www.example.com".to_string(),
            start_type: Some(DnsRecordType::A),
            start_identifier: Some("blue".to_string()),
            max_items: Some(1),
        };
        let params = p.record_set_query_params(&query);
        assert_eq!(
            params,
            vec![
                ("name".to_string(), "www.example.com".to_string()),
                ("type".to_string(), "A".to_string()),
                ("identifier".to_string(), "blue".to_string()),
                ("maxitems".to_string(), "1".to_string()),
            ]
        );

        // identifier without type is not allowed by the API
        let query = RecordSetQuery {
            start_name: "www.example.com".to_string(),
            start_identifier: Some("blue".to_string()),
            ..RecordSetQuery::default()
        };
        assert_eq!(
            p.record_set_query_params(&query),
            vec![("name".to_string(), "www.example.com".to_string())]
        );
    }

    #[tokio::test]
    async fn empty_change_batch_is_rejected_locally() {
        let result = provider()
            .change_record_sets("Z1", &ChangeBatch::default())
            .await;
        assert!(matches!(
            result,
            Err(ProviderError::InvalidParameter { param, .. }) if param == "changes"
        ));
    }
}
