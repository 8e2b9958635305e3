//! Diff and change staging

use std::sync::Arc;

use record_reconciler_provider::{DnsProvider, DnsRecordType, RecordSet, Zone};

use crate::error::{ReconcileError, ReconcileResult};
use crate::types::StagedRemoval;

use super::{RecordFetcher, ZoneResolver};

/// Decides which record sets to write or remove.
pub struct ChangeStager {
    zones: ZoneResolver,
    records: RecordFetcher,
}

impl ChangeStager {
    #[must_use]
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self {
            zones: ZoneResolver::new(provider.clone()),
            records: RecordFetcher::new(provider),
        }
    }

    /// The desired record set, unless it already equals the current one.
    ///
    /// Both sides must be normalized.
    pub fn upsert_if_changed(
        current: Option<&RecordSet>,
        desired: &RecordSet,
    ) -> Option<RecordSet> {
        match current {
            Some(current) if current == desired => None,
            _ => Some(desired.clone()),
        }
    }

    /// Locate a record set left behind under a previous domain.
    ///
    /// Looked up in `current_zone` when the old domain lies inside it,
    /// otherwise in the zone found by suffix scan. A missing zone or record
    /// yields `None`.
    pub async fn previous_record(
        &self,
        current_zone: &Zone,
        domain: &str,
        record_type: DnsRecordType,
    ) -> ReconcileResult<Option<StagedRemoval>> {
        let zone_id = if current_zone.contains(domain) {
            current_zone.id.clone()
        } else {
            match self.zones.find_by_suffix(domain).await {
                Ok(zone) => zone.id,
                Err(ReconcileError::NoHostedZone(_)) => return Ok(None),
                Err(e) => return Err(e),
            }
        };

        let found = self.records.find(&zone_id, domain, record_type).await?;
        Ok(found.map(|record_set| StagedRemoval {
            zone_id,
            record_set,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{a_record, zone, MockDnsProvider};

    #[test]
    fn equal_records_stage_nothing() {
        let current = a_record("www.example.com", 60, "192.0.2.1");
        assert!(ChangeStager::upsert_if_changed(Some(&current), &current).is_none());

        let mut desired = current.clone();
        desired.routing.weight = Some(10);
        assert_eq!(
            ChangeStager::upsert_if_changed(Some(&current), &desired),
            Some(desired.clone())
        );
        assert_eq!(
            ChangeStager::upsert_if_changed(None, &desired),
            Some(desired)
        );
    }

    #[tokio::test]
    async fn previous_record_in_current_zone() {
        let provider = Arc::new(MockDnsProvider::new());
        provider.add_zone(zone("Z1", "example.com")).await;
        provider
            .add_record_set("Z1", a_record("old.example.com", 60, "192.0.2.1"))
            .await;
        let stager = ChangeStager::new(provider.clone());

        let removal = stager
            .previous_record(&zone("Z1", "example.com"), "old.example.com", DnsRecordType::A)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(removal.zone_id, "Z1");
        assert!(!provider.calls().await.contains(&"list_zones".to_string()));
    }

    #[tokio::test]
    async fn previous_record_in_other_zone() {
        let provider = Arc::new(MockDnsProvider::new());
        provider.add_zone(zone("Z1", "example.com")).await;
        provider.add_zone(zone("Z2", "example.org")).await;
        provider
            .add_record_set("Z2", a_record("old.example.org", 60, "192.0.2.1"))
            .await;
        let stager = ChangeStager::new(provider);

        let removal = stager
            .previous_record(&zone("Z1", "example.com"), "old.example.org", DnsRecordType::A)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(removal.zone_id, "Z2");
    }

    #[tokio::test]
    async fn missing_zone_or_record_is_skipped() {
        let provider = Arc::new(MockDnsProvider::new());
        provider.add_zone(zone("Z1", "example.com")).await;
        let stager = ChangeStager::new(provider);
        let current = zone("Z1", "example.com");

        assert!(stager
            .previous_record(&current, "old.example.net", DnsRecordType::A)
            .await
            .unwrap()
            .is_none());
        assert!(stager
            .previous_record(&current, "gone.example.com", DnsRecordType::A)
            .await
            .unwrap()
            .is_none());
    }
}
