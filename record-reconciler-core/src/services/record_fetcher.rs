//! Current record lookup

use std::sync::Arc;

use record_reconciler_provider::{
    normalize_record_name, DnsProvider, DnsRecordType, RecordSet, RecordSetQuery,
};

use crate::error::ReconcileResult;

/// Looks up the record set currently stored for `(domain, type)`.
pub struct RecordFetcher {
    provider: Arc<dyn DnsProvider>,
}

impl RecordFetcher {
    #[must_use]
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self { provider }
    }

    /// Returns the first exact `(name, type)` match, normalized.
    ///
    /// The listing starts at `(domain, type)`. It keeps paging while the
    /// provider reports more results whose next name is still `domain`, and
    /// stops at the first page boundary that moves past it.
    pub async fn find(
        &self,
        zone_id: &str,
        domain: &str,
        record_type: DnsRecordType,
    ) -> ReconcileResult<Option<RecordSet>> {
        let wanted = normalize_record_name(domain);
        let mut query = RecordSetQuery::starting_at(domain, record_type);

        loop {
            let page = self.provider.list_record_sets(zone_id, &query).await?;
            if let Some(found) = page
                .record_sets
                .into_iter()
                .find(|rs| rs.matches(&wanted, record_type))
            {
                return Ok(Some(found.normalized()));
            }

            match page.next {
                Some(cursor) if normalize_record_name(&cursor.name) == wanted => {
                    log::debug!("Record listing for {wanted} continues on next page");
                    query = cursor.to_query(query.max_items);
                }
                _ => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{a_record, zone, MockDnsProvider};

    #[tokio::test]
    async fn finds_exact_match_only() {
        let provider = Arc::new(MockDnsProvider::new());
        provider.add_zone(zone("Z1", "example.com")).await;
        provider
            .add_record_set("Z1", a_record("www.example.com", 60, "192.0.2.1"))
            .await;
        let fetcher = RecordFetcher::new(provider);

        let found = fetcher
            .find("Z1", "www.example.com", DnsRecordType::A)
            .await
            .unwrap();
        assert_eq!(found, Some(a_record("www.example.com", 60, "192.0.2.1")));

        assert!(fetcher
            .find("Z1", "ww.example.com", DnsRecordType::A)
            .await
            .unwrap()
            .is_none());
        assert!(fetcher
            .find("Z1", "www.example.com", DnsRecordType::Aaaa)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn names_are_normalized() {
        let provider = Arc::new(MockDnsProvider::new());
        provider.add_zone(zone("Z1", "example.com")).await;
        provider
            .add_record_set("Z1", a_record("\\052.example.com.", 60, "192.0.2.1"))
            .await;
        let fetcher = RecordFetcher::new(provider);

        let found = fetcher
            .find("Z1", "\\052.example.com.", DnsRecordType::A)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "*.example.com");
    }

    fn typed(name: &str, record_type: DnsRecordType, value: &str) -> RecordSet {
        RecordSet {
            record_type,
            ..a_record(name, 60, value)
        }
    }

    #[tokio::test]
    async fn keeps_paging_while_next_name_matches() {
        let provider = Arc::new(MockDnsProvider::new());
        provider.add_zone(zone("Z1", "example.com")).await;
        provider
            .add_record_set("Z1", typed("www.example.com", DnsRecordType::Mx, "10 mx"))
            .await;
        provider
            .add_record_set("Z1", typed("www.example.com", DnsRecordType::Txt, "\"v\""))
            .await;
        provider.set_record_page_size(1).await;
        let fetcher = RecordFetcher::new(provider.clone());

        assert!(fetcher
            .find("Z1", "www.example.com", DnsRecordType::Cname)
            .await
            .unwrap()
            .is_none());
        assert_eq!(provider.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn weighted_record_is_matched() {
        let provider = Arc::new(MockDnsProvider::new());
        provider.add_zone(zone("Z1", "example.com")).await;
        provider
            .add_record_set("Z1", typed("www.example.com", DnsRecordType::Mx, "10 mx"))
            .await;
        let mut weighted = typed("www.example.com", DnsRecordType::Txt, "\"v\"");
        weighted.routing.set_identifier = Some("blue".to_string());
        weighted.routing.weight = Some(10);
        provider.add_record_set("Z1", weighted.clone()).await;
        provider.set_record_page_size(1).await;
        let fetcher = RecordFetcher::new(provider.clone());

        let found = fetcher
            .find("Z1", "www.example.com", DnsRecordType::Txt)
            .await
            .unwrap();
        assert_eq!(found, Some(weighted));
    }

    #[tokio::test]
    async fn stops_when_listing_moves_past_domain() {
        let provider = Arc::new(MockDnsProvider::new());
        provider.add_zone(zone("Z1", "example.com")).await;
        provider
            .add_record_set("Z1", a_record("www.example.com", 60, "192.0.2.1"))
            .await;
        provider
            .add_record_set("Z1", a_record("zzz.example.com", 60, "192.0.2.2"))
            .await;
        provider
            .add_record_set("Z1", a_record("zzzz.example.com", 60, "192.0.2.3"))
            .await;
        provider.set_record_page_size(1).await;
        let fetcher = RecordFetcher::new(provider.clone());

        assert!(fetcher
            .find("Z1", "www.example.com", DnsRecordType::Cname)
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            provider.calls().await,
            vec!["list_record_sets".to_string()]
        );
    }
}
