//! Hosted zone resolution

use std::sync::Arc;

use record_reconciler_provider::{DnsProvider, Zone};

use crate::error::{ReconcileError, ReconcileResult};

/// Finds the zone that holds a domain.
pub struct ZoneResolver {
    provider: Arc<dyn DnsProvider>,
}

impl ZoneResolver {
    #[must_use]
    pub fn new(provider: Arc<dyn DnsProvider>) -> Self {
        Self { provider }
    }

    /// Fetch a zone by explicit id.
    pub async fn get(&self, zone_id: &str) -> ReconcileResult<Zone> {
        Ok(self.provider.get_zone(zone_id).await?)
    }

    /// First public zone, in listing order, whose name is a label-aware
    /// suffix of `domain`.
    ///
    /// The first match wins even when a longer (more specific) zone appears
    /// later in the listing.
    pub async fn find_by_suffix(&self, domain: &str) -> ReconcileResult<Zone> {
        let mut marker: Option<String> = None;
        loop {
            let page = self.provider.list_zones(marker.as_deref()).await?;
            if let Some(zone) = page
                .zones
                .into_iter()
                .find(|z| !z.private && z.contains(domain))
            {
                log::debug!("Zone {} ({}) matches {domain}", zone.id, zone.name);
                return Ok(zone);
            }
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => return Err(ReconcileError::NoHostedZone(domain.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{private_zone, zone, MockDnsProvider};

    async fn resolver_with(zones: Vec<Zone>, page_size: usize) -> ZoneResolver {
        let provider = Arc::new(MockDnsProvider::new());
        for z in zones {
            provider.add_zone(z).await;
        }
        provider.set_zone_page_size(page_size).await;
        ZoneResolver::new(provider)
    }

    #[tokio::test]
    async fn skips_private_and_unrelated_zones() {
        let resolver = resolver_with(
            vec![
                private_zone("ZP", "example.com"),
                zone("ZB", "badexample.com"),
                zone("ZE", "example.com"),
            ],
            1,
        )
        .await;

        let found = resolver.find_by_suffix("www.example.com").await.unwrap();
        assert_eq!(found.id, "ZE");
    }

    #[tokio::test]
    async fn label_boundary_is_respected() {
        let resolver = resolver_with(vec![zone("ZE", "example.com")], 10).await;
        assert!(matches!(
            resolver.find_by_suffix("badexample.com").await,
            Err(ReconcileError::NoHostedZone(d)) if d == "badexample.com"
        ));
        assert_eq!(
            resolver.find_by_suffix("example.com").await.unwrap().id,
            "ZE"
        );
    }

    #[tokio::test]
    async fn first_match_wins_over_longer_suffix() {
        let resolver = resolver_with(
            vec![zone("ZE", "example.com"), zone("ZS", "sub.example.com")],
            10,
        )
        .await;
        assert_eq!(
            resolver.find_by_suffix("a.sub.example.com").await.unwrap().id,
            "ZE"
        );
    }

    #[tokio::test]
    async fn explicit_zone_errors_propagate() {
        let resolver = resolver_with(vec![], 10).await;
        let err = resolver.get("ZMISSING").await.unwrap_err();
        assert!(err.is_expected());
    }
}
