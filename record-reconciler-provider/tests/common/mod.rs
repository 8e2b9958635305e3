//! Shared helpers for live provider tests

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use record_reconciler_provider::{
    ChangeInfo, ChangeStatus, DnsProvider, DnsRecordType, ProviderCredentials, RecordSet,
    RecordSetQuery, RecordValue, RoutingPolicy, Zone, create_provider,
};

/// Skip the test when any of the given environment variables is missing.
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("Skipping test: environment variable {} not set", $var);
                return;
            }
        )+
    };
}

/// Assert an `Option` is `Some` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// Assert a `Result` is `Ok` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Unique record name under the test domain.
pub fn generate_test_record_name(domain: &str) -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("_test-{}.{domain}", &uuid.to_string()[..8])
}

/// A TXT record set with a single value.
pub fn txt_record_set(name: &str, text: &str) -> RecordSet {
    RecordSet {
        name: name.to_string(),
        record_type: DnsRecordType::Txt,
        value: RecordValue::Static {
            ttl: 60,
            records: vec![format!("\"{text}\"")],
        },
        routing: RoutingPolicy::default(),
    }
}

/// Provider plus the public zone serving `TEST_DOMAIN`.
pub struct TestContext {
    pub provider: Arc<dyn DnsProvider>,
    pub domain: String,
    pub zone: Option<Zone>,
}

impl TestContext {
    pub fn route53() -> Option<Self> {
        let access_key_id = env::var("AWS_ACCESS_KEY_ID").ok()?;
        let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY").ok()?;
        let session_token = env::var("AWS_SESSION_TOKEN").ok();
        let domain = env::var("TEST_DOMAIN").ok()?;

        let provider = create_provider(ProviderCredentials::Route53 {
            access_key_id,
            secret_access_key,
            session_token,
        })
        .ok()?;

        Some(Self {
            provider,
            domain,
            zone: None,
        })
    }

    /// Find the public zone named exactly `TEST_DOMAIN`, scanning every page.
    pub async fn find_zone(&mut self) -> Option<Zone> {
        if self.zone.is_some() {
            return self.zone.clone();
        }

        let mut marker: Option<String> = None;
        loop {
            let page = self.provider.list_zones(marker.as_deref()).await.ok()?;
            if let Some(zone) = page
                .zones
                .into_iter()
                .find(|z| !z.private && z.name == self.domain)
            {
                self.zone = Some(zone.clone());
                return Some(zone);
            }
            marker = Some(page.next_marker?);
        }
    }

    /// Look up a record set by exact name and type.
    pub async fn find_record_set(
        &self,
        zone_id: &str,
        name: &str,
        record_type: DnsRecordType,
    ) -> Option<RecordSet> {
        let page = self
            .provider
            .list_record_sets(zone_id, &RecordSetQuery::starting_at(name, record_type))
            .await
            .ok()?;
        page.record_sets
            .into_iter()
            .find(|set| set.matches(name, record_type))
    }

    /// Poll a change until it is `INSYNC` or the attempts run out.
    pub async fn wait_for_change(&self, change: ChangeInfo, attempts: u32) -> Option<ChangeInfo> {
        let mut current = change;
        for _ in 0..attempts {
            if current.status == ChangeStatus::Propagated {
                return Some(current);
            }
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            current = self.provider.get_change(&current.id).await.ok()?;
        }
        (current.status == ChangeStatus::Propagated).then_some(current)
    }
}
