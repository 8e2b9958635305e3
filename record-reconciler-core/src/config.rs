//! Reconciler settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

use record_reconciler_provider::DnsRecordType;

/// Default delay before re-checking a pending change (seconds).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// Default TTL for static record sets (seconds).
pub const DEFAULT_TTL: u32 = 300;
/// Route 53 console deep link prefix; the zone id is appended.
pub const DEFAULT_CONSOLE_LINK_BASE: &str =
    "https://console.aws.amazon.com/route53/v2/hostedzones#ListRecordSets/";

/// Tunables for one [`Reconciler`](crate::Reconciler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Delay requested from the caller while a change is still propagating.
    pub poll_interval_secs: u64,
    /// Comment attached to every submitted change batch.
    pub change_comment: String,
    /// Record type used when the definition does not name one.
    pub default_record_type: DnsRecordType,
    /// TTL used for static record sets without an explicit `ttl`.
    pub default_ttl: u32,
    /// Prefix of the "Record Set" console link.
    pub console_link_base: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            change_comment: "Change made by record-reconciler".to_string(),
            default_record_type: DnsRecordType::A,
            default_ttl: DEFAULT_TTL,
            console_link_base: DEFAULT_CONSOLE_LINK_BASE.to_string(),
        }
    }
}

impl ReconcilerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Console link listing the record sets of `zone_id`.
    pub fn record_set_link(&self, zone_id: &str) -> String {
        format!("{}{zone_id}", self.console_link_base)
    }
}
