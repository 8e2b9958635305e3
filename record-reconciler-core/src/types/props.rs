//! Persisted state

use serde::{Deserialize, Serialize};

/// State persisted across runs by the engine.
///
/// `route53_hosted_zone_id` is immutable once recorded. `hosted_zone_id` is the
/// alias *target* zone, not the zone holding the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route53_hosted_zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_zone_id: Option<String>,
}

impl RecordProps {
    pub fn is_empty(&self) -> bool {
        self.domain.is_none()
            && self.record_type.is_none()
            && self.route53_hosted_zone_id.is_none()
            && self.hosted_zone_id.is_none()
    }
}
