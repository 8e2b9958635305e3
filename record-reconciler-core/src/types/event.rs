//! Invocation event types

use serde::{Deserialize, Deserializer, Serialize};

use super::ledger::PassBackData;
use super::props::RecordProps;

/// Maximum length of a generated name label.
const MAX_LABEL_LEN: usize = 63;

/// Requested lifecycle operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Create or update the record set.
    #[default]
    Upsert,
    /// Remove the record set.
    Delete,
}

/// Declarative record definition, as authored by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentDef {
    pub domain: Option<String>,
    pub target_s3_bucket: Option<String>,
    pub base_domain: Option<String>,
    pub record_type: Option<String>,
    pub route53_hosted_zone_id: Option<String>,

    // Static values
    pub ttl: Option<u32>,
    pub resource_records: Vec<String>,

    // Routing
    pub identifier: Option<String>,
    pub weight: Option<u64>,
    pub region: Option<String>,
    pub continent: Option<String>,
    pub country: Option<String>,
    /// US state subdivision code; forces `country` to `US`.
    pub state: Option<String>,
    pub failover: Option<String>,
    pub multivalue_answer: Option<bool>,
    pub health_check_id: Option<String>,

    // Alias sources, by priority
    pub target_api_hosted_zone_id: Option<String>,
    pub target_api_domain_name: Option<String>,
    pub target_cloudfront_domain_name: Option<String>,
    pub target_s3_region: Option<String>,
    pub evaluate_target_health: Option<bool>,
}

/// State persisted by the engine from the previous successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrevState {
    pub props: RecordProps,
}

/// One handler invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileEvent {
    pub component_def: ComponentDef,
    pub component_name: Option<String>,
    pub project_code: Option<String>,
    pub repo_id: Option<String>,
    pub prev_state: Option<PrevState>,
    pub op: Operation,
    /// Ledger carried over from a previous `RetryAfter`; empty on a fresh run.
    #[serde(deserialize_with = "null_as_default")]
    pub pass_back_data: PassBackData,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ReconcileEvent {
    /// Props recorded by the previous run (empty when there was none).
    pub fn prior_props(&self) -> RecordProps {
        self.prev_state
            .as_ref()
            .map(|s| s.props.clone())
            .unwrap_or_default()
    }

    /// Target domain: `domain`, else `target_s3_bucket`, else a name derived
    /// from the project/repo/component triple under `base_domain`.
    pub fn resolve_domain(&self) -> Option<String> {
        let def = &self.component_def;
        non_blank(def.domain.as_deref())
            .or_else(|| non_blank(def.target_s3_bucket.as_deref()))
            .or_else(|| {
                let base = non_blank(def.base_domain.as_deref())?;
                let label = component_safe_name(
                    self.project_code.as_deref()?,
                    self.repo_id.as_deref()?,
                    self.component_name.as_deref()?,
                )?;
                Some(format!("{label}.{base}"))
            })
            .map(|d| d.trim_end_matches('.').to_lowercase())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// DNS-safe label from `project_code-repo_id-component_name`.
///
/// Lowercased; anything but ASCII alphanumerics, `-` and `_` becomes `-`;
/// leading/trailing dashes are trimmed and the result is capped at 63 chars.
pub fn component_safe_name(
    project_code: &str,
    repo_id: &str,
    component_name: &str,
) -> Option<String> {
    let parts = [project_code, repo_id, component_name];
    if parts.iter().any(|p| p.trim().is_empty()) {
        return None;
    }

    let mapped: String = parts
        .join("-")
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();

    let mut label = mapped.trim_matches('-').to_string();
    label.truncate(MAX_LABEL_LEN);
    let label = label.trim_end_matches('-').to_string();
    (!label.is_empty()).then_some(label)
}
