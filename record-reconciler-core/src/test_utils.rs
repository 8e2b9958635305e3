//! Test helpers
//!
//! A scripted in-memory [`DnsProvider`] plus factory functions for zones,
//! record sets and events.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use record_reconciler_provider::{
    AliasTarget, ChangeAction, ChangeBatch, ChangeInfo, ChangeStatus, DnsProvider, DnsRecordType,
    ProviderError, RecordSet, RecordSetCursor, RecordSetPage, RecordSetQuery, RecordValue,
    RoutingPolicy, Zone, ZonePage,
};
use tokio::sync::Mutex;

use crate::config::ReconcilerConfig;
use crate::services::Reconciler;
use crate::types::{ComponentDef, PrevState, ReconcileEvent, ReconcileResponse, RecordProps};

const PROVIDER: &str = "mock";

// ===== MockDnsProvider =====

struct MockState {
    zones: Vec<Zone>,
    zone_page_size: usize,
    /// Record sets per zone id, kept sorted by (name, type).
    record_sets: HashMap<String, Vec<RecordSet>>,
    record_page_size: usize,
    /// Status script given to each new change; the last entry sticks.
    status_script: Vec<ChangeStatus>,
    changes: HashMap<String, VecDeque<ChangeStatus>>,
    next_change: u32,
    batches: Vec<(String, ChangeBatch)>,
    calls: Vec<String>,
    /// One-shot errors by method name, with the number of calls to let through first.
    errors: HashMap<&'static str, (usize, ProviderError)>,
    panic_on: Option<&'static str>,
}

pub struct MockDnsProvider {
    state: Mutex<MockState>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                zones: Vec::new(),
                zone_page_size: 100,
                record_sets: HashMap::new(),
                record_page_size: 100,
                status_script: vec![ChangeStatus::Propagated],
                changes: HashMap::new(),
                next_change: 0,
                batches: Vec::new(),
                calls: Vec::new(),
                errors: HashMap::new(),
                panic_on: None,
            }),
        }
    }

    pub async fn add_zone(&self, zone: Zone) {
        let mut state = self.state.lock().await;
        state.record_sets.entry(zone.id.clone()).or_default();
        state.zones.push(zone);
    }

    pub async fn add_record_set(&self, zone_id: &str, record_set: RecordSet) {
        let mut state = self.state.lock().await;
        let sets = state.record_sets.entry(zone_id.to_string()).or_default();
        sets.push(record_set);
        sets.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    }

    pub async fn set_zone_page_size(&self, size: usize) {
        self.state.lock().await.zone_page_size = size;
    }

    pub async fn set_record_page_size(&self, size: usize) {
        self.state.lock().await.record_page_size = size;
    }

    pub async fn set_status_script(&self, script: Vec<ChangeStatus>) {
        self.state.lock().await.status_script = script;
    }

    /// Fail the next call to `method` with `error`.
    pub async fn fail_next(&self, method: &'static str, error: ProviderError) {
        self.fail_after(method, 0, error).await;
    }

    /// Let `skip` calls to `method` succeed, then fail the next one with `error`.
    pub async fn fail_after(&self, method: &'static str, skip: usize, error: ProviderError) {
        self.state.lock().await.errors.insert(method, (skip, error));
    }

    pub async fn panic_on(&self, method: &'static str) {
        self.state.lock().await.panic_on = Some(method);
    }

    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    pub async fn batches(&self) -> Vec<(String, ChangeBatch)> {
        self.state.lock().await.batches.clone()
    }

    pub async fn record_sets(&self, zone_id: &str) -> Vec<RecordSet> {
        self.state
            .lock()
            .await
            .record_sets
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn enter(&self, method: &'static str) -> Result<(), ProviderError> {
        let mut state = self.state.lock().await;
        state.calls.push(method.to_string());
        if state.panic_on == Some(method) {
            drop(state);
            panic!("mock panic in {method}");
        }
        let due = match state.errors.get_mut(method) {
            Some((skip, _)) if *skip > 0 => {
                *skip -= 1;
                false
            }
            Some(_) => true,
            None => false,
        };
        if !due {
            return Ok(());
        }
        match state.errors.remove(method) {
            Some((_, e)) => Err(e),
            None => Ok(()),
        }
    }
}

fn sort_key(record_set: &RecordSet) -> (String, &'static str, String) {
    (
        record_set.name.clone(),
        record_set.record_type.as_str(),
        record_set.routing.set_identifier.clone().unwrap_or_default(),
    )
}

fn same_identity(a: &RecordSet, b: &RecordSet) -> bool {
    a.matches(&b.name, b.record_type) && a.routing.set_identifier == b.routing.set_identifier
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    fn id(&self) -> &'static str {
        PROVIDER
    }

    async fn get_zone(&self, zone_id: &str) -> Result<Zone, ProviderError> {
        self.enter("get_zone").await?;
        let state = self.state.lock().await;
        state
            .zones
            .iter()
            .find(|z| z.id == zone_id)
            .cloned()
            .ok_or_else(|| ProviderError::ZoneNotFound {
                provider: PROVIDER.to_string(),
                zone_id: zone_id.to_string(),
                raw_message: None,
            })
    }

    async fn list_zones(&self, marker: Option<&str>) -> Result<ZonePage, ProviderError> {
        self.enter("list_zones").await?;
        let state = self.state.lock().await;
        let start: usize = marker.map_or(0, |m| m.parse().unwrap());
        let end = (start + state.zone_page_size).min(state.zones.len());
        Ok(ZonePage {
            zones: state.zones[start..end].to_vec(),
            next_marker: (end < state.zones.len()).then(|| end.to_string()),
        })
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        query: &RecordSetQuery,
    ) -> Result<RecordSetPage, ProviderError> {
        self.enter("list_record_sets").await?;
        let state = self.state.lock().await;
        let Some(sets) = state.record_sets.get(zone_id) else {
            return Err(ProviderError::ZoneNotFound {
                provider: PROVIDER.to_string(),
                zone_id: zone_id.to_string(),
                raw_message: None,
            });
        };

        let start_key = (
            query.start_name.clone(),
            query.start_type.map_or("", DnsRecordType::as_str),
            query.start_identifier.clone().unwrap_or_default(),
        );
        let start = sets
            .iter()
            .position(|rs| sort_key(rs) >= start_key)
            .unwrap_or(sets.len());
        let page_size = query
            .max_items
            .map_or(state.record_page_size, |m| m as usize);
        let end = (start + page_size).min(sets.len());

        Ok(RecordSetPage {
            record_sets: sets[start..end].to_vec(),
            next: sets.get(end).map(|rs| RecordSetCursor {
                name: rs.name.clone(),
                record_type: Some(rs.record_type),
                identifier: rs.routing.set_identifier.clone(),
            }),
        })
    }

    async fn change_record_sets(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, ProviderError> {
        self.enter("change_record_sets").await?;
        let mut state = self.state.lock().await;
        let Some(current) = state.record_sets.get(zone_id) else {
            return Err(ProviderError::ZoneNotFound {
                provider: PROVIDER.to_string(),
                zone_id: zone_id.to_string(),
                raw_message: None,
            });
        };

        // Apply atomically: work on a copy and swap it in only if every change applies.
        let mut sets = current.clone();
        for change in &batch.changes {
            let position = sets
                .iter()
                .position(|rs| same_identity(rs, &change.record_set));
            match (change.action, position) {
                (ChangeAction::Upsert, Some(i)) => sets[i] = change.record_set.clone(),
                (ChangeAction::Upsert | ChangeAction::Create, None) => {
                    sets.push(change.record_set.clone());
                }
                (ChangeAction::Delete, Some(i)) => {
                    sets.remove(i);
                }
                (ChangeAction::Create, Some(_)) | (ChangeAction::Delete, None) => {
                    return Err(ProviderError::InvalidChangeBatch {
                        provider: PROVIDER.to_string(),
                        raw_message: format!("{} not found", change.record_set.name),
                    });
                }
            }
        }
        sets.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        state.record_sets.insert(zone_id.to_string(), sets);

        state.next_change += 1;
        let id = format!("C{}", state.next_change);
        let script = state.status_script.iter().copied().collect();
        state.changes.insert(id.clone(), script);
        state.batches.push((zone_id.to_string(), batch.clone()));

        Ok(ChangeInfo {
            id,
            status: ChangeStatus::Pending,
            submitted_at: None,
            comment: batch.comment.clone(),
        })
    }

    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo, ProviderError> {
        self.enter("get_change").await?;
        let mut state = self.state.lock().await;
        let Some(script) = state.changes.get_mut(change_id) else {
            return Err(ProviderError::ChangeNotFound {
                provider: PROVIDER.to_string(),
                change_id: change_id.to_string(),
                raw_message: None,
            });
        };
        let status = if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().copied().unwrap_or(ChangeStatus::Propagated)
        };
        Ok(ChangeInfo {
            id: change_id.to_string(),
            status,
            submitted_at: None,
            comment: None,
        })
    }
}

// ===== Factories =====

pub fn zone(id: &str, name: &str) -> Zone {
    Zone {
        id: id.to_string(),
        name: name.to_string(),
        private: false,
        record_count: None,
    }
}

pub fn private_zone(id: &str, name: &str) -> Zone {
    Zone {
        private: true,
        ..zone(id, name)
    }
}

pub fn a_record(name: &str, ttl: u32, value: &str) -> RecordSet {
    RecordSet {
        name: name.to_string(),
        record_type: DnsRecordType::A,
        value: RecordValue::Static {
            ttl,
            records: vec![value.to_string()],
        },
        routing: RoutingPolicy::default(),
    }
}

pub fn s3_alias_record(name: &str) -> RecordSet {
    RecordSet {
        name: name.to_string(),
        record_type: DnsRecordType::A,
        value: RecordValue::Alias(AliasTarget {
            hosted_zone_id: "Z3AQBSTGFYJSTF".to_string(),
            dns_name: "s3-website-us-east-1.amazonaws.com".to_string(),
            evaluate_target_health: false,
        }),
        routing: RoutingPolicy::default(),
    }
}

/// Event for an S3 website alias in `us-east-1`.
pub fn s3_event(domain: &str) -> ReconcileEvent {
    ReconcileEvent {
        component_def: ComponentDef {
            domain: Some(domain.to_string()),
            target_s3_region: Some("us-east-1".to_string()),
            ..ComponentDef::default()
        },
        ..ReconcileEvent::default()
    }
}

pub fn static_event(domain: &str, ttl: u32, value: &str) -> ReconcileEvent {
    ReconcileEvent {
        component_def: ComponentDef {
            domain: Some(domain.to_string()),
            ttl: Some(ttl),
            resource_records: vec![value.to_string()],
            ..ComponentDef::default()
        },
        ..ReconcileEvent::default()
    }
}

pub fn with_prior(mut event: ReconcileEvent, props: RecordProps) -> ReconcileEvent {
    event.prev_state = Some(PrevState { props });
    event
}

pub fn reconciler(provider: &Arc<MockDnsProvider>) -> Reconciler {
    Reconciler::new(provider.clone(), ReconcilerConfig::default())
}

/// Invoke repeatedly, feeding back `pass_back_data`, until the run stops retrying.
pub async fn drive(
    reconciler: &Reconciler,
    mut event: ReconcileEvent,
    max_rounds: usize,
) -> Vec<ReconcileResponse> {
    let mut responses = Vec::new();
    for _ in 0..max_rounds {
        let response = reconciler.handle(&event).await;
        let pass_back = response.pass_back_data.clone();
        responses.push(response);
        match pass_back {
            Some(data) => event.pass_back_data = data,
            None => break,
        }
    }
    responses
}
