//! Reconcile pipeline

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::json;

use record_reconciler_provider::{
    normalize_record_name, strip_resource_prefix, DnsProvider, DnsRecordType, ProviderError, Zone,
};

use crate::config::ReconcilerConfig;
use crate::context::ReconcileContext;
use crate::error::{ReconcileError, ReconcileResult};
use crate::types::{
    Failure, Operation, Outcome, ReconcileEvent, ReconcileResponse, RecordProps, StagedChanges,
    StagedRemoval,
};

use super::completion_poller::PollStatus;
use super::desired_record;
use super::{
    ChangeStager, ChangeSubmitter, CompletionPoller, RecordFetcher, SubmitFailure, ZoneResolver,
};

const PROGRESS_ZONE: u8 = 10;
const PROGRESS_RECORD: u8 = 20;
const PROGRESS_UPDATE: u8 = 60;
const PROGRESS_CHECK: u8 = 90;

/// Converges one record set per invocation.
///
/// Each call runs the pending ledger steps in order (zone lookup, record
/// lookup and staging, submission, propagation check) and stops at the
/// first step that has to wait or fail.
pub struct Reconciler {
    provider: Arc<dyn DnsProvider>,
    config: ReconcilerConfig,
}

impl Reconciler {
    #[must_use]
    pub fn new(provider: Arc<dyn DnsProvider>, config: ReconcilerConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Run one invocation and render the result envelope.
    ///
    /// A panic anywhere in the pipeline is caught and reported as an
    /// unexpected failure.
    pub async fn handle(&self, event: &ReconcileEvent) -> ReconcileResponse {
        let mut ctx = ReconcileContext::from_event(event);

        let result = AssertUnwindSafe(self.reconcile(event, &mut ctx))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("Reconcile panicked: {message}");
                ctx.progress = 0;
                ctx.add_error_log("Unexpected Error", json!({ "error": message }));
                Outcome::Failed(Failure::unexpected(message))
            }
        };

        match &outcome {
            Outcome::Done => log::info!("Reconcile complete"),
            Outcome::RetryAfter(delay) => log::info!("Reconcile pending, retry in {delay:?}"),
            Outcome::Failed(failure) => {
                log::warn!("Reconcile failed ({:?}): {}", failure.kind, failure.error_code);
            }
        }
        ctx.finish(&outcome)
    }

    /// Run the pending pipeline steps against `ctx`.
    pub async fn reconcile(&self, event: &ReconcileEvent, ctx: &mut ReconcileContext) -> Outcome {
        let def = &event.component_def;
        let prior = event.prior_props();
        // Stored ids are bare; definitions may use the `/hostedzone/` path form.
        let prior_zone = prior
            .route53_hosted_zone_id
            .as_deref()
            .map(|z| strip_resource_prefix(z, "hostedzone"))
            .filter(|z| !z.is_empty());
        let requested_zone = def
            .route53_hosted_zone_id
            .as_deref()
            .map(|z| strip_resource_prefix(z, "hostedzone"))
            .filter(|z| !z.is_empty());

        if let (Some(prior_zone), Some(requested)) = (&prior_zone, &requested_zone) {
            if prior_zone != requested {
                let err = ReconcileError::ZoneChanged {
                    prior: prior_zone.to_string(),
                    requested: requested.to_string(),
                };
                log::warn!("{err}");
                return fail_permanent(
                    ctx,
                    "Cannot Change Hosted Zone ID",
                    0,
                    json!({ "prior": prior_zone, "new": requested }),
                );
            }
        }

        let Some(domain) = event.resolve_domain() else {
            return fail_permanent(
                ctx,
                "No Domain",
                0,
                json!({ "error": ReconcileError::NoDomain.to_string() }),
            );
        };

        let record_type = match def.record_type.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => match DnsRecordType::parse(t, self.provider.id()) {
                Ok(parsed) => parsed,
                Err(e) => {
                    return fail_permanent(
                        ctx,
                        "Invalid Record Type",
                        0,
                        json!({ "record_type": t, "error": e.to_string() }),
                    );
                }
            },
            _ => self.config.default_record_type,
        };

        let mut zone: Option<Zone> = None;

        if ctx.ops.get_hosted_zone {
            ctx.progress = PROGRESS_ZONE;
            let resolver = ZoneResolver::new(self.provider.clone());
            let hint = prior_zone.clone().or_else(|| requested_zone.clone());
            let result = match &hint {
                Some(zone_id) => resolver.get(zone_id).await,
                None => resolver.find_by_suffix(&domain).await,
            };

            match result {
                Ok(found) => {
                    log::info!("Using hosted zone {} ({})", found.id, found.name);
                    ctx.add_log("Found Hosted Zone", json!({ "id": found.id, "name": found.name }));
                    ctx.props.route53_hosted_zone_id = Some(found.id.clone());
                    ctx.ops.get_hosted_zone = false;
                    zone = Some(found);
                }
                Err(e @ ReconcileError::NoHostedZone(_)) => {
                    return fail_permanent(
                        ctx,
                        "No Hosted Zone Found",
                        0,
                        json!({ "domain": domain, "error": e.to_string() }),
                    );
                }
                Err(e) => {
                    return self.stage_failure(
                        ctx,
                        "Failed to Get Hosted Zone",
                        PROGRESS_ZONE,
                        &e,
                        lookup_rejected,
                    );
                }
            }
        }

        if ctx.ops.get_record_set {
            ctx.progress = PROGRESS_RECORD;
            let staged = match self
                .stage_changes(event, ctx, zone.take(), &domain, record_type)
                .await
            {
                Ok(staged) => staged,
                Err(e @ ReconcileError::NoAliasSource) => {
                    return fail_permanent(
                        ctx,
                        "No API, Cloudfront, or S3 Data",
                        PROGRESS_RECORD,
                        json!({ "error": e.to_string() }),
                    );
                }
                Err(e @ ReconcileError::UnknownS3Region(_)) => {
                    return fail_permanent(
                        ctx,
                        "Unknown S3 Region",
                        PROGRESS_RECORD,
                        json!({ "error": e.to_string() }),
                    );
                }
                Err(e) => {
                    return self.stage_failure(
                        ctx,
                        "Failed to Get Record Set",
                        PROGRESS_RECORD,
                        &e,
                        lookup_rejected,
                    );
                }
            };

            ctx.ops.get_record_set = false;
            if staged.is_empty() {
                if event.op == Operation::Upsert {
                    ctx.add_log("No Records to Write", json!({ "domain": domain }));
                }
                self.finalize(ctx, event.op, &domain, record_type);
                return Outcome::Done;
            }
            ctx.ops.update_record_set = Some(staged);
        }

        if let Some(staged) = ctx.ops.update_record_set.clone() {
            ctx.progress = PROGRESS_UPDATE;
            let Some(zone_id) = ctx.props.route53_hosted_zone_id.clone() else {
                return fail_unexpected(
                    ctx,
                    &ReconcileError::Ledger("staged changes without a hosted zone id".into()),
                );
            };

            let submitter = ChangeSubmitter::new(
                self.provider.clone(),
                self.config.change_comment.clone(),
            );
            // Ids accepted by an earlier, partially failed submission.
            let mut accepted = ctx.ops.check_update_complete.take().unwrap_or_default();
            match submitter.submit(&zone_id, &staged).await {
                Ok(change_ids) => {
                    ctx.add_log(
                        "Updated Record(s)",
                        json!({
                            "change_ids": change_ids,
                            "upsert": staged.upsert,
                            "delete": staged.remove,
                        }),
                    );
                    accepted.extend(change_ids);
                    ctx.ops.update_record_set = None;
                    ctx.ops.check_update_complete = Some(accepted);
                }
                Err(SubmitFailure {
                    accepted: newly_accepted,
                    remaining,
                    error,
                }) => {
                    if !newly_accepted.is_empty() {
                        ctx.add_log(
                            "Updated Record(s)",
                            json!({
                                "change_ids": newly_accepted,
                                "not_submitted": remaining,
                            }),
                        );
                        ctx.ops.update_record_set = Some(remaining);
                    }
                    accepted.extend(newly_accepted);
                    if !accepted.is_empty() {
                        ctx.ops.check_update_complete = Some(accepted);
                    }
                    return self.stage_failure(
                        ctx,
                        "Failed to Update Record",
                        PROGRESS_UPDATE,
                        &error,
                        submit_rejected,
                    );
                }
            }
        }

        if let Some(change_ids) = ctx.ops.check_update_complete.clone() {
            ctx.progress = PROGRESS_CHECK;
            let poller = CompletionPoller::new(self.provider.clone());
            match poller.poll(&change_ids).await {
                Ok(PollStatus::Pending(id)) => {
                    ctx.add_log("Record Updating", json!({ "id": id }));
                    return Outcome::RetryAfter(self.config.poll_interval());
                }
                Ok(PollStatus::AllPropagated) => {
                    ctx.add_log("Record(s) Complete", json!({ "change_ids": change_ids }));
                    ctx.ops.check_update_complete = None;
                }
                Err(e) => {
                    return self.stage_failure(
                        ctx,
                        "Failed to Check Status",
                        PROGRESS_CHECK,
                        &e,
                        poll_rejected,
                    );
                }
            }
        }

        self.finalize(ctx, event.op, &domain, record_type);
        Outcome::Done
    }

    /// Look up the current record and stage what has to change.
    async fn stage_changes(
        &self,
        event: &ReconcileEvent,
        ctx: &mut ReconcileContext,
        zone: Option<Zone>,
        domain: &str,
        record_type: DnsRecordType,
    ) -> ReconcileResult<StagedChanges> {
        let zone_id = ctx
            .props
            .route53_hosted_zone_id
            .clone()
            .ok_or_else(|| ReconcileError::Ledger("record lookup without a hosted zone id".into()))?;
        let records = RecordFetcher::new(self.provider.clone());
        let mut staged = StagedChanges::default();

        if event.op == Operation::Delete {
            match records.find(&zone_id, domain, record_type).await? {
                Some(record_set) => {
                    staged.remove = Some(StagedRemoval {
                        zone_id,
                        record_set,
                    });
                }
                None => ctx.add_log(
                    "No Record Set to Delete",
                    json!({ "domain": domain, "record_type": record_type }),
                ),
            }
            return Ok(staged);
        }

        let desired =
            desired_record::build(&event.component_def, domain, record_type, &self.config)?;
        if !desired.ignored_fields.is_empty() {
            log::warn!("Alias record for {domain} ignores {:?}", desired.ignored_fields);
            ctx.add_log(
                "Ignoring Static Fields",
                json!({
                    "fields": desired.ignored_fields,
                    "reason": "alias record sets carry no TTL or values",
                }),
            );
        }
        ctx.props.hosted_zone_id = desired.alias_zone_id().map(str::to_string);

        let zone = match zone {
            Some(zone) => zone,
            None => ZoneResolver::new(self.provider.clone()).get(&zone_id).await?,
        };

        let current = records.find(&zone.id, domain, record_type).await?;
        staged.upsert = ChangeStager::upsert_if_changed(current.as_ref(), &desired.record_set);
        if staged.upsert.is_some() {
            ctx.add_log(
                "Record Set Differs",
                json!({ "current": current, "desired": desired.record_set }),
            );
        }

        let prior = event.prior_props();
        if let Some(old_domain) = prior
            .domain
            .as_deref()
            .map(normalize_record_name)
            .filter(|old| old != domain)
        {
            let old_type = prior
                .record_type
                .as_deref()
                .and_then(|t| DnsRecordType::parse(t, self.provider.id()).ok())
                .unwrap_or(record_type);

            let stager = ChangeStager::new(self.provider.clone());
            match stager.previous_record(&zone, &old_domain, old_type).await? {
                Some(removal) => {
                    log::info!("Removing {old_domain} left behind by a rename");
                    staged.remove = Some(removal);
                }
                None => ctx.add_log(
                    "Previous Record Set Not Found",
                    json!({ "domain": old_domain, "record_type": old_type }),
                ),
            }
        }

        Ok(staged)
    }

    /// Record final props and links; a delete clears them.
    fn finalize(
        &self,
        ctx: &mut ReconcileContext,
        op: Operation,
        domain: &str,
        record_type: DnsRecordType,
    ) {
        if op == Operation::Delete {
            ctx.props = RecordProps::default();
            ctx.links.clear();
            return;
        }

        ctx.props.domain = Some(domain.to_string());
        ctx.props.record_type = Some(record_type.as_str().to_string());
        if let Some(zone_id) = &ctx.props.route53_hosted_zone_id {
            ctx.links
                .insert("Record Set".to_string(), self.config.record_set_link(zone_id));
        }
        ctx.links
            .insert("Domain URL".to_string(), format!("https://{domain}"));
    }

    /// Classify a failed stage: transient errors retry the stage, recognized
    /// provider rejections are permanent, anything else is unhandled.
    fn stage_failure(
        &self,
        ctx: &mut ReconcileContext,
        title: &str,
        progress: u8,
        err: &ReconcileError,
        is_permanent: fn(&ProviderError) -> bool,
    ) -> Outcome {
        if err.is_retryable() {
            log::warn!("{title}, retrying: {err}");
            ctx.add_log(format!("{title}, Retrying"), json!({ "error": err.to_string() }));
            return Outcome::RetryAfter(self.config.poll_interval());
        }

        match err.as_provider() {
            Some(provider_err) if is_permanent(provider_err) => {
                fail_permanent(ctx, title, progress, json!({ "error": err.to_string() }))
            }
            Some(_) => {
                log::error!("{title}: {err}");
                ctx.progress = progress;
                ctx.add_error_log(title, json!({ "error": err.to_string() }));
                Outcome::Failed(Failure::unhandled(format!("{title}: {err}")))
            }
            None => fail_unexpected(ctx, err),
        }
    }
}

fn fail_permanent(
    ctx: &mut ReconcileContext,
    title: &str,
    progress: u8,
    details: serde_json::Value,
) -> Outcome {
    log::warn!("{title}: {details}");
    ctx.progress = progress;
    ctx.add_error_log(title, details);
    Outcome::Failed(Failure::permanent(title))
}

fn fail_unexpected(ctx: &mut ReconcileContext, err: &ReconcileError) -> Outcome {
    log::error!("Unexpected reconcile error: {err}");
    ctx.progress = 0;
    ctx.add_error_log("Unexpected Error", json!({ "error": err.to_string() }));
    Outcome::Failed(Failure::unexpected(err.to_string()))
}

fn lookup_rejected(err: &ProviderError) -> bool {
    matches!(
        err,
        ProviderError::ZoneNotFound { .. } | ProviderError::InvalidParameter { .. }
    )
}

fn submit_rejected(err: &ProviderError) -> bool {
    matches!(
        err,
        ProviderError::ZoneNotFound { .. }
            | ProviderError::HealthCheckNotFound { .. }
            | ProviderError::InvalidChangeBatch { .. }
            | ProviderError::InvalidParameter { .. }
    )
}

fn poll_rejected(err: &ProviderError) -> bool {
    matches!(
        err,
        ProviderError::ChangeNotFound { .. } | ProviderError::InvalidParameter { .. }
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
