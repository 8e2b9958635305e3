//! Reconcile pipeline services

mod alias_targets;
mod change_staging;
mod change_submitter;
mod completion_poller;
mod desired_record;
mod reconciler;
mod record_fetcher;
mod zone_resolver;

pub use alias_targets::{s3_website_target, CLOUDFRONT_HOSTED_ZONE_ID};
pub use change_staging::ChangeStager;
pub use change_submitter::{ChangeSubmitter, SubmitFailure};
pub use completion_poller::{CompletionPoller, PollStatus};
pub use desired_record::DesiredRecord;
pub use reconciler::Reconciler;
pub use record_fetcher::RecordFetcher;
pub use zone_resolver::ZoneResolver;

/// Build the desired record set for a definition.
pub use desired_record::build as build_desired_record;
