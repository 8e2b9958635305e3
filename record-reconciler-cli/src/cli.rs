//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;
use record_reconciler_core::ReconcilerConfig;
use record_reconciler_provider::ProviderCredentials;

/// Reconcile one Route 53 record set from a JSON invocation event.
#[derive(Parser, Debug)]
#[command(name = "record-reconciler", version, about, long_about = None)]
pub struct Args {
    /// Invocation event JSON file, or `-` for stdin
    #[arg(long, default_value = "-")]
    pub event: String,

    /// Keep invoking until the run stops retrying, sleeping between rounds
    #[arg(long)]
    pub drive: bool,

    /// Upper bound on invocations with --drive
    #[arg(long, default_value_t = 60)]
    pub max_rounds: usize,

    /// Reconciler settings JSON file; unset fields keep their defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seconds to wait before re-checking a pending change
    #[arg(long, env = "RECONCILER_POLL_SECS")]
    pub poll_secs: Option<u64>,

    /// Comment attached to submitted change batches
    #[arg(long, env = "RECONCILER_CHANGE_COMMENT")]
    pub change_comment: Option<String>,

    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key_id: String,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: String,

    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    pub session_token: Option<String>,

    /// Pretty-print the result envelope
    #[arg(long)]
    pub pretty: bool,
}

impl Args {
    pub fn credentials(&self) -> ProviderCredentials {
        ProviderCredentials::Route53 {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            session_token: self.session_token.clone(),
        }
    }

    /// Apply command-line overrides on top of `base`.
    pub fn apply_overrides(&self, mut base: ReconcilerConfig) -> ReconcilerConfig {
        if let Some(secs) = self.poll_secs {
            base.poll_interval_secs = secs;
        }
        if let Some(comment) = &self.change_comment {
            base.change_comment.clone_from(comment);
        }
        base
    }
}
