//! Per-invocation reconcile state

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{
    LogEntry, OperationLedger, Outcome, PassBackData, ReconcileEvent, ReconcileResponse,
    RecordProps,
};

/// Mutable state threaded through one invocation of the pipeline.
///
/// Built from the incoming event: a non-empty `pass_back_data` resumes a
/// previous run (ledger, props and links), otherwise the run starts fresh
/// from the persisted props.
#[derive(Debug, Clone, Default)]
pub struct ReconcileContext {
    pub props: RecordProps,
    pub links: BTreeMap<String, String>,
    pub logs: Vec<LogEntry>,
    /// 0..=100
    pub progress: u8,
    pub ops: OperationLedger,
}

impl ReconcileContext {
    pub fn from_event(event: &ReconcileEvent) -> Self {
        if event.pass_back_data.is_empty() {
            Self {
                props: event.prior_props(),
                ops: OperationLedger::fresh(),
                ..Self::default()
            }
        } else {
            let data = event.pass_back_data.clone();
            Self {
                props: data.props,
                links: data.links,
                ops: data.ops,
                ..Self::default()
            }
        }
    }

    /// Append an informational log entry.
    pub fn add_log(&mut self, title: impl Into<String>, details: impl Serialize) {
        self.push_log(title.into(), details, false);
    }

    /// Append an error log entry.
    pub fn add_error_log(&mut self, title: impl Into<String>, details: impl Serialize) {
        self.push_log(title.into(), details, true);
    }

    fn push_log(&mut self, title: String, details: impl Serialize, is_error: bool) {
        let details = serde_json::to_value(details)
            .unwrap_or_else(|e| serde_json::Value::String(format!("unserializable details: {e}")));
        self.logs.push(LogEntry {
            title,
            details,
            is_error,
        });
    }

    /// Snapshot for the next invocation.
    pub fn to_pass_back(&self) -> PassBackData {
        PassBackData {
            ops: self.ops.clone(),
            props: self.props.clone(),
            links: self.links.clone(),
        }
    }

    /// Render the envelope for `outcome`.
    pub fn finish(self, outcome: &Outcome) -> ReconcileResponse {
        let mut response = ReconcileResponse {
            status_code: 200,
            progress: self.progress,
            error: None,
            callback_sec: None,
            retry_token: None,
            props: RecordProps::default(),
            links: BTreeMap::new(),
            pass_back_data: None,
            logs: Vec::new(),
        };

        match outcome {
            Outcome::Done => {
                response.progress = 100;
            }
            Outcome::RetryAfter(delay) => {
                response.callback_sec = Some(delay.as_secs());
                response.retry_token = Some(chrono::Utc::now().timestamp_micros().to_string());
                response.pass_back_data = Some(self.to_pass_back());
            }
            Outcome::Failed(failure) => {
                response.error = Some(failure.error_code.clone());
            }
        }

        response.props = self.props;
        response.links = self.links;
        response.logs = self.logs;
        response
    }
}
