//! Result envelope returned to the engine

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ledger::PassBackData;
use super::props::RecordProps;

/// A titled, structured log entry surfaced to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub title: String,
    pub details: serde_json::Value,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

/// Result envelope for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReconcileResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// 0..=100
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_sec: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_token: Option<String>,
    pub props: RecordProps,
    pub links: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_back_data: Option<PassBackData>,
    pub logs: Vec<LogEntry>,
}

impl ReconcileResponse {
    /// Whether the engine should call again.
    pub fn is_retry(&self) -> bool {
        self.callback_sec.is_some()
    }

    /// Log titles in emission order.
    pub fn log_titles(&self) -> Vec<&str> {
        self.logs.iter().map(|l| l.title.as_str()).collect()
    }
}
