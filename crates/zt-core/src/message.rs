//! Popup to page agent messages
//!
//! Wire format is JSON:
//! request `{"action": "refresh-preferences"}`,
//! response `{"status": "ok"}` or `{"status": "failed"}`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Request sent from the settings panel to a page agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "kebab-case")]
#[ts(export)]
pub enum Request {
    /// Reveal everything, re-read the store, re-apply suppression.
    RefreshPreferences,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Status {
    Ok,
    Failed,
}

/// Reply from a page agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Response {
    pub status: Status,
}

impl Response {
    pub fn ok() -> Self {
        Self { status: Status::Ok }
    }

    pub fn failed() -> Self {
        Self { status: Status::Failed }
    }
}

impl From<Status> for Response {
    fn from(status: Status) -> Self {
        Self { status }
    }
}

/// Parse an incoming request. Anything that is not one of ours yields `None`.
pub fn parse_request(json: &str) -> Option<Request> {
    serde_json::from_str(json).ok()
}
