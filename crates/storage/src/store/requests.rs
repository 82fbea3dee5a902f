#![forbid(unsafe_code)]

use insp_core::SubmissionStatus;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionRow {
    pub id: i64,
    pub form_id: String,
    pub payload: Value,
    pub status: SubmissionStatus,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListSubmissionsRequest {
    pub status: Option<SubmissionStatus>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ListSubmissionsRequest {
    fn default() -> Self {
        Self {
            status: None,
            limit: 50,
            offset: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetSubmissionStatusRequest {
    pub id: i64,
    pub status: SubmissionStatus,
    pub updated_at_ms: i64,
}
