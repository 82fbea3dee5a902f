#![forbid(unsafe_code)]

use crate::schema::Schema;
use crate::state::FormState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What leaves the engine on submit: the raw state tree plus the form id.
///
/// The payload is *not* run through the resolver. Row defaults that were
/// only ever displayed are absent; only values the user actually wrote are
/// sent.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub form_id: String,
    pub payload: Value,
}

pub fn assemble(schema: &Schema, state: &FormState) -> SubmissionPayload {
    SubmissionPayload {
        form_id: schema.form_id_or_unknown().to_string(),
        payload: state.snapshot(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Draft,
    PendingSync,
    Synced,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingSync => "pending_sync",
            Self::Synced => "synced",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::PendingSync => "Pending Sync",
            Self::Synced => "Synced",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending_sync" => Some(Self::PendingSync),
            "synced" => Some(Self::Synced),
            _ => None,
        }
    }
}

/// Record shape accepted by the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub form_id: String,
    pub payload: Value,
    pub status: SubmissionStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SubmissionRecord {
    pub fn new(submission: SubmissionPayload, status: SubmissionStatus, now_ms: i64) -> Self {
        Self {
            form_id: submission.form_id,
            payload: submission.payload,
            status,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }
}

/// Durable home for submitted records; assigns each record its id.
pub trait SubmissionSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn add_submission(&mut self, record: SubmissionRecord) -> Result<i64, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateStore;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn payload_is_raw_state_not_resolved_view() {
        let schema = Schema::from_value(&json!({
            "formId": "F-1",
            "sections": [{
                "type": "table_group",
                "sectionId": "T",
                "sub_sections": [{
                    "subSectionId": "a",
                    "columns": [{ "columnId": "ok", "type": "checkbox" }, { "columnId": "n" }],
                    "rows": [{ "ok": true, "n": "x" }, { "ok": true, "n": "y" }]
                }]
            }]
        }))
        .unwrap();
        let mut store = StateStore::new(Arc::new(schema));
        store.set_cell_value("T", "a", 1, "ok", false);

        let submission = assemble(store.schema(), store.state());
        assert_eq!(submission.form_id, "F-1");
        assert_eq!(submission.payload, json!({ "T": { "a": { "1": { "ok": false } } } }));
        assert_eq!(store.resolve_cell("T", "a", 0, "ok").value, Some(&json!(true)));
    }

    #[test]
    fn form_id_defaults_to_unknown() {
        let schema = Schema::from_value(&json!({ "sections": [] })).unwrap();
        let submission = assemble(&schema, &FormState::default());
        assert_eq!(submission.form_id, "unknown");
        assert_eq!(submission.payload, json!({}));
    }

    #[test]
    fn record_serializes_in_collaborator_shape() {
        let record = SubmissionRecord::new(
            SubmissionPayload {
                form_id: "F".to_string(),
                payload: json!({}),
            },
            SubmissionStatus::PendingSync,
            1_700_000_000_000,
        );
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "formId": "F",
                "payload": {},
                "status": "pending_sync",
                "createdAt": 1_700_000_000_000i64,
                "updatedAt": 1_700_000_000_000i64
            })
        );
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            SubmissionStatus::Draft,
            SubmissionStatus::PendingSync,
            SubmissionStatus::Synced,
        ] {
            assert_eq!(SubmissionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SubmissionStatus::PendingSync.label(), "Pending Sync");
        assert_eq!(SubmissionStatus::parse("queued"), None);
    }
}
