#![forbid(unsafe_code)]

use crate::resolve::CellResolution;
use crate::schema::Schema;
use crate::state::StateStore;
use crate::submit::{SubmissionRecord, SubmissionSink, SubmissionStatus, assemble};
use crate::walk::SectionView;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Editing,
    Submitted { submission_id: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub submission_id: i64,
    pub form_id: String,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form has already been submitted")]
    AlreadySubmitted,
    /// The session stays editable; the caller may retry.
    #[error("Failed to save submission to offline storage.")]
    Persist {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// One form-filling session: a schema, its state store and a two-state
/// lifecycle (`Editing` until a submit succeeds, then `Submitted`).
#[derive(Clone, Debug)]
pub struct FormSession {
    store: StateStore,
    phase: SessionPhase,
}

impl FormSession {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            store: StateStore::new(schema),
            phase: SessionPhase::Editing,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_editing(&self) -> bool {
        self.phase == SessionPhase::Editing
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn schema(&self) -> &Schema {
        self.store.schema()
    }

    pub fn set_field_value(&mut self, section_id: &str, field_id: &str, value: impl Into<Value>) {
        if !self.accepts_edits() {
            return;
        }
        self.store.set_field_value(section_id, field_id, value);
    }

    pub fn set_cell_value(
        &mut self,
        section_id: &str,
        sub_section_id: &str,
        row_index: usize,
        column_id: &str,
        value: impl Into<Value>,
    ) {
        if !self.accepts_edits() {
            return;
        }
        self.store
            .set_cell_value(section_id, sub_section_id, row_index, column_id, value);
    }

    /// Records an upload by name; file contents never enter the engine.
    pub fn attach_file(&mut self, section_id: &str, field_id: &str, file_name: &str) {
        self.set_field_value(section_id, field_id, file_name);
    }

    pub fn resolve_field(&self, section_id: &str, field_id: &str) -> Option<&Value> {
        self.store.resolve_field(section_id, field_id)
    }

    pub fn resolve_cell(
        &self,
        section_id: &str,
        sub_section_id: &str,
        row_index: usize,
        column_id: &str,
    ) -> CellResolution<'_> {
        self.store
            .resolve_cell(section_id, sub_section_id, row_index, column_id)
    }

    pub fn render(&self) -> Vec<SectionView> {
        self.store.walk()
    }

    /// Hands the raw state to `sink` as a `pending_sync` record.
    pub fn submit<S: SubmissionSink>(
        &mut self,
        sink: &mut S,
        now_ms: i64,
    ) -> Result<SubmitReceipt, SubmitError> {
        if !self.is_editing() {
            return Err(SubmitError::AlreadySubmitted);
        }

        let submission = assemble(self.store.schema(), self.store.state());
        let form_id = submission.form_id.clone();
        let record = SubmissionRecord::new(submission, SubmissionStatus::PendingSync, now_ms);

        let submission_id = sink.add_submission(record).map_err(|err| {
            tracing::warn!(form_id = form_id.as_str(), error = %err, "submission not persisted");
            SubmitError::Persist {
                source: Box::new(err),
            }
        })?;

        tracing::info!(form_id = form_id.as_str(), submission_id, "submission queued");
        self.phase = SessionPhase::Submitted { submission_id };
        Ok(SubmitReceipt {
            submission_id,
            form_id,
        })
    }

    fn accepts_edits(&self) -> bool {
        if self.is_editing() {
            return true;
        }
        tracing::debug!("ignoring edit on a submitted session");
        false
    }
}
