#![forbid(unsafe_code)]

use super::*;
use insp_core::{SubmissionRecord, SubmissionSink, SubmissionStatus};
use rusqlite::{OptionalExtension, params};

const MAX_LIST_LIMIT: usize = 500;

struct RawSubmissionRow {
    id: i64,
    form_id: String,
    payload_json: String,
    status: String,
    created_at_ms: i64,
    updated_at_ms: i64,
}

impl RawSubmissionRow {
    fn into_row(self) -> Result<SubmissionRow, StoreError> {
        let status = SubmissionStatus::parse(&self.status)
            .ok_or(StoreError::InvalidInput("stored submission status is invalid"))?;
        Ok(SubmissionRow {
            id: self.id,
            form_id: self.form_id,
            payload: serde_json::from_str(&self.payload_json)?,
            status,
            created_at_ms: self.created_at_ms,
            updated_at_ms: self.updated_at_ms,
        })
    }
}

fn read_submission_row(row: &rusqlite::Row<'_>) -> Result<RawSubmissionRow, rusqlite::Error> {
    Ok(RawSubmissionRow {
        id: row.get(0)?,
        form_id: row.get(1)?,
        payload_json: row.get(2)?,
        status: row.get(3)?,
        created_at_ms: row.get(4)?,
        updated_at_ms: row.get(5)?,
    })
}

impl SqliteStore {
    /// Inserts a record and returns it with its assigned id.
    ///
    /// `form_id` is stored exactly as handed over, blank or padded ids included.
    pub fn insert_submission(
        &mut self,
        record: SubmissionRecord,
    ) -> Result<SubmissionRow, StoreError> {
        if record.updated_at < record.created_at {
            return Err(StoreError::InvalidInput(
                "updated_at must not precede created_at",
            ));
        }
        let payload_json = serde_json::to_string(&record.payload)?;

        self.conn.execute(
            "INSERT INTO submissions(form_id, payload_json, status, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.form_id,
                payload_json,
                record.status.as_str(),
                record.created_at,
                record.updated_at,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(
            id,
            form_id = record.form_id.as_str(),
            status = record.status.as_str(),
            "submission stored"
        );

        Ok(SubmissionRow {
            id,
            form_id: record.form_id,
            payload: record.payload,
            status: record.status,
            created_at_ms: record.created_at,
            updated_at_ms: record.updated_at,
        })
    }

    pub fn get_submission(&self, id: i64) -> Result<Option<SubmissionRow>, StoreError> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, form_id, payload_json, status, created_at_ms, updated_at_ms \
                 FROM submissions WHERE id=?1",
                params![id],
                read_submission_row,
            )
            .optional()?;
        raw.map(RawSubmissionRow::into_row).transpose()
    }

    /// Newest first.
    pub fn list_submissions(
        &self,
        request: ListSubmissionsRequest,
    ) -> Result<Vec<SubmissionRow>, StoreError> {
        let limit = to_sqlite_i64(request.limit.min(MAX_LIST_LIMIT))?;
        let offset = to_sqlite_i64(request.offset)?;
        let status = request.status.map(SubmissionStatus::as_str);

        let mut stmt = self.conn.prepare(
            "SELECT id, form_id, payload_json, status, created_at_ms, updated_at_ms \
             FROM submissions \
             WHERE (?1 IS NULL OR status=?1) \
             ORDER BY created_at_ms DESC, id DESC \
             LIMIT ?2 OFFSET ?3",
        )?;
        let mut rows = stmt.query(params![status, limit, offset])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(read_submission_row(row)?.into_row()?);
        }
        Ok(out)
    }

    pub fn count_submissions(&self, status: Option<SubmissionStatus>) -> Result<usize, StoreError> {
        let count = self.conn.query_row(
            "SELECT COUNT(1) FROM submissions WHERE (?1 IS NULL OR status=?1)",
            params![status.map(SubmissionStatus::as_str)],
            |row| row.get::<_, i64>(0),
        )?;
        usize::try_from(count).map_err(|_| StoreError::InvalidInput("numeric overflow"))
    }

    pub fn set_submission_status(
        &mut self,
        request: SetSubmissionStatusRequest,
    ) -> Result<SubmissionRow, StoreError> {
        let tx = self.conn.transaction()?;
        let created_at_ms = tx
            .query_row(
                "SELECT created_at_ms FROM submissions WHERE id=?1",
                params![request.id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or(StoreError::UnknownId)?;
        if request.updated_at_ms < created_at_ms {
            return Err(StoreError::InvalidInput(
                "updated_at must not precede created_at",
            ));
        }
        tx.execute(
            "UPDATE submissions SET status=?2, updated_at_ms=?3 WHERE id=?1",
            params![request.id, request.status.as_str(), request.updated_at_ms],
        )?;
        tx.commit()?;

        self.get_submission(request.id)?
            .ok_or(StoreError::UnknownId)
    }
}

impl SubmissionSink for SqliteStore {
    type Error = StoreError;

    fn add_submission(&mut self, record: SubmissionRecord) -> Result<i64, StoreError> {
        self.insert_submission(record).map(|row| row.id)
    }
}
