#![forbid(unsafe_code)]

use insp_core::FormSession;
use serde::Deserialize;
use serde_json::Value;

/// One scripted user interaction, replayed against a session in order.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub(crate) enum Edit {
    Field {
        section: String,
        field: String,
        value: Value,
    },
    Cell {
        section: String,
        sub_section: String,
        row: usize,
        column: String,
        value: Value,
    },
    Attach {
        section: String,
        field: String,
        file_name: String,
    },
}

pub(crate) fn parse_edits(raw: &str) -> Result<Vec<Edit>, String> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|err| format!("invalid edit script: {err}"))
}

pub(crate) fn apply_edits(session: &mut FormSession, edits: Vec<Edit>) {
    for edit in edits {
        match edit {
            Edit::Field {
                section,
                field,
                value,
            } => session.set_field_value(&section, &field, value),
            Edit::Cell {
                section,
                sub_section,
                row,
                column,
                value,
            } => session.set_cell_value(&section, &sub_section, row, &column, value),
            Edit::Attach {
                section,
                field,
                file_name,
            } => session.attach_file(&section, &field, &file_name),
        }
    }
}
