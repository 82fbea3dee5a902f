#![forbid(unsafe_code)]

use super::types::*;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema root must be a JSON object")]
    RootNotObject,
}

impl Schema {
    pub fn from_json_str(raw: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    /// Interprets a schema document once, up front.
    ///
    /// Everything below the root is read leniently: unknown kinds become
    /// `Unsupported` variants and absent collections become empty.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let root = value.as_object().ok_or(SchemaError::RootNotObject)?;
        let sections = array(root, "sections")
            .iter()
            .enumerate()
            .map(|(index, raw)| read_section(index, raw))
            .collect();
        Ok(Self {
            form_id: text(root, "formId"),
            form_title: text(root, "formTitle"),
            sections,
        })
    }
}

fn read_section(index: usize, raw: &Value) -> Section {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    let section_id = text(obj, "sectionId").unwrap_or_else(|| {
        tracing::warn!(index, "section without sectionId");
        String::new()
    });
    let section_title = text(obj, "sectionTitle").unwrap_or_default();
    let kind_raw = text(obj, "type").unwrap_or_default();

    let kind = match kind_raw.as_str() {
        "fieldset" => SectionKind::Fieldset {
            fields: read_fields(obj, "fields"),
        },
        "table_group" => SectionKind::TableGroup {
            sub_sections: array(obj, "sub_sections")
                .iter()
                .map(read_sub_section)
                .collect(),
        },
        "info_list" => SectionKind::InfoList {
            items: strings(obj, "items"),
        },
        "signature_group" => SectionKind::SignatureGroup {
            roles: array(obj, "roles").iter().map(read_role).collect(),
        },
        "file_upload_group" => SectionKind::FileUploadGroup {
            upload_fields: array(obj, "upload_fields")
                .iter()
                .map(read_upload_field)
                .collect(),
        },
        _ => {
            tracing::warn!(
                section_id = section_id.as_str(),
                kind = kind_raw.as_str(),
                "unsupported section type"
            );
            SectionKind::Unsupported { kind: kind_raw }
        }
    };

    Section {
        section_id,
        section_title,
        kind,
    }
}

fn read_fields(obj: &Map<String, Value>, key: &str) -> Vec<Field> {
    array(obj, key).iter().map(read_field).collect()
}

fn read_field(raw: &Value) -> Field {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    let field_id = text(obj, "fieldId").unwrap_or_default();
    let kind_raw = text(obj, "type").unwrap_or_default();

    let kind = match kind_raw.as_str() {
        "text" => FieldKind::Text,
        "date" => FieldKind::Date,
        "datetime" => FieldKind::DateTime,
        "checkbox_group" => FieldKind::CheckboxGroup {
            options: strings(obj, "options"),
        },
        "radio" => FieldKind::Radio {
            options: strings(obj, "options"),
        },
        "signature_pad" => FieldKind::SignaturePad,
        _ => {
            tracing::warn!(
                field_id = field_id.as_str(),
                kind = kind_raw.as_str(),
                "unsupported field type"
            );
            FieldKind::Unsupported { kind: kind_raw }
        }
    };

    Field {
        field_id,
        label: text(obj, "label").unwrap_or_default(),
        required: flag(obj, "required").unwrap_or(false),
        kind,
    }
}

fn read_role(raw: &Value) -> SignatureRole {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    SignatureRole {
        role_id: text(obj, "roleId").unwrap_or_default(),
        role_name: text(obj, "roleName").unwrap_or_default(),
        fields: read_fields(obj, "fields"),
    }
}

fn read_upload_field(raw: &Value) -> UploadField {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    UploadField {
        field_id: text(obj, "fieldId").unwrap_or_default(),
        label: text(obj, "label").unwrap_or_default(),
        required: flag(obj, "required").unwrap_or(false),
    }
}

fn read_sub_section(raw: &Value) -> SubSection {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    SubSection {
        sub_section_id: text(obj, "subSectionId").unwrap_or_default(),
        sub_section_title: text(obj, "subSectionTitle").unwrap_or_default(),
        columns: array(obj, "columns").iter().map(read_column).collect(),
        // Non-object rows still occupy their position so row indices stay stable.
        rows: array(obj, "rows")
            .iter()
            .map(|row| Row {
                defaults: row.as_object().cloned().unwrap_or_default(),
            })
            .collect(),
    }
}

fn read_column(raw: &Value) -> Column {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    let kind = match text(obj, "type") {
        Some(raw) if raw == "checkbox" => ColumnKind::Checkbox,
        Some(raw) if raw == "date" => ColumnKind::Date,
        Some(raw) if raw == "textarea" => ColumnKind::Textarea,
        other => ColumnKind::Plain(other),
    };
    Column {
        column_id: text(obj, "columnId").unwrap_or_default(),
        label: text(obj, "label").unwrap_or_default(),
        kind,
        editable: flag(obj, "editable").unwrap_or(true),
        visible_if: text(obj, "visibleIf").filter(|id| !id.trim().is_empty()),
    }
}

fn array<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    scalar_text(obj.get(key)?)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn flag(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    obj.get(key).and_then(Value::as_bool)
}

fn strings(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    array(obj, key).iter().filter_map(scalar_text).collect()
}
