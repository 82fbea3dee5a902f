#![forbid(unsafe_code)]

//! Schema walker: turns the schema plus the current state into render
//! descriptors, one per section, in document order.
//!
//! The walk is a pure function of its inputs and is meant to be re-run after
//! every mutation. Kinds the engine does not know produce explicit
//! `Unsupported` descriptors rather than errors or gaps.

use crate::resolve::{Resolver, is_truthy};
use crate::schema::{
    Column, ColumnKind, Field, FieldKind, Section, SectionKind, SignatureRole, SubSection,
    UploadField,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SectionView {
    pub section_id: String,
    pub title: String,
    #[serde(flatten)]
    pub body: SectionBody,
}

impl SectionView {
    pub fn is_unsupported(&self) -> bool {
        matches!(self.body, SectionBody::Unsupported { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionBody {
    Fieldset { fields: Vec<FieldView> },
    TableGroup { tables: Vec<TableView> },
    InfoList { items: Vec<String> },
    SignatureGroup { roles: Vec<RoleView> },
    FileUploadGroup { uploads: Vec<UploadView> },
    Unsupported { kind: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldView {
    /// Key the field's value lives under in the state tree.
    pub scope: String,
    pub field_id: String,
    pub label: String,
    pub required: bool,
    pub value: Option<Value>,
    pub control: FieldControl,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum FieldControl {
    Input {
        input_type: &'static str,
    },
    Choice {
        multiple: bool,
        group: String,
        options: Vec<ChoiceOption>,
    },
    SignaturePad,
    Unsupported {
        kind: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChoiceOption {
    pub value: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoleView {
    pub role_id: String,
    pub role_name: String,
    pub scope: String,
    pub fields: Vec<FieldView>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UploadView {
    pub field_id: String,
    pub label: String,
    pub required: bool,
    pub attached: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableView {
    pub sub_section_id: String,
    pub heading: String,
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<RowView>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnHeader {
    pub column_id: String,
    pub label: String,
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RowView {
    pub row_index: usize,
    pub cells: Vec<CellView>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellView {
    pub row_index: usize,
    pub column_id: String,
    pub value: Option<Value>,
    pub enabled: bool,
    pub read_only: bool,
    pub control: CellControl,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum CellControl {
    Checkbox { checked: bool },
    Date,
    Display { multiline: bool },
}

pub fn walk(resolver: &Resolver<'_>) -> Vec<SectionView> {
    resolver
        .schema()
        .sections
        .iter()
        .map(|section| walk_section(resolver, section))
        .collect()
}

fn walk_section(resolver: &Resolver<'_>, section: &Section) -> SectionView {
    let section_id = section.section_id.as_str();
    let body = match &section.kind {
        SectionKind::Fieldset { fields } => SectionBody::Fieldset {
            fields: fields
                .iter()
                .map(|field| field_view(resolver, section_id, field))
                .collect(),
        },
        SectionKind::TableGroup { sub_sections } => SectionBody::TableGroup {
            tables: sub_sections
                .iter()
                .map(|sub| table_view(resolver, section_id, sub))
                .collect(),
        },
        SectionKind::InfoList { items } => SectionBody::InfoList {
            items: items.clone(),
        },
        SectionKind::SignatureGroup { roles } => SectionBody::SignatureGroup {
            roles: roles
                .iter()
                .map(|role| role_view(resolver, section_id, role))
                .collect(),
        },
        SectionKind::FileUploadGroup { upload_fields } => SectionBody::FileUploadGroup {
            uploads: upload_fields
                .iter()
                .map(|upload| upload_view(resolver, section_id, upload))
                .collect(),
        },
        SectionKind::Unsupported { kind } => SectionBody::Unsupported { kind: kind.clone() },
    };

    SectionView {
        section_id: section.section_id.clone(),
        title: section.section_title.clone(),
        body,
    }
}

fn field_view(resolver: &Resolver<'_>, scope: &str, field: &Field) -> FieldView {
    let value = resolver.resolve_field(scope, &field.field_id);
    let control = match &field.kind {
        FieldKind::Text => FieldControl::Input { input_type: "text" },
        FieldKind::Date => FieldControl::Input { input_type: "date" },
        FieldKind::DateTime => FieldControl::Input {
            input_type: "datetime-local",
        },
        FieldKind::CheckboxGroup { options } => {
            choice_control(scope, &field.field_id, options, value, true)
        }
        FieldKind::Radio { options } => {
            choice_control(scope, &field.field_id, options, value, false)
        }
        FieldKind::SignaturePad => FieldControl::SignaturePad,
        FieldKind::Unsupported { kind } => FieldControl::Unsupported { kind: kind.clone() },
    };

    FieldView {
        scope: scope.to_string(),
        field_id: field.field_id.clone(),
        label: field.label.clone(),
        required: field.required,
        value: value.cloned(),
        control,
    }
}

fn choice_control(
    scope: &str,
    field_id: &str,
    options: &[String],
    value: Option<&Value>,
    multiple: bool,
) -> FieldControl {
    let options = options
        .iter()
        .map(|option| ChoiceOption {
            value: option.clone(),
            selected: is_selected(value, option, multiple),
        })
        .collect();
    FieldControl::Choice {
        multiple,
        group: format!("{scope}-{field_id}"),
        options,
    }
}

fn is_selected(value: Option<&Value>, option: &str, multiple: bool) -> bool {
    match value {
        Some(Value::String(chosen)) => chosen == option,
        Some(Value::Array(chosen)) if multiple => {
            chosen.iter().any(|item| item.as_str() == Some(option))
        }
        _ => false,
    }
}

fn role_view(resolver: &Resolver<'_>, section_id: &str, role: &SignatureRole) -> RoleView {
    let scope = role.scope_key(section_id);
    let fields = role
        .fields
        .iter()
        .map(|field| field_view(resolver, &scope, field))
        .collect();
    RoleView {
        role_id: role.role_id.clone(),
        role_name: role.role_name.clone(),
        scope,
        fields,
    }
}

fn upload_view(resolver: &Resolver<'_>, section_id: &str, upload: &UploadField) -> UploadView {
    let attached = resolver
        .resolve_field(section_id, &upload.field_id)
        .filter(|value| is_truthy(value))
        .map(|value| match value {
            Value::String(name) => name.clone(),
            other => other.to_string(),
        });
    UploadView {
        field_id: upload.field_id.clone(),
        label: upload.label.clone(),
        required: upload.required,
        attached,
    }
}

fn table_view(resolver: &Resolver<'_>, section_id: &str, sub: &SubSection) -> TableView {
    let columns = sub
        .columns
        .iter()
        .map(|column| ColumnHeader {
            column_id: column.column_id.clone(),
            label: column.label.clone(),
            kind: column.kind.as_str().to_string(),
        })
        .collect();

    let rows = (0..sub.row_count())
        .map(|row_index| RowView {
            row_index,
            cells: sub
                .columns
                .iter()
                .map(|column| cell_view(resolver, section_id, sub, row_index, column))
                .collect(),
        })
        .collect();

    TableView {
        sub_section_id: sub.sub_section_id.clone(),
        heading: sub.heading(),
        columns,
        rows,
    }
}

fn cell_view(
    resolver: &Resolver<'_>,
    section_id: &str,
    sub: &SubSection,
    row_index: usize,
    column: &Column,
) -> CellView {
    let resolved = resolver.resolve_cell(
        section_id,
        &sub.sub_section_id,
        row_index,
        &column.column_id,
    );
    let control = match &column.kind {
        ColumnKind::Checkbox => CellControl::Checkbox {
            checked: resolved.value.is_some_and(is_truthy),
        },
        ColumnKind::Date => CellControl::Date,
        ColumnKind::Textarea => CellControl::Display { multiline: true },
        ColumnKind::Plain(_) => CellControl::Display { multiline: false },
    };
    CellView {
        row_index,
        column_id: column.column_id.clone(),
        value: resolved.value.cloned(),
        enabled: resolved.enabled,
        read_only: resolved.read_only,
        control,
    }
}

#[cfg(test)]
mod tests;
