#![forbid(unsafe_code)]

use serde_json::{Map, Value};

pub const DEFAULT_FORM_TITLE: &str = "Inspection Form";
pub const UNKNOWN_FORM_ID: &str = "unknown";

#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    pub form_id: Option<String>,
    pub form_title: Option<String>,
    pub sections: Vec<Section>,
}

impl Schema {
    pub fn form_id_or_unknown(&self) -> &str {
        self.form_id.as_deref().unwrap_or(UNKNOWN_FORM_ID)
    }

    pub fn title_or_default(&self) -> &str {
        self.form_title.as_deref().unwrap_or(DEFAULT_FORM_TITLE)
    }

    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.section_id == section_id)
    }

    /// Looks up a sub-section of a `table_group` section.
    pub fn sub_section(&self, section_id: &str, sub_section_id: &str) -> Option<&SubSection> {
        match &self.section(section_id)?.kind {
            SectionKind::TableGroup { sub_sections } => sub_sections
                .iter()
                .find(|sub| sub.sub_section_id == sub_section_id),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub section_id: String,
    pub section_title: String,
    pub kind: SectionKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SectionKind {
    Fieldset { fields: Vec<Field> },
    TableGroup { sub_sections: Vec<SubSection> },
    InfoList { items: Vec<String> },
    SignatureGroup { roles: Vec<SignatureRole> },
    FileUploadGroup { upload_fields: Vec<UploadField> },
    /// A `type` this engine does not know; carries the raw discriminator.
    Unsupported { kind: String },
}

impl SectionKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Fieldset { .. } => "fieldset",
            Self::TableGroup { .. } => "table_group",
            Self::InfoList { .. } => "info_list",
            Self::SignatureGroup { .. } => "signature_group",
            Self::FileUploadGroup { .. } => "file_upload_group",
            Self::Unsupported { kind } => kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignatureRole {
    pub role_id: String,
    pub role_name: String,
    pub fields: Vec<Field>,
}

impl SignatureRole {
    /// State scope for this role's fields: `"<sectionId>_<roleId>"`.
    pub fn scope_key(&self, section_id: &str) -> String {
        role_scope_key(section_id, &self.role_id)
    }
}

pub fn role_scope_key(section_id: &str, role_id: &str) -> String {
    format!("{section_id}_{role_id}")
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub field_id: String,
    pub label: String,
    pub required: bool,
    pub kind: FieldKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    Text,
    Date,
    DateTime,
    CheckboxGroup { options: Vec<String> },
    Radio { options: Vec<String> },
    SignaturePad,
    Unsupported { kind: String },
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::CheckboxGroup { .. } => "checkbox_group",
            Self::Radio { .. } => "radio",
            Self::SignaturePad => "signature_pad",
            Self::Unsupported { kind } => kind,
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            Self::CheckboxGroup { options } | Self::Radio { options } => options,
            _ => &[],
        }
    }
}

/// Upload slot; the state only ever holds the attached file's name.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadField {
    pub field_id: String,
    pub label: String,
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubSection {
    pub sub_section_id: String,
    pub sub_section_title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl SubSection {
    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.column_id == column_id)
    }

    pub fn row(&self, row_index: usize) -> Option<&Row> {
        self.rows.get(row_index)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn heading(&self) -> String {
        format!("{}. {}", self.sub_section_id, self.sub_section_title)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub column_id: String,
    pub label: String,
    pub kind: ColumnKind,
    pub editable: bool,
    pub visible_if: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Checkbox,
    Date,
    Textarea,
    /// Display-only cell; `None` when the column declared no `type` at all.
    Plain(Option<String>),
}

impl ColumnKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Textarea => "textarea",
            Self::Plain(Some(raw)) => raw,
            Self::Plain(None) => "static",
        }
    }
}

/// Static per-row defaults keyed by `columnId`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    pub defaults: Map<String, Value>,
}

impl Row {
    pub fn default_for(&self, column_id: &str) -> Option<&Value> {
        self.defaults.get(column_id)
    }
}
