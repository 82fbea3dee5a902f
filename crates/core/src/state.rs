#![forbid(unsafe_code)]

use crate::resolve::{CellResolution, Resolver};
use crate::schema::Schema;
use crate::walk::{SectionView, walk};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Raw, schema-shaped value tree of one session.
///
/// A section holds scalar field values and table values side by side:
/// `section -> field -> value` and `section -> sub-section -> row -> column -> value`.
/// Writes merge into the existing tree and never disturb sibling keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    sections: BTreeMap<String, SectionState>,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct SectionState {
    fields: BTreeMap<String, Value>,
    tables: BTreeMap<String, TableState>,
}

/// Rows keyed by their position in the schema's `rows`.
#[derive(Clone, Debug, Default, PartialEq)]
struct TableState {
    rows: BTreeMap<usize, BTreeMap<String, Value>>,
}

impl FormState {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub(crate) fn field(&self, section_id: &str, field_id: &str) -> Option<&Value> {
        self.sections.get(section_id)?.fields.get(field_id)
    }

    pub(crate) fn cell(
        &self,
        section_id: &str,
        sub_section_id: &str,
        row_index: usize,
        column_id: &str,
    ) -> Option<&Value> {
        self.sections
            .get(section_id)?
            .tables
            .get(sub_section_id)?
            .rows
            .get(&row_index)?
            .get(column_id)
    }

    pub(crate) fn write_field(&mut self, section_id: &str, field_id: &str, value: Value) {
        self.sections
            .entry(section_id.to_string())
            .or_default()
            .fields
            .insert(field_id.to_string(), value);
    }

    pub(crate) fn write_cell(
        &mut self,
        section_id: &str,
        sub_section_id: &str,
        row_index: usize,
        column_id: &str,
        value: Value,
    ) {
        self.sections
            .entry(section_id.to_string())
            .or_default()
            .tables
            .entry(sub_section_id.to_string())
            .or_default()
            .rows
            .entry(row_index)
            .or_default()
            .insert(column_id.to_string(), value);
    }

    /// Deep copy of exactly what has been written, as JSON.
    ///
    /// Row indices become object keys (`"0"`, `"1"`, ...). Nothing is
    /// defaulted: cells that were never written are absent. When a field id
    /// and a sub-section id collide inside one section, the table wins.
    pub fn snapshot(&self) -> Value {
        let mut root = Map::new();
        for (section_id, section) in &self.sections {
            let mut out = Map::new();
            for (field_id, value) in &section.fields {
                out.insert(field_id.clone(), value.clone());
            }
            for (sub_section_id, table) in &section.tables {
                if section.fields.contains_key(sub_section_id) {
                    tracing::debug!(
                        section_id = section_id.as_str(),
                        sub_section_id = sub_section_id.as_str(),
                        "field value shadowed by table of the same id"
                    );
                }
                let rows = table
                    .rows
                    .iter()
                    .map(|(index, cells)| {
                        let cells = cells
                            .iter()
                            .map(|(column_id, value)| (column_id.clone(), value.clone()))
                            .collect::<Map<_, _>>();
                        (index.to_string(), Value::Object(cells))
                    })
                    .collect::<Map<_, _>>();
                out.insert(sub_section_id.clone(), Value::Object(rows));
            }
            root.insert(section_id.clone(), Value::Object(out));
        }
        Value::Object(root)
    }
}

/// Sole owner of a session's [`FormState`].
///
/// Mutations go through [`set_field_value`](Self::set_field_value) and
/// [`set_cell_value`](Self::set_cell_value); reads go through the resolver.
#[derive(Clone, Debug)]
pub struct StateStore {
    schema: Arc<Schema>,
    state: FormState,
}

impl StateStore {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            state: FormState::default(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The raw tree, for submission snapshots only.
    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.schema, &self.state)
    }

    /// No `required`/`type` validation happens here.
    pub fn set_field_value(&mut self, section_id: &str, field_id: &str, value: impl Into<Value>) {
        self.state.write_field(section_id, field_id, value.into());
    }

    /// Writes one table cell. Rows the schema does not declare for this
    /// sub-section are never read back, so such writes are dropped.
    pub fn set_cell_value(
        &mut self,
        section_id: &str,
        sub_section_id: &str,
        row_index: usize,
        column_id: &str,
        value: impl Into<Value>,
    ) {
        let known_rows = self
            .schema
            .sub_section(section_id, sub_section_id)
            .map_or(0, |sub| sub.row_count());
        if row_index >= known_rows {
            tracing::debug!(
                section_id,
                sub_section_id,
                row_index,
                known_rows,
                "dropping cell write outside declared rows"
            );
            return;
        }
        self.state
            .write_cell(section_id, sub_section_id, row_index, column_id, value.into());
    }

    pub fn resolve_field(&self, section_id: &str, field_id: &str) -> Option<&Value> {
        self.resolver().resolve_field(section_id, field_id)
    }

    pub fn resolve_cell(
        &self,
        section_id: &str,
        sub_section_id: &str,
        row_index: usize,
        column_id: &str,
    ) -> CellResolution<'_> {
        self.resolver()
            .resolve_cell(section_id, sub_section_id, row_index, column_id)
    }

    pub fn walk(&self) -> Vec<SectionView> {
        walk(&self.resolver())
    }
}
