#![forbid(unsafe_code)]

use crate::schema::{Schema, SubSection};
use crate::state::FormState;
use serde_json::Value;

/// Effective view of one table cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellResolution<'a> {
    /// State value if written (even when falsy), else the row default.
    pub value: Option<&'a Value>,
    /// False when the column's `visibleIf` cell is not truthy in this row.
    pub enabled: bool,
    /// Set by `editable: false`, independent of `enabled`.
    pub read_only: bool,
}

/// Read-side of the engine: combines the immutable schema with the raw state.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    schema: &'a Schema,
    state: &'a FormState,
}

impl<'a> Resolver<'a> {
    pub fn new(schema: &'a Schema, state: &'a FormState) -> Self {
        Self { schema, state }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Scalar fields have no schema default; absent means never written.
    pub fn resolve_field(&self, section_id: &str, field_id: &str) -> Option<&'a Value> {
        self.state.field(section_id, field_id)
    }

    pub fn resolve_cell(
        &self,
        section_id: &str,
        sub_section_id: &str,
        row_index: usize,
        column_id: &str,
    ) -> CellResolution<'a> {
        let sub = self.schema.sub_section(section_id, sub_section_id);
        let value = self.cell_value(section_id, sub_section_id, sub, row_index, column_id);

        let Some(column) = sub.and_then(|sub| sub.column(column_id)) else {
            return CellResolution {
                value,
                enabled: true,
                read_only: false,
            };
        };

        let enabled = match column.visible_if.as_deref() {
            None => true,
            Some(gate) => self
                .cell_value(section_id, sub_section_id, sub, row_index, gate)
                .is_some_and(is_truthy),
        };

        CellResolution {
            value,
            enabled,
            read_only: !column.editable,
        }
    }

    fn cell_value(
        &self,
        section_id: &str,
        sub_section_id: &str,
        sub: Option<&'a SubSection>,
        row_index: usize,
        column_id: &str,
    ) -> Option<&'a Value> {
        if let Some(written) = self
            .state
            .cell(section_id, sub_section_id, row_index, column_id)
        {
            return Some(written);
        }
        sub.and_then(|sub| sub.row(row_index))
            .and_then(|row| row.default_for(column_id))
    }
}

/// JSON truthiness as the form documents expect it: `null`, `false`, `0`
/// and `""` are falsy, containers are always truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gated_schema() -> Schema {
        Schema::from_value(&json!({
            "formId": "F",
            "sections": [{
                "type": "table_group",
                "sectionId": "T",
                "sub_sections": [{
                    "subSectionId": "a",
                    "columns": [
                        { "columnId": "A", "type": "checkbox" },
                        { "columnId": "B", "type": "date", "visibleIf": "A" },
                        { "columnId": "C", "type": "textarea", "editable": false, "visibleIf": "A" }
                    ],
                    "rows": [
                        { "A": false, "C": "D" },
                        { "A": true }
                    ]
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn explicit_value_beats_row_default_even_when_falsy() {
        let schema = gated_schema();
        let mut state = FormState::default();

        let before = Resolver::new(&schema, &state).resolve_cell("T", "a", 0, "C");
        assert_eq!(before.value, Some(&json!("D")));

        state.write_cell("T", "a", 0, "C", json!(""));
        let after = Resolver::new(&schema, &state).resolve_cell("T", "a", 0, "C");
        assert_eq!(after.value, Some(&json!("")));
    }

    #[test]
    fn missing_cell_without_default_is_absent() {
        let schema = gated_schema();
        let state = FormState::default();
        let resolver = Resolver::new(&schema, &state);
        assert_eq!(resolver.resolve_cell("T", "a", 1, "B").value, None);
        assert_eq!(resolver.resolve_cell("T", "a", 9, "A").value, None);
    }

    #[test]
    fn visible_if_gates_on_the_same_row() {
        let schema = gated_schema();
        let mut state = FormState::default();

        let resolver = Resolver::new(&schema, &state);
        assert!(!resolver.resolve_cell("T", "a", 0, "B").enabled);
        assert!(resolver.resolve_cell("T", "a", 1, "B").enabled);

        state.write_cell("T", "a", 0, "A", json!(true));
        state.write_cell("T", "a", 1, "A", json!(false));
        let resolver = Resolver::new(&schema, &state);
        assert!(resolver.resolve_cell("T", "a", 0, "B").enabled);
        assert!(!resolver.resolve_cell("T", "a", 1, "B").enabled);
    }

    #[test]
    fn read_only_is_independent_of_visibility() {
        let schema = gated_schema();
        let state = FormState::default();
        let resolver = Resolver::new(&schema, &state);

        let hidden = resolver.resolve_cell("T", "a", 0, "C");
        assert!(hidden.read_only);
        assert!(!hidden.enabled);

        let shown = resolver.resolve_cell("T", "a", 1, "C");
        assert!(shown.read_only);
        assert!(shown.enabled);

        assert!(!resolver.resolve_cell("T", "a", 0, "A").read_only);
    }

    #[test]
    fn unknown_columns_resolve_from_state_only() {
        let schema = gated_schema();
        let mut state = FormState::default();
        state.write_cell("T", "a", 0, "ghost", json!(1));
        let cell = Resolver::new(&schema, &state).resolve_cell("T", "a", 0, "ghost");
        assert_eq!(cell.value, Some(&json!(1)));
        assert!(cell.enabled);
        assert!(!cell.read_only);
    }

    #[test]
    fn fields_never_fall_back() {
        let schema = gated_schema();
        let mut state = FormState::default();
        assert_eq!(Resolver::new(&schema, &state).resolve_field("S", "x"), None);
        state.write_field("S", "x", json!(false));
        assert_eq!(
            Resolver::new(&schema, &state).resolve_field("S", "x"),
            Some(&json!(false))
        );
    }

    #[test]
    fn truthiness_follows_json_conventions() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(-1), json!("no"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }
}
