use super::*;
use crate::schema::Schema;
use crate::state::StateStore;
use serde_json::json;
use std::sync::Arc;

fn store_for(doc: serde_json::Value) -> StateStore {
    StateStore::new(Arc::new(Schema::from_value(&doc).unwrap()))
}

#[test]
fn unknown_section_kind_yields_marker_in_place() {
    let store = store_for(json!({
        "formId": "F",
        "sections": [
            { "type": "fieldset", "sectionId": "S1", "sectionTitle": "One",
              "fields": [{ "fieldId": "name", "type": "text", "label": "Name" }] },
            { "type": "bogus", "sectionId": "S2" }
        ]
    }));

    let views = store.walk();
    assert_eq!(views.len(), 2);
    assert!(!views[0].is_unsupported());
    assert_eq!(views[1].section_id, "S2");
    assert_eq!(
        views[1].body,
        SectionBody::Unsupported {
            kind: "bogus".to_string()
        }
    );
}

#[test]
fn unknown_field_kind_is_marked_not_dropped() {
    let store = store_for(json!({
        "sections": [{ "type": "fieldset", "sectionId": "S", "fields": [
            { "fieldId": "a", "type": "text" },
            { "fieldId": "b", "type": "slider" },
            { "fieldId": "c", "type": "date" }
        ]}]
    }));

    let views = store.walk();
    let SectionBody::Fieldset { fields } = &views[0].body else {
        panic!("expected fieldset");
    };
    let ids = fields.iter().map(|f| f.field_id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(
        fields[1].control,
        FieldControl::Unsupported {
            kind: "slider".to_string()
        }
    );
}

#[test]
fn table_cells_are_row_major_and_resolved() {
    let mut store = store_for(json!({
        "sections": [{
            "type": "table_group",
            "sectionId": "T1",
            "sectionTitle": "Checks",
            "sub_sections": [{
                "subSectionId": "T1a",
                "subSectionTitle": "Visual",
                "columns": [
                    { "columnId": "chk", "label": "Done", "type": "checkbox" },
                    { "columnId": "on", "label": "On", "type": "date", "visibleIf": "chk" },
                    { "columnId": "note", "label": "Note" }
                ],
                "rows": [{ "chk": false, "note": "n1" }, { "chk": true, "note": "n2" }]
            }]
        }]
    }));
    store.set_cell_value("T1", "T1a", 0, "chk", true);

    let views = store.walk();
    let SectionBody::TableGroup { tables } = &views[0].body else {
        panic!("expected table group");
    };
    let table = &tables[0];
    assert_eq!(table.heading, "T1a. Visual");
    assert_eq!(table.columns.len(), 3);
    assert_eq!(table.columns[2].kind, "static");

    let order = table
        .rows
        .iter()
        .flat_map(|row| row.cells.iter())
        .map(|cell| (cell.row_index, cell.column_id.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        order,
        vec![
            (0, "chk"),
            (0, "on"),
            (0, "note"),
            (1, "chk"),
            (1, "on"),
            (1, "note")
        ]
    );

    let first = &table.rows[0].cells;
    assert_eq!(first[0].control, CellControl::Checkbox { checked: true });
    assert!(first[1].enabled);
    assert_eq!(first[2].value, Some(json!("n1")));
    assert_eq!(first[2].control, CellControl::Display { multiline: false });
}

#[test]
fn signature_fields_use_role_scope() {
    let mut store = store_for(json!({
        "sections": [{
            "type": "signature_group",
            "sectionId": "sign",
            "roles": [
                { "roleId": "qc", "roleName": "QC", "fields": [{ "fieldId": "name", "type": "text" }] },
                { "roleId": "pm", "roleName": "PM", "fields": [{ "fieldId": "name", "type": "text" }] }
            ]
        }]
    }));
    store.set_field_value("sign_pm", "name", "Bo");

    let views = store.walk();
    let SectionBody::SignatureGroup { roles } = &views[0].body else {
        panic!("expected signature group");
    };
    assert_eq!(roles[0].scope, "sign_qc");
    assert_eq!(roles[0].fields[0].value, None);
    assert_eq!(roles[1].fields[0].scope, "sign_pm");
    assert_eq!(roles[1].fields[0].value, Some(json!("Bo")));
}

#[test]
fn choice_controls_mark_the_selected_option() {
    let mut store = store_for(json!({
        "sections": [{ "type": "fieldset", "sectionId": "S", "fields": [
            { "fieldId": "shift", "type": "radio", "options": ["A", "B"] },
            { "fieldId": "flags", "type": "checkbox_group", "options": ["x", "y", "z"] },
            { "fieldId": "when", "type": "datetime" }
        ]}]
    }));
    store.set_field_value("S", "shift", "B");
    store.set_field_value("S", "flags", json!(["x", "z"]));

    let views = store.walk();
    let SectionBody::Fieldset { fields } = &views[0].body else {
        panic!("expected fieldset");
    };
    let FieldControl::Choice {
        multiple,
        group,
        options,
    } = &fields[0].control
    else {
        panic!("radio must render as a choice");
    };
    assert!(!multiple);
    assert_eq!(group, "S-shift");
    assert_eq!(
        options.iter().map(|o| o.selected).collect::<Vec<_>>(),
        vec![false, true]
    );

    let FieldControl::Choice { options, .. } = &fields[1].control else {
        panic!("checkbox group must render as a choice");
    };
    assert_eq!(
        options.iter().map(|o| o.selected).collect::<Vec<_>>(),
        vec![true, false, true]
    );
    assert_eq!(
        fields[2].control,
        FieldControl::Input {
            input_type: "datetime-local"
        }
    );
}

#[test]
fn uploads_and_info_lists_render_without_state() {
    let mut store = store_for(json!({
        "sections": [
            { "type": "info_list", "sectionId": "i", "items": ["Wear PPE"] },
            { "type": "file_upload_group", "sectionId": "f",
              "upload_fields": [{ "fieldId": "photo", "label": "Photo" }, { "fieldId": "plan", "label": "Plan" }] }
        ]
    }));
    store.set_field_value("f", "photo", "weld.jpg");

    let views = store.walk();
    assert_eq!(
        views[0].body,
        SectionBody::InfoList {
            items: vec!["Wear PPE".to_string()]
        }
    );
    let SectionBody::FileUploadGroup { uploads } = &views[1].body else {
        panic!("expected uploads");
    };
    assert_eq!(uploads[0].attached.as_deref(), Some("weld.jpg"));
    assert_eq!(uploads[1].attached, None);
}

#[test]
fn descriptors_serialize_with_type_tags() {
    let store = store_for(json!({
        "sections": [{ "type": "mystery", "sectionId": "m", "sectionTitle": "?" }]
    }));
    let out = serde_json::to_value(store.walk()).unwrap();
    assert_eq!(
        out,
        json!([{ "section_id": "m", "title": "?", "type": "unsupported", "kind": "mystery" }])
    );
}
