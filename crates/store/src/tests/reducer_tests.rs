use super::*;
use serde_json::{json, Value};

fn row(value: Value) -> Row {
    value.as_object().expect("object").clone()
}

fn loaded_state() -> StoreState {
    reduce(
        StoreState::default(),
        Change::SheetLoaded {
            name: "people".into(),
            rows: vec![
                row(json!({"id": 1, "name": "ada", "team": "core"})),
                row(json!({"id": 2, "name": "grace", "team": "core"})),
            ],
            fields: vec![
                Field::primary_key("id"),
                Field::named("name"),
                Field::named("team"),
            ],
        },
    )
}

#[test]
fn sheet_is_last_location_segment() {
    assert_eq!(sheet_from_location("/a/b/my-sheet"), "my-sheet");
    assert_eq!(sheet_from_location("my-sheet"), "my-sheet");
    assert_eq!(sheet_from_location("/sheets/"), "");
}

#[test]
fn location_segment_is_not_decoded() {
    assert_eq!(sheet_from_location("/s/my%20sheet"), "my%20sheet");
}

#[test]
fn conditions_pick_primary_key_values() {
    let fields = vec![
        Field::primary_key("org"),
        Field::named("name"),
        Field::primary_key("id"),
    ];
    let conditions = row_conditions(
        &fields,
        &row(json!({"org": "acme", "id": 3, "name": "ada"})),
    );
    assert_eq!(conditions, row(json!({"org": "acme", "id": 3})));
}

#[test]
fn conditions_fall_back_to_whole_row_without_primary_key() {
    let fields = vec![Field::named("name"), Field::named("team")];
    let original = row(json!({"name": "ada", "team": "core"}));
    assert_eq!(row_conditions(&fields, &original), original);
}

#[test]
fn conditions_skip_key_columns_missing_from_row() {
    let fields = vec![Field::primary_key("id"), Field::primary_key("org")];
    let conditions = row_conditions(&fields, &row(json!({"id": 3})));
    assert_eq!(conditions, row(json!({"id": 3})));
}

#[test]
fn other_constraints_are_not_keys() {
    let mut unique = Field::named("email");
    unique.constraint = Some("UNIQUE".into());
    assert!(primary_keys(&[unique]).is_empty());
}

#[test]
fn routed_sheet_wins_over_first_sheet() {
    let sheets = vec![Sheet::named("x"), Sheet::named("y")];
    let routed = RouteParams {
        sheet: Some("y".into()),
    };
    assert_eq!(initial_sheet(&routed, &sheets).as_deref(), Some("y"));
    assert_eq!(
        initial_sheet(&RouteParams::default(), &sheets).as_deref(),
        Some("x")
    );
    assert_eq!(initial_sheet(&RouteParams::default(), &[]), None);
}

#[test]
fn empty_routed_sheet_counts_as_absent() {
    let routed = RouteParams {
        sheet: Some(String::new()),
    };
    assert_eq!(
        initial_sheet(&routed, &[Sheet::named("x")]).as_deref(),
        Some("x")
    );
}

#[test]
fn loading_a_sheet_replaces_snapshot_and_bumps_revision() {
    let state = loaded_state();
    assert_eq!(state.active_sheet.revision, 1);

    let state = reduce(
        state,
        Change::SheetLoaded {
            name: "pets".into(),
            rows: Vec::new(),
            fields: vec![Field::named("kind")],
        },
    );
    assert_eq!(state.active_sheet.name.as_deref(), Some("pets"));
    assert_eq!(state.active_sheet.rows, Some(Vec::new()));
    assert_eq!(state.active_sheet.revision, 2);
}

#[test]
fn update_plan_targets_primary_key() {
    let state = loaded_state();
    let planned = plan(
        &state,
        StoreEvent::Update {
            row_index: 1,
            updates: row(json!({"team": "infra"})),
            revision: Some(1),
        },
    )
    .expect("plan");

    assert_eq!(
        planned,
        Plan::Send(Request::UpdateRow {
            sheet: "people".into(),
            row_index: 1,
            updates: row(json!({"team": "infra"})),
            conditions: row(json!({"id": 2})),
        })
    );
}

#[test]
fn stale_revision_is_rejected() {
    let state = loaded_state();
    let rejection = plan(
        &state,
        StoreEvent::DeleteRow {
            row_index: 0,
            revision: Some(0),
        },
    )
    .expect_err("stale");
    assert_eq!(
        rejection,
        Rejection::Stale {
            expected: 0,
            current: 1
        }
    );
}

#[test]
fn row_commands_need_an_active_sheet_and_a_row() {
    let rejection = plan(
        &StoreState::default(),
        StoreEvent::DeleteRow {
            row_index: 0,
            revision: None,
        },
    )
    .expect_err("no sheet");
    assert_eq!(rejection, Rejection::NoActiveSheet);

    let rejection = plan(
        &loaded_state(),
        StoreEvent::DeleteRow {
            row_index: 5,
            revision: None,
        },
    )
    .expect_err("out of range");
    assert_eq!(rejection, Rejection::RowOutOfRange { index: 5, len: 2 });
}

#[test]
fn rename_needs_an_existing_column() {
    let rejection = plan(
        &loaded_state(),
        StoreEvent::RenameField {
            column_index: 3,
            old_value: "x".into(),
            value: "y".into(),
            revision: None,
        },
    )
    .expect_err("out of range");
    assert_eq!(rejection, Rejection::ColumnOutOfRange { index: 3, len: 3 });
}

#[test]
fn push_state_plans_navigation() {
    let planned = plan(
        &StoreState::default(),
        StoreEvent::PushState("/a/b/my-sheet".into()),
    )
    .expect("plan");
    assert_eq!(
        planned,
        Plan::Navigate {
            sheet: "my-sheet".into()
        }
    );
}

#[test]
fn replaced_row_is_exactly_the_server_row() {
    let server_row = row(json!({"id": 2, "team": "infra"}));
    let state = reduce(
        loaded_state(),
        Change::RowReplaced {
            row_index: 1,
            row: server_row.clone(),
        },
    );
    let rows = state.active_sheet.rows.expect("rows");
    assert_eq!(rows[1], server_row);
    assert_eq!(state.active_sheet.revision, 2);
}

#[test]
fn removed_row_shifts_following_rows() {
    let state = reduce(loaded_state(), Change::RowRemoved { row_index: 0 });
    let rows = state.active_sheet.rows.expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&json!("grace")));
}

#[test]
fn renamed_field_moves_key_in_every_row() {
    let state = reduce(
        loaded_state(),
        Change::FieldRenamed {
            column_index: 2,
            old_name: "team".into(),
            new_name: "squad".into(),
        },
    );
    let fields = state.active_sheet.fields.expect("fields");
    assert_eq!(fields[2].name, "squad");
    for row in state.active_sheet.rows.expect("rows") {
        assert!(!row.contains_key("team"));
        assert_eq!(row.get("squad"), Some(&json!("core")));
    }
}

#[test]
fn renaming_a_key_absent_from_a_row_leaves_it_alone() {
    let mut state = loaded_state();
    state.active_sheet.rows = Some(vec![row(json!({"id": 1}))]);
    let state = reduce(
        state,
        Change::FieldRenamed {
            column_index: 2,
            old_name: "team".into(),
            new_name: "squad".into(),
        },
    );
    assert_eq!(state.active_sheet.rows.expect("rows")[0], row(json!({"id": 1})));
}

#[test]
fn route_and_list_changes_do_not_touch_the_snapshot() {
    let state = reduce(
        loaded_state(),
        Change::RouteChanged {
            sheet: "pets".into(),
        },
    );
    let state = reduce(state, Change::SheetsLoaded(vec![Sheet::named("pets")]));
    assert_eq!(state.params.sheet.as_deref(), Some("pets"));
    assert_eq!(state.sheets, vec![Sheet::named("pets")]);
    assert_eq!(state.active_sheet.revision, 1);
    assert_eq!(state.active_sheet.name.as_deref(), Some("people"));
}
