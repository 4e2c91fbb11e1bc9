//! Pure state transitions.
//!
//! A command is first planned against the current state, which either rejects
//! it or names the request to send. The response then comes back as a
//! [`Change`] and is folded in by [`reduce`]. Nothing here performs I/O.

use shared::domain::{ActiveSheet, Conditions, Field, Row, Sheet};
use thiserror::Error;

use crate::{
    events::StoreEvent,
    state::{RouteParams, StoreState},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("no sheet is active")]
    NoActiveSheet,
    #[error("row {index} is out of range ({len} rows)")]
    RowOutOfRange { index: usize, len: usize },
    #[error("column {index} is out of range ({len} columns)")]
    ColumnOutOfRange { index: usize, len: usize },
    #[error("command targets revision {expected} but the active sheet is at {current}")]
    Stale { expected: u64, current: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    ListSheets,
    LoadSheet {
        name: String,
    },
    UpdateRow {
        sheet: String,
        row_index: usize,
        updates: Row,
        conditions: Conditions,
    },
    DeleteRow {
        sheet: String,
        row_index: usize,
        conditions: Conditions,
    },
    RenameColumn {
        sheet: String,
        column_index: usize,
        old_name: String,
        new_name: String,
    },
    CreateRow {
        sheet: String,
        data: Row,
    },
    CreateColumn {
        sheet: String,
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Record the route, then select the sheet it names.
    Navigate { sheet: String },
    Send(Request),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    RouteChanged {
        sheet: String,
    },
    SheetsLoaded(Vec<Sheet>),
    SheetLoaded {
        name: String,
        rows: Vec<Row>,
        fields: Vec<Field>,
    },
    RowReplaced {
        row_index: usize,
        row: Row,
    },
    RowRemoved {
        row_index: usize,
    },
    RowAppended(Row),
    FieldRenamed {
        column_index: usize,
        old_name: String,
        new_name: String,
    },
    FieldAppended(Field),
}

pub fn plan(state: &StoreState, event: StoreEvent) -> Result<Plan, Rejection> {
    let plan = match event {
        StoreEvent::PushState(location) => Plan::Navigate {
            sheet: sheet_from_location(&location),
        },
        StoreEvent::GetList => Plan::Send(Request::ListSheets),
        StoreEvent::SelectSheet(name) => Plan::Send(Request::LoadSheet { name }),
        StoreEvent::Update {
            row_index,
            updates,
            revision,
        } => {
            let (sheet, conditions) = target_row(state, row_index, revision)?;
            Plan::Send(Request::UpdateRow {
                sheet,
                row_index,
                updates,
                conditions,
            })
        }
        StoreEvent::DeleteRow {
            row_index,
            revision,
        } => {
            let (sheet, conditions) = target_row(state, row_index, revision)?;
            Plan::Send(Request::DeleteRow {
                sheet,
                row_index,
                conditions,
            })
        }
        StoreEvent::RenameField {
            column_index,
            old_value,
            value,
            revision,
        } => {
            let sheet = active_name(state, revision)?;
            let len = state.active_sheet.fields.as_ref().map_or(0, Vec::len);
            if column_index >= len {
                return Err(Rejection::ColumnOutOfRange {
                    index: column_index,
                    len,
                });
            }
            Plan::Send(Request::RenameColumn {
                sheet,
                column_index,
                old_name: old_value,
                new_name: value,
            })
        }
        StoreEvent::InsertRow { data, revision } => Plan::Send(Request::CreateRow {
            sheet: active_name(state, revision)?,
            data,
        }),
        StoreEvent::AddField { name, revision } => Plan::Send(Request::CreateColumn {
            sheet: active_name(state, revision)?,
            name,
        }),
    };
    Ok(plan)
}

pub fn reduce(mut state: StoreState, change: Change) -> StoreState {
    match change {
        Change::RouteChanged { sheet } => {
            state.params.sheet = Some(sheet);
            return state;
        }
        Change::SheetsLoaded(sheets) => {
            state.sheets = sheets;
            return state;
        }
        Change::SheetLoaded { name, rows, fields } => {
            state.active_sheet = ActiveSheet {
                name: Some(name),
                fields: Some(fields),
                rows: Some(rows),
                revision: state.active_sheet.revision,
            };
        }
        Change::RowReplaced { row_index, row } => {
            if let Some(slot) = state
                .active_sheet
                .rows
                .as_mut()
                .and_then(|rows| rows.get_mut(row_index))
            {
                *slot = row;
            }
        }
        Change::RowRemoved { row_index } => {
            if let Some(rows) = state.active_sheet.rows.as_mut() {
                if row_index < rows.len() {
                    rows.remove(row_index);
                }
            }
        }
        Change::RowAppended(row) => {
            state.active_sheet.rows.get_or_insert_with(Vec::new).push(row);
        }
        Change::FieldRenamed {
            column_index,
            old_name,
            new_name,
        } => {
            if let Some(field) = state
                .active_sheet
                .fields
                .as_mut()
                .and_then(|fields| fields.get_mut(column_index))
            {
                field.name = new_name.clone();
            }
            for row in state.active_sheet.rows.iter_mut().flatten() {
                rename_key(row, &old_name, &new_name);
            }
        }
        Change::FieldAppended(field) => {
            state
                .active_sheet
                .fields
                .get_or_insert_with(Vec::new)
                .push(field);
        }
    }
    state.active_sheet.revision += 1;
    state
}

/// The sheet a location points at: its last path segment, taken verbatim.
pub fn sheet_from_location(location: &str) -> String {
    location.rsplit('/').next().unwrap_or_default().to_string()
}

pub fn primary_keys(fields: &[Field]) -> Vec<&str> {
    fields
        .iter()
        .filter(|field| field.is_primary_key())
        .map(|field| field.name.as_str())
        .collect()
}

/// Conditions identifying `row`: its primary-key values, or the whole row when
/// the sheet declares no key.
pub fn row_conditions(fields: &[Field], row: &Row) -> Conditions {
    let keys = primary_keys(fields);
    if keys.is_empty() {
        return row.clone();
    }
    keys.into_iter()
        .filter_map(|key| row.get(key).map(|value| (key.to_string(), value.clone())))
        .collect()
}

/// The sheet to open after the list loads: the routed one, else the first.
pub fn initial_sheet(params: &RouteParams, sheets: &[Sheet]) -> Option<String> {
    params
        .sheet
        .as_deref()
        .filter(|sheet| !sheet.is_empty())
        .map(str::to_string)
        .or_else(|| sheets.first().map(|sheet| sheet.name.clone()))
}

fn active_name(state: &StoreState, revision: Option<u64>) -> Result<String, Rejection> {
    let active = &state.active_sheet;
    if let Some(expected) = revision {
        if expected != active.revision {
            return Err(Rejection::Stale {
                expected,
                current: active.revision,
            });
        }
    }
    active.name.clone().ok_or(Rejection::NoActiveSheet)
}

fn target_row(
    state: &StoreState,
    row_index: usize,
    revision: Option<u64>,
) -> Result<(String, Conditions), Rejection> {
    let sheet = active_name(state, revision)?;
    let active = &state.active_sheet;
    let rows = active.rows.as_deref().unwrap_or_default();
    let row = rows.get(row_index).ok_or(Rejection::RowOutOfRange {
        index: row_index,
        len: rows.len(),
    })?;
    let fields = active.fields.as_deref().unwrap_or_default();
    Ok((sheet, row_conditions(fields, row)))
}

fn rename_key(row: &mut Row, old_name: &str, new_name: &str) {
    if let Some(value) = row.shift_remove(old_name) {
        row.insert(new_name.to_string(), value);
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
