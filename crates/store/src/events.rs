//! Commands accepted by the store and the signals it emits.

use std::sync::Arc;

use shared::domain::Row;

use crate::state::StoreState;

/// A command for the store.
///
/// Row and field commands may carry the `revision` of the snapshot they were
/// issued against; a mismatch makes the store drop them as stale. `None`
/// skips the check.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    PushState(String),
    GetList,
    SelectSheet(String),
    Update {
        row_index: usize,
        updates: Row,
        revision: Option<u64>,
    },
    DeleteRow {
        row_index: usize,
        revision: Option<u64>,
    },
    RenameField {
        column_index: usize,
        old_value: String,
        value: String,
        revision: Option<u64>,
    },
    InsertRow {
        data: Row,
        revision: Option<u64>,
    },
    AddField {
        name: String,
        revision: Option<u64>,
    },
}

impl StoreEvent {
    /// Name of the event on the shell's event bus.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PushState(_) => "pushState",
            Self::GetList => "store:getList",
            Self::SelectSheet(_) => "store:selectSheet",
            Self::Update { .. } => "store:update",
            Self::DeleteRow { .. } => "store:deleteRow",
            Self::RenameField { .. } => "store:renameField",
            Self::InsertRow { .. } => "store:insertRow",
            Self::AddField { .. } => "store:addField",
        }
    }
}

#[derive(Debug, Clone)]
pub enum StoreSignal {
    /// The view should redraw from this snapshot.
    Render(Arc<StoreState>),
}

impl StoreSignal {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Render(_) => "render",
        }
    }
}
