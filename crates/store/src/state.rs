use serde::{Deserialize, Serialize};
use shared::domain::{ActiveSheet, Sheet};

/// Parameters the router extracted from the current location.
///
/// This is router state: a `PushState` records it before the sheet loads, so it
/// is not rolled back when that load fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParams {
    pub sheet: Option<String>,
}

/// `Loading` is not a variant: it only exists while the owning task awaits a
/// `LoadSheet`, and nothing can observe the state during that await.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetStatus {
    Unselected,
    Loaded,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    pub sheets: Vec<Sheet>,
    pub active_sheet: ActiveSheet,
    pub params: RouteParams,
}

impl StoreState {
    pub fn with_params(params: RouteParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn status(&self) -> SheetStatus {
        if self.active_sheet.is_selected() {
            SheetStatus::Loaded
        } else {
            SheetStatus::Unselected
        }
    }
}
