use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Constraint string the backend reports for key columns.
pub const PRIMARY_KEY_CONSTRAINT: &str = "PRIMARY KEY";

/// One record of a sheet, keyed by column name.
pub type Row = Map<String, Value>;

/// Column/value pairs identifying a row for update and delete.
pub type Conditions = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Sheet {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Map::new(),
        }
    }
}

/// Column schema entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Field {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            extra: Map::new(),
        }
    }

    pub fn primary_key(name: impl Into<String>) -> Self {
        Self {
            constraint: Some(PRIMARY_KEY_CONSTRAINT.to_string()),
            ..Self::named(name)
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraint.as_deref() == Some(PRIMARY_KEY_CONSTRAINT)
    }
}

/// Snapshot of the sheet currently on screen.
///
/// `revision` is bumped whenever the snapshot is replaced or mutated, so a
/// command issued against an older snapshot can be told apart from a fresh one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveSheet {
    pub name: Option<String>,
    pub fields: Option<Vec<Field>>,
    pub rows: Option<Vec<Row>>,
    #[serde(default)]
    pub revision: u64,
}

impl ActiveSheet {
    pub fn is_selected(&self) -> bool {
        self.name.is_some()
    }
}

/// Opaque user payload returned by `/user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(pub Value);

/// Opaque session payload returned by `/authenticate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session(pub Value);
