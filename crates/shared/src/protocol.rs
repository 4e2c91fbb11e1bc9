use serde::{Deserialize, Serialize};

/// Body of `POST /sheets/{sheet}/columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateColumnRequest {
    pub name: String,
}

/// Body of `PATCH /sheets/{sheet}/columns/{name}` when only the name changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameColumnRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticateQuery {
    pub code: String,
}
