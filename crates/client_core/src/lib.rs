use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{Conditions, Field, Row, Session, Sheet, User},
    protocol::{AuthenticateQuery, CreateColumnRequest},
};
use tracing::debug;

pub mod config;
pub mod error;
pub mod transport;

pub use config::{load_settings, ClientSettings};
pub use error::ClientError;

use transport::{conditions_query, join_url, resolve_base_url};

/// Backend resource operations, one HTTP call each.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    async fn list_sheets(&self) -> Result<Vec<Sheet>, ClientError>;
    async fn create_sheet(&self, data: &Value) -> Result<Sheet, ClientError>;
    async fn update_sheet(&self, name: &str, updates: &Value) -> Result<Sheet, ClientError>;
    async fn delete_sheet(&self, name: &str) -> Result<(), ClientError>;

    async fn list_rows(&self, sheet: &str) -> Result<Vec<Row>, ClientError>;
    async fn update_row(
        &self,
        sheet: &str,
        updates: &Row,
        conditions: &Conditions,
    ) -> Result<Row, ClientError>;
    async fn create_row(&self, sheet: &str, data: &Row) -> Result<Row, ClientError>;
    async fn delete_row(&self, sheet: &str, conditions: &Conditions) -> Result<(), ClientError>;

    async fn list_columns(&self, sheet: &str) -> Result<Vec<Field>, ClientError>;
    async fn create_column(&self, sheet: &str, name: &str) -> Result<Field, ClientError>;
    async fn update_column(
        &self,
        sheet: &str,
        name: &str,
        updates: &Value,
    ) -> Result<Field, ClientError>;
    async fn delete_column(&self, sheet: &str, name: &str) -> Result<(), ClientError>;

    async fn authenticate(&self, code: &str) -> Result<Session, ClientError>;
    async fn logout(&self) -> Result<(), ClientError>;
    async fn current_user(&self) -> Result<User, ClientError>;
}

/// HTTP implementation of [`SheetsApi`].
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: Client,
    base_url: String,
}

impl SheetsClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        let base_url = resolve_base_url(&settings.api_host, &settings.origin)?;
        Self::with_base_url(base_url, settings.with_credentials())
    }

    /// Builds a client for an absolute base url.
    ///
    /// With credentials on, a cookie store keeps the session cookie across calls.
    pub fn with_base_url(
        base_url: impl Into<String>,
        with_credentials: bool,
    ) -> Result<Self, ClientError> {
        let http = Client::builder().cookie_store(with_credentials).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = join_url(&self.base_url, path);
        debug!(%method, %url, "api request");
        self.http.request(method, url)
    }

    async fn checked(req: RequestBuilder) -> Result<Response, ClientError> {
        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await?;
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(res)
    }

    async fn fetch<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ClientError> {
        let bytes = Self::checked(req).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn execute(req: RequestBuilder) -> Result<(), ClientError> {
        Self::checked(req).await?;
        Ok(())
    }
}

#[async_trait]
impl SheetsApi for SheetsClient {
    async fn list_sheets(&self) -> Result<Vec<Sheet>, ClientError> {
        Self::fetch(self.request(Method::GET, "/sheets")).await
    }

    async fn create_sheet(&self, data: &Value) -> Result<Sheet, ClientError> {
        Self::fetch(self.request(Method::POST, "/sheets").json(data)).await
    }

    async fn update_sheet(&self, name: &str, updates: &Value) -> Result<Sheet, ClientError> {
        Self::fetch(
            self.request(Method::PATCH, &format!("/sheets/{name}"))
                .json(updates),
        )
        .await
    }

    async fn delete_sheet(&self, name: &str) -> Result<(), ClientError> {
        Self::execute(self.request(Method::DELETE, &format!("/sheets/{name}"))).await
    }

    async fn list_rows(&self, sheet: &str) -> Result<Vec<Row>, ClientError> {
        Self::fetch(self.request(Method::GET, &format!("/sheets/{sheet}/rows"))).await
    }

    async fn update_row(
        &self,
        sheet: &str,
        updates: &Row,
        conditions: &Conditions,
    ) -> Result<Row, ClientError> {
        Self::fetch(
            self.request(Method::PATCH, &format!("/sheets/{sheet}/rows"))
                .query(&conditions_query(conditions))
                .json(updates),
        )
        .await
    }

    async fn create_row(&self, sheet: &str, data: &Row) -> Result<Row, ClientError> {
        Self::fetch(
            self.request(Method::POST, &format!("/sheets/{sheet}/rows"))
                .json(data),
        )
        .await
    }

    async fn delete_row(&self, sheet: &str, conditions: &Conditions) -> Result<(), ClientError> {
        Self::execute(
            self.request(Method::DELETE, &format!("/sheets/{sheet}/rows"))
                .query(&conditions_query(conditions)),
        )
        .await
    }

    async fn list_columns(&self, sheet: &str) -> Result<Vec<Field>, ClientError> {
        Self::fetch(self.request(Method::GET, &format!("/sheets/{sheet}/columns"))).await
    }

    async fn create_column(&self, sheet: &str, name: &str) -> Result<Field, ClientError> {
        let payload = CreateColumnRequest {
            name: name.to_string(),
        };
        Self::fetch(
            self.request(Method::POST, &format!("/sheets/{sheet}/columns"))
                .json(&payload),
        )
        .await
    }

    async fn update_column(
        &self,
        sheet: &str,
        name: &str,
        updates: &Value,
    ) -> Result<Field, ClientError> {
        Self::fetch(
            self.request(Method::PATCH, &format!("/sheets/{sheet}/columns/{name}"))
                .json(updates),
        )
        .await
    }

    async fn delete_column(&self, sheet: &str, name: &str) -> Result<(), ClientError> {
        Self::execute(self.request(Method::DELETE, &format!("/sheets/{sheet}/columns/{name}")))
            .await
    }

    async fn authenticate(&self, code: &str) -> Result<Session, ClientError> {
        let query = AuthenticateQuery {
            code: code.to_string(),
        };
        Self::fetch(self.request(Method::POST, "/authenticate").query(&query)).await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        Self::execute(self.request(Method::POST, "/logout")).await
    }

    async fn current_user(&self) -> Result<User, ClientError> {
        Self::fetch(self.request(Method::GET, "/user")).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
