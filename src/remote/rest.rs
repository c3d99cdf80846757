//! PostgREST-convention HTTP backend
//!
//! Talks to a hosted relational backend over its REST surface:
//!
//! - `GET    /rest/v1/{table}?select={shape}`: list
//! - `POST   /rest/v1/{table}` with `Prefer: return=representation`: insert
//! - `PATCH  /rest/v1/{table}?id=eq.{id}`: update
//! - `DELETE /rest/v1/{table}?id=eq.{id}`: delete
//! - `POST   /rest/v1/rpc/{name}`: remote procedure call
//!
//! Single-row mutations ask the backend to return the affected row so the
//! stores can patch their mirrors without a second read. Non-2xx responses
//! are mapped into [`RemoteError`] with the HTTP status and, when the body
//! parses as a PostgREST error document, its `code` and `message`.
//!
//! No retries and no layer-level timeout: a failed call surfaces once.

use crate::config::RemoteConfig;
use crate::core::error::RemoteError;
use crate::remote::RemoteStore;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

/// HTTP remote store speaking PostgREST conventions
#[derive(Clone)]
pub struct RestRemote {
    http: Client,
    config: RemoteConfig,
}

/// Error document returned by PostgREST backends
#[derive(Debug, Deserialize)]
struct ErrorDocument {
    message: Option<String>,
    code: Option<String>,
}

impl RestRemote {
    /// Create a client for the given backend
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    fn rpc_url(&self, name: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.config.url.trim_end_matches('/'), name)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key);
        if let Some(schema) = &self.config.schema {
            builder = builder.header("Accept-Profile", schema);
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::message(format!("failed to connect: {}", e)))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(Self::error_from(status, response.text().await.ok()))
    }

    fn error_from(status: StatusCode, body: Option<String>) -> RemoteError {
        let body = body.unwrap_or_default();
        match serde_json::from_str::<ErrorDocument>(&body) {
            Ok(doc) => RemoteError {
                message: doc.message.unwrap_or_else(|| status.to_string()),
                code: doc.code,
                status: Some(status.as_u16()),
            },
            Err(_) => RemoteError::with_status(
                if body.is_empty() { status.to_string() } else { body },
                status.as_u16(),
            ),
        }
    }

    /// Mutations return the affected rows as an array; single-row calls
    /// expect exactly one element.
    fn single_row(mut rows: Vec<Value>, table: &str) -> Result<Value, RemoteError> {
        if rows.is_empty() {
            return Err(RemoteError::message(format!(
                "backend returned no row for mutation on '{}'",
                table
            )));
        }
        Ok(rows.remove(0))
    }
}

#[async_trait]
impl RemoteStore for RestRemote {
    async fn list_all(
        &self,
        table: &str,
        read_shape: Option<&str>,
    ) -> Result<Vec<Value>, RemoteError> {
        let select = read_shape.unwrap_or("*");
        let response = self
            .send(
                self.request(Method::GET, &self.table_url(table))
                    .query(&[("select", select)]),
            )
            .await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| RemoteError::message(format!("invalid list payload: {}", e)))
    }

    async fn insert(
        &self,
        table: &str,
        record: Value,
        read_shape: Option<&str>,
    ) -> Result<Value, RemoteError> {
        let select = read_shape.unwrap_or("*");
        let response = self
            .send(
                self.request(Method::POST, &self.table_url(table))
                    .header("Prefer", "return=representation")
                    .query(&[("select", select)])
                    .json(&[record]),
            )
            .await?;
        let rows = response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| RemoteError::message(format!("invalid insert payload: {}", e)))?;
        Self::single_row(rows, table)
    }

    async fn update(
        &self,
        table: &str,
        id: Uuid,
        patch: Value,
        read_shape: Option<&str>,
    ) -> Result<Value, RemoteError> {
        let select = read_shape.unwrap_or("*");
        let response = self
            .send(
                self.request(Method::PATCH, &self.table_url(table))
                    .header("Prefer", "return=representation")
                    .query(&[("id", format!("eq.{}", id)), ("select", select.to_string())])
                    .json(&patch),
            )
            .await?;
        let rows = response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| RemoteError::message(format!("invalid update payload: {}", e)))?;
        Self::single_row(rows, table)
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<(), RemoteError> {
        self.send(
            self.request(Method::DELETE, &self.table_url(table))
                .query(&[("id", format!("eq.{}", id))]),
        )
        .await?;
        Ok(())
    }

    async fn call_procedure(&self, name: &str, args: Value) -> Result<Value, RemoteError> {
        let response = self
            .send(self.request(Method::POST, &self.rpc_url(name)).json(&args))
            .await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| RemoteError::message(format!("invalid procedure result: {}", e)))
    }

    async fn ping(&self, table: &str) -> Result<(), RemoteError> {
        self.send(
            self.request(Method::GET, &self.table_url(table))
                .query(&[("select", "id"), ("limit", "1")]),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote() -> RestRemote {
        RestRemote::new(RemoteConfig {
            url: "https://example.test/".to_string(),
            api_key: "anon".to_string(),
            schema: None,
        })
    }

    #[test]
    fn test_table_url_strips_trailing_slash() {
        assert_eq!(
            remote().table_url("rooms"),
            "https://example.test/rest/v1/rooms"
        );
    }

    #[test]
    fn test_rpc_url() {
        assert_eq!(
            remote().rpc_url("check_room_availability"),
            "https://example.test/rest/v1/rpc/check_room_availability"
        );
    }

    #[test]
    fn test_error_document_is_parsed() {
        let err = RestRemote::error_from(
            StatusCode::CONFLICT,
            Some(r#"{"message":"duplicate key value","code":"23505"}"#.to_string()),
        );

        assert_eq!(err.status, Some(409));
        assert_eq!(err.code.as_deref(), Some("23505"));
        assert!(err.message.contains("duplicate"));
    }

    #[test]
    fn test_opaque_body_falls_back_to_raw_text() {
        let err =
            RestRemote::error_from(StatusCode::BAD_GATEWAY, Some("upstream down".to_string()));

        assert_eq!(err.status, Some(502));
        assert_eq!(err.message, "upstream down");
        assert!(err.code.is_none());
    }

    #[test]
    fn test_single_row_rejects_empty_result() {
        let err = RestRemote::single_row(vec![], "rooms").unwrap_err();
        assert!(err.message.contains("rooms"));
    }
}
