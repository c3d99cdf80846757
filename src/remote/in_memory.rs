//! In-memory implementation of RemoteStore for testing and development
//!
//! Tables are plain `Vec<Value>` so insertion order is preserved, matching
//! the "rows in returned order" contract the stores rely on. Ids are
//! assigned on insert when the record does not carry one.
//!
//! Read shapes are accepted but not interpreted: rows come back as stored.
//! Tests that need embedded related records insert them pre-joined.

use crate::core::error::RemoteError;
use crate::remote::RemoteStore;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory remote store
///
/// Cheap to clone; all clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryRemote {
    tables: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl InMemoryRemote {
    /// Create an empty in-memory remote
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with rows, replacing any existing content
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables.insert(table.to_string(), rows);
    }

    /// Current row count of a table
    pub fn len(&self, table: &str) -> usize {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.get(table).map_or(0, Vec::len)
    }

    /// Whether a table is empty or absent
    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    fn row_id(row: &Value) -> Option<Uuid> {
        row.get("id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn list_all(
        &self,
        table: &str,
        _read_shape: Option<&str>,
    ) -> Result<Vec<Value>, RemoteError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(tables.get(table).cloned().unwrap_or_default())
    }

    async fn insert(
        &self,
        table: &str,
        mut record: Value,
        _read_shape: Option<&str>,
    ) -> Result<Value, RemoteError> {
        let Some(fields) = record.as_object_mut() else {
            return Err(RemoteError::with_status("record must be a JSON object", 400));
        };
        if !fields.contains_key("id") {
            fields.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tables
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        table: &str,
        id: Uuid,
        patch: Value,
        _read_shape: Option<&str>,
    ) -> Result<Value, RemoteError> {
        let Some(patch_fields) = patch.as_object() else {
            return Err(RemoteError::with_status("patch must be a JSON object", 400));
        };

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| RemoteError::with_status(format!("unknown table '{}'", table), 404))?;

        let row = rows
            .iter_mut()
            .find(|row| Self::row_id(row) == Some(id))
            .ok_or_else(|| {
                RemoteError::with_status(format!("no row with id '{}' in '{}'", id, table), 404)
            })?;

        if let Some(fields) = row.as_object_mut() {
            for (key, value) in patch_fields {
                fields.insert(key.clone(), value.clone());
            }
        }
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<(), RemoteError> {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|row| Self::row_id(row) != Some(id));
        }
        Ok(())
    }

    async fn call_procedure(&self, name: &str, _args: Value) -> Result<Value, RemoteError> {
        Err(RemoteError::with_status(
            format!("procedure '{}' is not registered on the in-memory remote", name),
            404,
        ))
    }

    async fn ping(&self, _table: &str) -> Result<(), RemoteError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let remote = InMemoryRemote::new();

        let row = remote
            .insert("rooms", json!({"number": "101"}), None)
            .await
            .unwrap();

        let id = row["id"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(remote.len("rooms"), 1);
    }

    #[tokio::test]
    async fn test_insert_keeps_provided_id() {
        let remote = InMemoryRemote::new();
        let id = Uuid::new_v4();

        let row = remote
            .insert("rooms", json!({"id": id.to_string(), "number": "102"}), None)
            .await
            .unwrap();

        assert_eq!(row["id"], json!(id.to_string()));
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let remote = InMemoryRemote::new();
        for number in ["101", "102", "103"] {
            remote
                .insert("rooms", json!({"number": number}), None)
                .await
                .unwrap();
        }

        let rows = remote.list_all("rooms", None).await.unwrap();
        let numbers: Vec<_> = rows.iter().map(|r| r["number"].as_str().unwrap()).collect();
        assert_eq!(numbers, vec!["101", "102", "103"]);
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let remote = InMemoryRemote::new();
        let row = remote
            .insert("guests", json!({"name": "Alice", "email": "a@b.c"}), None)
            .await
            .unwrap();
        let id = Uuid::parse_str(row["id"].as_str().unwrap()).unwrap();

        let updated = remote
            .update("guests", id, json!({"name": "Alicia"}), None)
            .await
            .unwrap();

        assert_eq!(updated["name"], "Alicia");
        assert_eq!(updated["email"], "a@b.c");
    }

    #[tokio::test]
    async fn test_update_missing_row_is_404() {
        let remote = InMemoryRemote::new();
        remote.seed("guests", vec![]);

        let err = remote
            .update("guests", Uuid::new_v4(), json!({"name": "X"}), None)
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(404));
    }

    #[tokio::test]
    async fn test_delete_removes_matching_row() {
        let remote = InMemoryRemote::new();
        let keep = remote
            .insert("rooms", json!({"number": "101"}), None)
            .await
            .unwrap();
        let drop = remote
            .insert("rooms", json!({"number": "102"}), None)
            .await
            .unwrap();
        let drop_id = Uuid::parse_str(drop["id"].as_str().unwrap()).unwrap();

        remote.delete("rooms", drop_id).await.unwrap();

        let rows = remote.list_all("rooms", None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], keep["id"]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let remote = InMemoryRemote::new();
        assert!(remote.delete("rooms", Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn test_procedures_are_not_registered() {
        let remote = InMemoryRemote::new();
        let err = remote
            .call_procedure("check_room_availability", json!({}))
            .await
            .unwrap_err();
        assert!(err.message.contains("check_room_availability"));
    }

    #[tokio::test]
    async fn test_ping_succeeds() {
        let remote = InMemoryRemote::new();
        assert!(remote.ping("guests").await.is_ok());
    }
}
