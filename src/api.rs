use crate::error::TodoError;
use crate::models::{DuePeriod, NewTodo, Todo, TodoPatch, TodoStatus};
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Thin client for the `todos` table behind Supabase's PostgREST API.
#[derive(Clone, Debug)]
pub struct StoreClient {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl StoreClient {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> StoreClient {
        StoreClient {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// All todos, newest first.
    pub async fn fetch_all(&self) -> Result<Vec<Todo>, TodoError> {
        let res = self
            .authorized(self.client.get(self.table_url()))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;

        let todos = check(res, "fetching todos")
            .await?
            .json::<Vec<Todo>>()
            .await?;
        debug!(count = todos.len(), "fetched todos");
        Ok(todos)
    }

    pub async fn create(&self, new_todo: &NewTodo) -> Result<Todo, TodoError> {
        let res = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&[new_todo])
            .send()
            .await?;

        let created = check(res, "creating todo")
            .await?
            .json::<Vec<Todo>>()
            .await?
            .into_iter()
            .next()
            .ok_or(TodoError::EmptyResponse)?;
        debug!(id = %created.id, "created todo");
        Ok(created)
    }

    pub async fn update_status(&self, id: &str, status: TodoStatus) -> Result<(), TodoError> {
        let patch = TodoPatch {
            status: Some(status),
            ..TodoPatch::default()
        };
        self.update(id, &patch).await
    }

    /// Applies the set fields of `patch` and stamps `updated_at`.
    pub async fn update(&self, id: &str, patch: &TodoPatch) -> Result<(), TodoError> {
        let body = patch_body(patch, &Utc::now().to_rfc3339())?;

        let res = self
            .authorized(self.client.patch(self.table_url()))
            .query(&[("id", format!("eq.{}", id))])
            .json(&body)
            .send()
            .await?;

        check(res, "updating todo").await?;
        debug!(id, "updated todo");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), TodoError> {
        let res = self
            .authorized(self.client.delete(self.table_url()))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;

        check(res, "deleting todo").await?;
        debug!(id, "deleted todo");
        Ok(())
    }
}

/// PATCH payload for `patch`. Switching to `Unspecified` nulls both
/// `due_period` and `due_date`, the same shape an undated insert leaves.
fn patch_body(patch: &TodoPatch, updated_at: &str) -> Result<Value, TodoError> {
    let mut body = serde_json::to_value(patch)?;

    if patch.due_period == Some(DuePeriod::Unspecified) {
        body["due_period"] = Value::Null;
        body["due_date"] = Value::Null;
    }
    body["updated_at"] = json!(updated_at);

    Ok(body)
}

async fn check(res: Response, action: &str) -> Result<Response, TodoError> {
    if res.status().is_success() {
        Ok(res)
    } else {
        let status = res.status().as_u16();
        let body = res.text().await?;
        warn!(status, %body, "store error while {}", action);
        Err(TodoError::Api { status, body })
    }
}
