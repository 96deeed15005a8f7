use super::config::AlgoliaConfig;
use super::types::{ErrorResponse, TaskResponse, TaskStatusResponse};
use reqwest::StatusCode;
use scout_settings::{
    IndexHandle, IndexProvider, PendingOperation, RawSettings, Result, SettingsError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const HEADER_APP_ID: &str = "x-algolia-application-id";
const HEADER_API_KEY: &str = "x-algolia-api-key";

/// HTTP client for one Algolia application. Cheap to clone.
#[derive(Clone)]
pub struct AlgoliaClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: AlgoliaConfig,
    base_url: String,
    http_client: reqwest::Client,
}

impl AlgoliaClient {
    pub fn new(config: AlgoliaConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SettingsError::Http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url: config.base_url(),
                config,
                http_client,
            }),
        })
    }

    pub fn app_id(&self) -> &str {
        &self.inner.config.app_id
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn index_url(&self, index: &str, suffix: &str) -> String {
        format!(
            "{}/1/indexes/{}{}",
            self.inner.base_url,
            urlencoding::encode(index),
            suffix
        )
    }

    /// Send `request` with credentials, mapping non-2xx responses to errors.
    /// A 404 is reported as `IndexNotFound(index)`.
    async fn send(
        &self,
        index: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let response = request
            .header(HEADER_APP_ID, &self.inner.config.app_id)
            .header(HEADER_API_KEY, &self.inner.config.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SettingsError::Http(format!("request for index {} timed out", index))
                } else {
                    SettingsError::Http(format!("request for index {} failed: {}", index, e))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        if status == StatusCode::NOT_FOUND {
            tracing::debug!("[ALGOLIA {}] 404: {}", index, message);
            return Err(SettingsError::IndexNotFound(index.to_string()));
        }

        tracing::warn!("[ALGOLIA {}] {} returned: {}", index, status, message);
        Err(SettingsError::Api { status, message })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        index: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        self.send(index, request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| {
                SettingsError::Json(format!("failed to parse response for {}: {}", index, e))
            })
    }

    async fn send_task(
        &self,
        index: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<AlgoliaTask> {
        let resp: TaskResponse = self.send_json(index, request).await?;
        tracing::debug!("[ALGOLIA {}] accepted as task {}", index, resp.task_id);
        Ok(AlgoliaTask {
            client: self.clone(),
            index: index.to_string(),
            task_id: resp.task_id,
        })
    }

    async fn task_status(&self, index: &str, task_id: i64) -> Result<TaskStatusResponse> {
        let url = self.index_url(index, &format!("/task/{}", task_id));
        self.send_json(index, self.inner.http_client.get(&url)).await
    }
}

/// Handle to one index of an [`AlgoliaClient`]
#[derive(Debug, Clone)]
pub struct AlgoliaIndex {
    client: AlgoliaClient,
    name: String,
}

/// A write the service has accepted but may not have applied yet.
#[derive(Debug, Clone)]
pub struct AlgoliaTask {
    client: AlgoliaClient,
    index: String,
    task_id: i64,
}

impl std::fmt::Debug for AlgoliaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgoliaClient")
            .field("app_id", &self.inner.config.app_id)
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

impl AlgoliaTask {
    pub fn task_id(&self) -> i64 {
        self.task_id
    }

    pub fn index(&self) -> &str {
        &self.index
    }
}

impl PendingOperation for AlgoliaTask {
    /// Poll the task until it is published or the poll budget is spent.
    async fn wait(self) -> Result<()> {
        let config = &self.client.inner.config;
        let interval = Duration::from_millis(config.task_poll_interval_ms);

        for attempt in 1..=config.task_max_polls {
            let status = self.client.task_status(&self.index, self.task_id).await?;
            if status.is_published() {
                tracing::debug!(
                    "[ALGOLIA {}] task {} published after {} poll(s)",
                    self.index,
                    self.task_id,
                    attempt
                );
                return Ok(());
            }
            if attempt < config.task_max_polls {
                tokio::time::sleep(interval).await;
            }
        }

        Err(SettingsError::TaskTimeout {
            index: self.index,
            task_id: self.task_id,
            polls: config.task_max_polls,
        })
    }
}

impl IndexHandle for AlgoliaIndex {
    type Pending = AlgoliaTask;

    fn name(&self) -> &str {
        &self.name
    }

    async fn get_settings(&self) -> Result<RawSettings> {
        let url = self.client.index_url(&self.name, "/settings");
        let request = self
            .client
            .inner
            .http_client
            .get(&url)
            .query(&[("getVersion", "2")]);
        let value: Value = self.client.send_json(&self.name, request).await?;
        match value {
            Value::Object(settings) => Ok(settings),
            other => Err(SettingsError::Json(format!(
                "settings of {} are not a JSON object: {}",
                self.name, other
            ))),
        }
    }

    async fn set_settings(&self, settings: &RawSettings) -> Result<AlgoliaTask> {
        let url = self.client.index_url(&self.name, "/settings");
        let request = self.client.inner.http_client.put(&url).json(settings);
        self.client.send_task(&self.name, request).await
    }

    async fn insert_record(&self, record: Value) -> Result<AlgoliaTask> {
        let request = match record.get("objectID").and_then(Value::as_str) {
            Some(object_id) => {
                let url = self
                    .client
                    .index_url(&self.name, &format!("/{}", urlencoding::encode(object_id)));
                self.client.inner.http_client.put(&url).json(&record)
            }
            None => {
                let url = self.client.index_url(&self.name, "");
                self.client.inner.http_client.post(&url).json(&record)
            }
        };
        self.client.send_task(&self.name, request).await
    }

    async fn clear_records(&self) -> Result<AlgoliaTask> {
        let url = self.client.index_url(&self.name, "/clear");
        let request = self.client.inner.http_client.post(&url);
        self.client.send_task(&self.name, request).await
    }
}

impl IndexProvider for AlgoliaClient {
    type Index = AlgoliaIndex;

    fn open_index(&self, name: &str) -> AlgoliaIndex {
        AlgoliaIndex {
            client: self.clone(),
            name: name.to_string(),
        }
    }

    async fn delete_index(&self, name: &str) -> Result<AlgoliaTask> {
        let url = self.index_url(name, "");
        let request = self.inner.http_client.delete(&url);
        self.send_task(name, request).await
    }
}
