//! Docs API 客户端
//!
//! 封装文档创建和批量变更调用

use crate::clients::drive::check_status;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::doc_request::DocRequest;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

/// Docs API 客户端
pub struct DocsClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl DocsClient {
    /// 创建新的 Docs 客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.docs_api_base_url.clone(),
            token: config.access_token.clone(),
        }
    }

    /// 创建空文档，返回文档ID
    pub async fn create_document(&self, title: &str) -> AppResult<String> {
        let endpoint = format!("{}/documents", self.base_url);
        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "title": title }))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        let value: JsonValue = check_status(&endpoint, response)?
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        let doc_id = value
            .get("documentId")
            .and_then(|v| v.as_str())
            .ok_or(AppError::Api(ApiError::EmptyResponse { endpoint }))?
            .to_string();

        debug!("文档创建完成: {}", doc_id);
        Ok(doc_id)
    }

    /// 一次性应用全部变更操作
    ///
    /// 整批要么全部生效要么全部失败，失败时保留原始错误信息
    pub async fn batch_update(&self, document_id: &str, requests: &[DocRequest]) -> AppResult<()> {
        if requests.is_empty() {
            return Ok(());
        }

        let endpoint = format!("{}/documents/{}:batchUpdate", self.base_url, document_id);
        let body = json!({
            "requests": requests.iter().map(|r| r.to_api_json()).collect::<Vec<_>>(),
        });

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        check_status(&endpoint, response)?;
        Ok(())
    }
}
