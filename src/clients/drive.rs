//! Drive API 客户端
//!
//! 封装笔记本下载、图片上传和共享权限调用

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, BusinessError};
use crate::models::notebook::Notebook;
use crate::services::compiler::ImageUploader;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

/// 文件夹列表中的一个文件条目
#[derive(Debug, Clone, PartialEq)]
pub struct DriveFileInfo {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

/// Drive API 客户端
pub struct DriveClient {
    http: reqwest::Client,
    base_url: String,
    upload_base_url: String,
    token: String,
}

impl DriveClient {
    /// 创建新的 Drive 客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.drive_api_base_url.clone(),
            upload_base_url: config.drive_upload_base_url.clone(),
            token: config.access_token.clone(),
        }
    }

    /// 下载笔记本文件并解析
    ///
    /// 文件不存在或无权限时返回错误
    pub async fn download_notebook(&self, file_id: &str) -> AppResult<Notebook> {
        if file_id.trim().is_empty() {
            return Err(AppError::Business(BusinessError::EmptyNotebookId));
        }

        let endpoint = format!(
            "{}/files/{}?alt=media&supportsAllDrives=true",
            self.base_url, file_id
        );
        let response = self
            .http
            .get(&endpoint)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        check_status(&endpoint, response)?
            .json::<Notebook>()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))
    }

    /// 上传 PNG 字节到 Drive，返回文件ID
    ///
    /// 先按 media 方式上传，再补一次重命名；重命名失败只告警
    pub async fn upload_png_bytes(&self, bytes: Vec<u8>, name: &str) -> AppResult<String> {
        let endpoint = format!(
            "{}/files?uploadType=media&supportsAllDrives=true",
            self.upload_base_url
        );
        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        let value: JsonValue = check_status(&endpoint, response)?
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        let file_id = value
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or(AppError::Api(ApiError::EmptyResponse { endpoint }))?
            .to_string();

        debug!("图片上传完成: {} → {}", name, file_id);

        let rename_endpoint = format!(
            "{}/files/{}?supportsAllDrives=true",
            self.base_url, file_id
        );
        let rename = self
            .http
            .patch(&rename_endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "name": name }))
            .send()
            .await;
        if let Err(e) = rename {
            warn!("⚠️ 图片重命名失败（不影响上传）: {}", e);
        }

        Ok(file_id)
    }

    /// 列出指定文件夹下的全部文件（不含已删除项）
    pub async fn list_folder_files(&self, folder_id: &str) -> AppResult<Vec<DriveFileInfo>> {
        let endpoint = format!("{}/files", self.base_url);
        let query = format!("'{}' in parents and trashed=false", folder_id);
        let response = self
            .http
            .get(&endpoint)
            .bearer_auth(&self.token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id, name, mimeType)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        let value: JsonValue = check_status(&endpoint, response)?
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        Ok(parse_file_list(&value))
    }

    /// 把文件设为任何人可读
    pub async fn share_anyone_reader(&self, file_id: &str) -> AppResult<()> {
        let endpoint = format!(
            "{}/files/{}/permissions?supportsAllDrives=true",
            self.base_url, file_id
        );
        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "type": "anyone", "role": "reader" }))
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        check_status(&endpoint, response)?;
        Ok(())
    }
}

impl ImageUploader for DriveClient {
    async fn upload_png(&self, bytes: Vec<u8>) -> anyhow::Result<String> {
        let name = format!(
            "lab-evidence-{}.png",
            chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f")
        );
        Ok(self.upload_png_bytes(bytes, &name).await?)
    }

    async fn share_file(&self, file_id: &str) -> anyhow::Result<()> {
        Ok(self.share_anyone_reader(file_id).await?)
    }
}

/// 从文件列表响应中提取文件条目，缺字段的条目整个跳过
fn parse_file_list(value: &JsonValue) -> Vec<DriveFileInfo> {
    value
        .get("files")
        .and_then(|v| v.as_array())
        .map(|files| {
            files
                .iter()
                .filter_map(|file| {
                    Some(DriveFileInfo {
                        id: file.get("id")?.as_str()?.to_string(),
                        name: file.get("name")?.as_str()?.to_string(),
                        mime_type: file.get("mimeType")?.as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// 检查响应状态，非 2xx 转换为带原始信息的 API 错误
pub(crate) fn check_status(
    endpoint: &str,
    response: reqwest::Response,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message: None,
        }))
    }
}
