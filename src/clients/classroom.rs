//! Classroom API 客户端
//!
//! 封装作业查询、附件关联和提交调用

use crate::clients::drive::check_status;
use crate::config::Config;
use crate::error::{AppError, AppResult, BusinessError};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

/// 待完成的作业条目
#[derive(Debug, Clone)]
pub struct PendingAssignment {
    pub coursework_id: String,
    pub title: String,
    pub due: String,
    pub state: String,
}

/// Classroom API 客户端
pub struct ClassroomClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ClassroomClient {
    /// 创建新的 Classroom 客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.classroom_api_base_url.clone(),
            token: config.access_token.clone(),
        }
    }

    async fn get_json(&self, endpoint: &str) -> AppResult<JsonValue> {
        let response = self
            .http
            .get(endpoint)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;
        check_status(endpoint, response)?
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))
    }

    async fn post_json(&self, endpoint: &str, body: &JsonValue) -> AppResult<JsonValue> {
        let response = self
            .http
            .post(endpoint)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;
        check_status(endpoint, response)?
            .json()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))
    }

    /// 查找自己在该作业下的提交记录ID
    async fn first_submission_id(
        &self,
        course_id: &str,
        coursework_id: &str,
    ) -> AppResult<String> {
        let endpoint = format!(
            "{}/courses/{}/courseWork/{}/studentSubmissions?userId=me",
            self.base_url, course_id, coursework_id
        );
        let value = self.get_json(&endpoint).await?;
        value
            .get("studentSubmissions")
            .and_then(|v| v.as_array())
            .and_then(|subs| subs.first())
            .and_then(|sub| sub.get("id"))
            .and_then(|id| id.as_str())
            .map(|id| id.to_string())
            .ok_or(AppError::Business(BusinessError::MissingSubmission {
                coursework_id: coursework_id.to_string(),
            }))
    }

    /// 把文档附加到自己的提交记录并转交
    pub async fn attach_and_turn_in(
        &self,
        course_id: &str,
        coursework_id: &str,
        doc_id: &str,
    ) -> AppResult<()> {
        let submission_id = self.first_submission_id(course_id, coursework_id).await?;
        debug!("提交记录: {}", submission_id);

        let attach_endpoint = format!(
            "{}/courses/{}/courseWork/{}/studentSubmissions/{}:modifyAttachments",
            self.base_url, course_id, coursework_id, submission_id
        );
        self.post_json(
            &attach_endpoint,
            &json!({
                "addAttachments": [
                    { "driveFile": { "id": doc_id } }
                ]
            }),
        )
        .await?;

        let turn_in_endpoint = format!(
            "{}/courses/{}/courseWork/{}/studentSubmissions/{}:turnIn",
            self.base_url, course_id, coursework_id, submission_id
        );
        self.post_json(&turn_in_endpoint, &json!({})).await?;

        Ok(())
    }

    /// 列出课程下状态为待完成的作业
    pub async fn list_pending_assignments(
        &self,
        course_id: &str,
    ) -> AppResult<Vec<PendingAssignment>> {
        let endpoint = format!("{}/courses/{}/courseWork", self.base_url, course_id);
        let value = self.get_json(&endpoint).await?;

        let mut pending = Vec::new();
        let coursework = value
            .get("courseWork")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        for work in coursework {
            let Some(work_id) = work.get("id").and_then(|v| v.as_str()) else {
                continue;
            };
            let title = work
                .get("title")
                .and_then(|v| v.as_str())
                .unwrap_or("Untitled")
                .to_string();
            let due = format_due_date(work.get("dueDate"));

            let subs_endpoint = format!(
                "{}/courses/{}/courseWork/{}/studentSubmissions?userId=me",
                self.base_url, course_id, work_id
            );
            let subs = self.get_json(&subs_endpoint).await?;
            let Some(state) = subs
                .get("studentSubmissions")
                .and_then(|v| v.as_array())
                .and_then(|subs| subs.first())
                .and_then(|sub| sub.get("state"))
                .and_then(|s| s.as_str())
            else {
                continue;
            };

            if matches!(state, "NEW" | "CREATED" | "RECLAIMED_BY_STUDENT") {
                info!("📌 待完成作业: {} ({})", title, work_id);
                pending.push(PendingAssignment {
                    coursework_id: work_id.to_string(),
                    title,
                    due,
                    state: state.to_string(),
                });
            }
        }

        Ok(pending)
    }
}

fn format_due_date(due: Option<&JsonValue>) -> String {
    let Some(due) = due else {
        return String::new();
    };
    match (
        due.get("year").and_then(|v| v.as_i64()),
        due.get("month").and_then(|v| v.as_i64()),
        due.get("day").and_then(|v| v.as_i64()),
    ) {
        (Some(year), Some(month), Some(day)) => format!("{}-{:02}-{:02}", year, month, day),
        _ => String::new(),
    }
}
