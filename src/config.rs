use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Google API 访问令牌（认证流程在外部完成）
    pub access_token: String,
    /// 待处理的笔记本文件ID（Drive 文件）
    pub notebook_file_id: String,
    /// Classroom 课程ID
    pub course_id: String,
    /// Classroom 作业ID
    pub coursework_id: String,
    /// 生成文档的标题
    pub doc_title: String,
    /// 未标记的代码单元格是否自动编号
    pub auto_number: bool,
    /// 是否在生成文档后提交到 Classroom
    pub turn_in: bool,
    /// 是否渲染笔记本并截图输出区域
    pub screenshot_outputs: bool,
    /// 上传的图片是否设为任何人可读
    pub share_images: bool,
    /// 只列出待完成作业，不运行流水线
    pub list_assignments: bool,
    /// 只列出该 Drive 文件夹下的文件，不运行流水线
    pub list_drive_folder: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 无头浏览器可执行文件路径（为空则使用系统默认 Chrome）
    pub browser_executable: Option<String>,
    // --- Google API 端点配置 ---
    pub drive_api_base_url: String,
    pub drive_upload_base_url: String,
    pub docs_api_base_url: String,
    pub classroom_api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            notebook_file_id: String::new(),
            course_id: String::new(),
            coursework_id: String::new(),
            doc_title: "Lab Evidence".to_string(),
            auto_number: false,
            turn_in: true,
            screenshot_outputs: false,
            share_images: false,
            list_assignments: false,
            list_drive_folder: None,
            verbose_logging: false,
            browser_executable: None,
            drive_api_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            drive_upload_base_url: "https://www.googleapis.com/upload/drive/v3".to_string(),
            docs_api_base_url: "https://docs.googleapis.com/v1".to_string(),
            classroom_api_base_url: "https://classroom.googleapis.com/v1".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：config.toml（如果存在）+ 环境变量覆盖
    pub fn load() -> Self {
        let base = Self::from_file(Path::new("config.toml")).unwrap_or_default();
        Self::from_env(base)
    }

    /// 从 TOML 文件加载配置，文件缺失或解析失败时返回 None
    pub fn from_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("⚠️ 配置文件解析失败 ({}): {}", path.display(), e);
                None
            }
        }
    }

    /// 用环境变量覆盖给定配置
    pub fn from_env(default: Self) -> Self {
        Self {
            access_token: std::env::var("GOOGLE_ACCESS_TOKEN").unwrap_or(default.access_token),
            notebook_file_id: std::env::var("NOTEBOOK_FILE_ID").unwrap_or(default.notebook_file_id),
            course_id: std::env::var("COURSE_ID").unwrap_or(default.course_id),
            coursework_id: std::env::var("COURSEWORK_ID").unwrap_or(default.coursework_id),
            doc_title: std::env::var("DOC_TITLE").unwrap_or(default.doc_title),
            auto_number: std::env::var("AUTO_NUMBER").ok().and_then(|v| v.parse().ok()).unwrap_or(default.auto_number),
            turn_in: std::env::var("TURN_IN").ok().and_then(|v| v.parse().ok()).unwrap_or(default.turn_in),
            screenshot_outputs: std::env::var("SCREENSHOT_OUTPUTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.screenshot_outputs),
            share_images: std::env::var("SHARE_IMAGES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.share_images),
            list_assignments: std::env::var("LIST_ASSIGNMENTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.list_assignments),
            list_drive_folder: std::env::var("LIST_DRIVE_FOLDER").ok().or(default.list_drive_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            browser_executable: std::env::var("BROWSER_EXECUTABLE").ok().or(default.browser_executable),
            drive_api_base_url: std::env::var("DRIVE_API_BASE_URL").unwrap_or(default.drive_api_base_url),
            drive_upload_base_url: std::env::var("DRIVE_UPLOAD_BASE_URL").unwrap_or(default.drive_upload_base_url),
            docs_api_base_url: std::env::var("DOCS_API_BASE_URL").unwrap_or(default.docs_api_base_url),
            classroom_api_base_url: std::env::var("CLASSROOM_API_BASE_URL").unwrap_or(default.classroom_api_base_url),
        }
    }
}
