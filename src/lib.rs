//! # Lab Evidence Submit
//!
//! 把计算笔记本转换为结构化证据文档并提交的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 无头浏览器截图能力，只暴露"截取输出区域"
//! - `clients/` - Drive / Docs / Classroom 远程 API 客户端
//!
//! ### ② 业务能力层（Services）
//! - `services/marker` - 题号标记扫描
//! - `services/segmenter` - 单元格流分段为大纲
//! - `services/correlator` - 截图文件关联
//! - `services/compiler` - 大纲编译为文档变更操作
//! - `services/renderer` - 笔记本 HTML 渲染
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/pipeline` - 下载 → 分段 → 截图 → 编译 → 应用 → 转交
//!
//! ### ④ 应用层（App）
//! - `app` - 应用生命周期（初始化、运行）
//!
//! ## 数据流
//!
//! ```text
//! 笔记本 → Segmenter → (大纲, 截图位置映射)
//!        → [截图捕获] → Correlator → 充实后的大纲
//!        → DocCompiler → 有序变更列表 → [批量应用]
//! ```

pub mod app;
pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod services;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{ClassroomClient, DocsClient, DriveClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{DocRequest, Item, Notebook, Outline, Question, ScreenshotSlot};
pub use services::{DocCompiler, ImageUploader, Segmenter};
pub use workflow::run_pipeline;
