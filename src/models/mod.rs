//! 数据模型
//!
//! - `notebook` - 笔记本输入结构（只读）
//! - `outline` - 分段产出的大纲结构
//! - `doc_request` - 文档变更操作与游标构建器

pub mod doc_request;
pub mod notebook;
pub mod outline;

pub use doc_request::{DocRequest, RequestBuilder};
pub use notebook::{Cell, CellType, Notebook, Output, OutputData};
pub use outline::{Item, Outline, Question, ScreenshotSlot};
