//! 远程 API 客户端
//!
//! 每个客户端封装一类远程能力，不处理业务流程

pub mod classroom;
pub mod docs;
pub mod drive;

pub use classroom::{ClassroomClient, PendingAssignment};
pub use docs::DocsClient;
pub use drive::{DriveClient, DriveFileInfo};
