use crate::clients::{ClassroomClient, DocsClient, DriveClient};
use crate::config::Config;
use crate::workflow;
use anyhow::Result;
use tracing::info;

/// 应用主结构
pub struct App {
    config: Config,
    drive: DriveClient,
    docs: DocsClient,
    classroom: ClassroomClient,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let drive = DriveClient::new(&config);
        let docs = DocsClient::new(&config);
        let classroom = ClassroomClient::new(&config);

        Ok(Self {
            config,
            drive,
            docs,
            classroom,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 仅列出待完成作业的模式
        if self.config.list_assignments {
            let pending = self
                .classroom
                .list_pending_assignments(&self.config.course_id)
                .await?;
            info!("✓ 共 {} 个待完成作业", pending.len());
            for assignment in &pending {
                info!(
                    "  - {} | 截止: {} | 状态: {}",
                    assignment.title,
                    if assignment.due.is_empty() {
                        "无"
                    } else {
                        assignment.due.as_str()
                    },
                    assignment.state
                );
            }
            return Ok(());
        }

        // 仅列出 Drive 文件夹内容的模式
        if let Some(folder_id) = &self.config.list_drive_folder {
            let files = self.drive.list_folder_files(folder_id).await?;
            if files.is_empty() {
                info!("📂 文件夹 {} 为空", folder_id);
                return Ok(());
            }
            info!("📂 文件夹 {} 共 {} 个文件", folder_id, files.len());
            for file in &files {
                info!("  - {} | id={} | {}", file.name, file.id, file.mime_type);
            }
            return Ok(());
        }

        let doc_id = workflow::run_pipeline(
            &self.config,
            &self.drive,
            &self.docs,
            &self.classroom,
        )
        .await?;

        if !self.config.turn_in {
            info!("💡 已跳过 Classroom 转交");
        }
        info!("✅ 证据文档已生成: {}", doc_id);

        Ok(())
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 笔记本证据文档流水线");
    info!("📓 笔记本: {}", config.notebook_file_id);
    info!(
        "📊 自动编号: {} | 截图: {} | 转交: {}",
        config.auto_number, config.screenshot_outputs, config.turn_in
    );
    info!("{}", "=".repeat(60));
}
