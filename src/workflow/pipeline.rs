//! 证据文档流水线 - 流程层
//!
//! 流程顺序（严格串行，后一步依赖前一步的完整产出）：
//! 1. 下载笔记本
//! 2. 分段为大纲 + 截图位置映射
//! 3. （可选）渲染 HTML → 无头浏览器截图 → 关联到大纲
//! 4. 创建文档
//! 5. 编译大纲为变更操作（图片在此阶段逐条上传）
//! 6. 一次性应用全部变更
//! 7. （可选）附加到 Classroom 提交并转交

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::browser;
use crate::clients::{ClassroomClient, DocsClient, DriveClient};
use crate::config::Config;
use crate::services::correlator;
use crate::services::renderer;
use crate::services::{DocCompiler, Segmenter};

/// 运行一次完整的流水线，返回生成的文档ID
pub async fn run_pipeline(
    config: &Config,
    drive: &DriveClient,
    docs: &DocsClient,
    classroom: &ClassroomClient,
) -> Result<String> {
    // 1. 下载笔记本
    info!("📥 正在下载笔记本: {}", config.notebook_file_id);
    let notebook = drive
        .download_notebook(&config.notebook_file_id)
        .await
        .context("下载笔记本失败")?;
    info!("✓ 下载完成，共 {} 个单元格", notebook.cells.len());

    // 2. 分段（大纲为空时这里直接失败，不会创建任何远程文档）
    let segmenter = Segmenter::new(config.auto_number);
    let (mut outline, slots) = segmenter.segment(&notebook)?;
    info!(
        "✓ 识别出 {} 个题目，{} 条带输出的记录",
        outline.len(),
        slots.len()
    );

    // 临时产物目录，本次运行结束时无论成败都会被清理
    let workdir = tempfile::tempdir().context("创建临时目录失败")?;

    // 3. 截图（可选）
    if config.screenshot_outputs {
        let html = renderer::render_notebook_html(&notebook);
        let html_path = workdir.path().join("notebook.html");
        tokio::fs::write(&html_path, &html)
            .await
            .with_context(|| format!("写入渲染页面失败: {}", html_path.display()))?;

        let shots = browser::capture_output_screenshots(
            &html_path,
            workdir.path(),
            config.browser_executable.as_deref(),
        )
        .await?;
        if shots.len() < slots.len() {
            warn!(
                "⚠️ 截图数量不足: {} 条记录只捕获到 {} 张",
                slots.len(),
                shots.len()
            );
        }
        correlator::assign_screenshots(&mut outline, &slots, &shots);
    }

    // 4. 创建文档
    let doc_id = docs.create_document(&config.doc_title).await?;
    info!("📄 文档已创建: {}", doc_id);

    // 5. 编译（图片在此阶段逐条上传，失败的条目降级为文字占位）
    let compiler = DocCompiler::new(drive, config.share_images);
    let requests = compiler.compile(&outline, &config.doc_title).await?;
    info!("📝 共 {} 条文档变更操作", requests.len());

    // 6. 一次性应用
    docs.batch_update(&doc_id, &requests).await?;
    info!("✓ 文档内容写入完成");

    // 7. 转交（可选）
    if config.turn_in {
        classroom
            .attach_and_turn_in(&config.course_id, &config.coursework_id, &doc_id)
            .await?;
        info!("🎓 已附加并提交到 Classroom");
    }

    drop(workdir);
    Ok(doc_id)
}
