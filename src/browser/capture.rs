//! 无头浏览器截图 - 基础设施层
//!
//! 渲染好的 HTML 页面中按固定选择器枚举输出区域并逐个截图

use std::path::{Path, PathBuf};

use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// 输出区域选择器，按优先级依次尝试，命中即停
const OUTPUT_SELECTORS: [&str; 3] = [".output_area", ".output", ".jp-OutputArea"];

/// 启动无头浏览器并导航到指定 URL
pub async fn launch_headless_browser(
    url: &str,
    executable: Option<&str>,
) -> Result<(Browser, Page)> {
    info!("🚀 启动无头浏览器...");
    debug!("目标 URL: {}", url);

    let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
        "--disable-gpu",
        "--no-sandbox",            // 禁用沙盒，防止权限问题导致的崩溃
        "--disable-dev-shm-usage", // 防止共享内存不足
        "--remote-debugging-port=0",
    ]);
    if let Some(executable) = executable {
        builder = builder.chrome_executable(Path::new(executable));
    }
    let config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        anyhow::anyhow!("配置无头浏览器失败: {}", e)
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        anyhow::anyhow!("启动无头浏览器失败: {}", e)
    })?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page(url).await.map_err(|e| {
        error!("创建页面失败: {}", e);
        anyhow::anyhow!("创建页面失败: {}", e)
    })?;

    info!("✅ 无头浏览器已导航到: {}", url);

    Ok((browser, page))
}

/// 截取页面中所有输出区域，PNG 文件按枚举顺序写入 out_dir
///
/// 单个元素截图失败时跳过该元素继续；页面中没有输出区域时返回
/// 空列表而不是错误
pub async fn capture_output_screenshots(
    html_path: &Path,
    out_dir: &Path,
    executable: Option<&str>,
) -> Result<Vec<PathBuf>> {
    let url = format!("file://{}", html_path.display());
    let (mut browser, page) = launch_headless_browser(&url, executable).await?;

    page.wait_for_navigation().await.ok();

    let mut elements = Vec::new();
    for selector in OUTPUT_SELECTORS {
        elements = page.find_elements(selector).await.unwrap_or_default();
        if !elements.is_empty() {
            debug!("选择器 {} 命中 {} 个输出区域", selector, elements.len());
            break;
        }
    }

    let mut shots = Vec::new();
    for (i, element) in elements.iter().enumerate() {
        match element.screenshot(CaptureScreenshotFormat::Png).await {
            Ok(bytes) => {
                let path = out_dir.join(format!("output-{}.png", i));
                if let Err(e) = tokio::fs::write(&path, &bytes).await {
                    warn!("⚠️ 截图写入失败 ({}): {}", path.display(), e);
                    continue;
                }
                shots.push(path);
            }
            Err(e) => {
                warn!("⚠️ 第 {} 个输出区域截图失败，跳过: {}", i + 1, e);
                continue;
            }
        }
    }

    browser.close().await.ok();
    browser.wait().await.ok();

    info!("📸 共捕获 {} 张输出截图", shots.len());
    Ok(shots)
}
