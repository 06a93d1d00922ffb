//! 文档编译器 - 业务能力层
//!
//! 把大纲编译为有序的文档变更操作列表
//!
//! 遍历顺序固定：标题行 → 按题号数字升序，每题 header + 分隔线，
//! 每条记录依次输出代码块、内联图片、外部截图、说明文字，题目之间
//! 空一行。游标由 RequestBuilder 独占维护

use crate::error::AppResult;
use crate::models::doc_request::{DocRequest, RequestBuilder};
use crate::models::outline::Outline;
use anyhow::{Context, Result};
use base64::Engine;
use std::path::Path;
use tracing::warn;

/// 图片上传能力
///
/// 由 Drive 客户端实现；测试中用内存假实现替代
pub trait ImageUploader {
    /// 上传 PNG 字节，返回稳定的文件引用ID
    async fn upload_png(&self, bytes: Vec<u8>) -> Result<String>;

    /// 把文件引用设为任何人可读
    async fn share_file(&self, file_id: &str) -> Result<()>;
}

/// 文档编译器
pub struct DocCompiler<'a, U: ImageUploader> {
    uploader: &'a U,
    share_images: bool,
}

impl<'a, U: ImageUploader> DocCompiler<'a, U> {
    pub fn new(uploader: &'a U, share_images: bool) -> Self {
        Self {
            uploader,
            share_images,
        }
    }

    /// 编译大纲为变更操作列表
    ///
    /// 上传/共享失败按条目降级为文字占位，不中断编译；
    /// 题号无法数字排序是致命错误
    pub async fn compile(&self, outline: &Outline, title: &str) -> AppResult<Vec<DocRequest>> {
        let mut builder = RequestBuilder::new();
        builder.push_text(format!("{}\n\n", title));

        for qn in outline.sorted_ids()? {
            let Some(question) = outline.get(&qn) else {
                continue;
            };

            builder.push_text(format!("Question {}\n", qn));
            builder.push_text(format!("{}\n", "=".repeat(40)));

            for (i, item) in question.items.iter().enumerate() {
                let label = i + 1;

                builder.push_text(format!("Code {}:\n", label));
                for line in item.code.trim().lines() {
                    builder.push_text(format!("    {}\n", line));
                }
                builder.push_text("\n");

                if let Some(image_b64) = &item.image_b64 {
                    builder.push_text(format!("Image {}:\n", label));
                    match self.embed_inline_image(image_b64).await {
                        Ok(uri) => {
                            builder.push_image(uri);
                            builder.push_text("\n");
                        }
                        Err(e) => {
                            warn!("⚠️ 题目 {} 记录 {} 图片嵌入失败: {:#}", qn, label, e);
                            builder.push_text("(Image attached in Drive; embed failed)\n");
                        }
                    }
                    builder.push_text("\n");
                }

                if let Some(path) = &item.screenshot_file {
                    builder.push_text(format!("Output {}:\n", label));
                    match self.embed_screenshot(path).await {
                        Ok(uri) => {
                            builder.push_image(uri);
                            builder.push_text("\n");
                        }
                        Err(e) => {
                            warn!("⚠️ 题目 {} 记录 {} 截图嵌入失败: {:#}", qn, label, e);
                            builder.push_text("(Screenshot attached in Drive; embed failed)\n");
                        }
                    }
                    builder.push_text("\n");
                }

                if let Some(reasoning) = &item.reasoning {
                    builder.push_text(format!("Reasoning {}:\n", label));
                    for line in reasoning.trim().lines() {
                        builder.push_text(format!("    {}\n", line));
                    }
                    builder.push_text("\n");
                }
            }

            builder.push_text("\n");
        }

        Ok(builder.finish())
    }

    async fn embed_inline_image(&self, image_b64: &str) -> Result<String> {
        // 笔记本中的 base64 可能按行拆分，解码前去掉空白
        let cleaned: String = image_b64
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(cleaned.as_bytes())
            .context("图片 base64 解码失败")?;
        self.upload_and_share(bytes).await
    }

    async fn embed_screenshot(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("读取截图文件失败: {}", path.display()))?;
        self.upload_and_share(bytes).await
    }

    async fn upload_and_share(&self, bytes: Vec<u8>) -> Result<String> {
        let file_id = self.uploader.upload_png(bytes).await?;
        if self.share_images {
            self.uploader.share_file(&file_id).await?;
        }
        Ok(format!("https://drive.google.com/uc?id={}", file_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::outline::Item;
    use std::sync::Mutex;

    /// 内存假上传器：记录上传的字节数并返回递增的文件ID
    struct FakeUploader {
        uploads: Mutex<Vec<usize>>,
        shared: Mutex<Vec<String>>,
        fail_uploads: bool,
    }

    impl FakeUploader {
        fn new() -> Self {
            Self {
                uploads: Mutex::new(Vec::new()),
                shared: Mutex::new(Vec::new()),
                fail_uploads: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_uploads: true,
                ..Self::new()
            }
        }
    }

    impl ImageUploader for FakeUploader {
        async fn upload_png(&self, bytes: Vec<u8>) -> Result<String> {
            if self.fail_uploads {
                anyhow::bail!("模拟上传失败");
            }
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push(bytes.len());
            Ok(format!("file-{}", uploads.len()))
        }

        async fn share_file(&self, file_id: &str) -> Result<()> {
            self.shared.lock().unwrap().push(file_id.to_string());
            Ok(())
        }
    }

    fn texts(requests: &[DocRequest]) -> Vec<&str> {
        requests
            .iter()
            .map(|r| match r {
                DocRequest::InsertText { text, .. } => text.as_str(),
                DocRequest::InsertInlineImage { .. } => "<image>",
            })
            .collect()
    }

    /// 游标不变式：每个操作的 index 等于此前所有文本的字符总数加图片数再加 1
    fn assert_cursor_consistent(requests: &[DocRequest]) {
        let mut expected: i64 = 1;
        for request in requests {
            assert_eq!(request.index(), expected, "游标漂移: {:?}", request);
            match request {
                DocRequest::InsertText { text, .. } => {
                    expected += text.chars().count() as i64;
                }
                DocRequest::InsertInlineImage { .. } => {
                    expected += 1;
                }
            }
        }
    }

    #[tokio::test]
    async fn single_code_item_exact_sequence() {
        let mut outline = Outline::default();
        outline.ensure_question("1").items.push(Item {
            code: "print(1)".to_string(),
            ..Default::default()
        });

        let uploader = FakeUploader::new();
        let compiler = DocCompiler::new(&uploader, false);
        let requests = compiler.compile(&outline, "Lab Evidence").await.unwrap();

        assert_eq!(
            texts(&requests),
            vec![
                "Lab Evidence\n\n",
                "Question 1\n",
                "========================================\n",
                "Code 1:\n",
                "    print(1)\n",
                "\n",
                "\n",
            ]
        );
        assert_cursor_consistent(&requests);
    }

    #[tokio::test]
    async fn questions_emitted_in_numeric_order() {
        let mut outline = Outline::default();
        for id in ["10", "2", "1"] {
            outline.ensure_question(id).items.push(Item {
                code: format!("q{}()", id),
                ..Default::default()
            });
        }

        let uploader = FakeUploader::new();
        let compiler = DocCompiler::new(&uploader, false);
        let requests = compiler.compile(&outline, "Lab Evidence").await.unwrap();

        let headers: Vec<&str> = texts(&requests)
            .into_iter()
            .filter(|t| t.starts_with("Question "))
            .collect();
        assert_eq!(headers, vec!["Question 1\n", "Question 2\n", "Question 10\n"]);
        assert_cursor_consistent(&requests);
    }

    #[tokio::test]
    async fn non_numeric_id_is_fatal() {
        let mut outline = Outline::default();
        outline.ensure_question("extra");

        let uploader = FakeUploader::new();
        let compiler = DocCompiler::new(&uploader, false);
        assert!(compiler.compile(&outline, "Lab Evidence").await.is_err());
    }

    #[tokio::test]
    async fn image_upload_and_share() {
        let mut outline = Outline::default();
        outline.ensure_question("1").items.push(Item {
            code: "plot()".to_string(),
            image_b64: Some("aGVsbG8=".to_string()),
            ..Default::default()
        });

        let uploader = FakeUploader::new();
        let compiler = DocCompiler::new(&uploader, true);
        let requests = compiler.compile(&outline, "Lab Evidence").await.unwrap();

        let image = requests
            .iter()
            .find_map(|r| match r {
                DocRequest::InsertInlineImage { uri, .. } => Some(uri.clone()),
                _ => None,
            })
            .expect("应包含图片插入操作");
        assert_eq!(image, "https://drive.google.com/uc?id=file-1");
        assert_eq!(*uploader.uploads.lock().unwrap(), vec![5]); // "hello"
        assert_eq!(*uploader.shared.lock().unwrap(), vec!["file-1"]);
        assert_cursor_consistent(&requests);
    }

    #[tokio::test]
    async fn base64_with_line_breaks_still_decodes() {
        let mut outline = Outline::default();
        outline.ensure_question("1").items.push(Item {
            image_b64: Some("aGVs\nbG8=\n".to_string()),
            ..Default::default()
        });

        let uploader = FakeUploader::new();
        let compiler = DocCompiler::new(&uploader, false);
        let requests = compiler.compile(&outline, "Lab Evidence").await.unwrap();

        assert_eq!(*uploader.uploads.lock().unwrap(), vec![5]);
        assert_cursor_consistent(&requests);
    }

    #[tokio::test]
    async fn upload_failure_degrades_to_fallback_text() {
        let mut outline = Outline::default();
        outline.ensure_question("1").items.push(Item {
            code: "plot()".to_string(),
            image_b64: Some("aGVsbG8=".to_string()),
            reasoning: Some("图挂了也要保留说明".to_string()),
            ..Default::default()
        });

        let uploader = FakeUploader::failing();
        let compiler = DocCompiler::new(&uploader, false);
        let requests = compiler.compile(&outline, "Lab Evidence").await.unwrap();

        let all = texts(&requests);
        assert!(all.contains(&"(Image attached in Drive; embed failed)\n"));
        assert!(!all.contains(&"<image>"));
        // 周边的代码和说明不受影响
        assert!(all.contains(&"    plot()\n"));
        assert!(all.contains(&"Reasoning 1:\n"));
        assert_cursor_consistent(&requests);
    }

    #[tokio::test]
    async fn screenshot_embed_is_independent_of_inline_image() {
        let dir = tempfile::tempdir().unwrap();
        let shot = dir.path().join("output-0.png");
        std::fs::write(&shot, b"png-bytes").unwrap();

        let mut outline = Outline::default();
        outline.ensure_question("1").items.push(Item {
            code: "both()".to_string(),
            image_b64: Some("aGVsbG8=".to_string()),
            screenshot_file: Some(shot),
            ..Default::default()
        });

        let uploader = FakeUploader::new();
        let compiler = DocCompiler::new(&uploader, false);
        let requests = compiler.compile(&outline, "Lab Evidence").await.unwrap();

        let image_count = requests
            .iter()
            .filter(|r| matches!(r, DocRequest::InsertInlineImage { .. }))
            .count();
        assert_eq!(image_count, 2);
        assert_eq!(*uploader.uploads.lock().unwrap(), vec![5, 9]);
        let all = texts(&requests);
        assert!(all.contains(&"Image 1:\n"));
        assert!(all.contains(&"Output 1:\n"));
        assert_cursor_consistent(&requests);
    }

    #[tokio::test]
    async fn missing_screenshot_file_falls_back() {
        let mut outline = Outline::default();
        outline.ensure_question("1").items.push(Item {
            screenshot_file: Some("/不存在的路径/shot.png".into()),
            ..Default::default()
        });

        let uploader = FakeUploader::new();
        let compiler = DocCompiler::new(&uploader, false);
        let requests = compiler.compile(&outline, "Lab Evidence").await.unwrap();

        assert!(texts(&requests).contains(&"(Screenshot attached in Drive; embed failed)\n"));
        assert_cursor_consistent(&requests);
    }

    #[tokio::test]
    async fn empty_question_emits_header_only() {
        let mut outline = Outline::default();
        outline.ensure_question("1");

        let uploader = FakeUploader::new();
        let compiler = DocCompiler::new(&uploader, false);
        let requests = compiler.compile(&outline, "Lab Evidence").await.unwrap();

        assert_eq!(
            texts(&requests),
            vec![
                "Lab Evidence\n\n",
                "Question 1\n",
                "========================================\n",
                "\n",
            ]
        );
        assert_cursor_consistent(&requests);
    }
}
