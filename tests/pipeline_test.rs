//! 离线端到端测试：分段 → 截图关联 → 编译
//!
//! 不依赖网络和浏览器，上传能力用内存假实现替代

use anyhow::Result;
use lab_evidence_submit::models::doc_request::DocRequest;
use lab_evidence_submit::services::correlator;
use lab_evidence_submit::{DocCompiler, ImageUploader, Notebook, Segmenter};
use std::path::PathBuf;
use std::sync::Mutex;

/// 内存假上传器
struct FakeUploader {
    uploads: Mutex<usize>,
}

impl FakeUploader {
    fn new() -> Self {
        Self {
            uploads: Mutex::new(0),
        }
    }
}

impl ImageUploader for FakeUploader {
    async fn upload_png(&self, _bytes: Vec<u8>) -> Result<String> {
        let mut uploads = self.uploads.lock().unwrap();
        *uploads += 1;
        Ok(format!("fake-{}", *uploads))
    }

    async fn share_file(&self, _file_id: &str) -> Result<()> {
        Ok(())
    }
}

fn sample_notebook() -> Notebook {
    serde_json::from_value(serde_json::json!({
        "cells": [
            { "cell_type": "markdown", "source": "# Q2" },
            { "cell_type": "markdown", "source": "先说明做法" },
            {
                "cell_type": "code",
                "source": ["import math\n", "print(math.pi)\n"],
                "outputs": [
                    { "output_type": "stream", "text": ["3.14159\n"] }
                ]
            },
            { "cell_type": "markdown", "source": "## Question 1" },
            {
                "cell_type": "code",
                "source": "plot()",
                "outputs": [
                    {
                        "output_type": "display_data",
                        "data": {
                            "text/plain": "<Figure 640x480>",
                            "image/png": "aGVsbG8="
                        }
                    }
                ]
            }
        ],
        "nbformat": 4
    }))
    .expect("示例笔记本应能解析")
}

#[tokio::test]
async fn full_offline_pipeline() {
    let notebook = sample_notebook();

    // 分段
    let (mut outline, slots) = Segmenter::new(false).segment(&notebook).unwrap();
    assert_eq!(outline.len(), 2);
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].question_id, "2");
    assert_eq!(slots[1].question_id, "1");

    let q2 = outline.get("2").unwrap();
    assert_eq!(q2.items[0].reasoning.as_deref(), Some("先说明做法"));
    assert_eq!(q2.items[0].outputs, "3.14159\n");

    // 截图关联：只捕获到一张，第二条记录保持无截图
    let dir = tempfile::tempdir().unwrap();
    let shot = dir.path().join("output-0.png");
    std::fs::write(&shot, b"png").unwrap();
    correlator::assign_screenshots(&mut outline, &slots, &[shot]);
    assert!(outline.get("2").unwrap().items[0].screenshot_file.is_some());
    assert!(outline.get("1").unwrap().items[0].screenshot_file.is_none());

    // 编译
    let uploader = FakeUploader::new();
    let compiler = DocCompiler::new(&uploader, false);
    let requests = compiler.compile(&outline, "Lab Evidence").await.unwrap();

    // 题目按数字升序输出，与插入顺序无关
    let texts: Vec<String> = requests
        .iter()
        .filter_map(|r| match r {
            DocRequest::InsertText { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect();
    let q1_pos = texts.iter().position(|t| t == "Question 1\n").unwrap();
    let q2_pos = texts.iter().position(|t| t == "Question 2\n").unwrap();
    assert!(q1_pos < q2_pos);

    // Q1 的内联图片 + Q2 的截图各上传一次
    assert_eq!(*uploader.uploads.lock().unwrap(), 2);

    // 游标不变式：严格非递减，文本推进字符数，图片推进 1
    let mut expected: i64 = 1;
    for request in &requests {
        assert_eq!(request.index(), expected);
        expected += match request {
            DocRequest::InsertText { text, .. } => text.chars().count() as i64,
            DocRequest::InsertInlineImage { .. } => 1,
        };
    }
}

#[tokio::test]
async fn single_item_exact_mutation_list() {
    // 单题单记录，逐条核对变更列表和游标
    let notebook: Notebook = serde_json::from_value(serde_json::json!({
        "cells": [
            { "cell_type": "markdown", "source": "# Q1" },
            {
                "cell_type": "code",
                "source": "print(1)",
                "outputs": []
            }
        ]
    }))
    .unwrap();

    let (outline, slots) = Segmenter::new(false).segment(&notebook).unwrap();
    assert!(slots.is_empty());

    let uploader = FakeUploader::new();
    let compiler = DocCompiler::new(&uploader, false);
    let requests = compiler.compile(&outline, "Lab Evidence").await.unwrap();

    let expected = [
        "Lab Evidence\n\n",
        "Question 1\n",
        "========================================\n",
        "Code 1:\n",
        "    print(1)\n",
        "\n",
        "\n",
    ];

    assert_eq!(requests.len(), expected.len());
    let mut cursor: i64 = 1;
    for (request, text) in requests.iter().zip(expected.iter()) {
        match request {
            DocRequest::InsertText { index, text: t } => {
                assert_eq!(t, text);
                assert_eq!(*index, cursor);
                cursor += t.chars().count() as i64;
            }
            other => panic!("不应出现图片操作: {:?}", other),
        }
    }
}

#[test]
fn no_questions_notebook_is_rejected_before_any_remote_call() {
    let notebook: Notebook = serde_json::from_value(serde_json::json!({
        "cells": [
            { "cell_type": "markdown", "source": "只有说明，没有题号" },
            { "cell_type": "code", "source": "x = 1", "outputs": [] }
        ]
    }))
    .unwrap();

    let result = Segmenter::new(false).segment(&notebook);
    assert!(result.is_err());

    // 同样的笔记本开启自动编号后可以分段
    let (outline, _) = Segmenter::new(true).segment(&notebook).unwrap();
    assert!(outline.get("1").is_some());
}

#[test]
fn screenshot_map_length_matches_output_bearing_items() {
    let notebook: Notebook = serde_json::from_value(serde_json::json!({
        "cells": [
            { "cell_type": "markdown", "source": "Q1" },
            { "cell_type": "code", "source": "a()", "outputs": [
                { "output_type": "stream", "text": "a\n" }
            ]},
            { "cell_type": "code", "source": "silent()", "outputs": [] },
            { "cell_type": "code", "source": "b()", "outputs": [
                { "output_type": "stream", "text": "b\n" }
            ]}
        ]
    }))
    .unwrap();

    let (outline, slots) = Segmenter::new(false).segment(&notebook).unwrap();
    assert_eq!(outline.get("1").unwrap().items.len(), 3);
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].item_index, 0);
    assert_eq!(slots[1].item_index, 2);
}

#[test]
fn correlated_screenshot_paths_round_trip_through_serde() {
    // 大纲是普通可序列化结构，调试时可以直接导出
    let notebook = sample_notebook();
    let (mut outline, slots) = Segmenter::new(false).segment(&notebook).unwrap();
    correlator::assign_screenshots(&mut outline, &slots, &[PathBuf::from("shot.png")]);

    let json = serde_json::to_string(&outline).unwrap();
    let restored: lab_evidence_submit::Outline = serde_json::from_str(&json).unwrap();
    assert_eq!(
        restored.get("2").unwrap().items[0].screenshot_file,
        Some(PathBuf::from("shot.png"))
    );
}
