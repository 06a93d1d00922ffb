use crate::error::{AppError, AppResult, NotebookError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// 一条证据记录：代码 + 输出文本 + 可选图片/截图/说明
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// 代码文本（可为空，例如只有输出的占位条目）
    #[serde(default)]
    pub code: String,
    /// 该代码单元格所有文本输出的拼接（按源顺序）
    #[serde(default)]
    pub outputs: String,
    /// 内联图片的 base64 负载（每条记录最多保留一张，后出现的覆盖先出现的）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_b64: Option<String>,
    /// 外部截图文件引用（由截图关联器填入）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_file: Option<PathBuf>,
    /// 前置说明文字（归属到紧随其后创建的第一条记录）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// 一道题目：按追加顺序保存的证据记录列表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub items: Vec<Item>,
}

/// 题号 → 题目 的大纲结构
///
/// 插入顺序无关紧要，编译时总是按题号数字升序遍历
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Outline {
    pub questions: HashMap<String, Question>,
}

impl Outline {
    /// 确保题目条目存在，返回可变引用
    pub fn ensure_question(&mut self, id: &str) -> &mut Question {
        self.questions.entry(id.to_string()).or_default()
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// 按数字升序返回所有题号
    ///
    /// 任何无法解析为整数的题号都是致命缺陷，直接报错而不是悄悄跳过
    pub fn sorted_ids(&self) -> AppResult<Vec<String>> {
        let mut numbered: Vec<(u64, String)> = Vec::with_capacity(self.questions.len());
        for id in self.questions.keys() {
            let number = id.parse::<u64>().map_err(|_| {
                AppError::Notebook(NotebookError::BadQuestionId { id: id.clone() })
            })?;
            numbered.push((number, id.clone()));
        }
        numbered.sort();
        Ok(numbered.into_iter().map(|(_, id)| id).collect())
    }
}

/// 截图位置映射的一项：(题号, 记录下标)
///
/// 映射顺序必须与渲染文档中输出区域的枚举顺序一致（两者都自上而下
/// 遍历笔记本），否则截图会关联到错误的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotSlot {
    pub question_id: String,
    pub item_index: usize,
}
