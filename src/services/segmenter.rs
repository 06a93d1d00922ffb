//! 笔记本分段器 - 业务能力层
//!
//! 遍历单元格流，维护"当前题目"状态，产出题号大纲和截图位置映射
//!
//! 遍历规则：
//! 1. markdown 带标记 → 切换当前题目，丢弃未消费的说明文字
//! 2. markdown 无标记 → 累积为说明文字，归属到下一条创建的记录
//! 3. code 无当前题目 → 按顺序恢复：源代码标记 → 输出文本标记 → 自动编号
//! 4. 仍无法归属的 code 单元格整体跳过（其输出随之丢失）

use crate::error::{AppError, AppResult, NotebookError};
use crate::models::notebook::{Cell, CellType, Notebook};
use crate::models::outline::{Item, Outline, ScreenshotSlot};
use crate::services::marker;

/// 笔记本分段器
pub struct Segmenter {
    auto_number: bool,
}

/// 单次遍历的状态，作用域限定在一次 segment 调用内
struct WalkState {
    current: Option<String>,
    pending_reasoning: Option<String>,
    auto_index: u32,
}

impl Segmenter {
    /// 创建分段器
    ///
    /// # 参数
    /// - `auto_number`: 未标记的代码单元格是否自动分配题号（从 1 递增）
    pub fn new(auto_number: bool) -> Self {
        Self { auto_number }
    }

    /// 分段整个笔记本
    ///
    /// # 返回
    /// (大纲, 截图位置映射)。遍历结束后大纲为空时返回
    /// `NotebookError::NoQuestionsFound`，调用方据此与空笔记本区分
    pub fn segment(&self, notebook: &Notebook) -> AppResult<(Outline, Vec<ScreenshotSlot>)> {
        let mut outline = Outline::default();
        let mut slots = Vec::new();
        let mut state = WalkState {
            current: None,
            pending_reasoning: None,
            auto_index: 1,
        };

        for cell in &notebook.cells {
            match cell.cell_type {
                CellType::Markdown => self.walk_markdown(cell, &mut outline, &mut state),
                CellType::Code => self.walk_code(cell, &mut outline, &mut slots, &mut state),
                CellType::Other => {}
            }
        }

        if outline.is_empty() {
            return Err(AppError::Notebook(NotebookError::NoQuestionsFound));
        }

        Ok((outline, slots))
    }

    fn walk_markdown(&self, cell: &Cell, outline: &mut Outline, state: &mut WalkState) {
        if let Some(qn) = marker::find_question_number(&cell.source) {
            // 题目边界：丢弃跨边界的说明文字
            state.current = Some(qn.clone());
            outline.ensure_question(&qn);
            state.pending_reasoning = None;
            return;
        }

        if state.current.is_some() {
            let text = cell.source.trim();
            if !text.is_empty() {
                state.pending_reasoning = Some(match state.pending_reasoning.take() {
                    Some(prev) => format!("{}\n{}", prev, text),
                    None => text.to_string(),
                });
            }
        }
    }

    fn walk_code(
        &self,
        cell: &Cell,
        outline: &mut Outline,
        slots: &mut Vec<ScreenshotSlot>,
        state: &mut WalkState,
    ) {
        if state.current.is_none() {
            state.current = self.recover_question(cell, state);
        }
        let Some(qn) = state.current.clone() else {
            // 无法归属，整个单元格跳过
            return;
        };

        let question = outline.ensure_question(&qn);

        // 有代码则追加新记录，并消费累积的说明文字
        if !cell.source.trim().is_empty() {
            question.items.push(Item {
                code: cell.source.clone(),
                reasoning: state.pending_reasoning.take(),
                ..Default::default()
            });
        }

        // 有输出则保证至少存在一条记录，并登记截图位置
        if !cell.outputs.is_empty() {
            if question.items.is_empty() {
                question.items.push(Item {
                    reasoning: state.pending_reasoning.take(),
                    ..Default::default()
                });
            }
            slots.push(ScreenshotSlot {
                question_id: qn.clone(),
                item_index: question.items.len() - 1,
            });
        }

        for output in &cell.outputs {
            let Some(item) = question.items.last_mut() else {
                continue;
            };
            if output.is_stream() {
                if !output.text.trim().is_empty() {
                    item.outputs.push_str(&output.text);
                }
            } else if output.is_rich() {
                if !output.data.text_plain.trim().is_empty() {
                    item.outputs.push_str(&output.data.text_plain);
                }
                // 每条记录只保留一张图片，后出现的覆盖先出现的
                if let Some(image) = &output.data.image_png {
                    item.image_b64 = Some(image.clone());
                }
            }
        }
    }

    /// 无当前题目时的恢复查找：按固定优先级逐项尝试，命中即返回
    fn recover_question(&self, cell: &Cell, state: &mut WalkState) -> Option<String> {
        if let Some(qn) = marker::find_question_number(&cell.source) {
            return Some(qn);
        }

        for output in &cell.outputs {
            let text = if output.is_stream() {
                &output.text
            } else if output.is_rich() {
                &output.data.text_plain
            } else {
                continue;
            };
            if let Some(qn) = marker::find_question_number(text) {
                return Some(qn);
            }
        }

        if self.auto_number {
            let qn = state.auto_index.to_string();
            state.auto_index += 1;
            return Some(qn);
        }

        None
    }
}
