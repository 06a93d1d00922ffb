//! 截图关联器 - 业务能力层
//!
//! 把外部捕获的有序截图文件按位置映射写回大纲

use crate::models::outline::{Item, Outline, ScreenshotSlot};
use std::path::PathBuf;
use tracing::debug;

/// 按位置映射把截图文件关联到对应记录
///
/// 第 i 张截图归属第 i 个映射位置。截图多于映射的部分不使用；
/// 截图不足时剩余记录保持无截图，均不是错误。映射下标越界时
/// 用空记录补齐题目的记录列表（防御性，正常流程不会触发）
pub fn assign_screenshots(outline: &mut Outline, slots: &[ScreenshotSlot], shots: &[PathBuf]) {
    for (i, slot) in slots.iter().enumerate() {
        let Some(path) = shots.get(i) else {
            debug!(
                "截图数量不足: {} 个位置只有 {} 张截图",
                slots.len(),
                shots.len()
            );
            break;
        };
        let question = outline.ensure_question(&slot.question_id);
        while question.items.len() <= slot.item_index {
            question.items.push(Item::default());
        }
        question.items[slot.item_index].screenshot_file = Some(path.clone());
    }
}
