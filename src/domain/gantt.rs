// ==========================================
// 工程进度看板 - 甘特图数据模型
// ==========================================

use crate::domain::types::BarKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// GanttBar - 甘特条
// ==========================================
// 渲染无关：任何前端按 (item_code, stage) 分行绘制即可
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttBar {
    pub item_id: i64,
    pub item_code: String,
    pub task_id: i64,
    pub stage: String,
    pub kind: BarKind,
    pub start: NaiveDate,
    pub finish: NaiveDate,
    pub progress: f64,
    pub open: bool, // 实绩条尚未完成（以今天作为终点）
}

impl GanttBar {
    /// 条长（天，含首尾）
    pub fn duration_days(&self) -> i64 {
        (self.finish - self.start).num_days() + 1
    }
}
