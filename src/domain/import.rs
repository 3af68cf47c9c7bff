// ==========================================
// 工程进度看板 - 导入/导出领域模型
// ==========================================
// 一行 CSV = 一个部品 (+ 可选的一条工序)
// ==========================================

use crate::domain::task::TaskFields;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// CSV 列名（导入/导出共用，顺序即导出顺序）
pub const BOARD_COLUMNS: [&str; 15] = [
    "item_code",
    "item_description",
    "item_plan_start",
    "item_plan_finish",
    "due",
    "hard_deadline",
    "stage",
    "plan_start",
    "plan_finish",
    "act_start",
    "act_finish",
    "progress",
    "owner",
    "supplier",
    "memo",
];

// ==========================================
// BoardRecord - 映射后的一行导入数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardRecord {
    pub row_number: usize, // 源文件行号 (表头为第1行)

    // ===== 部品字段 =====
    pub item_code: String,
    pub item_description: Option<String>,
    pub item_plan_start: Option<NaiveDate>,
    pub item_plan_finish: Option<NaiveDate>,
    pub due: Option<NaiveDate>,
    pub hard_deadline: Option<NaiveDate>,

    // ===== 工序字段 (阶段名为空时不导入工序) =====
    pub task: Option<TaskFields>,
}

// ==========================================
// RejectedRow - 被拒绝的行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub row_number: usize,
    pub reason: String,
}

// ==========================================
// ImportReport - 导入结果汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub items_inserted: usize,
    pub items_updated: usize,
    pub tasks_inserted: usize,
    pub tasks_updated: usize,
    pub rejected: Vec<RejectedRow>,
    pub warnings: Vec<String>,
}

impl ImportReport {
    pub fn accepted_rows(&self) -> usize {
        self.total_rows.saturating_sub(self.rejected.len())
    }
}
