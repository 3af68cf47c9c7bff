// ==========================================
// 工程进度看板 - 工序领域模型
// ==========================================
// 进度率取值范围: [0.0, 1.0]，写入时校验
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// 进度率下限
pub const PROGRESS_MIN: f64 = 0.0;
/// 进度率上限
pub const PROGRESS_MAX: f64 = 1.0;

// ==========================================
// Task - 工序 (阶段)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,                         // 工序ID
    pub item_id: i64,                    // 所属部品
    pub stage: String,                   // 阶段名 (配置中的阶段列表之一)
    pub plan_start: Option<NaiveDate>,   // 计划开始
    pub plan_finish: Option<NaiveDate>,  // 计划完成
    pub act_start: Option<NaiveDate>,    // 实绩开始
    pub act_finish: Option<NaiveDate>,   // 实绩完成
    pub progress: f64,                   // 进度率 [0, 1]
    pub owner: Option<String>,           // 负责人
    pub supplier: Option<String>,        // 外协/采购方
    pub memo: Option<String>,            // 备忘
}

/// 工序字段（不含主键与所属部品）
///
/// 新建、更新、表格编辑共用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFields {
    pub stage: String,
    pub plan_start: Option<NaiveDate>,
    pub plan_finish: Option<NaiveDate>,
    pub act_start: Option<NaiveDate>,
    pub act_finish: Option<NaiveDate>,
    #[serde(default)]
    pub progress: f64,
    pub owner: Option<String>,
    pub supplier: Option<String>,
    pub memo: Option<String>,
}

impl TaskFields {
    /// 只有阶段名、其余字段为空的工序
    pub fn for_stage(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            plan_start: None,
            plan_finish: None,
            act_start: None,
            act_finish: None,
            progress: 0.0,
            owner: None,
            supplier: None,
            memo: None,
        }
    }
}

impl From<&Task> for TaskFields {
    fn from(task: &Task) -> Self {
        Self {
            stage: task.stage.clone(),
            plan_start: task.plan_start,
            plan_finish: task.plan_finish,
            act_start: task.act_start,
            act_finish: task.act_finish,
            progress: task.progress,
            owner: task.owner.clone(),
            supplier: task.supplier.clone(),
            memo: task.memo.clone(),
        }
    }
}

/// 工序表格编辑行
///
/// - `id = None`: 新增行
/// - `id = Some(_)` 且 `delete = true`: 删除行（需确认）
/// - 阶段名为空的行被跳过
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEdit {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub fields: TaskFields,
    #[serde(default)]
    pub delete: bool,
}

/// 可登录日期的年份范围
pub const MIN_SUPPORTED_YEAR: i32 = 1900;
pub const MAX_SUPPORTED_YEAR: i32 = 9999;

/// 日期是否在可登录范围内
pub fn is_supported_date(date: NaiveDate) -> bool {
    (MIN_SUPPORTED_YEAR..=MAX_SUPPORTED_YEAR).contains(&date.year())
}

/// 进度率是否在合法范围内（NaN 视为非法）
pub fn is_valid_progress(progress: f64) -> bool {
    (PROGRESS_MIN..=PROGRESS_MAX).contains(&progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_range() {
        assert!(is_valid_progress(0.0));
        assert!(is_valid_progress(0.35));
        assert!(is_valid_progress(1.0));
        assert!(!is_valid_progress(-0.01));
        assert!(!is_valid_progress(1.01));
        assert!(!is_valid_progress(f64::NAN));
    }

    #[test]
    fn test_supported_date_range() {
        assert!(is_supported_date(NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()));
        assert!(is_supported_date(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()));
        assert!(!is_supported_date(NaiveDate::from_ymd_opt(1899, 12, 31).unwrap()));
        assert!(!is_supported_date(NaiveDate::MIN));
        assert!(!is_supported_date(NaiveDate::MAX));
    }

    #[test]
    fn test_task_edit_flatten_json() {
        let json = r#"{"id":null,"stage":"設計","plan_start":"2025-01-01","plan_finish":null,
            "act_start":null,"act_finish":null,"progress":0.5,"owner":"田中","supplier":null,"memo":null}"#;
        let edit: TaskEdit = serde_json::from_str(json).unwrap();
        assert_eq!(edit.id, None);
        assert_eq!(edit.fields.stage, "設計");
        assert_eq!(edit.fields.plan_start, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert!(!edit.delete);
    }
}
