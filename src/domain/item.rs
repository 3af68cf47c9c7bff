// ==========================================
// 工程进度看板 - 部品领域模型
// ==========================================
// 唯一性: (project_id, code)
// 所有权: 部品独占其工序，删除部品级联删除工序
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Item - 部品 / 交付物
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,                            // 部品ID
    pub project_id: i64,                    // 所属项目
    pub code: String,                       // 部品名 (项目内唯一)
    pub description: Option<String>,        // 说明
    pub plan_start: Option<NaiveDate>,      // 计划开始日
    pub plan_finish: Option<NaiveDate>,     // 计划完成日
    pub due: Option<NaiveDate>,             // 客户交期 (可选)
    pub hard_deadline: Option<NaiveDate>,   // 公司内部截止日 (可选)
}

/// 新建部品参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub project_id: i64,
    pub code: String,
    pub description: Option<String>,
    pub plan_start: Option<NaiveDate>,
    pub plan_finish: Option<NaiveDate>,
    pub due: Option<NaiveDate>,
    pub hard_deadline: Option<NaiveDate>,
}

/// 部品表格编辑行
///
/// `delete = true` 的行只有在调用方确认删除时才会被删除，
/// 未确认时该行既不删除也不更新。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEdit {
    pub id: i64,
    pub code: String,
    pub description: Option<String>,
    pub plan_start: Option<NaiveDate>,
    pub plan_finish: Option<NaiveDate>,
    pub due: Option<NaiveDate>,
    pub hard_deadline: Option<NaiveDate>,
    #[serde(default)]
    pub delete: bool,
}

impl ItemEdit {
    /// 以现有部品为底稿生成编辑行
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id,
            code: item.code.clone(),
            description: item.description.clone(),
            plan_start: item.plan_start,
            plan_finish: item.plan_finish,
            due: item.due,
            hard_deadline: item.hard_deadline,
            delete: false,
        }
    }
}
