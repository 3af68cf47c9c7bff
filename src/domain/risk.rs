// ==========================================
// 工程进度看板 - 风险判定领域模型
// ==========================================
// RiskInput: 部品期限 + 代表工序日期/进度合并后的单条记录
// RiskAssessment: 判定结果 (等级 + 推算完成日 + 有效期限 + 余量)
// ==========================================

use crate::domain::item::Item;
use crate::domain::task::Task;
use crate::domain::types::RiskLevel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// RiskInput - 风险判定输入
// ==========================================
// 所有字段可缺省；progress 缺省按 0.0 处理
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskInput {
    pub plan_start: Option<NaiveDate>,
    pub plan_finish: Option<NaiveDate>,
    pub act_start: Option<NaiveDate>,
    pub act_finish: Option<NaiveDate>,
    pub progress: Option<f64>,
    pub due: Option<NaiveDate>,           // 客户交期
    pub hard_deadline: Option<NaiveDate>, // 内部截止日
}

impl RiskInput {
    /// 将工序的日期/进度与部品的两个期限合并
    pub fn merge(item: &Item, task: &Task) -> Self {
        Self {
            plan_start: task.plan_start,
            plan_finish: task.plan_finish,
            act_start: task.act_start,
            act_finish: task.act_finish,
            progress: Some(task.progress),
            due: item.due,
            hard_deadline: item.hard_deadline,
        }
    }
}

// ==========================================
// RiskAssessment - 风险判定结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub estimated_finish: Option<NaiveDate>, // 推算完成日
    pub effective_due: Option<NaiveDate>,    // 有效期限 (候选最早者)
    pub slack_days: Option<i64>,             // 余量天数 (可为负)
}

// ==========================================
// ItemRisk - 部品级风险 (跨部品警报视图的一行)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRisk {
    pub project_id: i64,
    pub item_id: i64,
    pub item_code: String,
    pub representative_task_id: i64,
    pub representative_stage: String,
    pub progress: f64,
    pub due: Option<NaiveDate>,
    pub hard_deadline: Option<NaiveDate>,
    pub assessment: RiskAssessment,
}

// ==========================================
// TaskRisk - 工序行级风险 (工序表中的徽章)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRisk {
    pub task: Task,
    pub assessment: RiskAssessment,
}
