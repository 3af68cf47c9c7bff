// ==========================================
// 工程进度看板 - 看板配置
// ==========================================
// 阶段列表、字段标签、默认部品等显式配置，
// 由调用方传给需要它的组件（标准工序生成、甘特行顺序、表头）。
// 风险判定引擎不需要配置。
// ==========================================

use crate::engine::seeding::DEFAULT_STAGE_DAYS;
use serde::{Deserialize, Serialize};

/// 标准阶段（按工艺顺序）
pub const DEFAULT_STAGES: [&str; 11] = [
    "設計",
    "材料手配",
    "前加工",
    "製缶",
    "仕上加工",
    "購入部品",
    "組立",
    "検査",
    "試運転",
    "解体",
    "出荷",
];

// ==========================================
// FieldLabels - 期限字段显示标签
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldLabels {
    pub customer_due: String,
    pub internal_deadline: String,
}

impl Default for FieldLabels {
    fn default() -> Self {
        Self {
            customer_due: "顧客納期".to_string(),
            internal_deadline: "社内締切".to_string(),
        }
    }
}

// ==========================================
// DefaultItem - 样例部品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultItem {
    pub code: String,
    pub description: String,
}

// ==========================================
// BoardConfig - 看板配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub stages: Vec<String>,
    pub field_labels: FieldLabels,
    pub default_project_name: String,
    pub default_customer_name: String,
    pub default_items: Vec<DefaultItem>,
    pub stage_days: i64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            stages: DEFAULT_STAGES.iter().map(|s| s.to_string()).collect(),
            field_labels: FieldLabels::default(),
            default_project_name: String::new(),
            default_customer_name: String::new(),
            default_items: Vec::new(),
            stage_days: DEFAULT_STAGE_DAYS,
        }
    }
}

/// 规范化阶段列表：去空白、去空行、去重（保留首次出现顺序）
pub fn normalize_stages<I, S>(stages: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result: Vec<String> = Vec::new();
    for stage in stages {
        let trimmed = stage.as_ref().trim();
        if !trimmed.is_empty() && !result.iter().any(|s| s == trimmed) {
            result.push(trimmed.to_string());
        }
    }
    result
}
