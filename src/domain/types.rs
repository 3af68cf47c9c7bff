// ==========================================
// 工程进度看板 - 领域类型定义
// ==========================================
// 风险等级、甘特条类型等封闭枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 风险等级 (Risk Level)
// ==========================================
// 顺序: Ok < Warn < Late (按严重程度排序)
// 序列化格式: lowercase (与导出/JSON 一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Ok,   // 正常
    Warn, // 要注意 (余量 <= 7 天，或数据不足)
    Late, // 延迟
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Ok => write!(f, "ok"),
            RiskLevel::Warn => write!(f, "warn"),
            RiskLevel::Late => write!(f, "late"),
        }
    }
}

impl RiskLevel {
    /// 是否需要出现在跨部品警报列表中
    pub fn needs_attention(&self) -> bool {
        matches!(self, RiskLevel::Warn | RiskLevel::Late)
    }

    /// 本地化显示标签（遅延/要注意/順調）
    pub fn label(&self) -> String {
        crate::i18n::t(&format!("risk.{}", self))
    }
}

// ==========================================
// 甘特条类型 (Gantt Bar Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarKind {
    Plan,   // 计划
    Actual, // 实绩
}

impl fmt::Display for BarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarKind::Plan => write!(f, "plan"),
            BarKind::Actual => write!(f, "actual"),
        }
    }
}
