// ==========================================
// 工程进度看板 - 引擎层
// ==========================================
// 职责: 纯业务规则计算,不拼 SQL
// ==========================================

pub mod gantt;
pub mod representative;
pub mod risk;
pub mod seeding;

// 重导出核心引擎
pub use gantt::GanttBuilder;
pub use representative::{representative_input, select_representative};
pub use risk::{RiskEvaluator, WARN_BUFFER_DAYS};
pub use seeding::StageSeeder;
