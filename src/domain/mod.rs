// ==========================================
// 工程进度看板 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 约束: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod gantt;
pub mod import;
pub mod item;
pub mod project;
pub mod risk;
pub mod task;
pub mod types;

// 重导出核心类型
pub use gantt::GanttBar;
pub use import::{BoardRecord, ImportReport, RejectedRow, BOARD_COLUMNS};
pub use item::{Item, ItemEdit, NewItem};
pub use project::{NewProject, Project};
pub use risk::{ItemRisk, RiskAssessment, RiskInput, TaskRisk};
pub use task::{is_supported_date, is_valid_progress, Task, TaskEdit, TaskFields};
pub use types::{BarKind, RiskLevel};
