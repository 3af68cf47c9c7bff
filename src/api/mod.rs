// ==========================================
// 工程进度看板 - API 层
// ==========================================
// 职责: 输入校验 + 用例编排，供 CLI 或其他前端调用
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod import_api;
pub mod item_api;
pub mod project_api;
pub mod task_api;
pub mod validator;

pub use dashboard_api::DashboardApi;
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
pub use item_api::{AddItemOutcome, EditSummary, ItemApi};
pub use project_api::{ProjectApi, SeedSummary};
pub use task_api::TaskApi;
