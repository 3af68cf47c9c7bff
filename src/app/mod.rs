// ==========================================
// 工程进度看板 - 应用层
// ==========================================
// 职责: 由数据库路径组装仓储与 API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
