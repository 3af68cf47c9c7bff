// ==========================================
// 工程进度看板 - 数据仓储层
// ==========================================
// 约束: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod board_import_repo;
pub mod error;
pub mod item_repo;
pub mod project_repo;
pub mod sql_utils;
pub mod task_repo;

// 重导出核心仓储
pub use board_import_repo::BoardImportRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use item_repo::ItemRepository;
pub use project_repo::ProjectRepository;
pub use task_repo::TaskRepository;
