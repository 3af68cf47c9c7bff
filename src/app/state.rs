// ==========================================
// 工程进度看板 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{DashboardApi, ImportApi, ItemApi, ProjectApi, TaskApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::task_importer::TaskImporter;
use crate::repository::{
    board_import_repo::BoardImportRepository, item_repo::ItemRepository,
    project_repo::ProjectRepository, task_repo::TaskRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "PROGRESS_BOARD_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub project_api: Arc<ProjectApi>,
    pub item_api: Arc<ItemApi>,
    pub task_api: Arc<TaskApi>,
    pub dashboard_api: Arc<DashboardApi>,
    pub import_api: Arc<ImportApi>,

    /// 配置管理器（阶段列表、字段标签）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（":memory:" 为内存库）
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 所有Repository共享同一个连接；首次打开时建表。
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let project_repo = Arc::new(ProjectRepository::from_connection(conn.clone()));
        let item_repo = Arc::new(ItemRepository::from_connection(conn.clone()));
        let task_repo = Arc::new(TaskRepository::from_connection(conn.clone()));
        let import_repo = BoardImportRepository::from_connection(conn.clone());
        let config_manager = Arc::new(ConfigManager::from_connection(conn));

        // ==========================================
        // 初始化API层
        // ==========================================
        let project_api = Arc::new(ProjectApi::new(
            project_repo.clone(),
            item_repo.clone(),
            task_repo.clone(),
            config_manager.clone(),
        ));
        let item_api = Arc::new(ItemApi::new(project_repo.clone(), item_repo.clone()));
        let task_api = Arc::new(TaskApi::new(
            item_repo.clone(),
            task_repo.clone(),
            config_manager.clone(),
        ));
        let dashboard_api = Arc::new(DashboardApi::new(
            item_repo.clone(),
            task_repo.clone(),
            config_manager.clone(),
        ));
        let import_api = Arc::new(ImportApi::new(
            project_repo,
            item_repo,
            task_repo,
            TaskImporter::new(import_repo),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            project_api,
            item_api,
            task_api,
            dashboard_api,
            import_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 PROGRESS_BOARD_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./progress_board.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("progress-board");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("progress_board.db");
        }
    }

    path.to_string_lossy().to_string()
}
