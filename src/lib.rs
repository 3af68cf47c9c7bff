// ==========================================
// 工程进度看板 - 核心库
// ==========================================
// 部品 × 工序的计划/实绩管理，交期风险判定，甘特图数据
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "ja");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 风险判定 / 甘特图 / 标准工序
pub mod engine;

// 导入层 - CSV / Excel
pub mod importer;

// 配置层 - 阶段列表与字段标签
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BarKind, RiskLevel};

// 领域实体
pub use domain::{
    GanttBar, ImportReport, Item, ItemRisk, Project, RiskAssessment, RiskInput, Task, TaskRisk,
};

// 引擎
pub use engine::{GanttBuilder, RiskEvaluator, StageSeeder};

// API
pub use api::{DashboardApi, ImportApi, ItemApi, ProjectApi, TaskApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "工程進捗ボード";
