// ==========================================
// 工程进度看板 - 配置层
// ==========================================
// 职责: 看板配置管理（阶段列表、字段标签、样例部品）
// 存储: config_kv 表
// ==========================================

pub mod board_config;
pub mod config_manager;

// 重导出核心配置
pub use board_config::{normalize_stages, BoardConfig, DefaultItem, FieldLabels, DEFAULT_STAGES};
pub use config_manager::{config_keys, ConfigManager};
