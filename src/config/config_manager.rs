// ==========================================
// 工程进度看板 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value, 值为 JSON)
// 未写入的键回退到 BoardConfig::default()
// ==========================================

use crate::config::board_config::{normalize_stages, BoardConfig, DefaultItem, FieldLabels};
use crate::engine::seeding::MAX_STAGE_DAYS;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const STAGES: &str = "stages";
    pub const FIELD_LABELS: &str = "field_labels";
    pub const DEFAULT_PROJECT_NAME: &str = "default_project_name";
    pub const DEFAULT_CUSTOMER_NAME: &str = "default_customer_name";
    pub const DEFAULT_ITEMS: &str = "default_items";
    pub const STAGE_DAYS: &str = "stage_days";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 读取原始配置值
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入原始配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, "配置已更新");
        Ok(())
    }

    /// 读取 JSON 配置；格式错误时记录告警并回退默认值
    fn get_json_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>> {
        match self.get_config_value(key)? {
            None => Ok(default),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(v) => Ok(v),
                Err(e) => {
                    tracing::warn!(key, error = %e, "配置值格式错误，使用默认值");
                    Ok(default)
                }
            },
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), Box<dyn Error>> {
        self.set_config_value(key, &serde_json::to_string(value)?)
    }

    // ==========================================
    // 看板配置
    // ==========================================

    /// 加载完整看板配置
    pub fn load_board_config(&self) -> Result<BoardConfig, Box<dyn Error>> {
        let defaults = BoardConfig::default();

        let stages: Vec<String> = self.get_json_or(config_keys::STAGES, defaults.stages.clone())?;
        let stages = normalize_stages(stages);

        Ok(BoardConfig {
            stages: if stages.is_empty() { defaults.stages } else { stages },
            field_labels: self.get_json_or(config_keys::FIELD_LABELS, defaults.field_labels)?,
            default_project_name: self
                .get_json_or(config_keys::DEFAULT_PROJECT_NAME, defaults.default_project_name)?,
            default_customer_name: self
                .get_json_or(config_keys::DEFAULT_CUSTOMER_NAME, defaults.default_customer_name)?,
            default_items: self.get_json_or(config_keys::DEFAULT_ITEMS, defaults.default_items)?,
            stage_days: self
                .get_json_or(config_keys::STAGE_DAYS, defaults.stage_days)?
                .clamp(1, MAX_STAGE_DAYS),
        })
    }

    /// 保存阶段列表（规范化后不能为空）
    pub fn save_stages(&self, stages: &[String]) -> Result<Vec<String>, Box<dyn Error>> {
        let normalized = normalize_stages(stages);
        if normalized.is_empty() {
            return Err("阶段列表不能为空".into());
        }
        self.set_json(config_keys::STAGES, &normalized)?;
        Ok(normalized)
    }

    pub fn save_field_labels(&self, labels: &FieldLabels) -> Result<(), Box<dyn Error>> {
        self.set_json(config_keys::FIELD_LABELS, labels)
    }

    pub fn save_default_items(&self, items: &[DefaultItem]) -> Result<(), Box<dyn Error>> {
        self.set_json(config_keys::DEFAULT_ITEMS, &items)
    }

    pub fn save_stage_days(&self, days: i64) -> Result<(), Box<dyn Error>> {
        if !(1..=MAX_STAGE_DAYS).contains(&days) {
            return Err(format!("每阶段天数必须在 1-{} 之间: {}", MAX_STAGE_DAYS, days).into());
        }
        self.set_json(config_keys::STAGE_DAYS, &days)
    }

    /// 全部已写入配置的快照（键有序）
    pub fn get_config_snapshot(&self) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ConfigManager {
        let conn = crate::db::open_in_memory().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_defaults_when_empty() {
        let manager = setup();
        let config = manager.load_board_config().unwrap();
        assert_eq!(config, BoardConfig::default());
        assert!(manager.get_config_snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_stages() {
        let manager = setup();
        let saved = manager
            .save_stages(&["設計".to_string(), " 塗装 ".to_string(), "設計".to_string()])
            .unwrap();
        assert_eq!(saved, vec!["設計", "塗装"]);

        let config = manager.load_board_config().unwrap();
        assert_eq!(config.stages, vec!["設計", "塗装"]);
    }

    #[test]
    fn test_empty_stages_rejected() {
        let manager = setup();
        assert!(manager.save_stages(&[" ".to_string()]).is_err());
    }

    #[test]
    fn test_malformed_value_falls_back_to_default() {
        let manager = setup();
        manager.set_config_value(config_keys::STAGES, "not json").unwrap();
        manager.set_config_value(config_keys::STAGE_DAYS, "0").unwrap();

        let config = manager.load_board_config().unwrap();
        assert_eq!(config.stages, BoardConfig::default().stages);
        assert_eq!(config.stage_days, 1);
    }

    #[test]
    fn test_stage_days_bounds() {
        let manager = setup();
        assert!(manager.save_stage_days(0).is_err());
        assert!(manager.save_stage_days(1_000_000_000).is_err());
        assert!(manager.get_config_snapshot().unwrap().is_empty());

        manager.save_stage_days(MAX_STAGE_DAYS).unwrap();
        assert_eq!(manager.load_board_config().unwrap().stage_days, MAX_STAGE_DAYS);

        // 直接写入的越界值读取时收敛到上限
        manager
            .set_config_value(config_keys::STAGE_DAYS, "1000000000")
            .unwrap();
        assert_eq!(manager.load_board_config().unwrap().stage_days, MAX_STAGE_DAYS);
    }

    #[test]
    fn test_field_labels_and_default_items() {
        let manager = setup();
        let labels = FieldLabels {
            customer_due: "納期".to_string(),
            internal_deadline: "社内期限".to_string(),
        };
        manager.save_field_labels(&labels).unwrap();
        manager
            .save_default_items(&[DefaultItem {
                code: "F-01".to_string(),
                description: "フレーム".to_string(),
            }])
            .unwrap();

        let config = manager.load_board_config().unwrap();
        assert_eq!(config.field_labels, labels);
        assert_eq!(config.default_items.len(), 1);
        assert_eq!(manager.get_config_snapshot().unwrap().len(), 2);
    }
}
