// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use progress_board::app::AppState;
use progress_board::db::{init_schema, open_sqlite_connection};
use progress_board::domain::item::NewItem;
use progress_board::domain::project::NewProject;
use progress_board::logging;
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 基于临时数据库创建 AppState
pub fn create_test_state() -> (NamedTempFile, AppState) {
    logging::init_test();
    let (temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let state = AppState::new(db_path).expect("初始化 AppState 失败");
    (temp_file, state)
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).expect("无效日期")
}

/// 创建项目并返回ID
pub fn create_project(state: &AppState, name: &str) -> i64 {
    state
        .project_api
        .create_project(NewProject {
            name: name.to_string(),
            customer: Some("客先A".to_string()),
            note: None,
        })
        .expect("创建项目失败")
        .id
}

/// 创建部品并返回ID
pub fn create_item(
    state: &AppState,
    project_id: i64,
    code: &str,
    due: Option<NaiveDate>,
    hard_deadline: Option<NaiveDate>,
) -> i64 {
    state
        .item_api
        .add_item(NewItem {
            project_id,
            code: code.to_string(),
            due,
            hard_deadline,
            ..NewItem::default()
        })
        .expect("创建部品失败")
        .item
        .id
}
