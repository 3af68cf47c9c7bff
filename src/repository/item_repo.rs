// ==========================================
// 工程进度看板 - 部品仓储
// ==========================================
// 职责: 管理 items 表的 CRUD
// 约束: (project_id, code) 唯一；删除级联清理工序
// ==========================================
// 关联函数 `*_in(conn, ..)` 在调用方持有的连接/事务上执行，
// 供批量编辑和导入在同一事务内复用
// ==========================================

use crate::domain::item::{Item, ItemEdit, NewItem};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{date_to_sql, get_date};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str =
    "SELECT id, project_id, code, description, plan_start, plan_finish, due, hard_deadline FROM items";

pub struct ItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Item> {
        Ok(Item {
            id: row.get(0)?,
            project_id: row.get(1)?,
            code: row.get(2)?,
            description: row.get(3)?,
            plan_start: get_date(row, 4)?,
            plan_finish: get_date(row, 5)?,
            due: get_date(row, 6)?,
            hard_deadline: get_date(row, 7)?,
        })
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 新建部品；同项目内 code 重复时返回唯一约束错误
    pub fn insert(&self, item: &NewItem) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_in(&conn, item)
    }

    /// 新建部品；code 已存在时不做任何修改并返回 None
    pub fn insert_or_ignore(&self, item: &NewItem) -> RepositoryResult<Option<i64>> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            INSERT OR IGNORE INTO items (
                project_id, code, description, plan_start, plan_finish, due, hard_deadline
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                item.project_id,
                item.code,
                item.description,
                date_to_sql(item.plan_start),
                date_to_sql(item.plan_finish),
                date_to_sql(item.due),
                date_to_sql(item.hard_deadline),
            ],
        )?;
        Ok((affected > 0).then(|| conn.last_insert_rowid()))
    }

    pub fn update(&self, edit: &ItemEdit) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Self::update_in(&conn, edit)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Ok(conn.execute("DELETE FROM items WHERE id = ?1", params![id])?)
    }

    /// 同一事务内批量更新与删除
    ///
    /// # 返回
    /// (更新行数, 删除行数)
    pub fn apply_batch(&self, updates: &[ItemEdit], deletes: &[i64]) -> RepositoryResult<(usize, usize)> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut deleted = 0;
        for id in deletes {
            deleted += tx.execute("DELETE FROM items WHERE id = ?1", params![id])?;
        }

        let mut updated = 0;
        for edit in updates {
            updated += Self::update_in(&tx, edit)?;
        }

        tx.commit()?;
        Ok((updated, deleted))
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Item>> {
        let conn = self.get_conn()?;
        let item = conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_COLUMNS), params![id], Self::map_row)
            .optional()?;
        Ok(item)
    }

    pub fn find_by_code(&self, project_id: i64, code: &str) -> RepositoryResult<Option<Item>> {
        let conn = self.get_conn()?;
        Self::find_by_code_in(&conn, project_id, code)
    }

    /// 项目内全部部品（按ID）
    pub fn list_by_project(&self, project_id: i64) -> RepositoryResult<Vec<Item>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE project_id = ?1 ORDER BY id", SELECT_COLUMNS))?;
        let items = stmt
            .query_map(params![project_id], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// 全部项目的部品（按ID）
    pub fn list_all(&self) -> RepositoryResult<Vec<Item>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
        let items = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    // ==========================================
    // 事务内复用
    // ==========================================

    pub fn insert_in(conn: &Connection, item: &NewItem) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO items (
                project_id, code, description, plan_start, plan_finish, due, hard_deadline
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                item.project_id,
                item.code,
                item.description,
                date_to_sql(item.plan_start),
                date_to_sql(item.plan_finish),
                date_to_sql(item.due),
                date_to_sql(item.hard_deadline),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_in(conn: &Connection, edit: &ItemEdit) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"
            UPDATE items
               SET code = ?1,
                   description = ?2,
                   plan_start = ?3,
                   plan_finish = ?4,
                   due = ?5,
                   hard_deadline = ?6
             WHERE id = ?7
            "#,
            params![
                edit.code,
                edit.description,
                date_to_sql(edit.plan_start),
                date_to_sql(edit.plan_finish),
                date_to_sql(edit.due),
                date_to_sql(edit.hard_deadline),
                edit.id,
            ],
        )?;
        Ok(affected)
    }

    /// 只覆盖非空字段（导入时补充已有部品）
    pub fn merge_in(conn: &Connection, id: i64, patch: &NewItem) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"
            UPDATE items
               SET description = COALESCE(?1, description),
                   plan_start = COALESCE(?2, plan_start),
                   plan_finish = COALESCE(?3, plan_finish),
                   due = COALESCE(?4, due),
                   hard_deadline = COALESCE(?5, hard_deadline)
             WHERE id = ?6
            "#,
            params![
                patch.description,
                date_to_sql(patch.plan_start),
                date_to_sql(patch.plan_finish),
                date_to_sql(patch.due),
                date_to_sql(patch.hard_deadline),
                id,
            ],
        )?;
        Ok(affected)
    }

    pub fn find_by_code_in(conn: &Connection, project_id: i64, code: &str) -> RepositoryResult<Option<Item>> {
        let item = conn
            .query_row(
                &format!("{} WHERE project_id = ?1 AND code = ?2", SELECT_COLUMNS),
                params![project_id, code],
                Self::map_row,
            )
            .optional()?;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn setup() -> (Arc<Mutex<Connection>>, i64) {
        let conn = crate::db::open_in_memory().unwrap();
        conn.execute("INSERT INTO projects (name) VALUES ('P1')", []).unwrap();
        let project_id = conn.last_insert_rowid();
        (Arc::new(Mutex::new(conn)), project_id)
    }

    fn new_item(project_id: i64, code: &str) -> NewItem {
        NewItem {
            project_id,
            code: code.to_string(),
            description: Some("フレーム".to_string()),
            plan_start: NaiveDate::from_ymd_opt(2025, 1, 1),
            plan_finish: NaiveDate::from_ymd_opt(2025, 3, 1),
            due: NaiveDate::from_ymd_opt(2025, 3, 15),
            hard_deadline: None,
        }
    }

    #[test]
    fn test_insert_and_find_by_code() {
        let (conn, project_id) = setup();
        let repo = ItemRepository::from_connection(conn);

        let id = repo.insert(&new_item(project_id, "A-01")).unwrap();
        let found = repo.find_by_code(project_id, "A-01").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.due, NaiveDate::from_ymd_opt(2025, 3, 15));
        assert_eq!(found.hard_deadline, None);
    }

    #[test]
    fn test_duplicate_code_in_project() {
        let (conn, project_id) = setup();
        let repo = ItemRepository::from_connection(conn);

        repo.insert(&new_item(project_id, "A-01")).unwrap();
        let err = repo.insert(&new_item(project_id, "A-01")).unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));

        assert_eq!(repo.insert_or_ignore(&new_item(project_id, "A-01")).unwrap(), None);
        assert!(repo.insert_or_ignore(&new_item(project_id, "A-02")).unwrap().is_some());
    }

    #[test]
    fn test_unknown_project_is_fk_violation() {
        let (conn, project_id) = setup();
        let repo = ItemRepository::from_connection(conn);

        let err = repo.insert(&new_item(project_id + 1, "X")).unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }

    #[test]
    fn test_apply_batch_and_merge() {
        let (conn, project_id) = setup();
        let repo = ItemRepository::from_connection(conn.clone());

        let a = repo.insert(&new_item(project_id, "A")).unwrap();
        let b = repo.insert(&new_item(project_id, "B")).unwrap();

        let mut edit = ItemEdit::from_item(&repo.find_by_id(a).unwrap().unwrap());
        edit.hard_deadline = NaiveDate::from_ymd_opt(2025, 2, 20);
        let (updated, deleted) = repo.apply_batch(&[edit], &[b]).unwrap();
        assert_eq!((updated, deleted), (1, 1));
        assert!(repo.find_by_id(b).unwrap().is_none());

        let patch = NewItem {
            description: None,
            due: NaiveDate::from_ymd_opt(2025, 4, 1),
            ..NewItem::default()
        };
        {
            let guard = conn.lock().unwrap();
            ItemRepository::merge_in(&guard, a, &patch).unwrap();
        }
        let merged = repo.find_by_id(a).unwrap().unwrap();
        assert_eq!(merged.description.as_deref(), Some("フレーム"));
        assert_eq!(merged.due, NaiveDate::from_ymd_opt(2025, 4, 1));
        assert_eq!(merged.hard_deadline, NaiveDate::from_ymd_opt(2025, 2, 20));
    }
}
