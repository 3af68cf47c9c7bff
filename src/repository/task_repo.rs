// ==========================================
// 工程进度看板 - 工序仓储
// ==========================================
// 职责: 管理 tasks 表的 CRUD
// 约束: 所属部品必须存在 (外键)；progress 由表级 CHECK 兜底
// ==========================================

use crate::domain::task::{Task, TaskFields};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{date_to_sql, get_date};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = r#"
    SELECT t.id, t.item_id, t.stage, t.plan_start, t.plan_finish,
           t.act_start, t.act_finish, t.progress, t.owner, t.supplier, t.memo
      FROM tasks t
"#;

pub struct TaskRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TaskRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Task> {
        Ok(Task {
            id: row.get(0)?,
            item_id: row.get(1)?,
            stage: row.get(2)?,
            plan_start: get_date(row, 3)?,
            plan_finish: get_date(row, 4)?,
            act_start: get_date(row, 5)?,
            act_finish: get_date(row, 6)?,
            progress: row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
            owner: row.get(8)?,
            supplier: row.get(9)?,
            memo: row.get(10)?,
        })
    }

    fn query_list(conn: &Connection, sql: &str, param: Option<i64>) -> RepositoryResult<Vec<Task>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = match param {
            Some(p) => stmt.query_map(params![p], Self::map_row)?,
            None => stmt.query_map([], Self::map_row)?,
        };
        let tasks = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }

    // ==========================================
    // 写入
    // ==========================================

    pub fn insert(&self, item_id: i64, fields: &TaskFields) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_in(&conn, item_id, fields)
    }

    /// 同一事务内插入多条工序（标准工序生成用）
    pub fn insert_many(&self, item_id: i64, tasks: &[TaskFields]) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(tasks.len());
        for fields in tasks {
            ids.push(Self::insert_in(&tx, item_id, fields)?);
        }
        tx.commit()?;
        Ok(ids)
    }

    pub fn update(&self, id: i64, fields: &TaskFields) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Self::update_in(&conn, id, fields)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Ok(conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?)
    }

    /// 同一事务内批量新增 / 更新 / 删除
    ///
    /// 更新与删除仅作用于属于 `item_id` 的工序。
    ///
    /// # 返回
    /// (新增行数, 更新行数, 删除行数)
    pub fn apply_batch(
        &self,
        item_id: i64,
        inserts: &[TaskFields],
        updates: &[(i64, TaskFields)],
        deletes: &[i64],
    ) -> RepositoryResult<(usize, usize, usize)> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut deleted = 0;
        for id in deletes {
            deleted += tx.execute(
                "DELETE FROM tasks WHERE id = ?1 AND item_id = ?2",
                params![id, item_id],
            )?;
        }

        let mut updated = 0;
        for (id, fields) in updates {
            let owned: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM tasks WHERE id = ?1 AND item_id = ?2",
                    params![id, item_id],
                    |row| row.get(0),
                )
                .optional()?;
            if owned.is_none() {
                return Err(RepositoryError::not_found("Task", id));
            }
            updated += Self::update_in(&tx, *id, fields)?;
        }

        for fields in inserts {
            Self::insert_in(&tx, item_id, fields)?;
        }

        tx.commit()?;
        Ok((inserts.len(), updated, deleted))
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Task>> {
        let conn = self.get_conn()?;
        let task = conn
            .query_row(&format!("{} WHERE t.id = ?1", SELECT_COLUMNS), params![id], Self::map_row)
            .optional()?;
        Ok(task)
    }

    /// 部品下全部工序（按ID）
    pub fn list_by_item(&self, item_id: i64) -> RepositoryResult<Vec<Task>> {
        let conn = self.get_conn()?;
        Self::query_list(
            &conn,
            &format!("{} WHERE t.item_id = ?1 ORDER BY t.id", SELECT_COLUMNS),
            Some(item_id),
        )
    }

    /// 项目下全部工序（按部品ID、工序ID）
    pub fn list_by_project(&self, project_id: i64) -> RepositoryResult<Vec<Task>> {
        let conn = self.get_conn()?;
        Self::query_list(
            &conn,
            &format!(
                "{} JOIN items i ON i.id = t.item_id WHERE i.project_id = ?1 ORDER BY t.item_id, t.id",
                SELECT_COLUMNS
            ),
            Some(project_id),
        )
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<Task>> {
        let conn = self.get_conn()?;
        Self::query_list(&conn, &format!("{} ORDER BY t.item_id, t.id", SELECT_COLUMNS), None)
    }

    pub fn count_by_item(&self, item_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE item_id = ?1",
            params![item_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ==========================================
    // 事务内复用
    // ==========================================

    pub fn insert_in(conn: &Connection, item_id: i64, fields: &TaskFields) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO tasks (
                item_id, stage, plan_start, plan_finish, act_start, act_finish,
                progress, owner, supplier, memo
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                item_id,
                fields.stage,
                date_to_sql(fields.plan_start),
                date_to_sql(fields.plan_finish),
                date_to_sql(fields.act_start),
                date_to_sql(fields.act_finish),
                fields.progress,
                fields.owner,
                fields.supplier,
                fields.memo,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_in(conn: &Connection, id: i64, fields: &TaskFields) -> RepositoryResult<usize> {
        let affected = conn.execute(
            r#"
            UPDATE tasks
               SET stage = ?1,
                   plan_start = ?2,
                   plan_finish = ?3,
                   act_start = ?4,
                   act_finish = ?5,
                   progress = ?6,
                   owner = ?7,
                   supplier = ?8,
                   memo = ?9
             WHERE id = ?10
            "#,
            params![
                fields.stage,
                date_to_sql(fields.plan_start),
                date_to_sql(fields.plan_finish),
                date_to_sql(fields.act_start),
                date_to_sql(fields.act_finish),
                fields.progress,
                fields.owner,
                fields.supplier,
                fields.memo,
                id,
            ],
        )?;
        Ok(affected)
    }

    /// 部品下已有工序的 (id, 阶段名)，按ID（导入时按阶段匹配用）
    pub fn list_stage_ids_in(conn: &Connection, item_id: i64) -> RepositoryResult<Vec<(i64, String)>> {
        let mut stmt = conn.prepare("SELECT id, stage FROM tasks WHERE item_id = ?1 ORDER BY id")?;
        let pairs = stmt
            .query_map(params![item_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pairs)
    }
}
