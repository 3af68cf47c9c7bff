// ==========================================
// 工程进度看板 - 项目仓储
// ==========================================
// 职责: 管理 projects 表的 CRUD
// 约束: 不含业务逻辑；删除依赖外键级联清理部品/工序
// ==========================================

use crate::domain::project::{NewProject, Project};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct ProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Project> {
        Ok(Project {
            id: row.get(0)?,
            name: row.get(1)?,
            customer: row.get(2)?,
            note: row.get(3)?,
        })
    }

    /// 新建项目，返回自增ID
    pub fn insert(&self, project: &NewProject) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO projects (name, customer, note) VALUES (?1, ?2, ?3)",
            params![project.name, project.customer, project.note],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Project>> {
        let conn = self.get_conn()?;
        let project = conn
            .query_row(
                "SELECT id, name, customer, note FROM projects WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(project)
    }

    /// 全部项目，新建的在前
    pub fn list_all(&self) -> RepositoryResult<Vec<Project>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name, customer, note FROM projects ORDER BY id DESC")?;
        let projects = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }

    /// 删除项目（级联删除部品和工序）
    ///
    /// # 返回
    /// 删除的行数 (0 或 1)
    pub fn delete(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Ok(conn.execute("DELETE FROM projects WHERE id = ?1", params![id])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ProjectRepository {
        let conn = crate::db::open_in_memory().unwrap();
        ProjectRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn new_project(name: &str) -> NewProject {
        NewProject {
            name: name.to_string(),
            customer: Some("客先A".to_string()),
            note: None,
        }
    }

    #[test]
    fn test_insert_and_find() {
        let repo = setup();
        let id = repo.insert(&new_project("P1")).unwrap();

        let found = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.name, "P1");
        assert_eq!(found.customer.as_deref(), Some("客先A"));
        assert!(repo.find_by_id(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let repo = setup();
        let first = repo.insert(&new_project("P1")).unwrap();
        let second = repo.insert(&new_project("P2")).unwrap();

        let ids: Vec<i64> = repo.list_all().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_delete() {
        let repo = setup();
        let id = repo.insert(&new_project("P1")).unwrap();
        assert_eq!(repo.delete(id).unwrap(), 1);
        assert_eq!(repo.delete(id).unwrap(), 0);
    }
}
