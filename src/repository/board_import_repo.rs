// ==========================================
// 工程进度看板 - 导入落库仓储
// ==========================================
// 职责: 将映射后的 BoardRecord 在单一事务内写入 items / tasks
// 规则:
// - 部品按 (project_id, code) 匹配；不存在则新建，存在则只覆盖非空字段
// - 工序按阶段名匹配导入前已有的工序（每条已有工序最多匹配一次）；
//   匹配成功则整行覆盖，否则新增
// ==========================================

use crate::domain::import::{BoardRecord, ImportReport};
use crate::domain::item::NewItem;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::item_repo::ItemRepository;
use crate::repository::task_repo::TaskRepository;
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct BoardImportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BoardImportRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 单一事务落库
    ///
    /// # 参数
    /// - project_id: 目标项目
    /// - records: 已通过校验的记录
    /// - report: 累加 inserted/updated 计数
    ///
    /// 任一行写入失败时整批回滚。
    pub fn import_records(
        &self,
        project_id: i64,
        records: &[BoardRecord],
        report: &mut ImportReport,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        // item_code → (item_id, 导入前已有且尚未被匹配的工序)
        let mut touched: HashMap<String, (i64, Vec<(i64, String)>)> = HashMap::new();

        for record in records {
            let patch = NewItem {
                project_id,
                code: record.item_code.clone(),
                description: record.item_description.clone(),
                plan_start: record.item_plan_start,
                plan_finish: record.item_plan_finish,
                due: record.due,
                hard_deadline: record.hard_deadline,
            };

            if !touched.contains_key(&record.item_code) {
                let item_id = match ItemRepository::find_by_code_in(&tx, project_id, &record.item_code)? {
                    Some(existing) => {
                        ItemRepository::merge_in(&tx, existing.id, &patch)?;
                        report.items_updated += 1;
                        existing.id
                    }
                    None => {
                        let id = ItemRepository::insert_in(&tx, &patch)?;
                        report.items_inserted += 1;
                        id
                    }
                };
                let existing_tasks = TaskRepository::list_stage_ids_in(&tx, item_id)?;
                touched.insert(record.item_code.clone(), (item_id, existing_tasks));
            } else if let Some((item_id, _)) = touched.get(&record.item_code) {
                // 同一部品的后续行：继续补充非空部品字段
                ItemRepository::merge_in(&tx, *item_id, &patch)?;
            }

            let Some(task) = &record.task else {
                continue;
            };
            let Some((item_id, pool)) = touched.get_mut(&record.item_code) else {
                continue;
            };

            match pool.iter().position(|(_, stage)| stage == &task.stage) {
                Some(pos) => {
                    let (task_id, _) = pool.remove(pos);
                    TaskRepository::update_in(&tx, task_id, task)?;
                    report.tasks_updated += 1;
                }
                None => {
                    TaskRepository::insert_in(&tx, *item_id, task)?;
                    report.tasks_inserted += 1;
                }
            }
        }

        tx.commit()?;
        tracing::info!(
            project_id,
            items_inserted = report.items_inserted,
            items_updated = report.items_updated,
            tasks_inserted = report.tasks_inserted,
            tasks_updated = report.tasks_updated,
            "导入落库完成"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::TaskFields;
    use chrono::NaiveDate;

    fn setup() -> (Arc<Mutex<Connection>>, i64) {
        let conn = crate::db::open_in_memory().unwrap();
        conn.execute("INSERT INTO projects (name) VALUES ('P1')", []).unwrap();
        let project_id = conn.last_insert_rowid();
        (Arc::new(Mutex::new(conn)), project_id)
    }

    fn record(row: usize, code: &str, stage: Option<&str>) -> BoardRecord {
        BoardRecord {
            row_number: row,
            item_code: code.to_string(),
            item_description: None,
            item_plan_start: None,
            item_plan_finish: None,
            due: NaiveDate::from_ymd_opt(2025, 6, 1),
            hard_deadline: None,
            task: stage.map(TaskFields::for_stage),
        }
    }

    #[test]
    fn test_import_creates_then_updates() {
        let (conn, project_id) = setup();
        let repo = BoardImportRepository::from_connection(conn.clone());

        let records = vec![
            record(2, "A", Some("設計")),
            record(3, "A", Some("設計")),
            record(4, "B", None),
        ];
        let mut report = ImportReport::default();
        repo.import_records(project_id, &records, &mut report).unwrap();
        assert_eq!(report.items_inserted, 2);
        // 同批次内重复阶段不互相覆盖
        assert_eq!(report.tasks_inserted, 2);
        assert_eq!(report.tasks_updated, 0);

        // 再导入一次：两条已有 設計 工序被逐一匹配
        let mut second = ImportReport::default();
        repo.import_records(project_id, &records, &mut second).unwrap();
        assert_eq!(second.items_inserted, 0);
        assert_eq!(second.items_updated, 2);
        assert_eq!(second.tasks_updated, 2);
        assert_eq!(second.tasks_inserted, 0);

        let tasks = TaskRepository::from_connection(conn).list_by_project(project_id).unwrap();
        assert_eq!(tasks.len(), 2);
    }
}
