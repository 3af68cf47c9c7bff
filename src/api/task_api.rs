// ==========================================
// 工程进度看板 - 工序 API
// ==========================================
// 职责: 工序新增/查询/更新/删除、表格批量编辑、标准工序生成
// ==========================================

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::item_api::EditSummary;
use crate::api::validator::clean_task_fields;
use crate::config::config_manager::ConfigManager;
use crate::domain::task::{Task, TaskEdit, TaskFields};
use crate::engine::seeding::StageSeeder;
use crate::repository::item_repo::ItemRepository;
use crate::repository::task_repo::TaskRepository;

// ==========================================
// TaskApi - 工序 API
// ==========================================
pub struct TaskApi {
    item_repo: Arc<ItemRepository>,
    task_repo: Arc<TaskRepository>,
    config_manager: Arc<ConfigManager>,
}

impl TaskApi {
    pub fn new(
        item_repo: Arc<ItemRepository>,
        task_repo: Arc<TaskRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            item_repo,
            task_repo,
            config_manager,
        }
    }

    fn ensure_item(&self, item_id: i64) -> ApiResult<()> {
        if self.item_repo.find_by_id(item_id)?.is_none() {
            return Err(ApiError::NotFound(format!("部品(id={})不存在", item_id)));
        }
        Ok(())
    }

    /// 部品下的工序（按ID）
    pub fn list_tasks(&self, item_id: i64) -> ApiResult<Vec<Task>> {
        self.ensure_item(item_id)?;
        Ok(self.task_repo.list_by_item(item_id)?)
    }

    pub fn get_task(&self, task_id: i64) -> ApiResult<Task> {
        self.task_repo
            .find_by_id(task_id)?
            .ok_or_else(|| ApiError::NotFound(format!("工序(id={})不存在", task_id)))
    }

    pub fn add_task(&self, item_id: i64, fields: TaskFields) -> ApiResult<Task> {
        let fields = clean_task_fields(fields)?;
        self.ensure_item(item_id)?;
        let id = self.task_repo.insert(item_id, &fields)?;
        info!(task_id = id, item_id, stage = %fields.stage, "工序已新增");
        self.get_task(id)
    }

    /// 整行更新工序
    pub fn update_task(&self, task_id: i64, fields: TaskFields) -> ApiResult<Task> {
        let fields = clean_task_fields(fields)?;
        if self.task_repo.update(task_id, &fields)? == 0 {
            return Err(ApiError::NotFound(format!("工序(id={})不存在", task_id)));
        }
        debug!(task_id, progress = fields.progress, "工序已更新");
        self.get_task(task_id)
    }

    pub fn delete_task(&self, task_id: i64, confirm: bool) -> ApiResult<()> {
        let task = self.get_task(task_id)?;
        if !confirm {
            return Err(ApiError::ConfirmationRequired(format!(
                "删除工序 {} (id={})",
                task.stage, task.id
            )));
        }
        self.task_repo.delete(task_id)?;
        info!(task_id, stage = %task.stage, "工序已删除");
        Ok(())
    }

    /// 工序表格批量编辑（单一事务）
    ///
    /// - 无 ID 的行为新增，有 ID 的行为更新
    /// - 标记删除的行仅在 `confirm_delete` 时删除，否则跳过
    /// - 阶段名为空的行跳过
    pub fn apply_edits(
        &self,
        item_id: i64,
        rows: Vec<TaskEdit>,
        confirm_delete: bool,
    ) -> ApiResult<EditSummary> {
        self.ensure_item(item_id)?;

        let mut summary = EditSummary::default();
        let mut inserts = Vec::new();
        let mut updates = Vec::new();
        let mut deletes = Vec::new();

        for row in rows {
            if row.delete {
                match row.id {
                    Some(id) if confirm_delete => deletes.push(id),
                    _ => summary.skipped += 1,
                }
                continue;
            }
            if row.fields.stage.trim().is_empty() {
                summary.skipped += 1;
                continue;
            }

            let fields = clean_task_fields(row.fields)?;
            match row.id {
                Some(id) => updates.push((id, fields)),
                None => inserts.push(fields),
            }
        }

        let (inserted, updated, deleted) =
            self.task_repo
                .apply_batch(item_id, &inserts, &updates, &deletes)?;
        summary.inserted = inserted;
        summary.updated = updated;
        summary.deleted = deleted;

        info!(
            item_id,
            inserted,
            updated,
            deleted,
            skipped = summary.skipped,
            "工序表格编辑已保存"
        );
        Ok(summary)
    }

    /// 按阶段列表生成标准工序
    ///
    /// 部品已有工序时不做任何修改，返回 0。
    pub fn seed_tasks(&self, item_id: i64, start: NaiveDate) -> ApiResult<usize> {
        self.ensure_item(item_id)?;
        if self.task_repo.count_by_item(item_id)? > 0 {
            info!(item_id, "部品已有工序，跳过标准工序生成");
            return Ok(0);
        }

        let config = self
            .config_manager
            .load_board_config()
            .map_err(|e| ApiError::DatabaseError(format!("配置读取失败: {}", e)))?;
        let seeder = StageSeeder::new(config.stages).with_stage_days(config.stage_days);

        let tasks = seeder
            .seed(start)
            .ok_or_else(|| ApiError::InvalidInput(format!("标准工序计划日期超出范围: {}", start)))?;
        let ids = self.task_repo.insert_many(item_id, &tasks)?;
        info!(item_id, created = ids.len(), "标准工序已生成");
        Ok(ids.len())
    }
}
