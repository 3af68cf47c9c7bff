// ==========================================
// 工程进度看板 - 部品 API
// ==========================================
// 职责: 部品新增/查询/更新/删除、表格批量编辑
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{clean_item_edit, clean_new_item};
use crate::domain::item::{Item, ItemEdit, NewItem};
use crate::repository::item_repo::ItemRepository;
use crate::repository::project_repo::ProjectRepository;

/// 新增部品结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddItemOutcome {
    pub item: Item,
    /// false: 同名部品已存在，未做修改
    pub created: bool,
}

/// 表格编辑结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
}

// ==========================================
// ItemApi - 部品 API
// ==========================================
pub struct ItemApi {
    project_repo: Arc<ProjectRepository>,
    item_repo: Arc<ItemRepository>,
}

impl ItemApi {
    pub fn new(project_repo: Arc<ProjectRepository>, item_repo: Arc<ItemRepository>) -> Self {
        Self {
            project_repo,
            item_repo,
        }
    }

    fn ensure_project(&self, project_id: i64) -> ApiResult<()> {
        if self.project_repo.find_by_id(project_id)?.is_none() {
            return Err(ApiError::NotFound(format!("项目(id={})不存在", project_id)));
        }
        Ok(())
    }

    /// 新增部品
    ///
    /// 同项目内部品名已存在时不报错，返回已有部品并标记 `created = false`。
    pub fn add_item(&self, item: NewItem) -> ApiResult<AddItemOutcome> {
        let item = clean_new_item(item)?;
        self.ensure_project(item.project_id)?;

        match self.item_repo.insert_or_ignore(&item)? {
            Some(id) => {
                info!(item_id = id, code = %item.code, "部品已新增");
                Ok(AddItemOutcome {
                    item: self.get_item(id)?,
                    created: true,
                })
            }
            None => {
                warn!(project_id = item.project_id, code = %item.code, "部品已存在");
                let existing = self
                    .item_repo
                    .find_by_code(item.project_id, &item.code)?
                    .ok_or_else(|| ApiError::NotFound(format!("部品 {} 不存在", item.code)))?;
                Ok(AddItemOutcome {
                    item: existing,
                    created: false,
                })
            }
        }
    }

    pub fn list_items(&self, project_id: i64) -> ApiResult<Vec<Item>> {
        self.ensure_project(project_id)?;
        Ok(self.item_repo.list_by_project(project_id)?)
    }

    pub fn get_item(&self, item_id: i64) -> ApiResult<Item> {
        self.item_repo
            .find_by_id(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("部品(id={})不存在", item_id)))
    }

    pub fn find_item_by_code(&self, project_id: i64, code: &str) -> ApiResult<Option<Item>> {
        Ok(self.item_repo.find_by_code(project_id, code.trim())?)
    }

    /// 更新部品（部品名改为同项目内已有名称时报业务规则错误）
    pub fn update_item(&self, edit: ItemEdit) -> ApiResult<Item> {
        let edit = clean_item_edit(edit)?;
        if self.item_repo.update(&edit)? == 0 {
            return Err(ApiError::NotFound(format!("部品(id={})不存在", edit.id)));
        }
        self.get_item(edit.id)
    }

    /// 删除部品（级联删除工序）
    pub fn delete_item(&self, item_id: i64, confirm: bool) -> ApiResult<()> {
        let item = self.get_item(item_id)?;
        if !confirm {
            return Err(ApiError::ConfirmationRequired(format!(
                "删除部品 {} 将同时删除其全部工序",
                item.code
            )));
        }
        self.item_repo.delete(item_id)?;
        info!(item_id, code = %item.code, "部品已删除");
        Ok(())
    }

    /// 部品表格批量编辑（单一事务）
    ///
    /// - 标记删除的行仅在 `confirm_delete` 时删除，否则跳过（不删除也不更新）
    /// - 其余行整行更新
    /// - 行ID必须属于该项目
    pub fn apply_edits(
        &self,
        project_id: i64,
        rows: Vec<ItemEdit>,
        confirm_delete: bool,
    ) -> ApiResult<EditSummary> {
        let owned: HashSet<i64> = self
            .list_items(project_id)?
            .into_iter()
            .map(|item| item.id)
            .collect();

        let mut summary = EditSummary::default();
        let mut updates = Vec::new();
        let mut deletes = Vec::new();

        for row in rows {
            if !owned.contains(&row.id) {
                return Err(ApiError::NotFound(format!(
                    "部品(id={})不属于项目(id={})",
                    row.id, project_id
                )));
            }
            if row.delete {
                if confirm_delete {
                    deletes.push(row.id);
                } else {
                    summary.skipped += 1;
                }
                continue;
            }
            updates.push(clean_item_edit(row)?);
        }

        let (updated, deleted) = self.item_repo.apply_batch(&updates, &deletes)?;
        summary.updated = updated;
        summary.deleted = deleted;

        info!(
            project_id,
            updated,
            deleted,
            skipped = summary.skipped,
            "部品表格编辑已保存"
        );
        Ok(summary)
    }
}
