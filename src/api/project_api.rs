// ==========================================
// 工程进度看板 - 项目 API
// ==========================================
// 职责: 项目创建/查询/删除、样例部品投入
// 删除项目需显式确认，级联删除部品与工序
// ==========================================

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{clean_text, require_text};
use crate::config::config_manager::ConfigManager;
use crate::domain::item::NewItem;
use crate::domain::project::{NewProject, Project};
use crate::engine::seeding::{StageSeeder, DEFAULT_ITEM_SPAN_DAYS};
use crate::repository::item_repo::ItemRepository;
use crate::repository::project_repo::ProjectRepository;
use crate::repository::task_repo::TaskRepository;

/// 样例投入结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub items_created: usize,
    pub items_existing: usize,
    pub tasks_created: usize,
}

// ==========================================
// ProjectApi - 项目 API
// ==========================================
pub struct ProjectApi {
    project_repo: Arc<ProjectRepository>,
    item_repo: Arc<ItemRepository>,
    task_repo: Arc<TaskRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ProjectApi {
    pub fn new(
        project_repo: Arc<ProjectRepository>,
        item_repo: Arc<ItemRepository>,
        task_repo: Arc<TaskRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            project_repo,
            item_repo,
            task_repo,
            config_manager,
        }
    }

    /// 创建项目
    ///
    /// 名称/客户为空时使用配置中的默认值；名称最终不能为空。
    pub fn create_project(&self, project: NewProject) -> ApiResult<Project> {
        let config = self
            .config_manager
            .load_board_config()
            .map_err(|e| ApiError::DatabaseError(format!("配置读取失败: {}", e)))?;

        let name = match clean_text(Some(project.name)) {
            Some(name) => name,
            None => require_text("项目名称", &config.default_project_name)?,
        };
        let customer = clean_text(project.customer)
            .or_else(|| clean_text(Some(config.default_customer_name)));

        let new_project = NewProject {
            name,
            customer,
            note: clean_text(project.note),
        };
        let id = self.project_repo.insert(&new_project)?;
        info!(project_id = id, name = %new_project.name, "项目已创建");

        self.get_project(id)
    }

    /// 项目列表（新建在前）
    pub fn list_projects(&self) -> ApiResult<Vec<Project>> {
        Ok(self.project_repo.list_all()?)
    }

    pub fn get_project(&self, project_id: i64) -> ApiResult<Project> {
        self.project_repo
            .find_by_id(project_id)?
            .ok_or_else(|| ApiError::NotFound(format!("项目(id={})不存在", project_id)))
    }

    /// 删除项目（级联删除部品与工序）
    ///
    /// # 参数
    /// - confirm: 调用方已确认删除
    pub fn delete_project(&self, project_id: i64, confirm: bool) -> ApiResult<()> {
        let project = self.get_project(project_id)?;
        if !confirm {
            return Err(ApiError::ConfirmationRequired(format!(
                "删除项目 {} 将同时删除其全部部品与工序",
                project.name
            )));
        }

        self.project_repo.delete(project_id)?;
        info!(project_id, name = %project.name, "项目已删除");
        Ok(())
    }

    /// 投入配置中的样例部品
    ///
    /// 部品按 code 插入或忽略，计划期间为 today .. today+60；
    /// 尚无工序的部品按阶段列表生成标准工序。
    pub fn seed_default_items(&self, project_id: i64, today: NaiveDate) -> ApiResult<SeedSummary> {
        self.get_project(project_id)?;
        let config = self
            .config_manager
            .load_board_config()
            .map_err(|e| ApiError::DatabaseError(format!("配置读取失败: {}", e)))?;

        let mut summary = SeedSummary::default();
        if config.default_items.is_empty() {
            info!(project_id, "未配置样例部品，跳过");
            return Ok(summary);
        }

        let out_of_range = || ApiError::InvalidInput(format!("样例部品计划日期超出范围: {}", today));
        let span_finish = today
            .checked_add_signed(Duration::days(DEFAULT_ITEM_SPAN_DAYS))
            .ok_or_else(out_of_range)?;
        let seeder = StageSeeder::new(config.stages.clone()).with_stage_days(config.stage_days);
        let seeded_tasks = seeder.seed(today).ok_or_else(out_of_range)?;
        for default_item in &config.default_items {
            let code = require_text("部品名", &default_item.code)?;
            let new_item = NewItem {
                project_id,
                code: code.clone(),
                description: clean_text(Some(default_item.description.clone())),
                plan_start: Some(today),
                plan_finish: Some(span_finish),
                due: None,
                hard_deadline: None,
            };

            let item_id = match self.item_repo.insert_or_ignore(&new_item)? {
                Some(id) => {
                    summary.items_created += 1;
                    id
                }
                None => {
                    summary.items_existing += 1;
                    self.item_repo
                        .find_by_code(project_id, &code)?
                        .map(|item| item.id)
                        .ok_or_else(|| ApiError::NotFound(format!("部品 {} 不存在", code)))?
                }
            };

            if self.task_repo.count_by_item(item_id)? == 0 {
                let ids = self.task_repo.insert_many(item_id, &seeded_tasks)?;
                summary.tasks_created += ids.len();
            }
        }

        info!(
            project_id,
            items_created = summary.items_created,
            tasks_created = summary.tasks_created,
            "样例部品投入完成"
        );
        Ok(summary)
    }
}
