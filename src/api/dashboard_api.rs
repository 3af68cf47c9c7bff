// ==========================================
// 工程进度看板 - 看板 API
// ==========================================
// 职责: 跨部品警报、部品/工序风险徽章、甘特图数据
// 所有查询都有显式 today 版本（*_at），便于测试与回放
// ==========================================

use chrono::{Local, NaiveDate};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::domain::gantt::GanttBar;
use crate::domain::item::Item;
use crate::domain::risk::{ItemRisk, RiskInput, TaskRisk};
use crate::domain::task::Task;
use crate::engine::gantt::GanttBuilder;
use crate::engine::representative::representative_input;
use crate::engine::risk::RiskEvaluator;
use crate::repository::item_repo::ItemRepository;
use crate::repository::task_repo::TaskRepository;

/// 警报排序: 延迟在前 → 余量升序（缺省在后）→ 部品ID
fn alert_order(a: &ItemRisk, b: &ItemRisk) -> Ordering {
    let slack_key = |r: &ItemRisk| (r.assessment.slack_days.is_none(), r.assessment.slack_days);
    b.assessment
        .level
        .cmp(&a.assessment.level)
        .then_with(|| slack_key(a).cmp(&slack_key(b)))
        .then_with(|| a.item_id.cmp(&b.item_id))
}

// ==========================================
// DashboardApi - 看板 API
// ==========================================
pub struct DashboardApi {
    item_repo: Arc<ItemRepository>,
    task_repo: Arc<TaskRepository>,
    config_manager: Arc<ConfigManager>,
    evaluator: RiskEvaluator,
}

impl DashboardApi {
    pub fn new(
        item_repo: Arc<ItemRepository>,
        task_repo: Arc<TaskRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            item_repo,
            task_repo,
            config_manager,
            evaluator: RiskEvaluator::new(),
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// 逐部品选出代表工序并判定
    ///
    /// 无工序的部品被排除。结果按部品ID排序。
    fn evaluate_items(&self, items: &[Item], tasks: Vec<Task>, today: NaiveDate) -> Vec<ItemRisk> {
        let mut by_item: HashMap<i64, Vec<Task>> = HashMap::new();
        for task in tasks {
            by_item.entry(task.item_id).or_default().push(task);
        }

        let mut risks: Vec<ItemRisk> = items
            .iter()
            .filter_map(|item| {
                let tasks = by_item.get(&item.id)?;
                let (rep, input) = representative_input(item, tasks)?;
                Some(ItemRisk {
                    project_id: item.project_id,
                    item_id: item.id,
                    item_code: item.code.clone(),
                    representative_task_id: rep.id,
                    representative_stage: rep.stage.clone(),
                    progress: rep.progress,
                    due: item.due,
                    hard_deadline: item.hard_deadline,
                    assessment: self.evaluator.evaluate(&input, today),
                })
            })
            .collect();
        risks.sort_by_key(|r| r.item_id);
        risks
    }

    // ==========================================
    // 跨部品警报
    // ==========================================

    /// 需要关注的部品（延迟/要注意）
    ///
    /// # 参数
    /// - project_id: None 时覆盖全部项目
    pub fn list_alerts(&self, project_id: Option<i64>) -> ApiResult<Vec<ItemRisk>> {
        self.list_alerts_at(project_id, Self::today())
    }

    pub fn list_alerts_at(&self, project_id: Option<i64>, today: NaiveDate) -> ApiResult<Vec<ItemRisk>> {
        let (items, tasks) = match project_id {
            Some(id) => (
                self.item_repo.list_by_project(id)?,
                self.task_repo.list_by_project(id)?,
            ),
            None => (self.item_repo.list_all()?, self.task_repo.list_all()?),
        };

        let mut alerts: Vec<ItemRisk> = self
            .evaluate_items(&items, tasks, today)
            .into_iter()
            .filter(|r| r.assessment.level.needs_attention())
            .collect();
        alerts.sort_by(alert_order);

        debug!(?project_id, %today, alerts = alerts.len(), "警报列表已生成");
        Ok(alerts)
    }

    /// 项目内全部部品的风险（含正常）
    pub fn item_risks(&self, project_id: i64) -> ApiResult<Vec<ItemRisk>> {
        self.item_risks_at(project_id, Self::today())
    }

    pub fn item_risks_at(&self, project_id: i64, today: NaiveDate) -> ApiResult<Vec<ItemRisk>> {
        let items = self.item_repo.list_by_project(project_id)?;
        let tasks = self.task_repo.list_by_project(project_id)?;
        Ok(self.evaluate_items(&items, tasks, today))
    }

    /// 工序表逐行风险徽章（每行与部品期限合并后判定）
    pub fn task_risks(&self, item_id: i64) -> ApiResult<Vec<TaskRisk>> {
        self.task_risks_at(item_id, Self::today())
    }

    pub fn task_risks_at(&self, item_id: i64, today: NaiveDate) -> ApiResult<Vec<TaskRisk>> {
        let item = self
            .item_repo
            .find_by_id(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("部品(id={})不存在", item_id)))?;

        let risks = self
            .task_repo
            .list_by_item(item_id)?
            .into_iter()
            .map(|task| {
                let assessment = self.evaluator.evaluate(&RiskInput::merge(&item, &task), today);
                TaskRisk { task, assessment }
            })
            .collect();
        Ok(risks)
    }

    // ==========================================
    // 甘特图
    // ==========================================

    /// 甘特条（按配置阶段顺序）
    ///
    /// # 参数
    /// - item_id: 指定时只输出该部品
    pub fn gantt(&self, project_id: i64, item_id: Option<i64>) -> ApiResult<Vec<GanttBar>> {
        self.gantt_at(project_id, item_id, Self::today())
    }

    pub fn gantt_at(
        &self,
        project_id: i64,
        item_id: Option<i64>,
        today: NaiveDate,
    ) -> ApiResult<Vec<GanttBar>> {
        let config = self
            .config_manager
            .load_board_config()
            .map_err(|e| ApiError::DatabaseError(format!("配置读取失败: {}", e)))?;

        let mut items = self.item_repo.list_by_project(project_id)?;
        if let Some(id) = item_id {
            items.retain(|item| item.id == id);
            if items.is_empty() {
                return Err(ApiError::NotFound(format!(
                    "部品(id={})不属于项目(id={})",
                    id, project_id
                )));
            }
        }
        let tasks = self.task_repo.list_by_project(project_id)?;

        Ok(GanttBuilder::new(&config.stages).build(&items, &tasks, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::risk::RiskAssessment;
    use crate::domain::types::RiskLevel;

    fn risk(item_id: i64, level: RiskLevel, slack: Option<i64>) -> ItemRisk {
        ItemRisk {
            project_id: 1,
            item_id,
            item_code: format!("I{}", item_id),
            representative_task_id: item_id * 10,
            representative_stage: "設計".to_string(),
            progress: 0.0,
            due: None,
            hard_deadline: None,
            assessment: RiskAssessment {
                level,
                estimated_finish: None,
                effective_due: None,
                slack_days: slack,
            },
        }
    }

    #[test]
    fn test_alert_order() {
        let mut alerts = vec![
            risk(1, RiskLevel::Warn, None),
            risk(2, RiskLevel::Warn, Some(3)),
            risk(3, RiskLevel::Late, Some(-1)),
            risk(4, RiskLevel::Late, Some(-10)),
            risk(5, RiskLevel::Warn, Some(3)),
        ];
        alerts.sort_by(alert_order);
        let ids: Vec<i64> = alerts.iter().map(|r| r.item_id).collect();
        assert_eq!(ids, vec![4, 3, 2, 5, 1]);
    }
}
