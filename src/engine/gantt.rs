// ==========================================
// 工程进度看板 - 甘特图数据生成
// ==========================================
// 输入: 部品 + 工序 + 阶段顺序
// 输出: 计划条 / 实绩条 (GanttBar)
// ==========================================
// 规则:
// - 计划条: 计划开始、计划完成均存在
// - 实绩条: 实绩开始存在；未完成时以今天为终点
// - 终点早于起点的条被丢弃
// ==========================================

use crate::domain::gantt::GanttBar;
use crate::domain::item::Item;
use crate::domain::task::Task;
use crate::domain::types::BarKind;
use chrono::NaiveDate;
use std::collections::HashMap;

pub struct GanttBuilder {
    stage_rank: HashMap<String, usize>,
}

impl GanttBuilder {
    /// # 参数
    /// - `stages`: 配置中的阶段顺序，决定同一部品内的行顺序
    pub fn new(stages: &[String]) -> Self {
        let stage_rank = stages
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.clone(), idx))
            .collect();
        Self { stage_rank }
    }

    /// 生成甘特条
    ///
    /// 工序所属部品不在 `items` 中时跳过该工序。
    pub fn build(&self, items: &[Item], tasks: &[Task], today: NaiveDate) -> Vec<GanttBar> {
        let item_index: HashMap<i64, &Item> = items.iter().map(|i| (i.id, i)).collect();

        let mut ordered: Vec<&Task> = tasks
            .iter()
            .filter(|t| item_index.contains_key(&t.item_id))
            .collect();
        ordered.sort_by_key(|t| (t.item_id, self.rank(&t.stage), t.id));

        let mut bars = Vec::new();
        for task in ordered {
            let item = item_index[&task.item_id];

            if let (Some(start), Some(finish)) = (task.plan_start, task.plan_finish) {
                if let Some(bar) = Self::bar(item, task, BarKind::Plan, start, finish, false) {
                    bars.push(bar);
                }
            }

            if let Some(start) = task.act_start {
                let (finish, open) = match task.act_finish {
                    Some(finish) => (finish, false),
                    None => (today, true),
                };
                if let Some(bar) = Self::bar(item, task, BarKind::Actual, start, finish, open) {
                    bars.push(bar);
                }
            }
        }

        tracing::debug!(bars = bars.len(), "甘特条生成完成");
        bars
    }

    /// 未配置的阶段排在已配置阶段之后
    fn rank(&self, stage: &str) -> usize {
        self.stage_rank.get(stage).copied().unwrap_or(usize::MAX)
    }

    fn bar(
        item: &Item,
        task: &Task,
        kind: BarKind,
        start: NaiveDate,
        finish: NaiveDate,
        open: bool,
    ) -> Option<GanttBar> {
        if finish < start {
            return None;
        }
        Some(GanttBar {
            item_id: item.id,
            item_code: item.code.clone(),
            task_id: task.id,
            stage: task.stage.clone(),
            kind,
            start,
            finish,
            progress: task.progress,
            open,
        })
    }
}
