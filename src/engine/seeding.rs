// ==========================================
// 工程进度看板 - 标准工序生成
// ==========================================
// 每个阶段生成一条工序: 第 i 个阶段计划为
// [start + 7i, start + 7(i+1)]，进度 0
// ==========================================

use crate::domain::task::TaskFields;
use chrono::{Duration, NaiveDate};

/// 每个阶段的默认计划天数
pub const DEFAULT_STAGE_DAYS: i64 = 7;

/// 默认部品计划跨度（天）
pub const DEFAULT_ITEM_SPAN_DAYS: i64 = 60;

/// 每阶段天数上限
pub const MAX_STAGE_DAYS: i64 = 365;

pub struct StageSeeder {
    stages: Vec<String>,
    stage_days: i64,
}

impl StageSeeder {
    pub fn new(stages: Vec<String>) -> Self {
        Self {
            stages,
            stage_days: DEFAULT_STAGE_DAYS,
        }
    }

    /// 自定义每阶段天数（限制在 1..=MAX_STAGE_DAYS）
    pub fn with_stage_days(mut self, days: i64) -> Self {
        self.stage_days = days.clamp(1, MAX_STAGE_DAYS);
        self
    }

    /// 生成按阶段排列的工序
    ///
    /// 任一计划日期超出日期范围时返回 None
    pub fn seed(&self, start: NaiveDate) -> Option<Vec<TaskFields>> {
        self.stages
            .iter()
            .enumerate()
            .map(|(i, stage)| {
                let offset = self.stage_days.checked_mul(i as i64)?;
                let plan_start = start.checked_add_signed(Duration::try_days(offset)?)?;
                let plan_finish = plan_start.checked_add_signed(Duration::try_days(self.stage_days)?)?;
                Some(TaskFields {
                    plan_start: Some(plan_start),
                    plan_finish: Some(plan_finish),
                    ..TaskFields::for_stage(stage.clone())
                })
            })
            .collect()
    }
}
