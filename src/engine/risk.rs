// ==========================================
// 工程进度看板 - 交期风险判定引擎
// ==========================================
// 输入: 部品期限 + 代表工序 (RiskInput)
// 输出: late / warn / ok 三档风险等级
// ==========================================
// 推算方式: 按匀速线性外推剩余工期，不做关键路径调度
// 有效期限: {客户交期, 内部截止日, 计划完成日} 中最早者
// ==========================================

use crate::domain::risk::{RiskAssessment, RiskInput};
use crate::domain::types::RiskLevel;
use chrono::{Duration, NaiveDate};

/// 余量缓冲天数：0..=7 天判定为 warn
pub const WARN_BUFFER_DAYS: i64 = 7;

/// 计划工期下限（天）
pub const MIN_PLAN_DAYS: i64 = 1;

// ==========================================
// RiskEvaluator - 风险判定引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct RiskEvaluator {
    // 无状态引擎，不需要配置
}

impl RiskEvaluator {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 以指定日期为基准判定
    ///
    /// # 参数
    /// - `input`: 合并后的单条记录
    /// - `today`: 基准日
    ///
    /// # 返回
    /// RiskAssessment；推算完成日或有效期限无法确定时等级为 Warn
    pub fn evaluate(&self, input: &RiskInput, today: NaiveDate) -> RiskAssessment {
        let estimated_finish = self.estimate_finish(input, today);
        let effective_due = self.effective_due(input);

        let (level, slack_days) = match (effective_due, estimated_finish) {
            (Some(due), Some(finish)) => {
                let slack = (due - finish).num_days();
                (Self::classify_slack(slack), Some(slack))
            }
            // 数据不足：视为"需要关注"，不报错
            _ => (RiskLevel::Warn, None),
        };

        RiskAssessment {
            level,
            estimated_finish,
            effective_due,
            slack_days,
        }
    }

    /// 只返回风险等级
    pub fn classify(&self, input: &RiskInput, today: NaiveDate) -> RiskLevel {
        self.evaluate(input, today).level
    }

    // ==========================================
    // 计算步骤
    // ==========================================

    /// 推算完成日
    ///
    /// - 0 < 进度 < 1 且有计划完成日: today + floor(计划工期 × 剩余比例)
    /// - 进度 >= 1: 实绩完成日，缺省则计划完成日
    /// - 其他: 计划完成日（可能缺省）
    ///
    /// 外推结果超出日期范围时返回 None（判定为 Warn）
    pub fn estimate_finish(&self, input: &RiskInput, today: NaiveDate) -> Option<NaiveDate> {
        let progress = input.progress.filter(|p| !p.is_nan()).unwrap_or(0.0);

        match input.plan_finish {
            Some(plan_finish) if progress > 0.0 && progress < 1.0 => {
                let plan_start = input.plan_start.unwrap_or(today);
                let plan_days = (plan_finish - plan_start).num_days().max(MIN_PLAN_DAYS);
                let remaining_days = (plan_days as f64 * (1.0 - progress)).floor() as i64;
                today.checked_add_signed(Duration::days(remaining_days))
            }
            _ if progress >= 1.0 => input.act_finish.or(input.plan_finish),
            _ => input.plan_finish,
        }
    }

    /// 有效期限：候选中最早者
    pub fn effective_due(&self, input: &RiskInput) -> Option<NaiveDate> {
        [input.due, input.hard_deadline, input.plan_finish]
            .into_iter()
            .flatten()
            .min()
    }

    /// 余量 → 风险等级
    pub fn classify_slack(slack_days: i64) -> RiskLevel {
        if slack_days < 0 {
            RiskLevel::Late
        } else if slack_days <= WARN_BUFFER_DAYS {
            RiskLevel::Warn
        } else {
            RiskLevel::Ok
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn base_input() -> RiskInput {
        RiskInput::default()
    }

    #[test]
    fn test_slack_boundaries() {
        assert_eq!(RiskEvaluator::classify_slack(-1), RiskLevel::Late);
        assert_eq!(RiskEvaluator::classify_slack(0), RiskLevel::Warn);
        assert_eq!(RiskEvaluator::classify_slack(7), RiskLevel::Warn);
        assert_eq!(RiskEvaluator::classify_slack(8), RiskLevel::Ok);
    }

    #[test]
    fn test_progress_projection() {
        let engine = RiskEvaluator::new();
        let input = RiskInput {
            plan_start: Some(d(2025, 1, 1)),
            plan_finish: Some(d(2025, 1, 21)),
            progress: Some(0.5),
            ..base_input()
        };

        let finish = engine.estimate_finish(&input, d(2025, 1, 10));
        assert_eq!(finish, Some(d(2025, 1, 20)));
    }

    #[test]
    fn test_projection_without_plan_start_uses_today() {
        let engine = RiskEvaluator::new();
        // plan_start 缺省 → today；工期 = 10 天，剩余 0.25 → floor(2.5) = 2
        let input = RiskInput {
            plan_finish: Some(d(2025, 3, 11)),
            progress: Some(0.75),
            ..base_input()
        };
        assert_eq!(engine.estimate_finish(&input, d(2025, 3, 1)), Some(d(2025, 3, 3)));
    }

    #[test]
    fn test_projection_plan_days_floor_of_one() {
        let engine = RiskEvaluator::new();
        // 计划完成日早于开始日 → 工期下限 1 天，floor(1 × 0.5) = 0
        let input = RiskInput {
            plan_start: Some(d(2025, 5, 10)),
            plan_finish: Some(d(2025, 5, 1)),
            progress: Some(0.5),
            ..base_input()
        };
        assert_eq!(engine.estimate_finish(&input, d(2025, 5, 20)), Some(d(2025, 5, 20)));
    }

    #[test]
    fn test_completed_prefers_actual_finish() {
        let engine = RiskEvaluator::new();
        let input = RiskInput {
            plan_finish: Some(d(2025, 6, 30)),
            act_finish: Some(d(2025, 6, 10)),
            progress: Some(1.0),
            ..base_input()
        };
        assert_eq!(engine.estimate_finish(&input, d(2025, 7, 1)), Some(d(2025, 6, 10)));

        let without_actual = RiskInput {
            act_finish: None,
            ..input
        };
        assert_eq!(
            engine.estimate_finish(&without_actual, d(2025, 7, 1)),
            Some(d(2025, 6, 30))
        );
    }

    #[test]
    fn test_zero_progress_uses_plan_finish() {
        let engine = RiskEvaluator::new();
        let input = RiskInput {
            plan_finish: Some(d(2025, 2, 1)),
            progress: None,
            ..base_input()
        };
        assert_eq!(engine.estimate_finish(&input, d(2025, 1, 1)), Some(d(2025, 2, 1)));
    }

    #[test]
    fn test_effective_due_is_minimum() {
        let engine = RiskEvaluator::new();
        let input = RiskInput {
            due: Some(d(2025, 9, 20)),
            hard_deadline: Some(d(2025, 9, 10)),
            plan_finish: Some(d(2025, 9, 30)),
            ..base_input()
        };
        assert_eq!(engine.effective_due(&input), Some(d(2025, 9, 10)));
    }

    #[test]
    fn test_insufficient_data_is_warn() {
        let engine = RiskEvaluator::new();
        let today = d(2025, 1, 1);

        // 完全空
        let result = engine.evaluate(&base_input(), today);
        assert_eq!(result.level, RiskLevel::Warn);
        assert_eq!(result.slack_days, None);

        // 有交期但进度 0 且无计划完成日 → 推算完成日不可得
        let input = RiskInput {
            due: Some(d(2025, 3, 1)),
            ..base_input()
        };
        let result = engine.evaluate(&input, today);
        assert_eq!(result.level, RiskLevel::Warn);
        assert_eq!(result.estimated_finish, None);
        assert_eq!(result.effective_due, Some(d(2025, 3, 1)));
    }

    #[test]
    fn test_late_when_projection_exceeds_hard_deadline() {
        let engine = RiskEvaluator::new();
        let input = RiskInput {
            plan_start: Some(d(2025, 1, 1)),
            plan_finish: Some(d(2025, 1, 31)),
            progress: Some(0.1),
            due: Some(d(2025, 2, 28)),
            hard_deadline: Some(d(2025, 2, 10)),
            ..base_input()
        };
        // today 2025-01-20: 30 × 0.9 = 27 → 2025-02-16；有效期限 = 2025-01-31
        let result = engine.evaluate(&input, d(2025, 1, 20));
        assert_eq!(result.estimated_finish, Some(d(2025, 2, 16)));
        assert_eq!(result.effective_due, Some(d(2025, 1, 31)));
        assert_eq!(result.slack_days, Some(-16));
        assert_eq!(result.level, RiskLevel::Late);
    }

    #[test]
    fn test_ok_when_completed_early() {
        let engine = RiskEvaluator::new();
        let input = RiskInput {
            plan_finish: Some(d(2025, 4, 30)),
            act_finish: Some(d(2025, 4, 1)),
            progress: Some(1.0),
            due: Some(d(2025, 5, 15)),
            ..base_input()
        };
        let result = engine.evaluate(&input, d(2025, 4, 2));
        assert_eq!(result.slack_days, Some(29));
        assert_eq!(result.level, RiskLevel::Ok);
    }

    #[test]
    fn test_evaluate_is_deterministic_for_fixed_today() {
        let engine = RiskEvaluator::new();
        let input = RiskInput {
            plan_start: Some(d(2025, 1, 1)),
            plan_finish: Some(d(2025, 1, 21)),
            progress: Some(0.3),
            due: Some(d(2025, 1, 25)),
            ..base_input()
        };
        let today = d(2025, 1, 5);
        assert_eq!(engine.evaluate(&input, today), engine.evaluate(&input, today));
    }

    #[test]
    fn test_projection_beyond_date_range_is_warn() {
        let engine = RiskEvaluator::new();
        let input = RiskInput {
            plan_start: Some(NaiveDate::MIN),
            plan_finish: Some(d(2030, 1, 1)),
            progress: Some(0.01),
            due: Some(d(2030, 1, 1)),
            ..base_input()
        };
        let result = engine.evaluate(&input, d(2026, 1, 1));
        assert_eq!(result.estimated_finish, None);
        assert_eq!(result.slack_days, None);
        assert_eq!(result.level, RiskLevel::Warn);
    }
}
