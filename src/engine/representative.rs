// ==========================================
// 工程进度看板 - 代表工序选择
// ==========================================
// 规则: 计划完成日最晚的工序代表部品整体完成度
// 平手规则:
// - 有计划完成日的工序总是优先于没有的
// - 计划完成日相同(或都缺省)时, 工序ID较大者优先
// 无工序的部品不参与警报
// ==========================================

use crate::domain::item::Item;
use crate::domain::risk::RiskInput;
use crate::domain::task::Task;
use std::cmp::Ordering;

/// 代表工序排序键比较（升序；最大者即代表工序）
///
/// `Option<NaiveDate>` 的自然顺序中 `None` 小于任何日期。
fn representative_order(a: &Task, b: &Task) -> Ordering {
    a.plan_finish
        .cmp(&b.plan_finish)
        .then_with(|| a.id.cmp(&b.id))
}

/// 选择代表工序
///
/// # 返回
/// - Some(&Task): 代表工序
/// - None: 工序列表为空
pub fn select_representative(tasks: &[Task]) -> Option<&Task> {
    tasks.iter().max_by(|a, b| representative_order(a, b))
}

/// 选择代表工序并与部品期限合并为判定输入
///
/// 部品没有工序时返回 None（该部品被排除在警报之外）。
pub fn representative_input<'a>(item: &Item, tasks: &'a [Task]) -> Option<(&'a Task, RiskInput)> {
    select_representative(tasks).map(|task| (task, RiskInput::merge(item, task)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task(id: i64, plan_finish: Option<NaiveDate>) -> Task {
        Task {
            id,
            item_id: 1,
            stage: format!("S{}", id),
            plan_start: None,
            plan_finish,
            act_start: None,
            act_finish: None,
            progress: 0.0,
            owner: None,
            supplier: None,
            memo: None,
        }
    }

    fn item() -> Item {
        Item {
            id: 1,
            project_id: 1,
            code: "A-01".to_string(),
            description: None,
            plan_start: None,
            plan_finish: Some(d(2030, 1, 1)),
            due: Some(d(2025, 3, 1)),
            hard_deadline: Some(d(2025, 2, 20)),
        }
    }

    #[test]
    fn test_empty_tasks_has_no_representative() {
        assert!(select_representative(&[]).is_none());
        assert!(representative_input(&item(), &[]).is_none());
    }

    #[test]
    fn test_latest_plan_finish_wins() {
        let tasks = vec![
            task(1, Some(d(2025, 1, 10))),
            task(2, Some(d(2025, 2, 10))),
            task(3, Some(d(2025, 1, 20))),
        ];
        assert_eq!(select_representative(&tasks).unwrap().id, 2);
    }

    #[test]
    fn test_absent_plan_finish_loses_to_dated_task() {
        let tasks = vec![task(5, None), task(1, Some(d(2025, 1, 1))), task(9, None)];
        assert_eq!(select_representative(&tasks).unwrap().id, 1);
    }

    #[test]
    fn test_tie_broken_by_larger_id() {
        let tasks = vec![
            task(4, Some(d(2025, 1, 31))),
            task(7, Some(d(2025, 1, 31))),
            task(2, Some(d(2025, 1, 31))),
        ];
        assert_eq!(select_representative(&tasks).unwrap().id, 7);

        let undated = vec![task(3, None), task(8, None)];
        assert_eq!(select_representative(&undated).unwrap().id, 8);
    }

    #[test]
    fn test_merge_takes_task_dates_and_item_deadlines() {
        let mut t = task(1, Some(d(2025, 1, 31)));
        t.plan_start = Some(d(2025, 1, 1));
        t.progress = 0.4;
        let tasks = vec![t];

        let (rep, input) = representative_input(&item(), &tasks).unwrap();
        assert_eq!(rep.id, 1);
        // 部品自身的计划完成日不参与合并
        assert_eq!(input.plan_finish, Some(d(2025, 1, 31)));
        assert_eq!(input.plan_start, Some(d(2025, 1, 1)));
        assert_eq!(input.progress, Some(0.4));
        assert_eq!(input.due, Some(d(2025, 3, 1)));
        assert_eq!(input.hard_deadline, Some(d(2025, 2, 20)));
    }
}
