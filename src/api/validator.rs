// ==========================================
// 工程进度看板 - 输入校验
// ==========================================
// 职责: 写入前的文本清洗与范围校验
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::item::{ItemEdit, NewItem};
use crate::domain::task::{
    is_supported_date, is_valid_progress, TaskFields, MAX_SUPPORTED_YEAR, MIN_SUPPORTED_YEAR,
};
use chrono::NaiveDate;

/// 去首尾空白；空串视为缺省
pub fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 必填文本：去空白后不能为空
pub fn require_text(field: &str, value: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", field)));
    }
    Ok(trimmed.to_string())
}

pub fn validate_progress(progress: f64) -> ApiResult<()> {
    if !is_valid_progress(progress) {
        return Err(ApiError::InvalidInput(format!(
            "进度率必须在 [0, 1] 范围内: {}",
            progress
        )));
    }
    Ok(())
}

/// 日期年份范围校验（缺省允许）
pub fn validate_date(field: &str, date: Option<NaiveDate>) -> ApiResult<()> {
    match date {
        Some(d) if !is_supported_date(d) => Err(ApiError::InvalidInput(format!(
            "{}超出可登录范围 ({}-{}年): {}",
            field, MIN_SUPPORTED_YEAR, MAX_SUPPORTED_YEAR, d
        ))),
        _ => Ok(()),
    }
}

fn validate_item_dates(
    plan_start: Option<NaiveDate>,
    plan_finish: Option<NaiveDate>,
    due: Option<NaiveDate>,
    hard_deadline: Option<NaiveDate>,
) -> ApiResult<()> {
    validate_date("计划开始日", plan_start)?;
    validate_date("计划完成日", plan_finish)?;
    validate_date("客户交期", due)?;
    validate_date("内部截止日", hard_deadline)
}

/// 清洗部品输入
pub fn clean_new_item(item: NewItem) -> ApiResult<NewItem> {
    validate_item_dates(item.plan_start, item.plan_finish, item.due, item.hard_deadline)?;
    Ok(NewItem {
        code: require_text("部品名", &item.code)?,
        description: clean_text(item.description),
        ..item
    })
}

pub fn clean_item_edit(edit: ItemEdit) -> ApiResult<ItemEdit> {
    validate_item_dates(edit.plan_start, edit.plan_finish, edit.due, edit.hard_deadline)?;
    Ok(ItemEdit {
        code: require_text("部品名", &edit.code)?,
        description: clean_text(edit.description),
        ..edit
    })
}

/// 清洗工序输入（阶段名必填，进度率与日期范围校验）
pub fn clean_task_fields(fields: TaskFields) -> ApiResult<TaskFields> {
    validate_progress(fields.progress)?;
    validate_date("计划开始", fields.plan_start)?;
    validate_date("计划完成", fields.plan_finish)?;
    validate_date("实绩开始", fields.act_start)?;
    validate_date("实绩完成", fields.act_finish)?;
    Ok(TaskFields {
        stage: require_text("阶段名", &fields.stage)?,
        owner: clean_text(fields.owner),
        supplier: clean_text(fields.supplier),
        memo: clean_text(fields.memo),
        ..fields
    })
}
