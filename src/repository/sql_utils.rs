// ==========================================
// 工程进度看板 - 仓储层通用转换
// ==========================================
// 日期列以 `YYYY-MM-DD` 文本存储；无法解析的旧数据视为缺省
// ==========================================

use chrono::NaiveDate;
use rusqlite::Row;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 日期 → SQL 文本
pub fn date_to_sql(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

/// 读取日期列
pub fn get_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    Ok(row
        .get::<_, Option<String>>(idx)?
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()))
}
