// ==========================================
// 工程进度看板 - 字段映射器
// ==========================================
// 职责: 源列 → BoardRecord 映射 + 类型转换
// 规则:
// - 列名支持英文标准名与画面标签（日文）别名
// - 日期: YYYY-MM-DD / YYYY/MM/DD / YYYYMMDD / Excel 序列值；
//   无法解析时视为缺省并给出告警
// - 进度: 小数 (0.5) 或百分比 (50%)；超出 [0,1] 拒绝该行
// ==========================================

use crate::domain::import::BoardRecord;
use crate::domain::task::{is_supported_date, is_valid_progress, TaskFields};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

/// 列别名表：标准列名 → 可接受的表头
fn aliases(key: &str) -> &'static [&'static str] {
    match key {
        "item_code" => &["item_code", "アイテム名", "code"],
        "item_description" => &["item_description", "説明", "description"],
        "item_plan_start" => &["item_plan_start", "計画開始日"],
        "item_plan_finish" => &["item_plan_finish", "計画完了日"],
        "due" => &["due", "顧客納期"],
        "hard_deadline" => &["hard_deadline", "社内締切"],
        "stage" => &["stage", "ステージ"],
        "plan_start" => &["plan_start", "計画開始"],
        "plan_finish" => &["plan_finish", "計画完了"],
        "act_start" => &["act_start", "実績開始"],
        "act_finish" => &["act_finish", "実績完了"],
        "progress" => &["progress", "進捗率"],
        "owner" => &["owner", "担当"],
        "supplier" => &["supplier", "外注/購買先"],
        "memo" => &["memo", "メモ"],
        _ => &[],
    }
}

/// 表头中是否存在某标准列（含别名）
pub fn has_column<'a, I>(headers: I, key: &str) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    let accepted = aliases(key);
    headers.into_iter().any(|h| accepted.contains(&h.as_str()))
}

/// Excel 日期序列值起点
fn excel_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// 解析日期文本
///
/// 返回 None 表示无法识别或年份超出可登录范围（调用方记录告警）。
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_date_text(value).filter(|date| is_supported_date(*date))
}

fn parse_date_text(value: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

    let value = value.trim();
    let candidates = [value, value.get(..10).unwrap_or(value)];
    for candidate in candidates {
        for fmt in FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(candidate, fmt) {
                return Some(date);
            }
        }
    }

    // Excel 序列值 (例如 45658 或 45658.0)
    match value.parse::<f64>() {
        Ok(serial) if (1.0..2_958_466.0).contains(&serial) => {
            excel_epoch().map(|epoch| epoch + Duration::days(serial.trunc() as i64))
        }
        _ => None,
    }
}

/// 解析进度率
///
/// 空值 → 0.0；`50%` → 0.5
pub fn parse_progress(value: &str) -> Result<f64, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0.0);
    }

    let progress = match value.strip_suffix('%') {
        Some(pct) => pct
            .trim()
            .parse::<f64>()
            .map(|p| p / 100.0)
            .map_err(|_| format!("进度率无法解析: {}", value))?,
        None => value
            .parse::<f64>()
            .map_err(|_| format!("进度率无法解析: {}", value))?,
    };

    if !is_valid_progress(progress) {
        return Err(format!("进度率超出范围 [0, 1]: {}", value));
    }
    Ok(progress)
}

// ==========================================
// RecordMapper - 行映射器
// ==========================================
pub struct RecordMapper;

/// 单行映射结果
pub struct MappedRow {
    pub record: BoardRecord,
    pub warnings: Vec<String>,
}

impl RecordMapper {
    /// 映射一行
    ///
    /// # 返回
    /// - Ok(MappedRow): 映射成功（可能带日期告警）
    /// - Err(String): 拒绝原因
    pub fn map_row(&self, row_number: usize, row: &HashMap<String, String>) -> Result<MappedRow, String> {
        let mut warnings = Vec::new();

        let item_code = self
            .get_string(row, "item_code")
            .ok_or_else(|| "item_code 为空".to_string())?;

        let mut date = |key: &str| -> Option<NaiveDate> {
            let raw = self.get_string(row, key)?;
            let parsed = parse_date(&raw);
            if parsed.is_none() {
                warnings.push(format!("行 {}: 字段 {} 日期无法识别 ({})，按空值处理", row_number, key, raw));
            }
            parsed
        };

        let item_plan_start = date("item_plan_start");
        let item_plan_finish = date("item_plan_finish");
        let due = date("due");
        let hard_deadline = date("hard_deadline");
        let plan_start = date("plan_start");
        let plan_finish = date("plan_finish");
        let act_start = date("act_start");
        let act_finish = date("act_finish");

        let task = match self.get_string(row, "stage") {
            None => None,
            Some(stage) => {
                let progress = parse_progress(&self.get_string(row, "progress").unwrap_or_default())?;
                Some(TaskFields {
                    stage,
                    plan_start,
                    plan_finish,
                    act_start,
                    act_finish,
                    progress,
                    owner: self.get_string(row, "owner"),
                    supplier: self.get_string(row, "supplier"),
                    memo: self.get_string(row, "memo"),
                })
            }
        };

        Ok(MappedRow {
            record: BoardRecord {
                row_number,
                item_code,
                item_description: self.get_string(row, "item_description"),
                item_plan_start,
                item_plan_finish,
                due,
                hard_deadline,
                task,
            },
            warnings,
        })
    }

    /// 提取非空字符串字段（按别名依次查找）
    fn get_string(&self, row: &HashMap<String, String>, key: &str) -> Option<String> {
        for alias in aliases(key) {
            if let Some(v) = row.get(*alias) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2025-01-31"), Some(d(2025, 1, 31)));
        assert_eq!(parse_date("2025/1/31"), Some(d(2025, 1, 31)));
        assert_eq!(parse_date("20250131"), Some(d(2025, 1, 31)));
        assert_eq!(parse_date("2025-01-31 00:00:00"), Some(d(2025, 1, 31)));
        assert_eq!(parse_date("45658"), Some(d(2025, 1, 1)));
        assert_eq!(parse_date("来週"), None);
        assert_eq!(parse_date("2025-02-30"), None);
        // 年份超出范围
        assert_eq!(parse_date("-262000-01-01"), None);
        assert_eq!(parse_date("+100000-01-01"), None);
        assert_eq!(parse_date("1"), None);
    }

    #[test]
    fn test_parse_progress() {
        assert_eq!(parse_progress(""), Ok(0.0));
        assert_eq!(parse_progress("0.25"), Ok(0.25));
        assert_eq!(parse_progress("50%"), Ok(0.5));
        assert_eq!(parse_progress("100 %"), Ok(1.0));
        assert!(parse_progress("1.2").is_err());
        assert!(parse_progress("-0.1").is_err());
        assert!(parse_progress("half").is_err());
    }

    #[test]
    fn test_map_row_with_japanese_headers() {
        let mapped = RecordMapper
            .map_row(
                2,
                &row(&[
                    ("アイテム名", " F-01 "),
                    ("顧客納期", "2025/03/01"),
                    ("ステージ", "製缶"),
                    ("進捗率", "40%"),
                    ("担当", "鈴木"),
                    ("メモ", ""),
                ]),
            )
            .unwrap();

        assert!(mapped.warnings.is_empty());
        let record = mapped.record;
        assert_eq!(record.item_code, "F-01");
        assert_eq!(record.due, Some(d(2025, 3, 1)));
        let task = record.task.unwrap();
        assert_eq!(task.stage, "製缶");
        assert_eq!(task.progress, 0.4);
        assert_eq!(task.owner.as_deref(), Some("鈴木"));
        assert_eq!(task.memo, None);
    }

    #[test]
    fn test_bad_date_is_warning_not_error() {
        let mapped = RecordMapper
            .map_row(3, &row(&[("item_code", "A"), ("due", "TBD"), ("stage", "設計")]))
            .unwrap();
        assert_eq!(mapped.record.due, None);
        assert_eq!(mapped.warnings.len(), 1);
        assert!(mapped.warnings[0].contains("due"));
    }

    #[test]
    fn test_rejections() {
        assert!(RecordMapper.map_row(2, &row(&[("stage", "設計")])).is_err());
        assert!(RecordMapper
            .map_row(2, &row(&[("item_code", "A"), ("stage", "設計"), ("progress", "150%")]))
            .is_err());
        // 无阶段的行只导入部品，进度列被忽略
        let mapped = RecordMapper
            .map_row(2, &row(&[("item_code", "A"), ("progress", "150%")]))
            .unwrap();
        assert!(mapped.record.task.is_none());
    }

    #[test]
    fn test_has_column() {
        let headers = vec!["アイテム名".to_string(), "stage".to_string()];
        assert!(has_column(&headers, "item_code"));
        assert!(has_column(&headers, "stage"));
        assert!(!has_column(&headers, "due"));
    }
}
