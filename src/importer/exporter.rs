// ==========================================
// 工程进度看板 - CSV 导出
// ==========================================
// 列与导入共用 BOARD_COLUMNS，导出结果可原样再导入
// 行顺序: 部品ID → 工序ID；无工序的部品输出一行（工序列为空）
// ==========================================

use crate::domain::import::BOARD_COLUMNS;
use crate::domain::item::Item;
use crate::domain::task::Task;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::sql_utils::DATE_FORMAT;
use chrono::NaiveDate;
use csv::Writer;
use std::io::Write;
use std::path::Path;

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn fmt_text(text: &Option<String>) -> String {
    text.clone().unwrap_or_default()
}

fn item_columns(item: &Item) -> [String; 6] {
    [
        item.code.clone(),
        fmt_text(&item.description),
        fmt_date(item.plan_start),
        fmt_date(item.plan_finish),
        fmt_date(item.due),
        fmt_date(item.hard_deadline),
    ]
}

// ==========================================
// TaskExporter
// ==========================================
pub struct TaskExporter;

impl TaskExporter {
    /// 写出看板 CSV
    ///
    /// # 返回
    /// 写出的数据行数（不含表头）
    pub fn write_board<W: Write>(&self, writer: W, items: &[Item], tasks: &[Task]) -> ImportResult<usize> {
        let mut out = Writer::from_writer(writer);
        out.write_record(BOARD_COLUMNS)
            .map_err(|e| ImportError::CsvWriteError(e.to_string()))?;

        let mut items: Vec<&Item> = items.iter().collect();
        items.sort_by_key(|i| i.id);

        let mut rows = 0;
        for item in items {
            let mut own: Vec<&Task> = tasks.iter().filter(|t| t.item_id == item.id).collect();
            own.sort_by_key(|t| t.id);

            let head = item_columns(item);
            if own.is_empty() {
                let mut record: Vec<String> = head.to_vec();
                record.resize(BOARD_COLUMNS.len(), String::new());
                out.write_record(&record)
                    .map_err(|e| ImportError::CsvWriteError(e.to_string()))?;
                rows += 1;
                continue;
            }

            for task in own {
                let mut record: Vec<String> = head.to_vec();
                record.extend([
                    task.stage.clone(),
                    fmt_date(task.plan_start),
                    fmt_date(task.plan_finish),
                    fmt_date(task.act_start),
                    fmt_date(task.act_finish),
                    task.progress.to_string(),
                    fmt_text(&task.owner),
                    fmt_text(&task.supplier),
                    fmt_text(&task.memo),
                ]);
                out.write_record(&record)
                    .map_err(|e| ImportError::CsvWriteError(e.to_string()))?;
                rows += 1;
            }
        }

        out.flush()
            .map_err(|e| ImportError::CsvWriteError(e.to_string()))?;
        tracing::debug!(rows, "CSV 导出完成");
        Ok(rows)
    }

    /// 写出到文件
    pub fn write_board_file<P: AsRef<Path>>(&self, path: P, items: &[Item], tasks: &[Task]) -> ImportResult<usize> {
        let file = std::fs::File::create(path.as_ref())
            .map_err(|e| ImportError::CsvWriteError(format!("{}: {}", path.as_ref().display(), e)))?;
        self.write_board(file, items, tasks)
    }
}
