// ==========================================
// 工程进度看板 - 看板数据导入器
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 解析 → 列检查 → 映射（拒绝/告警）→ 单事务落库
// ==========================================

use crate::domain::import::{BoardRecord, ImportReport, RejectedRow};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{has_column, RecordMapper};
use crate::importer::file_parser::{CsvParser, RawRow, UniversalFileParser};
use crate::repository::board_import_repo::BoardImportRepository;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

// ==========================================
// TaskImporter - 看板数据导入器
// ==========================================
pub struct TaskImporter {
    import_repo: BoardImportRepository,
    mapper: RecordMapper,
}

impl TaskImporter {
    pub fn new(import_repo: BoardImportRepository) -> Self {
        Self {
            import_repo,
            mapper: RecordMapper,
        }
    }

    /// 从文件导入（.csv / .xlsx / .xls）
    #[instrument(skip(self, file_path))]
    pub fn import_file<P: AsRef<Path>>(&self, project_id: i64, file_path: P) -> ImportResult<ImportReport> {
        info!(file_path = %file_path.as_ref().display(), "开始导入看板数据");
        let raw_rows = UniversalFileParser.parse(file_path)?;
        self.import_rows(project_id, raw_rows)
    }

    /// 从 CSV 数据流导入
    pub fn import_csv_reader<R: Read>(&self, project_id: i64, reader: R) -> ImportResult<ImportReport> {
        let raw_rows = CsvParser.parse_reader(reader)?;
        self.import_rows(project_id, raw_rows)
    }

    /// 映射并落库
    ///
    /// 被拒绝的行记入报告，不影响其他行；落库失败时整批回滚并返回错误。
    pub fn import_rows(&self, project_id: i64, raw_rows: Vec<RawRow>) -> ImportResult<ImportReport> {
        let headers: BTreeSet<&String> = raw_rows.iter().flat_map(|(_, row)| row.keys()).collect();
        if !raw_rows.is_empty() && !has_column(headers, "item_code") {
            return Err(ImportError::MissingColumn("item_code".to_string()));
        }

        let mut report = ImportReport {
            total_rows: raw_rows.len(),
            ..ImportReport::default()
        };

        let mut records: Vec<BoardRecord> = Vec::with_capacity(raw_rows.len());
        for (row_number, row) in &raw_rows {
            match self.mapper.map_row(*row_number, row) {
                Ok(mapped) => {
                    report.warnings.extend(mapped.warnings);
                    records.push(mapped.record);
                }
                Err(reason) => {
                    debug!(row_number, reason = %reason, "行被拒绝");
                    report.rejected.push(RejectedRow {
                        row_number: *row_number,
                        reason,
                    });
                }
            }
        }

        if !report.rejected.is_empty() {
            warn!(rejected = report.rejected.len(), "部分行被拒绝");
        }

        self.import_repo.import_records(project_id, &records, &mut report)?;

        info!(
            total_rows = report.total_rows,
            accepted = report.accepted_rows(),
            warnings = report.warnings.len(),
            "看板数据导入完成"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    fn setup() -> (TaskImporter, i64) {
        let conn = crate::db::open_in_memory().unwrap();
        conn.execute("INSERT INTO projects (name) VALUES ('P1')", []).unwrap();
        let project_id = conn.last_insert_rowid();
        let conn: Arc<Mutex<Connection>> = Arc::new(Mutex::new(conn));
        (TaskImporter::new(BoardImportRepository::from_connection(conn)), project_id)
    }

    #[test]
    fn test_import_reports_rejections_and_warnings() {
        let (importer, project_id) = setup();
        let csv = "item_code,due,stage,progress\n\
                   A,2025-06-01,設計,0.5\n\
                   ,2025-06-01,設計,0.5\n\
                   B,someday,組立,150%\n\
                   C,someday,,\n";

        let report = importer.import_csv_reader(project_id, csv.as_bytes()).unwrap();
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].row_number, 3);
        assert_eq!(report.rejected[1].row_number, 4);
        assert_eq!(report.items_inserted, 2);
        assert_eq!(report.tasks_inserted, 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.accepted_rows(), 2);
    }

    #[test]
    fn test_missing_item_code_column() {
        let (importer, project_id) = setup();
        let err = importer
            .import_csv_reader(project_id, "stage,progress\n設計,0.1\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(_)));
    }

    #[test]
    fn test_unknown_project_rolls_back() {
        let (importer, _) = setup();
        let err = importer
            .import_csv_reader(999, "item_code,stage\nA,設計\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ImportError::Repository(_)));
    }
}
