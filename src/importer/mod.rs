// ==========================================
// 工程进度看板 - 导入/导出层
// ==========================================
// 职责: 外部表格数据 ⇄ 部品/工序
// 支持: CSV, Excel (只读)
// ==========================================

pub mod error;
pub mod exporter;
pub mod field_mapper;
pub mod file_parser;
pub mod task_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use exporter::TaskExporter;
pub use field_mapper::{parse_date, parse_progress, RecordMapper};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use task_importer::TaskImporter;
