// ==========================================
// 工程进度看板 - 导入/导出 API
// ==========================================
// 职责: 封装看板 CSV/Excel 导入与 CSV 导出
// ==========================================

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::import::ImportReport;
use crate::importer::exporter::TaskExporter;
use crate::importer::task_importer::TaskImporter;
use crate::repository::item_repo::ItemRepository;
use crate::repository::project_repo::ProjectRepository;
use crate::repository::task_repo::TaskRepository;

pub struct ImportApi {
    project_repo: Arc<ProjectRepository>,
    item_repo: Arc<ItemRepository>,
    task_repo: Arc<TaskRepository>,
    importer: TaskImporter,
}

impl ImportApi {
    pub fn new(
        project_repo: Arc<ProjectRepository>,
        item_repo: Arc<ItemRepository>,
        task_repo: Arc<TaskRepository>,
        importer: TaskImporter,
    ) -> Self {
        Self {
            project_repo,
            item_repo,
            task_repo,
            importer,
        }
    }

    fn ensure_project(&self, project_id: i64) -> ApiResult<()> {
        if self.project_repo.find_by_id(project_id)?.is_none() {
            return Err(ApiError::NotFound(format!("项目(id={})不存在", project_id)));
        }
        Ok(())
    }

    /// 从文件导入（.csv / .xlsx / .xls）
    pub fn import_file<P: AsRef<Path>>(&self, project_id: i64, path: P) -> ApiResult<ImportReport> {
        self.ensure_project(project_id)?;
        Ok(self.importer.import_file(project_id, path)?)
    }

    /// 从 CSV 数据流导入（例如标准输入）
    pub fn import_csv<R: Read>(&self, project_id: i64, reader: R) -> ApiResult<ImportReport> {
        self.ensure_project(project_id)?;
        Ok(self.importer.import_csv_reader(project_id, reader)?)
    }

    /// 导出项目全部部品/工序为 CSV
    ///
    /// # 返回
    /// 写出的数据行数
    pub fn export_csv<W: Write>(&self, project_id: i64, writer: W) -> ApiResult<usize> {
        self.ensure_project(project_id)?;
        let items = self.item_repo.list_by_project(project_id)?;
        let tasks = self.task_repo.list_by_project(project_id)?;

        let rows = TaskExporter.write_board(writer, &items, &tasks)?;
        info!(project_id, rows, "CSV 导出完成");
        Ok(rows)
    }

    pub fn export_file<P: AsRef<Path>>(&self, project_id: i64, path: P) -> ApiResult<usize> {
        self.ensure_project(project_id)?;
        let items = self.item_repo.list_by_project(project_id)?;
        let tasks = self.task_repo.list_by_project(project_id)?;

        let rows = TaskExporter.write_board_file(path.as_ref(), &items, &tasks)?;
        info!(project_id, rows, path = %path.as_ref().display(), "CSV 导出完成");
        Ok(rows)
    }
}
