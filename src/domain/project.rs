// ==========================================
// 工程进度看板 - 项目领域模型
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Project - 项目
// ==========================================
// 创建后不原地修改；删除时级联删除其部品及工序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,                  // 项目ID (自增)
    pub name: String,             // 名称
    pub customer: Option<String>, // 客户
    pub note: Option<String>,     // 备注
}

/// 新建项目参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub customer: Option<String>,
    pub note: Option<String>,
}
