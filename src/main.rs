// ==========================================
// 工程进度看板 - 命令行入口
// ==========================================
// 结果输出到 stdout（表格或 --json），日志输出到 stderr
// ==========================================

use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;

use progress_board::app::{get_default_db_path, AppState, DB_PATH_ENV};
use progress_board::config::FieldLabels;
use progress_board::domain::item::NewItem;
use progress_board::domain::project::NewProject;
use progress_board::domain::task::TaskFields;
use progress_board::importer::parse_progress;
use progress_board::{i18n, logging};

#[derive(Parser)]
#[command(name = "progress-board", version, about = "工程進捗ボード: 部品×工程の進捗と納期リスク")]
struct Cli {
    /// SQLite database path (or set PROGRESS_BOARD_DB_PATH)
    #[arg(long, env = DB_PATH_ENV, global = true)]
    db: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Label language (ja / en)
    #[arg(long, global = true, default_value = "ja")]
    lang: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectCmd,
    },
    /// Manage items (parts / deliverables)
    Item {
        #[command(subcommand)]
        action: ItemCmd,
    },
    /// Manage tasks (one stage of an item)
    Task {
        #[command(subcommand)]
        action: TaskCmd,
    },
    /// Items that are late or need attention
    Alerts {
        /// Limit to one project (default: all projects)
        #[arg(long)]
        project: Option<i64>,
        /// Evaluate as of this date (default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Risk of every item in a project, or of every task of one item
    Risks {
        #[arg(long)]
        project: i64,
        #[arg(long)]
        item: Option<i64>,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Plan / actual bars for a Gantt view
    Gantt {
        #[arg(long)]
        project: i64,
        #[arg(long)]
        item: Option<i64>,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Import a CSV / Excel board into a project ("-" reads CSV from stdin)
    Import {
        #[arg(long)]
        project: i64,
        file: PathBuf,
    },
    /// Export a project as CSV (stdout when --out is omitted)
    Export {
        #[arg(long)]
        project: i64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Board configuration
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
}

#[derive(Subcommand)]
enum ProjectCmd {
    Create {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        customer: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    List,
    /// Delete a project with all its items and tasks
    Delete {
        id: i64,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ItemCmd {
    Add {
        #[arg(long)]
        project: i64,
        #[arg(long)]
        code: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        plan_start: Option<NaiveDate>,
        #[arg(long)]
        plan_finish: Option<NaiveDate>,
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        hard_deadline: Option<NaiveDate>,
    },
    List {
        #[arg(long)]
        project: i64,
    },
    /// Delete an item with all its tasks
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
    /// Insert the configured sample items with standard stages
    Seed {
        #[arg(long)]
        project: i64,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

/// 工序字段参数（新增/更新共用）
#[derive(clap::Args)]
struct TaskArgs {
    #[arg(long)]
    plan_start: Option<NaiveDate>,
    #[arg(long)]
    plan_finish: Option<NaiveDate>,
    #[arg(long)]
    act_start: Option<NaiveDate>,
    #[arg(long)]
    act_finish: Option<NaiveDate>,
    /// 0.5 or 50%
    #[arg(long)]
    progress: Option<String>,
    #[arg(long)]
    owner: Option<String>,
    #[arg(long)]
    supplier: Option<String>,
    #[arg(long)]
    memo: Option<String>,
}

impl TaskArgs {
    /// 覆盖已指定的字段
    fn apply_to(self, fields: &mut TaskFields) -> Result<()> {
        if let Some(progress) = self.progress {
            fields.progress = parse_progress(&progress).map_err(|e| anyhow!(e))?;
        }
        fields.plan_start = self.plan_start.or(fields.plan_start);
        fields.plan_finish = self.plan_finish.or(fields.plan_finish);
        fields.act_start = self.act_start.or(fields.act_start);
        fields.act_finish = self.act_finish.or(fields.act_finish);
        fields.owner = self.owner.or(fields.owner.take());
        fields.supplier = self.supplier.or(fields.supplier.take());
        fields.memo = self.memo.or(fields.memo.take());
        Ok(())
    }
}

#[derive(Subcommand)]
enum TaskCmd {
    List {
        #[arg(long)]
        item: i64,
    },
    Add {
        #[arg(long)]
        item: i64,
        #[arg(long)]
        stage: String,
        #[command(flatten)]
        fields: TaskArgs,
    },
    /// Update the given fields of a task
    Update {
        id: i64,
        #[arg(long)]
        stage: Option<String>,
        #[command(flatten)]
        fields: TaskArgs,
    },
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
    /// One task per configured stage (no-op when the item already has tasks)
    Seed {
        #[arg(long)]
        item: i64,
        #[arg(long)]
        start: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum ConfigCmd {
    Show,
    /// Replace the ordered stage list (comma separated)
    SetStages {
        #[arg(value_delimiter = ',', required = true)]
        stages: Vec<String>,
    },
    /// Rename the two deadline columns
    SetLabels {
        #[arg(long)]
        customer_due: String,
        #[arg(long)]
        internal_deadline: String,
    },
    /// Planned days per stage used by seeding
    SetStageDays { days: i64 },
}

fn today_or(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn fmt_opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);
    i18n::set_locale(&cli.lang);

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    run(&state, cli.command, cli.json)
}

fn run(state: &AppState, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Project { action } => run_project(state, action, json),
        Commands::Item { action } => run_item(state, action, json),
        Commands::Task { action } => run_task(state, action, json),
        Commands::Alerts { project, today } => {
            let alerts = state.dashboard_api.list_alerts_at(project, today_or(today))?;
            if json {
                return print_json(&alerts);
            }
            if alerts.is_empty() {
                println!("-");
            }
            for r in &alerts {
                println!(
                    "{:<8} {:<16} {:<10} {:>5.0}%  推定完了 {}  期限 {}  余裕 {}",
                    r.assessment.level.label(),
                    r.item_code,
                    r.representative_stage,
                    r.progress * 100.0,
                    fmt_date(r.assessment.estimated_finish),
                    fmt_date(r.assessment.effective_due),
                    r.assessment
                        .slack_days
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            Ok(())
        }
        Commands::Risks { project, item, today } => {
            let today = today_or(today);
            match item {
                Some(item_id) => {
                    let risks = state.dashboard_api.task_risks_at(item_id, today)?;
                    if json {
                        return print_json(&risks);
                    }
                    for r in &risks {
                        println!(
                            "{:<6} {:<12} {:>5.0}%  {}",
                            r.task.id,
                            r.task.stage,
                            r.task.progress * 100.0,
                            r.assessment.level.label()
                        );
                    }
                }
                None => {
                    let risks = state.dashboard_api.item_risks_at(project, today)?;
                    if json {
                        return print_json(&risks);
                    }
                    for r in &risks {
                        println!(
                            "{:<6} {:<16} {:<10} {}",
                            r.item_id,
                            r.item_code,
                            r.representative_stage,
                            r.assessment.level.label()
                        );
                    }
                }
            }
            Ok(())
        }
        Commands::Gantt { project, item, today } => {
            let bars = state.dashboard_api.gantt_at(project, item, today_or(today))?;
            if json {
                return print_json(&bars);
            }
            for bar in &bars {
                println!(
                    "{:<16} {:<10} {:<6} {} → {} ({}d){}",
                    bar.item_code,
                    bar.stage,
                    bar.kind.to_string(),
                    bar.start,
                    bar.finish,
                    bar.duration_days(),
                    if bar.open { " *" } else { "" }
                );
            }
            Ok(())
        }
        Commands::Import { project, file } => {
            let report = if file.as_os_str() == "-" {
                state.import_api.import_csv(project, io::stdin().lock())?
            } else {
                if !file.exists() {
                    let path = file.display().to_string();
                    return Err(anyhow!(i18n::t_with_args(
                        "import.file_not_found",
                        &[("path", path.as_str())]
                    )));
                }
                state.import_api.import_file(project, &file)?
            };
            if json {
                return print_json(&report);
            }
            println!(
                "rows {}  items +{} ~{}  tasks +{} ~{}  rejected {}",
                report.total_rows,
                report.items_inserted,
                report.items_updated,
                report.tasks_inserted,
                report.tasks_updated,
                report.rejected.len()
            );
            for rejected in &report.rejected {
                println!("  row {}: {}", rejected.row_number, rejected.reason);
            }
            for warning in &report.warnings {
                println!("  warn: {}", warning);
            }
            Ok(())
        }
        Commands::Export { project, out } => {
            match out {
                Some(path) => {
                    let rows = state.import_api.export_file(project, &path)?;
                    eprintln!("{} rows → {}", rows, path.display());
                }
                None => {
                    state.import_api.export_csv(project, io::stdout().lock())?;
                }
            }
            Ok(())
        }
        Commands::Config { action } => run_config(state, action, json),
    }
}

fn run_project(state: &AppState, action: ProjectCmd, json: bool) -> Result<()> {
    match action {
        ProjectCmd::Create { name, customer, note } => {
            let project = state
                .project_api
                .create_project(NewProject { name, customer, note })?;
            if json {
                return print_json(&project);
            }
            println!("{}\t{}", project.id, project.name);
        }
        ProjectCmd::List => {
            let projects = state.project_api.list_projects()?;
            if json {
                return print_json(&projects);
            }
            for p in &projects {
                println!("{:<6} {:<24} {}", p.id, p.name, fmt_opt(&p.customer));
            }
        }
        ProjectCmd::Delete { id, yes } => {
            state.project_api.delete_project(id, yes)?;
            println!("deleted project {}", id);
        }
    }
    Ok(())
}

fn run_item(state: &AppState, action: ItemCmd, json: bool) -> Result<()> {
    match action {
        ItemCmd::Add {
            project,
            code,
            description,
            plan_start,
            plan_finish,
            due,
            hard_deadline,
        } => {
            let outcome = state.item_api.add_item(NewItem {
                project_id: project,
                code,
                description,
                plan_start,
                plan_finish,
                due,
                hard_deadline,
            })?;
            if json {
                return print_json(&outcome);
            }
            if outcome.created {
                println!("{}\t{}", outcome.item.id, outcome.item.code);
            } else {
                println!("{}\t{} (already exists)", outcome.item.id, outcome.item.code);
            }
        }
        ItemCmd::List { project } => {
            let items = state.item_api.list_items(project)?;
            if json {
                return print_json(&items);
            }
            let labels = state
                .config_manager
                .load_board_config()
                .map_err(|e| anyhow!(e.to_string()))?
                .field_labels;
            println!(
                "{:<6} {:<16} {:<12} {:<12} {:<12} {:<12}",
                "id", "code", "plan_start", "plan_finish", labels.customer_due, labels.internal_deadline
            );
            for i in &items {
                println!(
                    "{:<6} {:<16} {:<12} {:<12} {:<12} {:<12}",
                    i.id,
                    i.code,
                    fmt_date(i.plan_start),
                    fmt_date(i.plan_finish),
                    fmt_date(i.due),
                    fmt_date(i.hard_deadline)
                );
            }
        }
        ItemCmd::Delete { id, yes } => {
            state.item_api.delete_item(id, yes)?;
            println!("deleted item {}", id);
        }
        ItemCmd::Seed { project, today } => {
            let summary = state.project_api.seed_default_items(project, today_or(today))?;
            if json {
                return print_json(&summary);
            }
            println!(
                "items +{} (existing {})  tasks +{}",
                summary.items_created, summary.items_existing, summary.tasks_created
            );
        }
    }
    Ok(())
}

fn run_task(state: &AppState, action: TaskCmd, json: bool) -> Result<()> {
    match action {
        TaskCmd::List { item } => {
            let tasks = state.task_api.list_tasks(item)?;
            if json {
                return print_json(&tasks);
            }
            println!(
                "{:<6} {:<12} {:<12} {:<12} {:<12} {:<12} {:>6}",
                "id",
                i18n::field_label("stage"),
                "plan_start",
                "plan_finish",
                "act_start",
                "act_finish",
                i18n::field_label("progress")
            );
            for t in &tasks {
                println!(
                    "{:<6} {:<12} {:<12} {:<12} {:<12} {:<12} {:>5.0}%  {}",
                    t.id,
                    t.stage,
                    fmt_date(t.plan_start),
                    fmt_date(t.plan_finish),
                    fmt_date(t.act_start),
                    fmt_date(t.act_finish),
                    t.progress * 100.0,
                    fmt_opt(&t.owner)
                );
            }
        }
        TaskCmd::Add { item, stage, fields } => {
            let mut task_fields = TaskFields::for_stage(stage);
            fields.apply_to(&mut task_fields)?;
            let task = state.task_api.add_task(item, task_fields)?;
            if json {
                return print_json(&task);
            }
            println!("{}\t{}", task.id, task.stage);
        }
        TaskCmd::Update { id, stage, fields } => {
            let existing = state.task_api.get_task(id)?;
            let mut task_fields = TaskFields::from(&existing);
            if let Some(stage) = stage {
                task_fields.stage = stage;
            }
            fields.apply_to(&mut task_fields)?;
            let task = state.task_api.update_task(id, task_fields)?;
            if json {
                return print_json(&task);
            }
            println!("{}\t{}\t{:.0}%", task.id, task.stage, task.progress * 100.0);
        }
        TaskCmd::Delete { id, yes } => {
            state.task_api.delete_task(id, yes)?;
            println!("deleted task {}", id);
        }
        TaskCmd::Seed { item, start } => {
            let created = state.task_api.seed_tasks(item, today_or(start))?;
            println!("tasks +{}", created);
        }
    }
    Ok(())
}

fn run_config(state: &AppState, action: ConfigCmd, json: bool) -> Result<()> {
    match action {
        ConfigCmd::Show => {
            let config = state
                .config_manager
                .load_board_config()
                .map_err(|e| anyhow!(e.to_string()))?;
            // 已写入库的覆写值（未列出的键使用默认值）
            let overrides = state
                .config_manager
                .get_config_snapshot()
                .map_err(|e| anyhow!(e.to_string()))?;
            if json {
                return print_json(&serde_json::json!({
                    "config": config,
                    "overrides": overrides,
                }));
            }
            println!("db: {}", state.db_path);
            println!("stages: {}", config.stages.join(", "));
            println!(
                "labels: {} / {}",
                config.field_labels.customer_due, config.field_labels.internal_deadline
            );
            println!("stage_days: {}", config.stage_days);
            for (key, value) in &overrides {
                println!("  {} = {}", key, value);
            }
        }
        ConfigCmd::SetStages { stages } => {
            let saved = state
                .config_manager
                .save_stages(&stages)
                .map_err(|e| anyhow!(e.to_string()))
                .context("阶段列表保存失败")?;
            println!("stages: {}", saved.join(", "));
        }
        ConfigCmd::SetLabels {
            customer_due,
            internal_deadline,
        } => {
            let labels = FieldLabels {
                customer_due: customer_due.trim().to_string(),
                internal_deadline: internal_deadline.trim().to_string(),
            };
            if labels.customer_due.is_empty() || labels.internal_deadline.is_empty() {
                return Err(anyhow!("标签不能为空"));
            }
            state
                .config_manager
                .save_field_labels(&labels)
                .map_err(|e| anyhow!(e.to_string()))?;
            println!("labels: {} / {}", labels.customer_due, labels.internal_deadline);
        }
        ConfigCmd::SetStageDays { days } => {
            state
                .config_manager
                .save_stage_days(days)
                .map_err(|e| anyhow!(e.to_string()))?;
            println!("stage_days: {}", days);
        }
    }
    Ok(())
}
