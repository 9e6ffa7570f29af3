//! 批量导入处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量任务的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、创建题库客户端
//! 2. **批量加载**：扫描并加载所有待处理的导入任务（`Vec<ImportJob>`）
//! 3. **顺序处理**：任务逐个处理，任务内题目逐条提交
//! 4. **资源管理**：持有 QuestionBankClient（连接池 + 查询缓存）
//! 5. **全局统计**：汇总所有任务的处理结果
//! 6. **列表查看**：分页查看题目、查看班级
//! 7. **单条维护**：委托 catalog 执行增删改
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个任务的细节
//! - **资源所有者**：唯一持有客户端的模块
//! - **向下委托**：委托 job_processor 处理单个任务

use crate::clients::{HierarchySource, QuestionBankClient};
use crate::config::Config;
use crate::models::{ImportJob, Named, QuestionSummary};
use crate::orchestrator::catalog::{self, CatalogCommand};
use crate::orchestrator::job_processor::{self, JobOutcome};
use crate::services::FailureWriter;
use crate::utils::logging::{self, ImportStats};
use crate::workflow::{ListView, PaginationMode, ViewState};
use anyhow::Result;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    client: QuestionBankClient,
    failure_writer: FailureWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(&config.api_base_url, &config.import_folder);

        let client = QuestionBankClient::new(&config)?;
        let failure_writer = FailureWriter::with_path(config.failure_log_file.clone());

        Ok(Self {
            config,
            client,
            failure_writer,
        })
    }

    /// 运行批量导入
    pub async fn run(&self) -> Result<ImportStats> {
        let all_jobs = self.load_jobs().await?;

        if all_jobs.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(ImportStats::default());
        }

        logging::log_jobs_loaded(all_jobs.len());

        let stats = self.process_all_jobs(all_jobs).await;

        logging::print_final_stats(&stats, &self.config.output_log_file);

        Ok(stats)
    }

    /// 加载导入任务
    async fn load_jobs(&self) -> Result<Vec<ImportJob>> {
        info!("\n📁 正在扫描待处理的导入任务...");
        crate::models::load_all_import_jobs(&self.config.import_folder).await
    }

    /// 逐个处理任务；单个任务出错不影响后续任务
    async fn process_all_jobs(&self, all_jobs: Vec<ImportJob>) -> ImportStats {
        let mut stats = ImportStats {
            jobs_total: all_jobs.len(),
            ..Default::default()
        };

        for (idx, job) in all_jobs.into_iter().enumerate() {
            let job_index = idx + 1;
            match job_processor::process_job(
                &self.client,
                job,
                job_index,
                &self.config,
                &self.failure_writer,
            )
            .await
            {
                Ok(JobOutcome::Completed(report)) => {
                    stats.jobs_completed += 1;
                    stats.items_succeeded += report.succeeded;
                    stats.items_failed += report.failed();
                }
                Ok(JobOutcome::Aborted(_)) => {
                    stats.jobs_aborted += 1;
                }
                Err(e) => {
                    error!("[任务 {}] ❌ 处理过程中发生错误: {}", job_index, e);
                    stats.jobs_aborted += 1;
                }
            }
        }

        stats
    }

    /// 分页查看题目；指定主题时只看该主题
    pub async fn list_questions(&self, topic_id: Option<&str>, page: usize) -> Result<()> {
        let mode = match topic_id {
            Some(_) => PaginationMode::Simple,
            None => PaginationMode::Windowed,
        };
        let mut view: ListView<QuestionSummary> = ListView::new(mode, self.config.page_size);
        view.go_to(page);

        let request = view.begin_load();
        let result = match topic_id {
            Some(topic_id) => {
                self.client
                    .list_questions_by_topic(topic_id, request, &self.config.content_lang)
                    .await
            }
            None => self.client.list_questions(request).await,
        };
        view.apply(result);

        info!("{}", "=".repeat(60));
        info!("📋 题目列表 - 第 {} 页", view.page());
        info!("{}", "=".repeat(60));
        match view.state() {
            ViewState::Loading => {}
            ViewState::Error(_) => error!("❌ 加载题目失败"),
            ViewState::Empty => warn!("⚠️ 没有找到题目"),
            ViewState::Loaded(items) => {
                for (i, item) in items.iter().enumerate() {
                    log_question_row(request.offset + i + 1, item);
                }
            }
        }
        info!(
            "上一页: {} | 下一页: {}",
            if view.has_previous() { "可用" } else { "-" },
            if view.has_next() { "可用" } else { "-" }
        );

        Ok(())
    }

    /// 执行单条维护命令
    pub async fn run_catalog(&self, command: CatalogCommand) -> Result<()> {
        catalog::execute(&self.client, command, self.config.page_size).await
    }

    /// 查看全部班级
    pub async fn list_classes(&self) -> Result<()> {
        let classes = self.client.list_classes().await?;
        if classes.is_empty() {
            warn!("⚠️ 没有找到班级");
            return Ok(());
        }
        for (i, class) in classes.iter().enumerate() {
            info!("{}. [{}] {}", i + 1, class.id(), class.display_name());
        }
        Ok(())
    }
}

fn log_question_row(number: usize, item: &QuestionSummary) {
    let text = item
        .question_text
        .as_ref()
        .map(|t| t.display().to_string())
        .unwrap_or_default();
    info!(
        "{}. [{}] {} | {} | {} | {}",
        number,
        item.key(),
        logging::truncate_text(&text, 60),
        item.question_type().map_or("-", |t| t.label()),
        item.difficulty().map_or("-", |d| d.as_str()),
        item.index().unwrap_or_else(|| "-".to_string())
    );
}
