//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量任务处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载导入任务（Vec<ImportJob>）
//! - 持有题库客户端
//! - 输出全局统计信息
//!
//! ### `job_processor` - 单个任务处理器
//! - 按任务里的 id 走级联选择
//! - 调用导入管线
//! - 写失败记录、清理文件
//! - 输出单个任务的统计信息
//!
//! ### `catalog` - 单条维护
//! - 班级 / 章节 / 主题的增删改
//! - 单题查看、带确认流程的删除
//!
//! ### `import_pipeline` - 导入管线
//! - 宽松解析 → 逐题校验 → 逐题提交
//! - 汇总成功数和失败序号
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ImportJob>)
//!     ↓
//! job_processor (处理单个 ImportJob)
//!     ↓
//! import_pipeline (处理题目数组)
//!     ↓
//! workflow::ImportFlow (处理单个题目)
//!     ↓
//! services (能力层：repair / validate / failure)
//!     ↓
//! clients → infrastructure (HttpExecutor + QueryCache)
//! ```

pub mod batch_processor;
pub mod catalog;
pub mod import_pipeline;
pub mod job_processor;

// 重新导出主要类型
pub use batch_processor::App;
pub use catalog::CatalogCommand;
pub use import_pipeline::{run_import, ImportReport};
pub use job_processor::{process_job, resolve_selection, JobOutcome};
