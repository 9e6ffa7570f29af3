//! # Question Bank Admin
//!
//! 乌兹别克语 / 俄语双语题库的管理客户端，核心是批量 JSON 导入
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 HTTP 连接，只暴露能力
//! - `HttpExecutor` - 统一的请求发送、鉴权和错误映射
//! - `QueryCache` - 按实体标签失效的查询缓存
//!
//! ### ② 业务能力层（Clients / Services）
//! - `clients/` - 题库 REST 接口，`QuestionGateway` / `HierarchySource` 两个能力接口
//! - `services/` - 只处理单个题目：宽松解析、校验、失败记录
//!
//! ### ③ 流程层（Workflow）
//! - `SelectionCascade` - 班级 → 章节 → 主题 → 分组 级联选择
//! - `ImportCtx` / `ImportFlow` - 单个题目的补全与提交
//! - `ListView` - 分页、展开、删除确认
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量任务处理器
//! - `orchestrator/job_processor` - 单个任务处理器
//! - `orchestrator/import_pipeline` - 题目数组的导入管线

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{HierarchySource, QuestionBankClient, QuestionGateway};
pub use config::Config;
pub use error::{AppError, AppResult, ImportError, ItemFailure};
pub use infrastructure::{HttpExecutor, QueryCache};
pub use models::{ImportJob, QuestionDraft};
pub use orchestrator::{run_import, App, ImportReport};
pub use workflow::{ImportCtx, ImportFlow, ListView, SelectionCascade};
