//! # Workbook Genie
//!
//! 把一张课本照片变成带插图的练习册
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - Gemini REST 协议：请求/响应类型和 HTTP 调用
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ContentProvider` - 页面分析 + 插图生成能力（`GeminiContentService` 实现）
//! - `WorkbookExporter` - 保存插图、导出 Markdown 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 四个阶段的状态机
//! - `AppStore` - 唯一的状态容器
//! - `WorkbookController` - 阶段切换
//! - `illustration_pass` - 后台顺序生成插图
//!
//! ### ④ 展示层与编排层（Presentation / Orchestration）
//! - `presentation/` - 上传控件、答题卡片、四个界面的终端渲染
//! - `orchestrator/` - 终端输入循环和命令解析
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod presentation;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ConfigError, ProviderError};
pub use models::{AnalysisResult, Configuration, Question, QuestionKind};
pub use orchestrator::App;
pub use services::{ContentProvider, GeminiContentService, WorkbookExporter};
pub use workflow::{AppState, AppStore, WorkbookController, WorkflowStage};
