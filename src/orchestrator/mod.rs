//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层是终端前端的"指挥中心"：读取输入、调用流程层、渲染界面。
//!
//! ## 模块划分
//!
//! ### `app` - 终端应用
//! - 管理应用生命周期（初始化、运行、退出）
//! - 持有流程控制器和导出服务
//! - 观察状态变化，保存并提示新到达的插图
//!
//! ### `commands` - 命令解析
//! - 一行输入 → 当前阶段下的一条命令
//! - 把用户输入的答案转换为题目可接受的形式
//!
//! ## 层次关系
//!
//! ```text
//! app (输入循环 + 渲染)
//!     ↓
//! workflow::WorkbookController (阶段切换)
//!     ↓
//! services (能力层：分析 / 插图 / 导出)
//!     ↓
//! clients (Gemini REST)
//! ```

pub mod app;
pub mod commands;

// 重新导出主要类型
pub use app::App;
pub use commands::{parse_command, Command};
