//! 练习册流程控制 - 流程层
//!
//! 核心职责：驱动四个阶段之间的切换
//!
//! ```text
//! UploadingInput ──选择图片──▶ SelectingConfiguration ──确认──▶ Analyzing ──成功──▶ ShowingResults
//!       ▲                              │                           │                   │
//!       └────────────取消──────────────┘◀──────────失败─────────────┘◀──────关闭────────┘
//! ```
//!
//! 进入 `ShowingResults` 后立即在后台启动一次插图生成。

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::models::{Configuration, DifficultyLevel, GradeLevel, IllustrationStyle, PendingImage};
use crate::services::ContentProvider;
use crate::utils::logging::log_analysis_ready;
use crate::workflow::illustration_pass::{spawn_illustration_pass, IllustrationJob, PassSummary};
use crate::workflow::state::{AppState, WorkflowStage};
use crate::workflow::store::AppStore;

/// 错误信息为空时的兜底提示
pub const GENERIC_ANALYSIS_FAILURE: &str =
    "Oops! The research engines were interrupted. Let's try again! ✏️";

/// 练习册流程控制器
///
/// - 状态的唯一写入方（插图任务只写回自己会话的插图）
/// - 不关心界面如何渲染
pub struct WorkbookController {
    store: AppStore,
    provider: Arc<dyn ContentProvider>,
}

impl WorkbookController {
    /// 创建新的控制器
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self::with_store(provider, AppStore::new())
    }

    pub fn with_store(provider: Arc<dyn ContentProvider>, store: AppStore) -> Self {
        Self { store, provider }
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    /// 照片已读取并编码：UploadingInput → SelectingConfiguration
    pub fn select_image(&self, image: PendingImage) -> AppResult<()> {
        self.store.try_transition("select image", |state| {
            require_stage(state, WorkflowStage::UploadingInput, "select image")?;
            info!("📷 已选择图片: {}", image.file_name);
            let next = AppState {
                stage: WorkflowStage::SelectingConfiguration,
                pending_image: Some(image),
                ..state.clone()
            };
            Ok((next, ()))
        })
    }

    pub fn set_grade(&self, grade: GradeLevel) -> AppResult<()> {
        self.update_configuration("set grade", |c| Configuration { grade, ..c })
    }

    pub fn set_difficulty(&self, difficulty: DifficultyLevel) -> AppResult<()> {
        self.update_configuration("set difficulty", |c| Configuration { difficulty, ..c })
    }

    pub fn set_style(&self, style: IllustrationStyle) -> AppResult<()> {
        self.update_configuration("set style", |c| Configuration { style, ..c })
    }

    fn update_configuration(
        &self,
        action: &'static str,
        f: impl FnOnce(Configuration) -> Configuration,
    ) -> AppResult<()> {
        self.store.try_transition(action, |state| {
            require_stage(state, WorkflowStage::SelectingConfiguration, action)?;
            let next = AppState {
                configuration: f(state.configuration),
                ..state.clone()
            };
            Ok((next, ()))
        })
    }

    /// 取消配置并丢弃照片：SelectingConfiguration → UploadingInput
    pub fn cancel_configuration(&self) -> AppResult<()> {
        self.store.try_transition("cancel configuration", |state| {
            require_stage(state, WorkflowStage::SelectingConfiguration, "cancel configuration")?;
            let next = AppState {
                stage: WorkflowStage::UploadingInput,
                pending_image: None,
                ..state.clone()
            };
            Ok((next, ()))
        })
    }

    /// 开始分析：SelectingConfiguration → Analyzing → ShowingResults / UploadingInput
    ///
    /// 成功时返回后台插图任务的句柄。
    /// 分析失败时状态已重置到 UploadingInput 并记录了错误提示，同时把错误返回给调用方。
    pub async fn start_analysis(&self) -> AppResult<JoinHandle<PassSummary>> {
        let (image, configuration) = self.store.try_transition("start analysis", |state| {
            require_stage(state, WorkflowStage::SelectingConfiguration, "start analysis")?;
            let image = state
                .pending_image
                .clone()
                .ok_or(AppError::InvalidTransition {
                    action: "start analysis without an image",
                    stage: state.stage,
                })?;
            let next = AppState {
                stage: WorkflowStage::Analyzing,
                pending_image: None,
                error: None,
                ..state.clone()
            };
            Ok((next, (image, state.configuration)))
        })?;

        info!(
            "🔍 开始分析 (年级: {}, 难度: {}, 风格: {})",
            configuration.grade, configuration.difficulty, configuration.style
        );

        match self
            .provider
            .analyze(&image, configuration.grade, configuration.difficulty)
            .await
        {
            Ok(result) => {
                let analysis = result.with_illustrations_pending();
                log_analysis_ready(&analysis);
                let jobs: Vec<IllustrationJob> = analysis.questions.iter().map(IllustrationJob::from).collect();

                let session = self.store.try_transition("show results", |state| {
                    require_stage(state, WorkflowStage::Analyzing, "show results")?;
                    let session = state.session.next();
                    let next = AppState {
                        stage: WorkflowStage::ShowingResults,
                        session,
                        analysis: Some(analysis),
                        ..state.clone()
                    };
                    Ok((next, session))
                })?;

                Ok(spawn_illustration_pass(
                    Arc::clone(&self.provider),
                    self.store.clone(),
                    session,
                    jobs,
                    configuration.style,
                ))
            }
            Err(e) => {
                error!("❌ 分析失败: {}", e);
                let message = match e.to_string() {
                    m if m.trim().is_empty() => GENERIC_ANALYSIS_FAILURE.to_string(),
                    m => m,
                };
                self.store.replace(|state| AppState {
                    stage: WorkflowStage::UploadingInput,
                    pending_image: None,
                    analysis: None,
                    error: Some(message),
                    ..state.clone()
                });
                Err(e)
            }
        }
    }

    /// 关闭练习册：ShowingResults → UploadingInput
    ///
    /// 丢弃分析结果、错误和本次会话的配置；仍在运行的插图任务会因会话过期而停止写回
    pub fn close_workbook(&self) -> AppResult<()> {
        self.store.try_transition("close workbook", |state| {
            require_stage(state, WorkflowStage::ShowingResults, "close workbook")?;
            info!("🏅 关闭练习册 (会话 {})", state.session);
            Ok((AppState::fresh(state.session.next()), ()))
        })
    }
}

fn require_stage(state: &AppState, expected: WorkflowStage, action: &'static str) -> AppResult<()> {
    if state.stage == expected {
        Ok(())
    } else {
        Err(AppError::InvalidTransition {
            action,
            stage: state.stage,
        })
    }
}
