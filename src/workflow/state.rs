//! 应用状态
//!
//! 描述"当前处于哪个界面、手里有什么数据"

use std::fmt::Display;

use crate::models::{AnalysisResult, Configuration, IllustrationState, PendingImage};

/// 工作流阶段，任一时刻只有一个处于激活状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkflowStage {
    /// 上传照片（初始阶段）
    #[default]
    UploadingInput,
    /// 选择年级、难度和插图风格
    SelectingConfiguration,
    /// 等待页面分析
    Analyzing,
    /// 展示练习册
    ShowingResults,
}

impl Display for WorkflowStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkflowStage::UploadingInput => "uploading-input",
            WorkflowStage::SelectingConfiguration => "selecting-configuration",
            WorkflowStage::Analyzing => "analyzing",
            WorkflowStage::ShowingResults => "showing-results",
        };
        write!(f, "{}", name)
    }
}

/// 会话标识
///
/// 每次进入或离开练习册都会递增，后台任务据此判断自己是否已过期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionId(u64);

impl SessionId {
    pub fn next(self) -> Self {
        SessionId(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 整个应用唯一的状态
///
/// 只通过整体替换来更新，不做原地修改
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub stage: WorkflowStage,
    pub session: SessionId,
    pub pending_image: Option<PendingImage>,
    pub configuration: Configuration,
    pub analysis: Option<AnalysisResult>,
    /// 最近一次分析失败的提示
    pub error: Option<String>,
}

impl AppState {
    /// 新会话的初始状态
    pub fn fresh(session: SessionId) -> Self {
        Self {
            session,
            ..Self::default()
        }
    }

    /// 返回更新了某道题插图状态的新状态
    pub fn with_question_illustration(&self, question_id: &str, illustration: IllustrationState) -> Option<Self> {
        let analysis = self
            .analysis
            .as_ref()?
            .with_question_illustration(question_id, illustration)?;

        Some(Self {
            analysis: Some(analysis),
            ..self.clone()
        })
    }
}
