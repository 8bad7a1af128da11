//! 插图生成流程
//!
//! 按题目顺序逐个请求插图：上一题的结果写回状态后才发出下一题的请求。
//! 单题失败只清除该题的"生成中"标记，不中断后续题目，也不作为全局错误。

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::models::{IllustrationState, IllustrationStyle, Question};
use crate::services::ContentProvider;
use crate::utils::logging::log_pass_complete;
use crate::workflow::state::SessionId;
use crate::workflow::store::AppStore;

/// 一道题的插图任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllustrationJob {
    pub question_id: String,
    pub prompt: String,
}

impl From<&Question> for IllustrationJob {
    fn from(question: &Question) -> Self {
        Self {
            question_id: question.id.clone(),
            prompt: question.illustration_prompt.clone(),
        }
    }
}

/// 插图生成统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// 已写回的插图数量
    pub succeeded: usize,
    /// 生成失败的数量
    pub failed: usize,
    /// 会话已关闭，剩余结果被丢弃
    pub discarded: bool,
}

/// 在后台启动插图生成
pub fn spawn_illustration_pass(
    provider: Arc<dyn ContentProvider>,
    store: AppStore,
    session: SessionId,
    jobs: Vec<IllustrationJob>,
    style: IllustrationStyle,
) -> JoinHandle<PassSummary> {
    let span = info_span!("illustration_pass", session = %session, style = %style);
    tokio::spawn(run_illustration_pass(provider, store, session, jobs, style).instrument(span))
}

/// 顺序生成所有插图
pub async fn run_illustration_pass(
    provider: Arc<dyn ContentProvider>,
    store: AppStore,
    session: SessionId,
    jobs: Vec<IllustrationJob>,
    style: IllustrationStyle,
) -> PassSummary {
    let total = jobs.len();
    let mut summary = PassSummary::default();
    info!("🎨 开始生成插图，共 {} 张", total);

    for (index, job) in jobs.into_iter().enumerate() {
        if !store.is_current(session) {
            summary.discarded = true;
            break;
        }

        let (illustration, ok) = match provider.generate_illustration(&job.prompt, style).await {
            Ok(image) => (IllustrationState::Ready(image), true),
            Err(e) => {
                warn!("第 {}/{} 张插图生成失败，显示占位图: {}", index + 1, total, e);
                (IllustrationState::Unavailable, false)
            }
        };

        let mut unknown_question = false;
        let applied = store.update_session(session, |state| {
            let next = state.with_question_illustration(&job.question_id, illustration);
            unknown_question = next.is_none();
            next
        });
        if unknown_question {
            warn!("题目 {} 不在当前练习册中，跳过", job.question_id);
            summary.failed += 1;
            continue;
        }
        if !applied {
            debug!("会话 {} 已失效，丢弃题目 {} 的插图", session, job.question_id);
            summary.discarded = true;
            break;
        }

        if ok {
            summary.succeeded += 1;
            debug!("✓ 第 {}/{} 张插图完成", index + 1, total);
        } else {
            summary.failed += 1;
        }
    }

    log_pass_complete(&summary);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::AppResult;
    use crate::models::{AnalysisResult, DifficultyLevel, GradeLevel, Illustration, PendingImage, QuestionKind};
    use crate::workflow::state::{AppState, WorkflowStage};

    struct EchoProvider;

    #[async_trait]
    impl ContentProvider for EchoProvider {
        async fn analyze(&self, _: &PendingImage, _: GradeLevel, _: DifficultyLevel) -> AppResult<AnalysisResult> {
            unreachable!("only illustrations are requested")
        }

        async fn generate_illustration(&self, _prompt: &str, _style: IllustrationStyle) -> AppResult<Illustration> {
            Ok(Illustration::new("image/png", "aGk="))
        }
    }

    fn results_store(session: SessionId) -> AppStore {
        let question = Question {
            id: "q1".to_string(),
            text: "Water boils at 100°C.".to_string(),
            kind: QuestionKind::TrueFalse,
            correct_answer: "True".to_string(),
            explanation: "At sea level.".to_string(),
            illustration_prompt: "kettle".to_string(),
            illustration: IllustrationState::Pending,
        };
        let store = AppStore::new();
        store.replace(|_| AppState {
            stage: WorkflowStage::ShowingResults,
            session,
            analysis: Some(AnalysisResult {
                subject: "Science".to_string(),
                topic: "Heat".to_string(),
                summary: String::new(),
                fun_fact: String::new(),
                questions: vec![question],
                sources: Vec::new(),
            }),
            ..AppState::default()
        });
        store
    }

    #[tokio::test]
    async fn test_unknown_question_is_skipped_without_stopping() {
        let session = SessionId::default().next();
        let store = results_store(session);
        let jobs = vec![
            IllustrationJob {
                question_id: "missing".to_string(),
                prompt: "ghost".to_string(),
            },
            IllustrationJob {
                question_id: "q1".to_string(),
                prompt: "kettle".to_string(),
            },
        ];

        let summary =
            run_illustration_pass(Arc::new(EchoProvider), store.clone(), session, jobs, IllustrationStyle::Pencil).await;

        assert_eq!(
            summary,
            PassSummary {
                succeeded: 1,
                failed: 1,
                discarded: false
            }
        );
        let analysis = store.snapshot().analysis.unwrap();
        assert!(analysis.question("q1").unwrap().image().is_some());
    }

    #[tokio::test]
    async fn test_other_session_stops_the_pass() {
        let store = results_store(SessionId::default());
        let jobs = vec![IllustrationJob {
            question_id: "q1".to_string(),
            prompt: "kettle".to_string(),
        }];

        let summary = run_illustration_pass(
            Arc::new(EchoProvider),
            store.clone(),
            SessionId::default().next(),
            jobs,
            IllustrationStyle::Pencil,
        )
        .await;

        assert!(summary.discarded);
        assert_eq!(store.snapshot().analysis.unwrap().pending_illustrations(), 1);
    }
}
