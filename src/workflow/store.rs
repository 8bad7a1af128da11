//! 状态容器
//!
//! 基于 `tokio::sync::watch`：写入方整体替换状态，界面通过订阅获得最新快照

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{AppError, AppResult};
use crate::workflow::state::{AppState, SessionId, WorkflowStage};

/// 应用状态容器
///
/// 克隆得到的是同一个容器的句柄
#[derive(Debug, Clone)]
pub struct AppStore {
    tx: Arc<watch::Sender<AppState>>,
}

impl AppStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AppState::default());
        Self { tx: Arc::new(tx) }
    }

    /// 当前状态的快照
    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    pub fn stage(&self) -> WorkflowStage {
        self.tx.borrow().stage
    }

    /// 订阅状态变化（用于重新渲染）
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }

    /// 无条件替换状态
    pub fn replace(&self, f: impl FnOnce(&AppState) -> AppState) {
        self.tx.send_modify(|state| {
            let next = f(state);
            *state = next;
        });
    }

    /// 带校验的状态切换
    ///
    /// `f` 返回错误时状态保持不变。读取和写入在同一把锁内完成
    pub fn try_transition<T>(
        &self,
        action: &'static str,
        f: impl FnOnce(&AppState) -> AppResult<(AppState, T)>,
    ) -> AppResult<T> {
        let mut outcome = None;
        self.tx.send_if_modified(|state| match f(state) {
            Ok((next, value)) => {
                *state = next;
                outcome = Some(Ok(value));
                true
            }
            Err(e) => {
                outcome = Some(Err(e));
                false
            }
        });

        outcome.unwrap_or_else(|| {
            Err(AppError::InvalidTransition {
                action,
                stage: self.stage(),
            })
        })
    }

    /// 会话是否仍在展示练习册
    pub fn is_current(&self, session: SessionId) -> bool {
        let state = self.tx.borrow();
        state.session == session && state.stage == WorkflowStage::ShowingResults
    }

    /// 只在会话仍有效时应用更新
    ///
    /// 返回更新是否被应用；会话过期或 `f` 返回 `None` 时丢弃
    pub fn update_session(&self, session: SessionId, f: impl FnOnce(&AppState) -> Option<AppState>) -> bool {
        self.tx.send_if_modified(|state| {
            if state.session != session || state.stage != WorkflowStage::ShowingResults {
                return false;
            }
            match f(state) {
                Some(next) => {
                    *state = next;
                    true
                }
                None => false,
            }
        })
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_transition_leaves_state_untouched() {
        let store = AppStore::new();
        let before = store.snapshot();

        let result: AppResult<()> = store.try_transition("noop", |state| {
            Err(AppError::InvalidTransition {
                action: "noop",
                stage: state.stage,
            })
        });

        assert!(result.is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_transition_returns_value() {
        let store = AppStore::new();
        let stage = store
            .try_transition("configure", |state| {
                let next = AppState {
                    stage: WorkflowStage::SelectingConfiguration,
                    ..state.clone()
                };
                Ok((next, WorkflowStage::SelectingConfiguration))
            })
            .unwrap();

        assert_eq!(stage, WorkflowStage::SelectingConfiguration);
        assert_eq!(store.stage(), WorkflowStage::SelectingConfiguration);
    }

    #[test]
    fn test_update_session_rejects_stale_session() {
        let store = AppStore::new();
        let session = SessionId::default().next();
        store.replace(|state| AppState {
            stage: WorkflowStage::ShowingResults,
            session,
            ..state.clone()
        });

        assert!(store.is_current(session));
        assert!(!store.update_session(session.next(), |state| Some(state.clone())));
        assert!(store.update_session(session, |state| Some(state.clone())));

        store.replace(|_| AppState::fresh(session.next()));
        assert!(!store.is_current(session));
        assert!(!store.update_session(session, |state| Some(state.clone())));
    }

    #[tokio::test]
    async fn test_subscribers_see_replacements() {
        let store = AppStore::new();
        let mut rx = store.subscribe();

        store.replace(|state| AppState {
            error: Some("boom".to_string()),
            ..state.clone()
        });

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().error.as_deref(), Some("boom"));
    }
}
