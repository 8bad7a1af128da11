use serde::{Deserialize, Serialize};

use crate::models::question::{IllustrationState, Question};

/// 检索来源（模型引用的网页）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// 课本页面分析结果
///
/// 由一次模型响应整体创建；之后只有题目的插图状态会按ID更新
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub subject: String,
    pub topic: String,
    pub summary: String,
    pub fun_fact: String,
    pub questions: Vec<Question>,
    pub sources: Vec<GroundingSource>,
}

impl AnalysisResult {
    /// 所有题目标记为"插图生成中"
    pub fn with_illustrations_pending(mut self) -> Self {
        for question in &mut self.questions {
            question.illustration = IllustrationState::Pending;
        }
        self
    }

    /// 返回更新了某道题插图状态的新结果，原结果不变
    ///
    /// 找不到对应ID时返回 `None`
    pub fn with_question_illustration(&self, question_id: &str, state: IllustrationState) -> Option<Self> {
        if !self.questions.iter().any(|q| q.id == question_id) {
            return None;
        }

        let questions = self
            .questions
            .iter()
            .map(|q| {
                if q.id == question_id {
                    Question {
                        illustration: state.clone(),
                        ..q.clone()
                    }
                } else {
                    q.clone()
                }
            })
            .collect();

        Some(Self {
            questions,
            ..self.clone()
        })
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// 仍在生成插图的题目数量
    pub fn pending_illustrations(&self) -> usize {
        self.questions.iter().filter(|q| q.is_generating_image()).count()
    }
}
