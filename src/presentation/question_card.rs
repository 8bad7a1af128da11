//! 答题卡片
//!
//! 每道题一个卡片，只持有本地交互状态（已选选项、简答输入、是否已揭晓答案），
//! 从不写回分析结果

use std::fmt::Write as _;

use crate::models::question::option_letter;
use crate::models::{IllustrationState, Question, QuestionKind};

/// 插图生成中显示的进度提示
pub const SKETCHING_INDICATOR: &str = "⏳ sketching figure...";
/// 插图生成失败时的占位图
pub const PLACEHOLDER_GLYPH: &str = "✏️";

/// 判分
///
/// - 选择题 / 判断题：与正确答案完全一致（区分大小写）
/// - 简答题：去掉首尾空白后忽略大小写比较
pub fn evaluate(question: &Question, selected_option: Option<&str>, short_answer_text: &str) -> bool {
    match &question.kind {
        QuestionKind::MultipleChoice { .. } | QuestionKind::TrueFalse => {
            selected_option == Some(question.correct_answer.as_str())
        }
        QuestionKind::ShortAnswer => {
            short_answer_text.trim().to_lowercase() == question.correct_answer.trim().to_lowercase()
        }
    }
}

/// 答题卡片的本地状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionCard {
    index: usize,
    selected_option: Option<String>,
    short_answer_text: String,
    answer_revealed: bool,
}

impl QuestionCard {
    /// 创建第 `index` 题（从0开始）的卡片
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.selected_option.as_deref()
    }

    pub fn short_answer_text(&self) -> &str {
        &self.short_answer_text
    }

    pub fn is_answer_revealed(&self) -> bool {
        self.answer_revealed
    }

    /// 选择一个选项
    ///
    /// 已揭晓答案、题型不是选择/判断题、或选项不存在时忽略，返回 `false`
    pub fn select_option(&mut self, question: &Question, option: &str) -> bool {
        if self.answer_revealed || !question.choices().contains(&option) {
            return false;
        }
        self.selected_option = Some(option.to_string());
        true
    }

    /// 输入简答内容；已揭晓答案或不是简答题时忽略
    pub fn set_short_answer(&mut self, question: &Question, text: &str) -> bool {
        if self.answer_revealed || !matches!(question.kind, QuestionKind::ShortAnswer) {
            return false;
        }
        self.short_answer_text = text.to_string();
        true
    }

    /// 是否已作答（可以提交）
    pub fn can_submit(&self) -> bool {
        self.selected_option.is_some() || !self.short_answer_text.is_empty()
    }

    /// 提交并揭晓答案
    pub fn submit(&mut self) -> bool {
        if self.answer_revealed || !self.can_submit() {
            return false;
        }
        self.answer_revealed = true;
        true
    }

    /// 在简答输入框中按下回车，等同于提交
    pub fn press_enter(&mut self) -> bool {
        self.submit()
    }

    /// 清除作答，回到初始状态
    pub fn reset(&mut self) {
        self.selected_option = None;
        self.short_answer_text.clear();
        self.answer_revealed = false;
    }

    /// 当前作答是否正确
    pub fn is_correct(&self, question: &Question) -> bool {
        evaluate(question, self.selected_option.as_deref(), &self.short_answer_text)
    }

    /// 揭晓后才返回判分结果
    pub fn evaluation(&self, question: &Question) -> Option<bool> {
        self.answer_revealed.then(|| self.is_correct(question))
    }

    /// 例如 "Section 2 • Problem 7"，每5题一节
    pub fn section_label(&self) -> String {
        let number = self.index + 1;
        format!("Section {} • Problem {}", number.div_ceil(5), number)
    }

    /// 渲染成终端文本
    pub fn render(&self, question: &Question) -> String {
        let mut out = String::new();
        let number = self.index + 1;

        let _ = writeln!(out, "┌─ {}  [{}]", self.section_label(), question.kind.label());
        let figure = match &question.illustration {
            IllustrationState::Pending => SKETCHING_INDICATOR.to_string(),
            IllustrationState::Ready(image) => format!("🖼  Figure {} ({})", number, image.mime_type),
            IllustrationState::Unavailable => PLACEHOLDER_GLYPH.to_string(),
        };
        let _ = writeln!(out, "│ {}", figure);
        let _ = writeln!(out, "│ Figure {}. {}", number, question.illustration_prompt);
        let _ = writeln!(out, "│ {}", question.text);

        match &question.kind {
            QuestionKind::MultipleChoice { .. } | QuestionKind::TrueFalse => {
                for (i, choice) in question.choices().into_iter().enumerate() {
                    let selected = self.selected_option() == Some(choice);
                    let marker = if self.answer_revealed && choice == question.correct_answer {
                        "✓"
                    } else if self.answer_revealed && selected {
                        "✗"
                    } else if selected {
                        "●"
                    } else {
                        "○"
                    };
                    let _ = writeln!(out, "│   {} {}. {}", marker, option_letter(i), choice);
                }
            }
            QuestionKind::ShortAnswer => {
                let shown = if self.short_answer_text.is_empty() {
                    "Type your answer..."
                } else {
                    self.short_answer_text.as_str()
                };
                let _ = writeln!(out, "│   ✎ {}", shown);
            }
        }

        match self.evaluation(question) {
            Some(correct) => {
                let verdict = if correct {
                    "✅ Evaluation: Correct"
                } else {
                    "❌ Evaluation: Review Needed"
                };
                let _ = writeln!(out, "│ {}", verdict);
                let _ = writeln!(out, "│ Answer: {}", question.correct_answer);
                let _ = writeln!(out, "│ \"{}\"", question.explanation);
                let _ = writeln!(out, "│ (reset {} to try again)", number);
            }
            None if self.can_submit() => {
                let _ = writeln!(out, "│ (submit {} to check your response)", number);
            }
            None => {}
        }
        out.push_str("└─");
        out
    }
}
