//! 终端命令解析
//!
//! 一行输入 → 当前阶段下的一条命令。无法识别的输入返回 `Command::Unknown`，附带提示

use std::path::PathBuf;

use crate::models::{DifficultyLevel, GradeLevel, IllustrationStyle, Question, QuestionKind};
use crate::presentation::views::RESULTS_HELP;
use crate::workflow::WorkflowStage;

/// 用户命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 退出程序（任意阶段）
    Quit,
    /// 空行，忽略
    Empty,
    /// 上传照片
    Upload(PathBuf),
    SetGrade(GradeLevel),
    SetDifficulty(DifficultyLevel),
    SetStyle(IllustrationStyle),
    /// 确认配置，开始分析
    Go,
    /// 取消配置，丢弃照片
    Cancel,
    /// 作答第 `index` 题（从0开始）
    Answer { index: usize, value: String },
    Submit(usize),
    Reset(usize),
    /// 重新显示练习册
    Show,
    /// 导出 Markdown
    Export,
    /// 关闭练习册
    Close,
    /// 无法识别，附带提示
    Unknown(String),
}

/// 作答内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerInput {
    /// 选择题 / 判断题的选项原文
    Option(String),
    /// 简答内容
    Text(String),
}

/// 解析一行输入
///
/// # 参数
/// - `stage`: 当前阶段
/// - `line`: 原始输入
pub fn parse_command(stage: WorkflowStage, line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    if matches!(line.to_lowercase().as_str(), "quit" | "exit") {
        return Command::Quit;
    }

    let (head, rest) = split_head(line);
    match stage {
        WorkflowStage::UploadingInput => {
            let path = line.trim_matches(|c| c == '"' || c == '\'');
            Command::Upload(PathBuf::from(path))
        }
        WorkflowStage::SelectingConfiguration => match head.as_str() {
            "grade" => parse_grade(rest)
                .map(Command::SetGrade)
                .unwrap_or_else(|| unknown("Grade must be 1-4.")),
            "difficulty" => DifficultyLevel::from_str(rest)
                .map(Command::SetDifficulty)
                .unwrap_or_else(|| unknown("Difficulty must be easy, similar or difficult.")),
            "style" => IllustrationStyle::from_str(rest)
                .map(Command::SetStyle)
                .unwrap_or_else(|| unknown("Style must be pencil, watercolor, chalkboard or crayon.")),
            "go" | "generate" => Command::Go,
            "cancel" => Command::Cancel,
            _ => unknown("Try: grade <1-4> · difficulty <easy|similar|difficult> · style <name> · go · cancel"),
        },
        WorkflowStage::Analyzing => unknown("Still analyzing the page, hang tight..."),
        WorkflowStage::ShowingResults => parse_results_command(&head, rest),
    }
}

fn parse_results_command(head: &str, rest: &str) -> Command {
    match head {
        "answer" => {
            let (number, value) = split_head(rest);
            match problem_index(&number) {
                Some(index) if !value.is_empty() => Command::Answer {
                    index,
                    value: value.to_string(),
                },
                _ => unknown("Usage: answer <n> <value>"),
            }
        }
        "submit" => problem_index(rest.trim())
            .map(Command::Submit)
            .unwrap_or_else(|| unknown("Usage: submit <n>")),
        "reset" => problem_index(rest.trim())
            .map(Command::Reset)
            .unwrap_or_else(|| unknown("Usage: reset <n>")),
        "show" => Command::Show,
        "export" => Command::Export,
        "close" => Command::Close,
        _ => unknown(RESULTS_HELP),
    }
}

/// 把用户输入的答案转换为题目可接受的形式
///
/// - 选择题：字母（A, B...）或选项原文
/// - 判断题：任意大小写的 true / false，规范化为 `True` / `False`
/// - 简答题：原样保留
///
/// 无法对应到选项时返回 `None`
pub fn resolve_answer(question: &Question, raw: &str) -> Option<AnswerInput> {
    let raw = raw.trim();
    match &question.kind {
        QuestionKind::MultipleChoice { options } => {
            if let Some(exact) = options.iter().find(|o| o.as_str() == raw) {
                return Some(AnswerInput::Option(exact.clone()));
            }
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(letter), None) if letter.is_ascii_alphabetic() => {
                    let index = (letter.to_ascii_uppercase() as u8 - b'A') as usize;
                    options.get(index).cloned().map(AnswerInput::Option)
                }
                _ => None,
            }
        }
        QuestionKind::TrueFalse => QuestionKind::TRUE_FALSE_OPTIONS
            .iter()
            .find(|literal| literal.eq_ignore_ascii_case(raw))
            .map(|literal| AnswerInput::Option(literal.to_string())),
        QuestionKind::ShortAnswer => Some(AnswerInput::Text(raw.to_string())),
    }
}

fn split_head(line: &str) -> (String, &str) {
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head.to_lowercase(), rest.trim()),
        None => (line.to_lowercase(), ""),
    }
}

fn parse_grade(s: &str) -> Option<GradeLevel> {
    s.parse::<usize>()
        .ok()
        .and_then(GradeLevel::from_menu_index)
        .or_else(|| GradeLevel::from_str(s))
}

/// 1-based 题号 → 0-based 下标
fn problem_index(s: &str) -> Option<usize> {
    s.parse::<usize>().ok()?.checked_sub(1)
}

fn unknown(hint: &str) -> Command {
    Command::Unknown(hint.to_string())
}
