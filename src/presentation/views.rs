//! 四个界面的终端渲染
//!
//! 只读取状态快照生成文本，不做任何状态修改

use std::fmt::Write as _;

use crate::models::{AnalysisResult, Configuration, DifficultyLevel, GradeLevel, IllustrationStyle};
use crate::presentation::question_card::QuestionCard;

const RULE: &str = "════════════════════════════════════════════════════════════";

/// 上传界面
///
/// # 参数
/// - `error`: 上一次分析失败的提示（如果有）
pub fn render_upload(error: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "📚 Workbook Genie");
    let _ = writeln!(out, "Snap a textbook page and get an illustrated practice workbook.");
    let _ = writeln!(out, "{}", RULE);
    if let Some(message) = error {
        let _ = writeln!(out, "⚠️  {}", message);
    }
    let _ = writeln!(out, "Enter the path to a photo of a textbook page (or `quit`):");
    out
}

/// 配置界面
pub fn render_configuration(file_name: Option<&str>, configuration: &Configuration) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "⚙️  Customize your workbook");
    if let Some(name) = file_name {
        let _ = writeln!(out, "Page: {}", name);
    }
    let _ = writeln!(out, "{}", RULE);

    let _ = writeln!(out, "Grade level  (grade <1-4>)");
    for (i, grade) in GradeLevel::ALL.iter().enumerate() {
        let _ = writeln!(out, "  {} {}. {}", marker(*grade == configuration.grade), i + 1, grade);
    }

    let _ = writeln!(out, "Difficulty   (difficulty <easy|similar|difficult>)");
    for difficulty in [DifficultyLevel::Easier, DifficultyLevel::Matched, DifficultyLevel::Harder] {
        let _ = writeln!(
            out,
            "  {} {:<10} {}",
            marker(difficulty == configuration.difficulty),
            difficulty.as_str(),
            difficulty_label(difficulty)
        );
    }

    let _ = writeln!(out, "Figure style (style <pencil|watercolor|chalkboard|crayon>)");
    for style in IllustrationStyle::ALL {
        let _ = writeln!(
            out,
            "  {} {:<10} {}",
            marker(style == configuration.style),
            style.as_str(),
            style.label()
        );
    }

    let _ = writeln!(out, "Type `go` to generate or `cancel` to pick another photo.");
    out
}

/// 分析中界面
pub fn render_analyzing(grade: GradeLevel) -> String {
    format!(
        "🔍 Researching the page and writing {} level problems... this can take a minute.\n",
        grade
    )
}

/// 练习册界面
///
/// # 参数
/// - `analysis`: 分析结果
/// - `grade`: 本次会话选择的年级
/// - `cards`: 与题目一一对应的答题卡片
pub fn render_results(analysis: &AnalysisResult, grade: GradeLevel, cards: &[QuestionCard]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "{} Level Practice Guide · {}", grade, analysis.subject);
    let _ = writeln!(out, "📖 {}", analysis.topic);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "{}", analysis.summary);
    let _ = writeln!(out, "💡 Did you know? {}", analysis.fun_fact);
    out.push('\n');

    for (question, card) in analysis.questions.iter().zip(cards) {
        let _ = writeln!(out, "{}\n", card.render(question));
    }

    if !analysis.sources.is_empty() {
        let _ = writeln!(out, "Research footnotes");
        for (i, source) in analysis.sources.iter().enumerate() {
            let _ = writeln!(out, "  [{}] {} <{}>", i + 1, source.title, source.uri);
        }
        out.push('\n');
    }

    out.push_str(RESULTS_HELP);
    out.push('\n');
    out
}

/// 练习册界面的命令提示
pub const RESULTS_HELP: &str =
    "Commands: answer <n> <value> · submit <n> · reset <n> · show · export · close";

fn marker(selected: bool) -> &'static str {
    if selected {
        "●"
    } else {
        "○"
    }
}

fn difficulty_label(difficulty: DifficultyLevel) -> &'static str {
    match difficulty {
        DifficultyLevel::Easier => "easier than the page",
        DifficultyLevel::Matched => "matched to the page",
        DifficultyLevel::Harder => "harder than the page",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GroundingSource, IllustrationState, Question, QuestionKind};

    fn analysis(sources: Vec<GroundingSource>) -> AnalysisResult {
        AnalysisResult {
            subject: "Biology".to_string(),
            topic: "Photosynthesis".to_string(),
            summary: "Plants make sugar from light.".to_string(),
            fun_fact: "Leaves are green because of chlorophyll.".to_string(),
            questions: vec![Question {
                id: "q-1".to_string(),
                text: "Plants need light.".to_string(),
                kind: QuestionKind::TrueFalse,
                correct_answer: "True".to_string(),
                explanation: "Light drives the reaction.".to_string(),
                illustration_prompt: "a leaf".to_string(),
                illustration: IllustrationState::Pending,
            }],
            sources,
        }
    }

    #[test]
    fn test_upload_view_shows_error() {
        assert!(render_upload(Some("Try again")).contains("⚠️  Try again"));
        assert!(!render_upload(None).contains("⚠️"));
    }

    #[test]
    fn test_configuration_view_marks_selection() {
        let config = Configuration {
            grade: GradeLevel::HighSchool,
            ..Configuration::default()
        };
        let view = render_configuration(Some("page.jpg"), &config);
        assert!(view.contains("● 3. High School (9-12)"));
        assert!(view.contains("○ 1. Elementary (K-5)"));
        assert!(view.contains("● similar"));
        assert!(view.contains("● pencil"));
    }

    #[test]
    fn test_results_view_footnotes_only_when_present() {
        let cards = vec![QuestionCard::new(0)];
        let without = render_results(&analysis(Vec::new()), GradeLevel::Elementary, &cards);
        assert!(without.contains("Elementary (K-5) Level Practice Guide"));
        assert!(without.contains("Section 1 • Problem 1"));
        assert!(!without.contains("Research footnotes"));

        let with = render_results(
            &analysis(vec![GroundingSource {
                title: "Botany 101".to_string(),
                uri: "https://botany.example".to_string(),
            }]),
            GradeLevel::Elementary,
            &cards,
        );
        assert!(with.contains("[1] Botany 101 <https://botany.example>"));
    }
}
