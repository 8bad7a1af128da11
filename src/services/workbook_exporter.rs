//! 练习册导出服务 - 业务能力层
//!
//! 只负责"把插图和练习册写到磁盘"能力，不关心流程

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::question::option_letter;
use crate::models::{AnalysisResult, GradeLevel, Illustration, IllustrationState, QuestionKind};

/// 练习册导出服务
///
/// 职责：
/// - 将生成好的插图保存为图片文件
/// - 将整本练习册导出为 Markdown（含答案页和参考来源）
///
/// 插图和 Markdown 写在同一目录，Markdown 用相对路径引用插图；
/// 每个练习册应通过 [`WorkbookExporter::for_session`] 使用自己的子目录
#[derive(Debug, Clone)]
pub struct WorkbookExporter {
    output_dir: PathBuf,
}

impl WorkbookExporter {
    /// 使用指定目录创建
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 返回写入 `output_dir/<folder>` 的导出服务
    pub fn for_session(&self, folder: impl AsRef<Path>) -> Self {
        Self::new(self.output_dir.join(folder))
    }

    /// 第 `index` 题（从0开始）插图的文件名
    pub fn figure_file_name(index: usize, illustration: &Illustration) -> String {
        format!("figure_{:02}.{}", index + 1, illustration.file_extension())
    }

    /// 保存一张插图
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub async fn save_figure(&self, index: usize, illustration: &Illustration) -> AppResult<PathBuf> {
        self.ensure_dir().await?;

        let path = self.output_dir.join(Self::figure_file_name(index, illustration));
        let bytes = illustration.decode().map_err(|e| {
            AppError::file(
                path.display().to_string(),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;

        fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::file(path.display().to_string(), e))?;

        debug!("插图已保存: {}", path.display());
        Ok(path)
    }

    /// 导出 Markdown 练习册
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub async fn export_markdown(&self, analysis: &AnalysisResult, grade: GradeLevel) -> AppResult<PathBuf> {
        self.ensure_dir().await?;

        let file_name = format!("workbook_{}.md", chrono::Local::now().format("%Y%m%d_%H%M%S"));
        let path = self.output_dir.join(file_name);

        fs::write(&path, render_markdown(analysis, grade))
            .await
            .map_err(|e| AppError::file(path.display().to_string(), e))?;

        debug!("练习册已导出: {}", path.display());
        Ok(path)
    }

    async fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::file(self.output_dir.display().to_string(), e))
    }
}

/// 渲染 Markdown 练习册
pub fn render_markdown(analysis: &AnalysisResult, grade: GradeLevel) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# {}\n", analysis.topic);
    let _ = writeln!(md, "*{} Level Practice Guide · {}*\n", grade, analysis.subject);
    let _ = writeln!(md, "{}\n", analysis.summary);
    let _ = writeln!(md, "> 💡 {}\n", analysis.fun_fact);

    for (index, question) in analysis.questions.iter().enumerate() {
        let _ = writeln!(
            md,
            "## Problem {} ({})\n",
            index + 1,
            question.kind.label()
        );
        if let IllustrationState::Ready(image) = &question.illustration {
            let _ = writeln!(
                md,
                "![Figure {}]({})\n",
                index + 1,
                WorkbookExporter::figure_file_name(index, image)
            );
        }
        let _ = writeln!(md, "{}\n", question.text);

        match &question.kind {
            QuestionKind::MultipleChoice { options } => {
                for (i, option) in options.iter().enumerate() {
                    let _ = writeln!(md, "- {}. {}", option_letter(i), option);
                }
                md.push('\n');
            }
            QuestionKind::TrueFalse => md.push_str("- True\n- False\n\n"),
            QuestionKind::ShortAnswer => md.push_str("Answer: ______________________\n\n"),
        }
    }

    md.push_str("---\n\n## Answer Key\n\n");
    for (index, question) in analysis.questions.iter().enumerate() {
        let _ = writeln!(
            md,
            "{}. **{}**: {}",
            index + 1,
            question.correct_answer,
            question.explanation
        );
    }

    if !analysis.sources.is_empty() {
        md.push_str("\n## Research Sources\n\n");
        for source in &analysis.sources {
            let _ = writeln!(md, "- [{}]({})", source.title, source.uri);
        }
    }

    md
}
