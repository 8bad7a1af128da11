use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// 题型
///
/// 只有选择题携带选项，渲染和判分时都必须穷尽匹配
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    /// 选择题
    MultipleChoice { options: Vec<String> },
    /// 判断题
    TrueFalse,
    /// 简答题
    ShortAnswer,
}

impl QuestionKind {
    /// 判断题的两个固定选项
    pub const TRUE_FALSE_OPTIONS: [&'static str; 2] = ["True", "False"];

    /// 模型返回的题型字面量
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "multiple-choice",
            QuestionKind::TrueFalse => "true-false",
            QuestionKind::ShortAnswer => "short-answer",
        }
    }

    /// 界面上显示的题型名称
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "multiple choice",
            QuestionKind::TrueFalse => "true false",
            QuestionKind::ShortAnswer => "short answer",
        }
    }
}

/// 选项序号 → 字母（A, B, C...）
pub fn option_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// 生成好的插图
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Illustration {
    pub mime_type: String,
    /// base64 编码的图片数据
    pub data: String,
}

impl Illustration {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// 生成 data URL，方便网页端直接使用
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// 解码为原始字节
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.data.as_bytes())
    }

    /// 根据 MIME 类型推断文件扩展名
    pub fn file_extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// 插图状态
///
/// 任一时刻只处于一种状态，不存在"生成中但已有图片"的情况
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IllustrationState {
    /// 请求已发出，尚未返回
    #[default]
    Pending,
    /// 已生成
    Ready(Illustration),
    /// 生成失败，显示占位图
    Unavailable,
}

/// 练习题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// 题目ID（会话内唯一）
    pub id: String,
    /// 题干
    pub text: String,
    pub kind: QuestionKind,
    pub correct_answer: String,
    pub explanation: String,
    /// 用于生成插图的描述
    pub illustration_prompt: String,
    pub illustration: IllustrationState,
}

impl Question {
    /// 插图是否仍在生成
    pub fn is_generating_image(&self) -> bool {
        matches!(self.illustration, IllustrationState::Pending)
    }

    /// 已生成的插图
    pub fn image(&self) -> Option<&Illustration> {
        match &self.illustration {
            IllustrationState::Ready(image) => Some(image),
            _ => None,
        }
    }

    /// 选择题的选项；判断题返回固定的 True/False
    pub fn choices(&self) -> Vec<&str> {
        match &self.kind {
            QuestionKind::MultipleChoice { options } => options.iter().map(String::as_str).collect(),
            QuestionKind::TrueFalse => QuestionKind::TRUE_FALSE_OPTIONS.to_vec(),
            QuestionKind::ShortAnswer => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(kind: QuestionKind) -> Question {
        Question {
            id: "q-1".to_string(),
            text: "What is the capital of France?".to_string(),
            kind,
            correct_answer: "Paris".to_string(),
            explanation: "Paris has been the capital since 987.".to_string(),
            illustration_prompt: "A map of France".to_string(),
            illustration: IllustrationState::Pending,
        }
    }

    #[test]
    fn test_illustration_state_accessors() {
        let mut q = question(QuestionKind::ShortAnswer);
        assert!(q.is_generating_image());
        assert!(q.image().is_none());

        q.illustration = IllustrationState::Ready(Illustration::new("image/png", "aGVsbG8="));
        assert!(!q.is_generating_image());
        assert_eq!(q.image().unwrap().decode().unwrap(), b"hello");

        q.illustration = IllustrationState::Unavailable;
        assert!(!q.is_generating_image());
        assert!(q.image().is_none());
    }

    #[test]
    fn test_choices_per_kind() {
        let mc = question(QuestionKind::MultipleChoice {
            options: vec!["Paris".to_string(), "Lyon".to_string()],
        });
        assert_eq!(mc.choices(), vec!["Paris", "Lyon"]);
        assert_eq!(question(QuestionKind::TrueFalse).choices(), vec!["True", "False"]);
        assert!(question(QuestionKind::ShortAnswer).choices().is_empty());
    }

    #[test]
    fn test_data_url_and_extension() {
        let image = Illustration::new("image/png", "AAAA");
        assert_eq!(image.data_url(), "data:image/png;base64,AAAA");
        assert_eq!(image.file_extension(), "png");
        assert_eq!(Illustration::new("image/jpeg", "").file_extension(), "jpg");
    }
}
