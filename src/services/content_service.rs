//! 内容服务 - 业务能力层
//!
//! 只负责"分析课本页面"和"生成插图"两种能力，不关心流程
//!
//! ## 技术栈
//! - 通过 `GeminiClient` 调用 `generateContent`
//! - 分析请求启用 Google 搜索检索，并要求按 JSON Schema 返回
//! - 插图请求只要求返回一张 1:1 图片

use std::collections::HashSet;

use async_trait::async_trait;
use phf::phf_map;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, error, info, warn};

use crate::clients::gemini_types::{
    Content, GenerateContentRequest, GenerationConfig, ImageConfig, Part, Tool,
};
use crate::clients::GeminiClient;
use crate::config::Config;
use crate::error::{AppError, AppResult, ProviderError};
use crate::models::{
    AnalysisResult, DifficultyLevel, GradeLevel, GroundingSource, Illustration, IllustrationState,
    IllustrationStyle, PendingImage, Question, QuestionKind,
};
use crate::utils::logging::truncate_text;

/// 每次分析至少需要的题目数量
pub const MIN_QUESTIONS: usize = 10;

/// 上传图片在请求中声明的类型
const UPLOAD_MIME_TYPE: &str = "image/jpeg";

const PENCIL_DESCRIPTOR: &str =
    "Clear, professional pencil sketch on paper, technical drawing style for textbooks.";

/// 插图风格 → 风格描述
static STYLE_DESCRIPTORS: phf::Map<&'static str, &'static str> = phf_map! {
    "pencil" => PENCIL_DESCRIPTOR,
    "watercolor" => "Artistic watercolor wash, soft edges, educational illustration style. Minimalist.",
    "chalkboard" => "Chalk on blackboard drawing, dusty textures, educational diagram style.",
    "crayon" => "Crayon drawing, waxy texture, bright colors, friendly educational sketch.",
};

/// 查找风格描述，未知风格回退到铅笔素描
pub fn style_descriptor(style: &str) -> &'static str {
    STYLE_DESCRIPTORS.get(style).copied().unwrap_or(PENCIL_DESCRIPTOR)
}

/// 内容提供方
///
/// 工作流只依赖这个 trait，测试时可以替换为内存实现
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// 分析课本页面，生成练习题
    async fn analyze(
        &self,
        image: &PendingImage,
        grade: GradeLevel,
        difficulty: DifficultyLevel,
    ) -> AppResult<AnalysisResult>;

    /// 为一道题生成插图
    async fn generate_illustration(&self, prompt: &str, style: IllustrationStyle) -> AppResult<Illustration>;
}

/// 基于 Gemini 的内容服务
///
/// 职责：
/// - 构建提示词和请求结构
/// - 校验并解析模型返回的内容
/// - 不持有任何会话状态，不做重试
pub struct GeminiContentService {
    client: GeminiClient,
    analysis_model: String,
    illustration_model: String,
}

impl GeminiContentService {
    /// 创建新的内容服务
    ///
    /// HTTP 客户端构建失败属于启动错误，直接返回 `ProviderError`
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let client = GeminiClient::new(config)?;
        Ok(Self::with_client(
            client,
            config.analysis_model.clone(),
            config.illustration_model.clone(),
        ))
    }

    /// 使用现成的客户端创建
    pub fn with_client(
        client: GeminiClient,
        analysis_model: impl Into<String>,
        illustration_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            analysis_model: analysis_model.into(),
            illustration_model: illustration_model.into(),
        }
    }

    async fn request_analysis(
        &self,
        image: &PendingImage,
        grade: GradeLevel,
        difficulty: DifficultyLevel,
    ) -> Result<AnalysisResult, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::inline(UPLOAD_MIME_TYPE, image.data.clone()),
                Part::text(build_analysis_prompt(grade, difficulty)),
            ])],
            tools: Some(vec![Tool::google_search()]),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(analysis_schema()),
                ..Default::default()
            }),
        };

        let response = self.client.generate_content(&self.analysis_model, &request).await?;
        let text = response
            .text()
            .ok_or_else(|| ProviderError::MalformedPayload("响应中没有文本内容".to_string()))?;
        debug!("分析响应: {}", truncate_text(&text, 200));

        parse_analysis(&text, response.grounding_sources(), chrono::Utc::now().timestamp_millis())
    }

    async fn request_illustration(&self, prompt: &str, style: IllustrationStyle) -> Result<Illustration, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(build_illustration_prompt(
                prompt,
                style.as_str(),
            ))])],
            tools: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                image_config: Some(ImageConfig {
                    aspect_ratio: "1:1".to_string(),
                }),
                ..Default::default()
            }),
        };

        let response = self
            .client
            .generate_content(&self.illustration_model, &request)
            .await?;

        let inline = response.first_inline_data().ok_or(ProviderError::MissingImage)?;
        Ok(Illustration::new(inline.mime_type.clone(), inline.data.clone()))
    }
}

#[async_trait]
impl ContentProvider for GeminiContentService {
    async fn analyze(
        &self,
        image: &PendingImage,
        grade: GradeLevel,
        difficulty: DifficultyLevel,
    ) -> AppResult<AnalysisResult> {
        info!(
            "🔍 正在分析课本页面: {} ({} 字节, 年级: {}, 难度: {})",
            image.file_name,
            image.encoded_len(),
            grade,
            difficulty
        );

        self.request_analysis(image, grade, difficulty).await.map_err(|e| {
            error!("页面分析失败: {}", e);
            AppError::content_generation_failed(e)
        })
    }

    async fn generate_illustration(&self, prompt: &str, style: IllustrationStyle) -> AppResult<Illustration> {
        debug!("生成插图 (风格: {}): {}", style, truncate_text(prompt, 80));

        self.request_illustration(prompt, style)
            .await
            .map_err(AppError::illustration_failed)
    }
}

// ========== 提示词 ==========

/// 构建分析提示词
pub fn build_analysis_prompt(grade: GradeLevel, difficulty: DifficultyLevel) -> String {
    format!(
        r#"You are a world-class educational curriculum researcher and textbook author.
Step 1: Use Google Search to research common {grade} level curriculum standards and typical question formats for the topic shown in this textbook page.
Step 2: Generate AT LEAST {min} high-quality practice questions that look and feel like they belong in a professional {grade} textbook.

Difficulty Context: {context}.
Grade Level: {grade}.

The questions should vary in type (Multiple Choice, True/False, and Short Answer).
Multiple Choice questions must list their options, and the correctAnswer must be copied exactly from one option.
True/False questions must use exactly "True" or "False" as the correctAnswer.

For EACH question, provide an "illustrationPrompt" for a simple, clear educational diagram or sketch that supports visual learning.

Return the result strictly in JSON format."#,
        grade = grade.as_str(),
        min = MIN_QUESTIONS,
        context = difficulty.context(),
    )
}

/// 构建插图提示词
pub fn build_illustration_prompt(prompt: &str, style: &str) -> String {
    format!(
        "Style: {} Content: {}. No text in image.",
        style_descriptor(style),
        prompt.trim().trim_end_matches('.')
    )
}

/// 分析结果的 JSON Schema
pub fn analysis_schema() -> JsonValue {
    json!({
        "type": "OBJECT",
        "properties": {
            "subject": { "type": "STRING" },
            "topic": { "type": "STRING" },
            "summary": { "type": "STRING" },
            "funFact": { "type": "STRING" },
            "questions": {
                "type": "ARRAY",
                "minItems": MIN_QUESTIONS,
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "text": { "type": "STRING" },
                        "type": { "type": "STRING", "enum": ["multiple-choice", "short-answer", "true-false"] },
                        "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "correctAnswer": { "type": "STRING" },
                        "explanation": { "type": "STRING" },
                        "illustrationPrompt": { "type": "STRING", "description": "Description for a pedagogical sketch." }
                    },
                    "required": ["text", "type", "correctAnswer", "explanation", "illustrationPrompt"]
                }
            }
        },
        "required": ["subject", "topic", "summary", "funFact", "questions"]
    })
}

// ========== 响应解析 ==========

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    subject: String,
    topic: String,
    summary: String,
    fun_fact: String,
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(default)]
    id: Option<String>,
    text: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    correct_answer: String,
    explanation: String,
    illustration_prompt: String,
}

/// 去掉模型偶尔包裹在外面的 Markdown 代码块
fn strip_code_fence(text: &str) -> Result<&str, ProviderError> {
    let re = Regex::new(r"(?s)^\s*```(?:json|JSON)?\s*(.*?)\s*```\s*$")
        .map_err(|e| ProviderError::MalformedPayload(e.to_string()))?;
    Ok(re
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text))
}

/// 解析并校验分析结果
///
/// # 参数
/// - `text`: 模型返回的文本
/// - `sources`: 检索来源
/// - `id_seed`: 生成缺失题目ID用的时间戳（毫秒）
pub fn parse_analysis(
    text: &str,
    sources: Vec<GroundingSource>,
    id_seed: i64,
) -> Result<AnalysisResult, ProviderError> {
    let body = strip_code_fence(text)?;
    let raw: RawAnalysis =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedPayload(e.to_string()))?;

    if raw.questions.len() < MIN_QUESTIONS {
        return Err(ProviderError::MalformedPayload(format!(
            "题目数量不足: {} < {}",
            raw.questions.len(),
            MIN_QUESTIONS
        )));
    }

    // 模型给出的ID都先占位，生成的ID不能与其中任何一个相同
    let reserved: HashSet<String> = raw
        .questions
        .iter()
        .filter_map(|q| q.id.as_deref())
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();

    let mut seen_ids = HashSet::new();
    let mut questions = Vec::with_capacity(raw.questions.len());
    for (index, raw_question) in raw.questions.into_iter().enumerate() {
        let question = convert_question(raw_question, index, id_seed, &reserved, &seen_ids)?;
        seen_ids.insert(question.id.clone());
        questions.push(question);
    }

    Ok(AnalysisResult {
        subject: raw.subject,
        topic: raw.topic,
        summary: raw.summary,
        fun_fact: raw.fun_fact,
        questions,
        sources,
    })
}

fn convert_question(
    raw: RawQuestion,
    index: usize,
    id_seed: i64,
    reserved: &HashSet<String>,
    seen_ids: &HashSet<String>,
) -> Result<Question, ProviderError> {
    let kind = match raw.kind.trim() {
        "multiple-choice" => {
            let options: Vec<String> = raw
                .options
                .unwrap_or_default()
                .into_iter()
                .filter(|o| !o.trim().is_empty())
                .collect();
            if options.len() < 2 {
                return Err(ProviderError::MalformedPayload(format!(
                    "第 {} 题是选择题但选项不足",
                    index + 1
                )));
            }
            if !options.contains(&raw.correct_answer) {
                warn!(
                    "第 {} 题的正确答案不在选项中: {}",
                    index + 1,
                    truncate_text(&raw.correct_answer, 40)
                );
            }
            QuestionKind::MultipleChoice { options }
        }
        "true-false" => QuestionKind::TrueFalse,
        "short-answer" => QuestionKind::ShortAnswer,
        other => {
            return Err(ProviderError::MalformedPayload(format!(
                "第 {} 题题型未知: {}",
                index + 1,
                other
            )))
        }
    };

    let id = match raw.id.map(|id| id.trim().to_string()) {
        Some(id) if !id.is_empty() && !seen_ids.contains(&id) => id,
        _ => generate_id(id_seed, index, |candidate| {
            reserved.contains(candidate) || seen_ids.contains(candidate)
        }),
    };

    Ok(Question {
        id,
        text: raw.text,
        kind,
        correct_answer: raw.correct_answer,
        explanation: raw.explanation,
        illustration_prompt: raw.illustration_prompt,
        illustration: IllustrationState::Pending,
    })
}

/// 生成 `q-<seed>-<index>`，被占用时追加序号
fn generate_id(id_seed: i64, index: usize, taken: impl Fn(&str) -> bool) -> String {
    let base = format!("q-{}-{}", id_seed, index);
    let mut candidate = base.clone();
    let mut suffix = 1;
    while taken(&candidate) {
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造一份合法的分析响应
    fn sample_payload(count: usize) -> JsonValue {
        let questions: Vec<JsonValue> = (0..count)
            .map(|i| match i % 3 {
                0 => json!({
                    "id": format!("mc-{}", i),
                    "text": "Which city is the capital of France?",
                    "type": "multiple-choice",
                    "options": ["Paris", "Lyon", "Nice"],
                    "correctAnswer": "Paris",
                    "explanation": "Paris is the capital.",
                    "illustrationPrompt": "Map of France"
                }),
                1 => json!({
                    "text": "The Seine flows through Paris.",
                    "type": "true-false",
                    "correctAnswer": "True",
                    "explanation": "It does.",
                    "illustrationPrompt": "River through a city"
                }),
                _ => json!({
                    "id": "",
                    "text": "Name the capital of France.",
                    "type": "short-answer",
                    "options": ["ignored"],
                    "correctAnswer": "Paris",
                    "explanation": "Paris.",
                    "illustrationPrompt": "Eiffel tower"
                }),
            })
            .collect();

        json!({
            "subject": "Geography",
            "topic": "Capitals of Europe",
            "summary": "A page about European capitals.",
            "funFact": "Paris was once called Lutetia.",
            "questions": questions
        })
    }

    #[test]
    fn test_parse_valid_payload() {
        let text = sample_payload(10).to_string();
        let sources = vec![GroundingSource {
            title: "Curriculum".to_string(),
            uri: "https://example.org".to_string(),
        }];

        let result = parse_analysis(&text, sources.clone(), 42).unwrap();

        assert_eq!(result.questions.len(), 10);
        assert_eq!(result.topic, "Capitals of Europe");
        assert_eq!(result.fun_fact, "Paris was once called Lutetia.");
        assert_eq!(result.sources, sources);
        assert!(result.questions.iter().all(|q| q.is_generating_image()));
        assert_eq!(result.questions[0].id, "mc-0");
        assert_eq!(result.questions[1].id, "q-42-1");
        assert_eq!(result.questions[2].id, "q-42-2");
        assert_eq!(result.questions[2].kind, QuestionKind::ShortAnswer);
    }

    #[test]
    fn test_parse_fenced_payload() {
        let text = format!("```json\n{}\n```", sample_payload(12));
        assert_eq!(parse_analysis(&text, Vec::new(), 1).unwrap().questions.len(), 12);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_analysis("Sorry, I cannot read this page.", Vec::new(), 1).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedPayload(_)));
    }

    #[test]
    fn test_parse_rejects_too_few_questions() {
        let text = sample_payload(9).to_string();
        assert!(matches!(
            parse_analysis(&text, Vec::new(), 1),
            Err(ProviderError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_parse_rejects_multiple_choice_without_options() {
        let mut payload = sample_payload(10);
        payload["questions"][0]
            .as_object_mut()
            .unwrap()
            .remove("options");
        assert!(parse_analysis(&payload.to_string(), Vec::new(), 1).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let mut payload = sample_payload(10);
        payload["questions"][4]["type"] = json!("essay");
        assert!(parse_analysis(&payload.to_string(), Vec::new(), 1).is_err());
    }

    #[test]
    fn test_duplicate_ids_are_replaced() {
        let mut payload = sample_payload(10);
        payload["questions"][3]["id"] = json!("mc-0");
        let result = parse_analysis(&payload.to_string(), Vec::new(), 7).unwrap();
        assert_eq!(result.questions[0].id, "mc-0");
        assert_eq!(result.questions[3].id, "q-7-3");
    }

    #[test]
    fn test_generated_id_avoids_provider_ids() {
        let mut payload = sample_payload(10);
        payload["questions"][0]["id"] = json!("q-7-5");
        payload["questions"][5]
            .as_object_mut()
            .unwrap()
            .remove("id");
        payload["questions"][6]["id"] = json!("q-7-5-1");

        let result = parse_analysis(&payload.to_string(), Vec::new(), 7).unwrap();
        assert_eq!(result.questions[0].id, "q-7-5");
        assert_eq!(result.questions[5].id, "q-7-5-2");
        assert_eq!(result.questions[6].id, "q-7-5-1");

        let ids: HashSet<&str> = result.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), result.questions.len());
    }

    #[test]
    fn test_new_keeps_client_errors_out_of_analysis_failures() {
        let config = Config {
            api_key: "key".to_string(),
            ..Config::default()
        };
        let service: Result<GeminiContentService, ProviderError> = GeminiContentService::new(&config);
        assert!(service.is_ok());
    }

    #[test]
    fn test_style_descriptor_fallback() {
        assert!(style_descriptor("watercolor").contains("watercolor"));
        assert!(style_descriptor("chalkboard").contains("blackboard"));
        assert!(style_descriptor("crayon").contains("Crayon"));
        assert_eq!(style_descriptor("oil-painting"), style_descriptor("pencil"));
    }

    #[test]
    fn test_illustration_prompt_forbids_text() {
        let prompt = build_illustration_prompt("A plant cell with labelled parts.", "crayon");
        assert!(prompt.starts_with("Style: Crayon drawing"));
        assert!(prompt.contains("Content: A plant cell with labelled parts."));
        assert!(prompt.ends_with("No text in image."));
    }

    #[test]
    fn test_analysis_prompt_embeds_grade_and_difficulty() {
        let prompt = build_analysis_prompt(GradeLevel::HighSchool, DifficultyLevel::Harder);
        assert!(prompt.contains("High School (9-12)"));
        assert!(prompt.contains("Advanced/Critical Thinking"));
        assert!(prompt.contains("AT LEAST 10"));
    }

    #[test]
    fn test_schema_requires_ten_questions() {
        let schema = analysis_schema();
        assert_eq!(schema["properties"]["questions"]["minItems"], 10);
        assert_eq!(schema["required"].as_array().unwrap().len(), 5);
    }
}
