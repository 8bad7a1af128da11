use thiserror::Error;

use crate::workflow::WorkflowStage;

/// 内容解析失败时展示给用户的提示
pub const UNREADABLE_PAGE_MESSAGE: &str =
    "The research engine found the material too complex or the photo was unclear. Please try again! 📸";

/// 网络或服务端错误时展示给用户的提示
pub const UNREACHABLE_PROVIDER_MESSAGE: &str =
    "We could not reach the research engine. Check your connection and try again! 🌐";

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 上传的不是图片，只在上传控件本地处理
    #[error("{reason}")]
    InputValidation { reason: String },

    /// 页面分析失败，整个会话重置
    #[error("{message}")]
    ContentGenerationFailed {
        message: String,
        #[source]
        source: ProviderError,
    },

    /// 单张插图生成失败，只影响对应题目
    #[error("插图生成失败: {source}")]
    IllustrationGenerationFailed {
        #[source]
        source: ProviderError,
    },

    /// 当前阶段不允许该操作
    #[error("当前阶段 {stage} 不允许执行操作: {action}")]
    InvalidTransition {
        action: &'static str,
        stage: WorkflowStage,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 文件读写错误
    #[error("文件错误 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 内容服务（模型 API）错误
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 网络请求失败
    #[error("请求 {endpoint} 失败: {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 服务端返回错误状态码
    #[error("{endpoint} 返回错误响应: status={status}, body={body}")]
    BadResponse {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// 响应中没有候选结果
    #[error("模型返回结果为空")]
    EmptyResponse,

    /// 响应内容不符合预期结构
    #[error("模型返回内容无法解析: {0}")]
    MalformedPayload(String),

    /// 插图响应中没有图片数据
    #[error("模型响应中没有图片数据")]
    MissingImage,
}

impl ProviderError {
    /// 是否属于网络/服务端层面的错误
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ProviderError::RequestFailed { .. } | ProviderError::BadResponse { .. }
        )
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少 API 密钥
    #[error("缺少内容服务的 API 密钥，请设置 GEMINI_API_KEY")]
    MissingApiKey,

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建输入校验错误
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        AppError::InputValidation {
            reason: reason.into(),
        }
    }

    /// 把分析请求的错误包装为面向用户的错误
    ///
    /// 网络错误和内容解析错误使用不同的提示
    pub fn content_generation_failed(source: ProviderError) -> Self {
        let message = if source.is_transport() {
            UNREACHABLE_PROVIDER_MESSAGE
        } else {
            UNREADABLE_PAGE_MESSAGE
        };
        AppError::ContentGenerationFailed {
            message: message.to_string(),
            source,
        }
    }

    /// 创建插图生成错误
    pub fn illustration_failed(source: ProviderError) -> Self {
        AppError::IllustrationGenerationFailed { source }
    }

    /// 创建文件错误
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
