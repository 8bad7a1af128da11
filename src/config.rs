use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// 默认配置文件名
const DEFAULT_CONFIG_FILE: &str = "workbook.toml";

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    // --- 内容服务配置 ---
    pub api_key: String,
    pub api_base_url: String,
    /// 页面分析使用的模型
    pub analysis_model: String,
    /// 插图生成使用的模型
    pub illustration_model: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    // --- 输出配置 ---
    /// 插图和练习册的输出目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            analysis_model: "gemini-3-pro-preview".to_string(),
            illustration_model: "gemini-2.5-flash-image".to_string(),
            request_timeout_secs: 120,
            output_dir: "workbooks".to_string(),
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件（所有字段可选）
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_key: Option<String>,
    api_base_url: Option<String>,
    analysis_model: Option<String>,
    illustration_model: Option<String>,
    request_timeout_secs: Option<u64>,
    output_dir: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 加载配置：默认值 → 配置文件 → 环境变量
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let file_path = std::env::var("WORKBOOK_CONFIG").ok().or_else(|| {
            Path::new(DEFAULT_CONFIG_FILE)
                .exists()
                .then(|| DEFAULT_CONFIG_FILE.to_string())
        });
        if let Some(path) = file_path {
            config = config.merge_file(&path)?;
        }

        config.apply_env()
    }

    /// 只从环境变量加载（不读取配置文件）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// 合并 TOML 配置文件
    pub fn merge_file(self, path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.to_string(),
            source,
        })?;
        self.merge_toml(&content, path)
    }

    fn merge_toml(self, content: &str, path: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })?;

        Ok(Self {
            api_key: file.api_key.unwrap_or(self.api_key),
            api_base_url: file.api_base_url.unwrap_or(self.api_base_url),
            analysis_model: file.analysis_model.unwrap_or(self.analysis_model),
            illustration_model: file.illustration_model.unwrap_or(self.illustration_model),
            request_timeout_secs: file.request_timeout_secs.unwrap_or(self.request_timeout_secs),
            output_dir: file.output_dir.unwrap_or(self.output_dir),
            verbose_logging: file.verbose_logging.unwrap_or(self.verbose_logging),
        })
    }

    fn apply_env(self) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .unwrap_or(self.api_key),
            api_base_url: std::env::var("GEMINI_API_BASE_URL").unwrap_or(self.api_base_url),
            analysis_model: std::env::var("ANALYSIS_MODEL").unwrap_or(self.analysis_model),
            illustration_model: std::env::var("ILLUSTRATION_MODEL").unwrap_or(self.illustration_model),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", "u64")?.unwrap_or(self.request_timeout_secs),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
        })
    }

    /// 校验必填项
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}

/// 解析可选的环境变量，存在但无法解析时报错
fn parse_env<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
