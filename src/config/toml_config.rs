use crate::adapters::gemini::{DEFAULT_AI_ENDPOINT, DEFAULT_AI_MODEL};
use crate::adapters::geocoding::DEFAULT_GEOCODING_ENDPOINT;
use crate::adapters::style_document::DEFAULT_STYLE_URL;
use crate::core::render::RenderSettings;
use crate::utils::error::{Result, SalesMapError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MAPBOX_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";
pub const AI_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mapbox: MapboxConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub project: ProjectDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapboxConfig {
    pub access_token: Option<String>,
    pub geocoding_endpoint: String,
    pub country: String,
    pub style: String,
}

impl Default for MapboxConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            geocoding_endpoint: DEFAULT_GEOCODING_ENDPOINT.to_string(),
            country: "tw".to_string(),
            style: DEFAULT_STYLE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub endpoint: String,
    pub model: String,
    /// 可留空；沒有金鑰時改用示意設施
    pub api_key: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_AI_ENDPOINT.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub zoom: f64,
    pub base_radius_px: f64,
    pub reference_zoom: f64,
    pub max_zoom: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let settings = RenderSettings::default();
        Self {
            zoom: settings.zoom,
            base_radius_px: settings.base_radius_px,
            reference_zoom: settings.reference_zoom,
            max_zoom: settings.max_zoom,
        }
    }
}

impl From<&RenderConfig> for RenderSettings {
    fn from(config: &RenderConfig) -> Self {
        Self {
            zoom: config.zoom,
            base_radius_px: config.base_radius_px,
            reference_zoom: config.reference_zoom,
            max_zoom: config.max_zoom,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub html: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
            html: true,
        }
    }
}

/// 表單的初始值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDefaults {
    pub name: Option<String>,
    pub address: Option<String>,
    pub ring_option: Option<String>,
    pub poi_count: usize,
}

impl Default for ProjectDefaults {
    fn default() -> Self {
        Self {
            name: None,
            address: None,
            ring_option: None,
            poi_count: 4,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SalesMapError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SalesMapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MAPBOX_ACCESS_TOKEN})，找不到的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SalesMapError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 設定檔沒給的金鑰改從環境變數取得
    pub fn apply_env(&mut self) {
        let missing = |value: &Option<String>| {
            value
                .as_deref()
                .map(|v| v.trim().is_empty() || validation::is_unresolved_placeholder(v))
                .unwrap_or(true)
        };

        if missing(&self.mapbox.access_token) {
            if let Ok(token) = std::env::var(MAPBOX_TOKEN_ENV) {
                self.mapbox.access_token = Some(token);
            }
        }
        if missing(&self.ai.api_key) {
            if let Ok(key) = std::env::var(AI_KEY_ENV) {
                self.ai.api_key = Some(key);
            }
        }
    }

    pub fn access_token(&self) -> Result<&str> {
        validation::validate_required_secret("mapbox.access_token", &self.mapbox.access_token)
    }

    /// 空字串與未替換的 `${VAR}` 都當作沒有金鑰
    pub fn ai_credential(&self) -> Option<&str> {
        self.ai
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !validation::is_unresolved_placeholder(k))
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings::from(&self.render)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        self.access_token()?;

        validation::validate_url("mapbox.geocoding_endpoint", &self.mapbox.geocoding_endpoint)?;
        validation::validate_non_empty_string("mapbox.country", &self.mapbox.country)?;
        validation::validate_non_empty_string("mapbox.style", &self.mapbox.style)?;
        validation::validate_url("ai.endpoint", &self.ai.endpoint)?;
        validation::validate_non_empty_string("ai.model", &self.ai.model)?;

        validation::validate_range("render.zoom", self.render.zoom, 0.0, 22.0)?;
        validation::validate_range("render.reference_zoom", self.render.reference_zoom, 0.0, 22.0)?;
        validation::validate_range("render.max_zoom", self.render.max_zoom, 0.0, 24.0)?;
        if self.render.max_zoom <= self.render.reference_zoom {
            return Err(SalesMapError::InvalidConfigValueError {
                field: "render.max_zoom".to_string(),
                value: self.render.max_zoom.to_string(),
                reason: "must be greater than render.reference_zoom".to_string(),
            });
        }
        if self.render.base_radius_px.is_nan() || self.render.base_radius_px <= 0.0 {
            return Err(SalesMapError::InvalidConfigValueError {
                field: "render.base_radius_px".to_string(),
                value: self.render.base_radius_px.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_positive_number("project.poi_count", self.project.poi_count, 1)?;

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
