use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesMapError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Address not found: {address}")]
    AddressNotFound { address: String },

    #[error("Geocoding error: {message}")]
    GeocodingError { message: String },

    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    #[error("AI generation error: {message}")]
    AiGenerationError { message: String },

    #[error("Render error: {message}")]
    RenderError { message: String },
}

pub type Result<T> = std::result::Result<T, SalesMapError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Lookup,
    Generation,
    Rendering,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SalesMapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::ApiError(_) | Self::GeocodingError { .. } => ErrorCategory::Network,
            Self::AddressNotFound { .. } | Self::InvalidCoordinate { .. } => ErrorCategory::Lookup,
            Self::AiGenerationError { .. } => ErrorCategory::Generation,
            Self::RenderError { .. } => ErrorCategory::Rendering,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    /// 缺少設定是唯一會終止整個程式的錯誤
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingConfigError { .. } => ErrorSeverity::Critical,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. }
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::RenderError { .. } => ErrorSeverity::High,
            Self::ApiError(_)
            | Self::GeocodingError { .. }
            | Self::AddressNotFound { .. }
            | Self::InvalidCoordinate { .. } => ErrorSeverity::Medium,
            Self::AiGenerationError { .. } => ErrorSeverity::Low,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingConfigError { field } => format!("缺少必要設定：{}", field),
            Self::ConfigError { message } => format!("設定錯誤：{}", message),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("設定值 {} 無效：{}", field, reason)
            }
            Self::ConfigValidationError { field, message } => {
                format!("設定檔 {} 驗證失敗：{}", field, message)
            }
            Self::AddressNotFound { address } => format!("找不到地址：{}", address),
            Self::GeocodingError { message } => format!("地址查詢失敗：{}", message),
            Self::InvalidCoordinate { message } => format!("座標無效：{}", message),
            Self::AiGenerationError { message } => format!("AI 生成錯誤：{}", message),
            Self::ApiError(e) => format!("網路請求失敗：{}", e),
            Self::RenderError { message } => format!("地圖繪製失敗：{}", message),
            Self::IoError(e) => format!("檔案讀寫失敗：{}", e),
            Self::SerializationError(e) => format!("資料格式錯誤：{}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::MissingConfigError { field } if field.contains("access_token") => {
                "請設定 MAPBOX_ACCESS_TOKEN 環境變數，或在設定檔 [mapbox] access_token 填入 token"
                    .to_string()
            }
            Self::MissingConfigError { field } => format!("請在設定檔或命令列補上 {}", field),
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => "請檢查設定檔內容與命令列參數".to_string(),
            Self::AddressNotFound { .. } => "請確認地址是否完整（含縣市、路名與門牌）".to_string(),
            Self::InvalidCoordinate { .. } => {
                "經度需介於 -180 與 180，緯度需介於 -90 與 90".to_string()
            }
            Self::GeocodingError { .. } | Self::ApiError(_) => {
                "請檢查網路連線與 Mapbox token 權限後再試一次".to_string()
            }
            Self::AiGenerationError { .. } => {
                "請確認 AI 金鑰是否有效；系統已改用示意資料".to_string()
            }
            Self::RenderError { .. } => "請重新產生地圖".to_string(),
            Self::IoError(_) => "請確認輸出目錄存在且可寫入".to_string(),
            Self::SerializationError(_) => "請回報此問題並附上輸入資料".to_string(),
        }
    }
}
