use crate::utils::error::{Result, SalesMapError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SalesMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SalesMapError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SalesMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SalesMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SalesMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(SalesMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 缺值或仍是未替換的 `${VAR}` 都視為未設定
pub fn validate_required_secret<'a>(
    field_name: &str,
    value: &'a Option<String>,
) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() && !is_unresolved_placeholder(v) => Ok(v),
        _ => Err(SalesMapError::MissingConfigError {
            field: field_name.to_string(),
        }),
    }
}

pub fn is_unresolved_placeholder(value: &str) -> bool {
    value.starts_with("${") && value.ends_with('}')
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SalesMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SalesMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("mapbox.geocoding_endpoint", "https://api.mapbox.com").is_ok());
        assert!(validate_url("mapbox.geocoding_endpoint", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("mapbox.geocoding_endpoint", "").is_err());
        assert!(validate_url("mapbox.geocoding_endpoint", "invalid-url").is_err());
        assert!(validate_url("mapbox.geocoding_endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_required_secret() {
        assert_eq!(
            validate_required_secret("mapbox.access_token", &Some("pk.abc".to_string())).unwrap(),
            "pk.abc"
        );
        assert!(validate_required_secret("mapbox.access_token", &None).is_err());
        assert!(validate_required_secret("mapbox.access_token", &Some("  ".to_string())).is_err());
        assert!(validate_required_secret(
            "mapbox.access_token",
            &Some("${MAPBOX_ACCESS_TOKEN}".to_string())
        )
        .is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("render.zoom", 13.0, 0.0, 22.0).is_ok());
        assert!(validate_range("render.zoom", 23.0, 0.0, 22.0).is_err());
        assert!(validate_positive_number("project.poi_count", 0, 1).is_err());
    }
}
