use crate::utils::error::{Result, WidgetError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 端點可以是絕對 URL，也可以是同源的絕對路徑 (例如 `/sales/ajax/search-users/`)
pub fn validate_endpoint(field_name: &str, endpoint: &str) -> Result<()> {
    if endpoint.starts_with('/') && !endpoint.starts_with("//") {
        return Ok(());
    }
    validate_url(field_name, endpoint)
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(WidgetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(WidgetError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(WidgetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(WidgetError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| WidgetError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(WidgetError::InvalidConfigValueError {
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
        return Err(WidgetError::InvalidConfigValueError {
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
        assert!(validate_url("search_url", "https://example.com").is_ok());
        assert!(validate_url("search_url", "http://example.com").is_ok());
        assert!(validate_url("search_url", "").is_err());
        assert!(validate_url("search_url", "invalid-url").is_err());
        assert!(validate_url("search_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_endpoint_accepts_same_origin_paths() {
        assert!(validate_endpoint("search_url", "/sales/ajax/search-users/").is_ok());
        assert!(validate_endpoint("search_url", "//cdn.example.com/x").is_err());
        assert!(validate_endpoint("search_url", "relative/path").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("min_chars", 2, 1).is_ok());
        assert!(validate_positive_number("min_chars", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("default_lat", -17.8146, -90.0, 90.0).is_ok());
        assert!(validate_range("default_lat", 200.0, -90.0, 90.0).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let token: Option<String> = None;
        let err = validate_required_field("service.csrf_token", &token).unwrap_err();
        assert!(matches!(err, WidgetError::MissingConfigError { .. }));
    }
}
