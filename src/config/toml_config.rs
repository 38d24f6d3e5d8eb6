use crate::adapters::HttpUserDirectory;
use crate::config::{CoordinatePickerConfig, CreateFormConfig, SearchSelectConfig, WidgetConfig};
use crate::utils::error::{Result, WidgetError};
use crate::utils::validation::{validate_required_field, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub search: SearchSelectConfig,
    #[serde(default)]
    pub create_form: CreateFormConfig,
    #[serde(default)]
    pub picker: CoordinatePickerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// 端點為相對路徑時的基底 URL
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(WidgetError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| WidgetError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CSRF_TOKEN})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| WidgetError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn widgets(&self) -> WidgetConfig {
        WidgetConfig {
            search: self.search.clone(),
            create_form: self.create_form.clone(),
            picker: self.picker.clone(),
        }
    }

    /// 依設定建立 HTTP 使用者目錄；端點為相對路徑時必須提供 base_url
    pub fn directory(&self) -> Result<HttpUserDirectory> {
        let relative = [&self.search.search_url, &self.search.create_url]
            .iter()
            .any(|endpoint| endpoint.starts_with('/'));
        let base_url = if relative {
            Some(validate_required_field("service.base_url", &self.service.base_url)?.as_str())
        } else {
            self.service.base_url.as_deref()
        };

        HttpUserDirectory::from_endpoints(
            base_url,
            &self.search.search_url,
            &self.search.create_url,
        )
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    /// 驗證配置的合理性 (token 只在建立使用者時檢查)
    pub fn validate_config(&self) -> Result<()> {
        if let Some(base_url) = &self.service.base_url {
            validate_url("service.base_url", base_url)?;
        }
        self.search.validate()?;
        self.picker.validate()?;

        if self.create_form.csrf_token.contains("${") {
            return Err(WidgetError::InvalidConfigValueError {
                field: "create_form.csrf_token".to_string(),
                value: self.create_form.csrf_token.clone(),
                reason: "Environment variable is not set".to_string(),
            });
        }
        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponseOrdering;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[service]
base_url = "https://crm.example.com"

[search]
min_chars = 3
debounce_delay_ms = 250
response_ordering = "latest_arrived"

[create_form]
csrf_token = "abc123"

[picker]
default_zoom = 12
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.search.min_chars, 3);
        assert_eq!(config.search.debounce_delay_ms, 250);
        assert_eq!(config.search.response_ordering, ResponseOrdering::LatestArrived);
        assert_eq!(config.search.placeholder_text, "Search user...");
        assert_eq!(config.create_form.csrf_token, "abc123");
        assert_eq!(config.picker.default_zoom, 12);
        assert_eq!(config.picker.default_lat, -17.8146);
        assert!(config.validate().is_ok());

        let directory = config.directory().unwrap();
        assert_eq!(
            directory.create_url().as_str(),
            "https://crm.example.com/sales/ajax/create-user/"
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_WIDGET_CSRF_TOKEN", "from-env");

        let toml_content = r#"
[create_form]
csrf_token = "${TEST_WIDGET_CSRF_TOKEN}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.create_form.csrf_token, "from-env");

        std::env::remove_var("TEST_WIDGET_CSRF_TOKEN");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let toml_content = r#"
[create_form]
csrf_token = "${TEST_WIDGET_TOKEN_NEVER_SET}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[service]
base_url = "ftp://crm.example.com"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[logging]
verbose = true

[search]
no_results_text = "Nothing here"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert!(config.verbose());
        assert!(!config.json_logs());
        assert_eq!(config.widgets().search.no_results_text, "Nothing here");
    }

    #[test]
    fn test_relative_endpoints_need_base_url() {
        let config = TomlConfig::default();
        let err = config.directory().unwrap_err();
        assert!(matches!(
            err,
            WidgetError::MissingConfigError { ref field } if field == "service.base_url"
        ));

        let absolute = TomlConfig::from_toml_str(
            r#"
[search]
search_url = "https://crm.example.com/users/search/"
create_url = "https://crm.example.com/users/create/"
"#,
        )
        .unwrap();
        let directory = absolute.directory().unwrap();
        assert_eq!(
            directory.search_url().as_str(),
            "https://crm.example.com/users/search/"
        );
    }
}
