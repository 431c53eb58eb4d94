use crate::config::{
    parse_date_arg, DEFAULT_EXCLUDE_AFTER, DEFAULT_SPLIT_DATE, DEFAULT_SPLIT_LABEL, DEFAULT_TITLE,
    INPUT_EXTENSIONS,
};
use crate::core::{ChartFormat, ConfigProvider, CsvColumns};
use crate::utils::error::{Result, TrendError};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
    pub date_column: Option<String>,
    pub views_column: Option<String>,
    pub article_column: Option<String>,
}

/// Dates are kept as `YYYY-MM-DD` strings and checked by `validate_config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub title: Option<String>,
    /// `false` fits a single trend over all months.
    pub split: Option<bool>,
    pub split_date: Option<String>,
    pub split_label: Option<String>,
    /// `false` skips the plot without outliers.
    pub exclude_outliers: Option<bool>,
    pub exclude_after: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TrendError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TrendError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| TrendError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_required("input.path", &self.input.path)?;
        validation::validate_required("output.path", &self.output.path)?;
        validation::validate_path("input.path", &self.input.path)?;
        validation::validate_file_extension("input.path", &self.input.path, &INPUT_EXTENSIONS)?;
        validation::validate_path("output.path", &self.output.path)?;

        for (field, column) in [
            ("input.date_column", &self.input.date_column),
            ("input.views_column", &self.input.views_column),
        ] {
            if let Some(column) = column {
                validation::validate_non_empty_string(field, column)?;
            }
        }

        if let Some(format) = &self.output.format {
            validation::validate_one_of("output.format", format, &ChartFormat::NAMES)?;
        }

        let split = Self::parse_optional_date("analysis.split_date", &self.analysis.split_date)?;
        let cutoff =
            Self::parse_optional_date("analysis.exclude_after", &self.analysis.exclude_after)?;
        validation::validate_date_order("analysis.exclude_after", split, cutoff)?;

        Ok(())
    }

    fn parse_optional_date(field: &str, value: &Option<String>) -> Result<Option<NaiveDate>> {
        value
            .as_deref()
            .map(|raw| {
                parse_date_arg(raw).map_err(|reason| TrendError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: raw.to_string(),
                    reason,
                })
            })
            .transpose()
    }

    /// 未經 `validate_config` 的壞日期會被忽略並記錄警告
    fn resolve_date(field: &str, raw: &str) -> Option<NaiveDate> {
        match parse_date_arg(raw) {
            Ok(date) => Some(date),
            Err(reason) => {
                tracing::warn!("⚠️ Ignoring {} = '{}': {}", field, raw, reason);
                None
            }
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn columns(&self) -> CsvColumns {
        let defaults = CsvColumns::default();
        CsvColumns {
            date: self.input.date_column.clone().unwrap_or(defaults.date),
            views: self.input.views_column.clone().unwrap_or(defaults.views),
            article: match &self.input.article_column {
                Some(column) if column.trim().is_empty() => None,
                Some(column) => Some(column.clone()),
                None => defaults.article,
            },
        }
    }

    fn split_date(&self) -> Option<NaiveDate> {
        if !self.analysis.split.unwrap_or(true) {
            return None;
        }
        let raw = self
            .analysis
            .split_date
            .as_deref()
            .unwrap_or(DEFAULT_SPLIT_DATE);
        Self::resolve_date("analysis.split_date", raw)
    }

    fn split_label(&self) -> &str {
        self.analysis
            .split_label
            .as_deref()
            .unwrap_or(DEFAULT_SPLIT_LABEL)
    }

    fn exclude_after(&self) -> Option<NaiveDate> {
        if !self.analysis.exclude_outliers.unwrap_or(true) {
            return None;
        }
        let raw = self
            .analysis
            .exclude_after
            .as_deref()
            .unwrap_or(DEFAULT_EXCLUDE_AFTER);
        Self::resolve_date("analysis.exclude_after", raw)
    }

    fn chart_format(&self) -> ChartFormat {
        self.output
            .format
            .as_deref()
            .and_then(|f| f.parse().ok())
            .unwrap_or_default()
    }

    fn title(&self) -> &str {
        self.analysis.title.as_deref().unwrap_or(DEFAULT_TITLE)
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
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_content = r#"
[input]
path = "./data/terrorism_data.csv"

[output]
path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.split_date(), NaiveDate::from_ymd_opt(2013, 6, 6));
        assert_eq!(config.exclude_after(), NaiveDate::from_ymd_opt(2014, 6, 30));
        assert_eq!(config.title(), DEFAULT_TITLE);
        assert_eq!(config.chart_format(), ChartFormat::Png);
        assert_eq!(config.columns(), CsvColumns::default());
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[input]
path = "views.csv"
date_column = "day"
views_column = "count"
article_column = ""

[analysis]
title = "Snowden effect"
split = true
split_date = "2013-07-01"
split_label = "July 2013"
exclude_outliers = false

[output]
path = "./charts"
format = "svg"

[monitoring]
enabled = true
json_logs = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.split_date(), NaiveDate::from_ymd_opt(2013, 7, 1));
        assert_eq!(config.split_label(), "July 2013");
        assert_eq!(config.exclude_after(), None);
        assert_eq!(config.chart_format(), ChartFormat::Svg);
        assert_eq!(config.columns().date, "day");
        assert_eq!(config.columns().article, None);
        assert!(config.monitoring_enabled());
        assert!(config.json_logs());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PAGEVIEW_TEST_DATA_DIR", "/srv/data");

        let toml_content = r#"
[input]
path = "${PAGEVIEW_TEST_DATA_DIR}/views.csv"

[output]
path = "${PAGEVIEW_TEST_UNSET_DIR}/out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input.path, "/srv/data/views.csv");
        assert_eq!(config.output.path, "${PAGEVIEW_TEST_UNSET_DIR}/out");

        std::env::remove_var("PAGEVIEW_TEST_DATA_DIR");
    }

    #[test]
    fn test_config_validation() {
        let bad_format = r#"
[input]
path = "views.csv"

[output]
path = "./output"
format = "gif"
"#;
        let config = TomlConfig::from_toml_str(bad_format).unwrap();
        assert!(config.validate().is_err());

        let bad_date = r#"
[input]
path = "views.csv"

[analysis]
split_date = "sometime in 2013"

[output]
path = "./output"
"#;
        let config = TomlConfig::from_toml_str(bad_date).unwrap();
        assert!(matches!(
            config.validate(),
            Err(TrendError::InvalidConfigValueError { .. })
        ));
        // 跳過驗證時壞日期等同於不切割，截止日仍使用預設值
        assert_eq!(config.split_date(), None);
        assert_eq!(config.exclude_after(), NaiveDate::from_ymd_opt(2014, 6, 30));

        let empty_path = r#"
[input]
path = ""

[output]
path = "./output"
"#;
        let config = TomlConfig::from_toml_str(empty_path).unwrap();
        match config.validate() {
            Err(TrendError::MissingConfigError { field }) => assert_eq!(field, "input.path"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let result = TomlConfig::from_toml_str("[input]\npath = \"views.csv\"\n");
        assert!(matches!(
            result,
            Err(TrendError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[input]
path = "file.csv"

[output]
path = "./output"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.input.path, "file.csv");
    }
}
