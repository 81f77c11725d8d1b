use crate::utils::error::{MonitorError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Csv,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Json => "JSON",
            ReportFormat::Csv => "CSV",
        })
    }
}

/// Effective settings. Every field has a default; see [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub cost_limit_monthly: f64,
    /// Fraction of the monthly limit (0-1) at which alerts fire.
    pub alert_threshold: f64,
    pub currency: String,
    pub email_alerts: bool,
    pub report_format: Vec<ReportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sns_topic_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,
    /// Overrides the Cost Explorer endpoint (LocalStack, proxies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    pub output_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_timeout_seconds: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cost_limit_monthly: 100.0,
            alert_threshold: 0.8,
            currency: "USD".to_string(),
            email_alerts: false,
            report_format: vec![ReportFormat::Json, ReportFormat::Csv],
            sns_topic_arn: None,
            aws_region: None,
            endpoint_url: None,
            output_dir: "reports".to_string(),
            query_timeout_seconds: None,
        }
    }
}

/// What a settings file may contain. Absent fields keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub cost_limit_monthly: Option<f64>,
    pub alert_threshold: Option<f64>,
    pub currency: Option<String>,
    pub email_alerts: Option<bool>,
    pub report_format: Option<Vec<String>>,
    pub sns_topic_arn: Option<String>,
    pub aws_region: Option<String>,
    pub endpoint_url: Option<String>,
    pub output_dir: Option<String>,
    pub query_timeout_seconds: Option<u64>,
}

impl SettingsFile {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        serde_json::from_str(&processed).map_err(|e| MonitorError::ConfigValidationError {
            field: "json_parsing".to_string(),
            message: format!("JSON parsing error: {}", e),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| MonitorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Parses by extension: `.toml` as TOML, anything else as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| MonitorError::ConfigError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }
}

/// Replaces `${VAR}` with the environment value. Unknown variables are left as-is.
fn substitute_env_vars(content: &str) -> String {
    use regex::Regex;
    use std::sync::OnceLock;

    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
    });

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}

/// Keeps `value` when `check` accepts it, otherwise logs and keeps `current`.
fn merge_field<T>(current: &mut T, value: Option<T>, check: impl FnOnce(&T) -> Result<()>) {
    if let Some(value) = value {
        match check(&value) {
            Ok(()) => *current = value,
            Err(e) => tracing::warn!("⚠️  {}; keeping default", e),
        }
    }
}

impl Settings {
    /// Field-by-field merge of a parsed file over `self`. Invalid fields are
    /// rejected individually and never abort the merge.
    pub fn merge(mut self, file: SettingsFile) -> Self {
        merge_field(&mut self.cost_limit_monthly, file.cost_limit_monthly, |v| {
            validation::validate_non_negative_amount("cost_limit_monthly", *v)
        });
        merge_field(&mut self.alert_threshold, file.alert_threshold, |v| {
            validation::validate_range("alert_threshold", *v, 0.0, 1.0)
        });
        merge_field(&mut self.currency, file.currency, |v| {
            validation::validate_non_empty_string("currency", v)
        });
        merge_field(&mut self.email_alerts, file.email_alerts, |_| Ok(()));
        merge_field(&mut self.output_dir, file.output_dir, |v| {
            validation::validate_path("output_dir", v)
        });

        if let Some(formats) = file.report_format {
            let mut parsed = Vec::new();
            for raw in &formats {
                match ReportFormat::parse(raw) {
                    Some(format) if !parsed.contains(&format) => parsed.push(format),
                    Some(_) => {}
                    None => tracing::warn!("⚠️  Unknown report format '{}' ignored", raw),
                }
            }
            self.report_format = parsed;
        }

        merge_field(&mut self.sns_topic_arn, file.sns_topic_arn.map(Some), |v| {
            v.as_deref()
                .map_or(Ok(()), |arn| validation::validate_sns_topic_arn("sns_topic_arn", arn))
        });
        merge_field(&mut self.aws_region, file.aws_region.map(Some), |v| {
            v.as_deref()
                .map_or(Ok(()), |region| validation::validate_non_empty_string("aws_region", region))
        });
        merge_field(&mut self.endpoint_url, file.endpoint_url.map(Some), |v| {
            v.as_deref()
                .map_or(Ok(()), |url| validation::validate_url("endpoint_url", url))
        });
        merge_field(
            &mut self.query_timeout_seconds,
            file.query_timeout_seconds.map(Some),
            |v| {
                v.map_or(Ok(()), |secs| {
                    validation::validate_positive_number("query_timeout_seconds", secs, 1)
                })
            },
        );

        self
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::default().merge(SettingsFile::from_file(path)?))
    }

    /// Loads settings without ever failing. A missing file is created with
    /// the defaults; an unreadable or malformed one is reported and ignored.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            let defaults = Self::default();
            match defaults.write_to(path) {
                Ok(()) => tracing::info!("📝 Configuration file created: {}", path.display()),
                Err(e) => tracing::warn!("⚠️  {}", e),
            }
            return defaults;
        }

        match Self::from_file(path) {
            Ok(settings) => {
                tracing::debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                tracing::warn!("⚠️  {}; using default settings", e);
                tracing::warn!("💡 {}", e.recovery_suggestion());
                Self::default()
            }
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| MonitorError::ConfigError {
                message: format!("cannot serialize settings: {}", e),
            })?,
            _ => serde_json::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_non_negative_amount("cost_limit_monthly", self.cost_limit_monthly)?;
        validation::validate_range("alert_threshold", self.alert_threshold, 0.0, 1.0)?;
        validation::validate_non_empty_string("currency", &self.currency)?;
        validation::validate_path("output_dir", &self.output_dir)?;

        if let Some(arn) = &self.sns_topic_arn {
            validation::validate_sns_topic_arn("sns_topic_arn", arn)?;
        }
        if let Some(url) = &self.endpoint_url {
            validation::validate_url("endpoint_url", url)?;
        }
        if let Some(secs) = self.query_timeout_seconds {
            validation::validate_positive_number("query_timeout_seconds", secs, 1)?;
        }

        Ok(())
    }
}
