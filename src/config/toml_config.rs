use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_RELEASE_NOTES_URL: &str = "https://www.postgresql.org/docs/current/static";
pub const DEFAULT_SOURCE_URL: &str = "https://raw.githubusercontent.com/postgres/postgres";
pub const DEFAULT_YEAR_OFFSET: i32 = 2008;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_USERNAME: &str = "postgres";
pub const DEFAULT_MIN_WAIT_SECONDS: u64 = 45;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub changelog: ChangelogSettings,
    pub closewait: CloseWaitSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChangelogSettings {
    /// Directory holding `release-<version>.html` pages
    pub release_notes_url: String,
    /// Raw-file root of the PostgreSQL source repository
    pub source_url: String,
    /// Default major = current year - year_offset
    pub year_offset: i32,
    pub timeout_seconds: u64,
}

impl Default for ChangelogSettings {
    fn default() -> Self {
        Self {
            release_notes_url: DEFAULT_RELEASE_NOTES_URL.to_string(),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            year_offset: DEFAULT_YEAR_OFFSET,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CloseWaitSettings {
    pub username: String,
    pub min_wait_seconds: u64,
}

impl Default for CloseWaitSettings {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            min_wait_seconds: DEFAULT_MIN_WAIT_SECONDS,
        }
    }
}

impl ScoutConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 載入指定檔案，未指定時使用預設值
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path);
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${PG_DOCS_URL})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_REF: OnceLock<Regex> = OnceLock::new();
        let re = ENV_REF.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }
}

impl Validate for ScoutConfig {
    fn validate(&self) -> Result<()> {
        self.changelog.validate()?;
        self.closewait.validate()
    }
}

impl Validate for ChangelogSettings {
    fn validate(&self) -> Result<()> {
        validate_url("changelog.release_notes_url", &self.release_notes_url)?;
        validate_url("changelog.source_url", &self.source_url)?;
        validate_positive_number(
            "changelog.year_offset",
            u64::try_from(self.year_offset).unwrap_or(0),
            1,
        )?;
        validate_positive_number("changelog.timeout_seconds", self.timeout_seconds, 1)
    }
}

impl Validate for CloseWaitSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("closewait.username", &self.username)
    }
}
