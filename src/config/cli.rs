use crate::config::toml_config::ScoutConfig;
use crate::domain::model::VersionSpec;
use crate::domain::ports::MajorVersionResolver;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "pgchangelog")]
#[command(about = "Find interesting fragments in PostgreSQL release notes")]
pub struct ChangelogArgs {
    #[arg(long, help = "Major PostgreSQL version, eg. 9.5 or 10")]
    pub major: Option<String>,

    #[arg(long, help = "Minor PostgreSQL version, eg. 1 or 21")]
    pub minor: Option<u32>,

    #[arg(long, default_value = ".", help = "Search pattern (case-insensitive)")]
    pub regex: String,

    #[arg(long, help = "Highlight <b>found</b> <b>terms</b>")]
    pub bold: bool,

    #[arg(long, help = "Generate CSV output")]
    pub csv: bool,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl ChangelogArgs {
    pub fn load_config(&self) -> Result<ScoutConfig> {
        let config = ScoutConfig::load(self.config.as_deref())?;
        config.changelog.validate()?;
        Ok(config)
    }

    /// `--major` wins; otherwise the resolver supplies the default.
    pub fn version_spec(&self, resolver: &dyn MajorVersionResolver) -> Result<VersionSpec> {
        let major = match &self.major {
            Some(major) => major.clone(),
            None => resolver.resolve_current_major(),
        };
        VersionSpec::new(major, self.minor)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "pg-closewait")]
#[command(about = "Print pg_cancel_backend statements for sockets stuck in CLOSE_WAIT")]
pub struct CloseWaitArgs {
    /// Owner of the server processes (default: postgres)
    #[arg(long)]
    pub user: Option<String>,

    /// Only cancel backends whose state changed at least this long ago (default: 45)
    #[arg(long)]
    pub min_wait_seconds: Option<u64>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CloseWaitArgs {
    /// 命令列參數覆蓋設定檔
    pub fn load_config(&self) -> Result<ScoutConfig> {
        let mut config = ScoutConfig::load(self.config.as_deref())?;
        if let Some(user) = &self.user {
            config.closewait.username = user.clone();
        }
        if let Some(seconds) = self.min_wait_seconds {
            config.closewait.min_wait_seconds = seconds;
        }
        config.closewait.validate()?;
        Ok(config)
    }
}
