use crate::config::toml_config::TomlConfig;
use crate::config::ClientConfig;
use crate::core::signature::DEFAULT_TOLERANCE_SECS;
use crate::domain::ports::Environment;
use crate::utils::error::{JewelMusicError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "jewelmusic")]
#[command(about = "Command-line client for the JewelMusic API", version)]
pub struct CliConfig {
    #[arg(long, env = "JEWELMUSIC_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[arg(long, value_parser = parse_environment, global = true)]
    pub environment: Option<Environment>,

    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, help = "TOML config file with [client], [retry] and [logging] tables", global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, short, help = "Enable verbose output", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check connectivity and credentials
    Ping,
    /// Show the authenticated user's profile
    Profile,
    /// Show API usage for the current billing period
    Usage,
    /// Produce an X-JewelMusic-Signature header for a payload
    Sign(SignArgs),
    /// Check a payload against an X-JewelMusic-Signature header
    Verify(VerifyArgs),
}

#[derive(Debug, Clone, Args)]
pub struct PayloadArgs {
    #[arg(long, conflicts_with = "file")]
    pub payload: Option<String>,

    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    pub fn read(&self) -> Result<Vec<u8>> {
        match (&self.payload, &self.file) {
            (Some(payload), _) => Ok(payload.as_bytes().to_vec()),
            (None, Some(path)) => Ok(std::fs::read(path)?),
            (None, None) => Err(JewelMusicError::missing_fields(["payload"])),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SignArgs {
    #[arg(long, env = "JEWELMUSIC_WEBHOOK_SECRET", hide_env_values = true)]
    pub secret: String,

    #[command(flatten)]
    pub input: PayloadArgs,

    #[arg(long, help = "Unix timestamp to sign with (defaults to now)")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    #[arg(long, env = "JEWELMUSIC_WEBHOOK_SECRET", hide_env_values = true)]
    pub secret: String,

    #[arg(long)]
    pub header: String,

    #[command(flatten)]
    pub input: PayloadArgs,

    #[arg(long, default_value_t = DEFAULT_TOLERANCE_SECS)]
    pub tolerance: u64,
}

fn parse_environment(value: &str) -> std::result::Result<Environment, String> {
    value.parse::<Environment>().map_err(|e| e.to_string())
}

impl CliConfig {
    pub fn needs_client(&self) -> bool {
        matches!(self.command, Command::Ping | Command::Profile | Command::Usage)
    }

    /// Settings from `--config` (if any) with command-line flags layered on top.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_provider(&TomlConfig::from_file(path)?),
            None => ClientConfig::new(self.api_key.clone().unwrap_or_default()),
        };

        if let Some(api_key) = &self.api_key {
            config.api_key = api_key.clone();
        }
        if let Some(environment) = self.environment {
            config.environment = environment;
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn log_format(&self) -> LogFormat {
        self.toml_config()
            .map(|config| config.log_format())
            .unwrap_or_default()
    }

    /// `--verbose`, or `[logging] verbose = true` in the config file.
    pub fn verbose_logging(&self) -> bool {
        self.verbose || self.toml_config().is_some_and(|config| config.verbose())
    }

    // Logging is set up before validation, so an unreadable file just means defaults here.
    fn toml_config(&self) -> Option<TomlConfig> {
        self.config
            .as_ref()
            .and_then(|path| TomlConfig::from_file(path).ok())
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.base_url {
            crate::utils::validation::validate_url("base_url", base_url)?;
        }
        if let Some(path) = &self.config {
            if !path.exists() {
                return Err(JewelMusicError::InvalidConfigValueError {
                    field: "config".to_string(),
                    value: path.display().to_string(),
                    reason: "Config file does not exist".to_string(),
                });
            }
        }
        Ok(())
    }
}
