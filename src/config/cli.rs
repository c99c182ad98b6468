use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "request-caster")]
#[command(about = "Apply declarative field casts to a JSON request body")]
pub struct CliConfig {
    /// Path to the TOML cast configuration
    #[arg(short, long, default_value = "casts.toml")]
    pub config: String,

    /// JSON request body to transform (reads stdin when omitted)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Pretty-print the transformed request
    #[arg(long)]
    pub pretty: bool,

    /// Only load and compile the configuration
    #[arg(long)]
    pub check: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("config", &self.config)?;
        if let Some(input) = &self.input {
            validation::validate_path("input", input)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_args() {
        let config = CliConfig::parse_from([
            "request-caster",
            "--config",
            "register.toml",
            "--input",
            "body.json",
            "--pretty",
        ]);

        assert_eq!(config.config, "register.toml");
        assert_eq!(config.input.as_deref(), Some("body.json"));
        assert!(config.pretty);
        assert!(!config.check);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_path_is_rejected() {
        let config = CliConfig::parse_from(["request-caster", "--config", ""]);
        assert!(config.validate().is_err());
    }
}
