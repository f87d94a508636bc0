use clap::{Args, ValueEnum};

use crate::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Show current configuration values
#[derive(Args)]
pub struct ConfigCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(config)?);
            }
            OutputFormat::Text => {
                println!("Configuration");
                println!("=============\n");

                if let Some(path) = &config.config_file {
                    println!("Config file: {}", path.display());
                } else {
                    println!(
                        "Config file: {} (not found)",
                        Config::default_config_path().display()
                    );
                }
                println!();

                println!(
                    "database_url: {}",
                    config.database_url.value.as_deref().unwrap_or("(not set)")
                );
                println!("  source: {}", config.database_url.source);
                println!();

                println!("data_dir: {}", config.data_dir.value.display());
                println!("  source: {}", config.data_dir.source);
                println!();

                println!("food_api:");
                println!("  base_url: {}", config.food_api.base_url);
                println!(
                    "  credentials: {}",
                    if config.food_api.is_configured() {
                        "set"
                    } else {
                        "not set"
                    }
                );
            }
        }
        Ok(())
    }
}
