use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::APP_NAME;

const CONFIG_NAME: &str = "config.toml";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub db_file: String,
    /// Label printed after amounts.
    pub currency: String,
}

impl Settings {
    /// Defaults, then the config file, then `BUDGET_*` environment variables.
    pub fn new(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let file = match config_path {
            Some(path) => File::with_name(path),
            None => File::from(default_config_path()).required(false),
        };

        Config::builder()
            .set_default("db_file", default_data_path())?
            .set_default("currency", "DH")?
            .add_source(file)
            .add_source(Environment::with_prefix("BUDGET"))
            .build()?
            .try_deserialize()
    }
}

fn default_data_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir()))
        .join(APP_NAME)
        .join("budget.db")
        .display()
        .to_string()
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir()))
        .join(APP_NAME)
        .join(CONFIG_NAME)
}
