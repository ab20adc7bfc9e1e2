use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
const ENV_PREFIX: &str = "BRIEFS";

/// Runtime settings, read from `BRIEFS_*` environment variables (and `.env`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub output_dir: String,
    pub input_csv: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.2,
            output_dir: "output".to_string(),
            input_csv: "countries.csv".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize::<Settings>())
            .map_err(|e| Error::Config(e.to_string()))?;

        debug!(?settings, "Loaded settings");
        Ok(settings)
    }
}

/// Read the API credential. Missing or blank is a startup failure.
pub fn api_key() -> Result<String> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(Error::Config(format!("{} environment variable must be set", API_KEY_VAR))),
    }
}
