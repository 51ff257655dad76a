//! Runtime settings, read from an optional YAML file plus a few env overrides.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::digest::DigestLimits;

pub const CONFIG_ENV: &str = "SALESDESK_CONFIG";
pub const WORKBOOK_ENV: &str = "SALESDESK_WORKBOOK";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Spreadsheet file, or a directory of one CSV per sheet.
    pub workbook: PathBuf,
    pub digest: DigestLimits,
    pub summarizer: SummarizerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workbook: PathBuf::from("data/weekly_sales.xlsx"),
            digest: DigestLimits::default(),
            summarizer: SummarizerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummarizerConfig {
    pub endpoint: String,
    pub model: String,
    /// Name of the env var holding the API key; the key itself never lives in the file.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo-1106".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
            temperature: 0.0,
        }
    }
}

impl SummarizerConfig {
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)
            .with_context(|| format!("invalid summarizer endpoint {:?}", self.endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("summarizer endpoint must be http(s), got {}", url.scheme());
        }
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The API key, if its env var is set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env).ok().filter(|k| !k.trim().is_empty())
    }
}

impl Config {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(text).context("parsing config YAML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads `path`, else the file named by `SALESDESK_CONFIG`, else defaults.
    /// `SALESDESK_WORKBOOK` always wins for the workbook location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

        let mut cfg = match &path {
            Some(p) => {
                let text = fs::read_to_string(p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                info!(path = %p.display(), "loaded config");
                Self::from_yaml_str(&text).with_context(|| format!("in {}", p.display()))?
            }
            None => {
                debug!("no config file; using defaults");
                Self::default()
            }
        };

        if let Some(wb) = env::var_os(WORKBOOK_ENV) {
            cfg.workbook = PathBuf::from(wb);
        }
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        self.summarizer.endpoint_url()?;
        if self.summarizer.timeout_secs == 0 {
            bail!("summarizer.timeout_secs must be positive");
        }
        Ok(())
    }
}
