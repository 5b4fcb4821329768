use crate::engine::OutputFormat;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub service: Service,
    #[serde(default)]
    pub compare: Compare,
    #[serde(default)]
    pub inputs: Inputs,
    #[serde(default)]
    pub report: Report,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub security: Security,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// Loads `path` when it exists, otherwise the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("config not found, using defaults: {}", path.display());
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Global {
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    pub out_dir: String,
    pub dotenv_file: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            out_dir: "results".into(),
            dotenv_file: ".env".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub endpoint_env: String,
    pub api_key_env: String,
    pub model_id: String,
    pub api_version: String,
    pub request_timeout_seconds: u64,
    pub poll_interval_ms: u64,
    pub poll_timeout_seconds: u64,
    pub fallback_to_default: bool,
}
impl Default for Service {
    fn default() -> Self {
        Self {
            endpoint_env: "DOCUMENT_INTELLIGENCE_ENDPOINT".into(),
            api_key_env: "DOCUMENT_INTELLIGENCE_KEY".into(),
            model_id: "prebuilt-layout".into(),
            api_version: "2024-11-30".into(),
            request_timeout_seconds: 120,
            poll_interval_ms: 1000,
            poll_timeout_seconds: 600,
            fallback_to_default: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Compare {
    pub formats: Vec<OutputFormat>,
}
impl Default for Compare {
    fn default() -> Self {
        Self {
            formats: vec![
                OutputFormat::Default,
                OutputFormat::Markdown,
                OutputFormat::Text,
                OutputFormat::Html,
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inputs {
    pub documents: Vec<String>,
}
impl Default for Inputs {
    fn default() -> Self {
        Self {
            documents: vec![
                "test_documents/Azure AI Agents.pdf".into(),
                "test_documents/Azure ARC SQL.pdf".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub excerpt_chars: usize,
    pub write_report_json: bool,
}
impl Default for Report {
    fn default() -> Self {
        Self {
            excerpt_chars: 500,
            write_report_json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    pub reject_url_inputs: bool,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: true,
        }
    }
}

/// Service credentials, resolved once at startup and handed to the engine.
#[derive(Clone)]
pub struct Credentials {
    pub endpoint: String,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env(cfg: &Config) -> Result<Self> {
        let dotenv = Path::new(&cfg.paths.dotenv_file);
        if !cfg.paths.dotenv_file.is_empty() && dotenv.exists() {
            dotenvy::from_path(dotenv)
                .with_context(|| format!("loading dotenv file: {}", dotenv.display()))?;
        }
        Self::from_lookup(cfg, |k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(cfg: &Config, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| -> Result<String> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("missing environment variable {name}; check the .env file"))
        };
        let endpoint = read(&cfg.service.endpoint_env)?;
        let api_key = read(&cfg.service.api_key_env)?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}
