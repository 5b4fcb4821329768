pub mod azure;
pub mod types;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub use types::AnalyzeOut;

/// Output content format requested from the layout service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Default,
    Markdown,
    Text,
    Html,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Default => "default",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Text => "text",
            OutputFormat::Html => "html",
        }
    }

    /// Value for the `outputContentFormat` query parameter; `None` lets the service decide.
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            OutputFormat::Default => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Engine {
    fn analyze(&self, input: &Path, format: OutputFormat) -> Result<AnalyzeOut>;
}
