use serde::{Deserialize, Serialize};
use std::fmt;

pub const HTML_INDICATORS: &[&str] = &[
    "<html>", "<div>", "<p>", "<table>", "<tr>", "<td>", "<span>", "<h1>", "<h2>",
];

pub const MARKDOWN_INDICATORS: &[&str] = &["# ", "## ", "### ", "**", "*", "- ", "1. ", "|", "```"];

pub const JSON_INDICATORS: &[&str] = &["{", "}", "\":", "[\"", "\"]"];

const MARKDOWN_MIN_EXCLUSIVE: u32 = 2;
const JSON_MIN_EXCLUSIVE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectedFormat {
    Html,
    Markdown,
    Json,
    PlainText,
}

impl DetectedFormat {
    pub fn label(self) -> &'static str {
        match self {
            DetectedFormat::Html => "HTML",
            DetectedFormat::Markdown => "Markdown",
            DetectedFormat::Json => "JSON",
            DetectedFormat::PlainText => "Plain text",
        }
    }
}

/// Winning label plus the number of distinct indicators that decided it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub format: DetectedFormat,
    pub indicators: u32,
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            DetectedFormat::PlainText => f.write_str(self.format.label()),
            other => write!(f, "{} (indicators: {})", other.label(), self.indicators),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorCounts {
    pub html: u32,
    pub markdown: u32,
    pub json: u32,
}

pub fn detect(content: &str) -> Detection {
    resolve(detect_counts(content))
}

pub fn detect_counts(content: &str) -> IndicatorCounts {
    // HTML tags match case-insensitively; the other sets do not.
    let lower = content.to_lowercase();
    IndicatorCounts {
        html: present(&lower, HTML_INDICATORS),
        markdown: present(content, MARKDOWN_INDICATORS),
        json: present(content, JSON_INDICATORS),
    }
}

/// Priority is fixed: HTML, then Markdown, then JSON, else plain text.
pub fn resolve(counts: IndicatorCounts) -> Detection {
    let (format, indicators) = if counts.html > 0 {
        (DetectedFormat::Html, counts.html)
    } else if counts.markdown > MARKDOWN_MIN_EXCLUSIVE {
        (DetectedFormat::Markdown, counts.markdown)
    } else if counts.json > JSON_MIN_EXCLUSIVE {
        (DetectedFormat::Json, counts.json)
    } else {
        (DetectedFormat::PlainText, 0)
    };
    Detection { format, indicators }
}

fn present(haystack: &str, indicators: &[&str]) -> u32 {
    indicators.iter().filter(|i| haystack.contains(**i)).count() as u32
}
