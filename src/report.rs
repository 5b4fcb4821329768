use crate::{
    detect::{self, DetectedFormat, Detection, IndicatorCounts},
    engine::OutputFormat,
    util::{head_chars, now_rfc3339, tail_chars},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub file: String,
    pub date: String,
    pub requested: OutputFormat,
    pub detected: Detection,
    pub counts: IndicatorCounts,
    pub content_chars: usize,
    pub excerpt_chars: usize,
    pub head: String,
    pub tail: String,
    #[serde(default)]
    pub fell_back: bool,
}

impl AnalysisReport {
    pub fn new(file: &str, content: &str, requested: OutputFormat, excerpt_chars: usize) -> Self {
        let counts = detect::detect_counts(content);
        Self {
            file: file.to_string(),
            date: now_rfc3339(),
            requested,
            detected: detect::resolve(counts),
            counts,
            content_chars: content.chars().count(),
            excerpt_chars,
            head: head_chars(content, excerpt_chars).to_string(),
            tail: tail_chars(content, excerpt_chars).to_string(),
            fell_back: false,
        }
    }

    pub fn render_text(&self) -> String {
        let note = if self.fell_back {
            "Note: requested format was rejected; default parameters were used\n"
        } else {
            ""
        };
        let result = match self.detected.format {
            DetectedFormat::Html => "RESULT: service returned HTML\n   - HTML tags found",
            DetectedFormat::Markdown => "RESULT: service returned Markdown\n   - Markdown syntax found",
            DetectedFormat::Json => "RESULT: service returned JSON\n   - JSON structure found",
            DetectedFormat::PlainText => "RESULT: Plain text or unidentified format",
        };
        let n = self.excerpt_chars;

        format!(
            "=== ANALYSIS REPORT ===
File: {file}
Date: {date}
Requested format: {requested}
Detected format: {detected}
Content length: {chars} characters
{note}
=== CONTENT ANALYSIS ===
{result}

=== CONTENT SAMPLE ===
FIRST {n} CHARACTERS:
{head}...

LAST {n} CHARACTERS:
...{tail}

=== MANUAL VERIFICATION ===
Check the complete file to confirm the format.
",
            file = self.file,
            date = self.date,
            requested = self.requested,
            detected = self.detected,
            chars = self.content_chars,
            head = self.head,
            tail = self.tail,
        )
    }
}
