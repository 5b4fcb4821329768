use crate::{
    config::Config,
    detect::Detection,
    engine::{Engine, OutputFormat},
    report::AnalysisReport,
    util::{ensure_dir, looks_like_url, output_stem},
};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub struct Analyzer<E: Engine> {
    cfg: Config,
    engine: E,
}

pub struct AnalysisOutput {
    pub content: String,
    pub report: AnalysisReport,
    pub content_path: PathBuf,
    pub report_path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub format: OutputFormat,
    pub detected: Option<Detection>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub compared: Option<String>,
    pub comparison: Vec<ComparisonRow>,
    pub analyzed: Vec<(String, Option<Detection>)>,
    pub missing: Vec<String>,
}

impl<E: Engine> Analyzer<E> {
    pub fn new(cfg: &Config, engine: E) -> Self {
        Self {
            cfg: cfg.clone(),
            engine,
        }
    }

    pub fn analyze_document(
        &self,
        input: &Path,
        format: OutputFormat,
        out_dir: &Path,
    ) -> Result<AnalysisOutput> {
        self.validate_input(input)?;
        info!("analyzing {} requested={format}", input.display());

        let out = self
            .engine
            .analyze(input, format)
            .with_context(|| format!("analyzing {}", input.display()))?;

        let file = input.display().to_string();
        let mut report =
            AnalysisReport::new(&file, &out.content, format, self.cfg.report.excerpt_chars);
        report.fell_back = out.fell_back;

        info!(
            "requested={} detected={} html={} markdown={} json={}",
            format, report.detected, report.counts.html, report.counts.markdown, report.counts.json
        );

        ensure_dir(out_dir)?;
        let stem = output_stem(input);
        let content_path = out_dir.join(format!("{stem}_{format}_content.md"));
        let report_path = out_dir.join(format!("{stem}_{format}_report.md"));

        std::fs::write(&content_path, &out.content)
            .with_context(|| format!("writing {}", content_path.display()))?;
        std::fs::write(&report_path, report.render_text())
            .with_context(|| format!("writing {}", report_path.display()))?;
        if self.cfg.report.write_report_json {
            let json_path = out_dir.join(format!("{stem}_{format}_report.json"));
            std::fs::write(&json_path, serde_json::to_string_pretty(&report)?)
                .with_context(|| format!("writing {}", json_path.display()))?;
        }
        info!(
            "saved {} and {}",
            content_path.display(),
            report_path.display()
        );

        Ok(AnalysisOutput {
            content: out.content,
            report,
            content_path,
            report_path,
        })
    }

    /// Runs every format in turn; a failing format is logged and recorded, not fatal.
    pub fn compare_formats(
        &self,
        input: &Path,
        formats: &[OutputFormat],
        out_dir: &Path,
    ) -> Vec<ComparisonRow> {
        info!("format comparison for {}", input.display());
        formats
            .iter()
            .map(|&format| {
                let detected = match self.analyze_document(input, format, out_dir) {
                    Ok(out) => Some(out.report.detected),
                    Err(err) => {
                        error!("format {format} failed for {}: {err:#}", input.display());
                        None
                    }
                };
                ComparisonRow { format, detected }
            })
            .collect()
    }

    pub fn run_batch(&self, documents: &[String], out_dir: &Path) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let mut available = Vec::new();
        for doc in documents {
            if Path::new(doc).exists() {
                available.push(doc.clone());
            } else {
                warn!("document not found: {doc}");
                summary.missing.push(doc.clone());
            }
        }

        let Some(first) = available.first() else {
            warn!("no input documents found; add some files to [inputs].documents");
            return summary;
        };

        summary.comparison = self.compare_formats(Path::new(first), &self.cfg.compare.formats, out_dir);
        summary.compared = Some(first.clone());

        for doc in &available {
            let detected = match self.analyze_document(Path::new(doc), OutputFormat::Default, out_dir) {
                Ok(out) => Some(out.report.detected),
                Err(err) => {
                    error!("{doc}: {err:#}");
                    None
                }
            };
            summary.analyzed.push((doc.clone(), detected));
        }
        summary
    }

    fn validate_input(&self, input: &Path) -> Result<()> {
        let input_str = input.display().to_string();

        if self.cfg.security.reject_url_inputs && looks_like_url(&input_str) {
            return Err(anyhow!("URL inputs are disabled: {input_str}"));
        }

        if !input.exists() {
            return Err(anyhow!("input does not exist: {}", input.display()));
        }

        Ok(())
    }
}

pub fn render_comparison(rows: &[ComparisonRow]) -> String {
    rows.iter()
        .map(|row| match &row.detected {
            Some(d) => format!("{:10} -> {d}\n", row.format.as_str()),
            None => format!("{:10} -> ERROR\n", row.format.as_str()),
        })
        .collect()
}
